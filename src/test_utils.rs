//! Test utilities for m3ui.
//!
//! Provides a scripted [`Transport`] with call-count spies and provider
//! body factories for use across unit and integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use m3ui::test_utils::*;
//!
//! let stub = StubTransport::new().respond(endpoint, 200, &user_info_body());
//! // ... run an extraction against `stub` ...
//! assert_eq!(stub.total_calls(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::core::transport::{Transport, TransportResponse};

/// Playlist URL used by the canonical scenarios.
pub const SAMPLE_PLAYLIST_URL: &str =
    "https://iptv.example.com:8080/get.php?username=john&password=secret123&type=m3u";

/// Introspection endpoint derived from [`SAMPLE_PLAYLIST_URL`].
pub const SAMPLE_ENDPOINT: &str =
    "https://iptv.example.com:8080/player_api.php?username=john&password=secret123";

/// Category endpoint derived from [`SAMPLE_PLAYLIST_URL`].
pub const SAMPLE_CATEGORIES_ENDPOINT: &str = "https://iptv.example.com:8080/player_api.php?username=john&password=secret123&action=get_live_categories";

// =============================================================================
// Body Factories
// =============================================================================

/// `user_info` object for the sample account (`exp_date` = 2025-01-01).
#[must_use]
pub fn sample_user_info() -> Value {
    json!({
        "username": "john",
        "password": "secret123",
        "is_trial": "0",
        "status": "Active",
        "exp_date": "1735689600",
        "max_connections": "2"
    })
}

/// Full introspection body wrapping [`sample_user_info`].
#[must_use]
pub fn user_info_body() -> String {
    json!({ "user_info": sample_user_info() }).to_string()
}

/// Category listing body with the given names.
#[must_use]
pub fn categories_body(names: &[&str]) -> String {
    let items: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({ "category_id": (i + 1).to_string(), "category_name": name, "parent_id": 0 })
        })
        .collect();
    Value::Array(items).to_string()
}

/// Write `contents` to a temporary TOML file that lives as long as the handle.
///
/// # Panics
///
/// Panics if the temporary file cannot be created or written.
#[must_use]
pub fn temp_config(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

// =============================================================================
// Stub Transport
// =============================================================================

/// Scripted transport keyed by exact request URL.
///
/// Unscripted URLs fail with a connection error, so "every strategy fails"
/// is the empty stub.
#[derive(Default)]
pub struct StubTransport {
    responses: HashMap<String, Result<TransportResponse, String>>,
    delay: Option<Duration>,
    url_delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status` and `body`.
    #[must_use]
    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), Ok(TransportResponse::new(status, body)));
        self
    }

    /// Fail `url` with a connection-level error.
    #[must_use]
    pub fn fail(mut self, url: &str, reason: &str) -> Self {
        self.responses.insert(url.to_string(), Err(reason.to_string()));
        self
    }

    /// Sleep before answering every request.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before answering `url` only.
    #[must_use]
    pub fn delay_url(mut self, url: &str, delay: Duration) -> Self {
        self.url_delays.insert(url.to_string(), delay);
        self
    }

    /// Every requested URL, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls().len()
    }

    #[must_use]
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        if let Some(delay) = self.url_delays.get(url).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err("connection refused (unscripted URL)".to_string()))
    }
}
