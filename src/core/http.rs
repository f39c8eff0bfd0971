//! HTTP client utilities.
//!
//! Provides the reqwest-backed [`Transport`] used outside tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

use super::transport::{Transport, TransportResponse};
use crate::error::{M3uiError, Result};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(format!("m3ui/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| M3uiError::Network(e.to_string()))
}

/// Transport over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a transport whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns error if client construction fails.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        build_client(timeout).map(Self::new)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> std::result::Result<TransportResponse, String> {
        let response = self.client.get(url).send().await.map_err(describe)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(describe)?;
        Ok(TransportResponse { status, body })
    }
}

/// Failure reason without the request URL, which carries the password.
fn describe(e: reqwest::Error) -> String {
    let e = e.without_url();
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}
