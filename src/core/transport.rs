//! Network seam and response classification.
//!
//! A [`Transport`] performs one GET and reports status + body; the functions
//! here turn that into the pipeline's [`RawResult`]. Keeping classification
//! out of the transport lets tests script responses without a socket.

use async_trait::async_trait;
use serde_json::Value;

use super::fetch_plan::AttemptFailure;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs a single GET request.
///
/// `Err` carries a human-readable reason for connection-level failures
/// (DNS, refused, TLS, timeout); any HTTP status is an `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, String>;
}

/// Parsed provider body or the reason there is none.
pub type RawResult = Result<Value, AttemptFailure>;

/// Classify an account introspection response.
///
/// Success requires a 2xx status, a JSON body, and a non-null `user_info`
/// object in it.
#[must_use]
pub fn classify_account(response: Result<TransportResponse, String>) -> RawResult {
    let body = parse_json(response)?;
    match body.get("user_info") {
        Some(Value::Object(_)) => Ok(body),
        _ => Err(AttemptFailure::FieldMissing),
    }
}

/// Classify a category listing response; success requires a JSON array.
#[must_use]
pub fn classify_categories(response: Result<TransportResponse, String>) -> RawResult {
    let body = parse_json(response)?;
    if body.is_array() {
        Ok(body)
    } else {
        Err(AttemptFailure::FieldMissing)
    }
}

fn parse_json(response: Result<TransportResponse, String>) -> RawResult {
    let response = response.map_err(AttemptFailure::Network)?;
    if !response.is_success() {
        return Err(AttemptFailure::Http(response.status));
    }
    serde_json::from_str(response.body.trim_start_matches('\u{feff}'))
        .map_err(|_| AttemptFailure::MalformedResponse)
}
