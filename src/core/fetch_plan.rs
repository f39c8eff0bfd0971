//! Transport strategies and the ordered fetch plan.
//!
//! A plan is the direct strategy (when the [`DirectPolicy`] allows it for
//! the playlist scheme) followed by every configured proxy relay, in order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credentials::Scheme;
use super::models::ProfileSource;
use crate::error::{M3uiError, Result};

/// Placeholder substituted with the URL-encoded target in proxy templates.
pub const URL_PLACEHOLDER: &str = "{url}";

// =============================================================================
// Direct Policy
// =============================================================================

/// When the provider endpoint may be requested without a relay.
///
/// Browser-hosted callers cannot reach plain-HTTP hosts from a secure page
/// (mixed content), so the default only goes direct for HTTPS playlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectPolicy {
    /// Direct only when the playlist scheme is https.
    #[default]
    HttpsOnly,
    /// Always try direct first.
    Always,
    /// Never go direct; proxies only.
    Never,
}

impl DirectPolicy {
    /// Parse from CLI argument or config value.
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "https-only" | "https" => Some(Self::HttpsOnly),
            "always" => Some(Self::Always),
            "never" | "off" => Some(Self::Never),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HttpsOnly => "https-only",
            Self::Always => "always",
            Self::Never => "never",
        }
    }

    /// Whether a direct request is eligible for the given scheme.
    #[must_use]
    pub const fn allows(self, scheme: Scheme) -> bool {
        match self {
            Self::HttpsOnly => matches!(scheme, Scheme::Https),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl fmt::Display for DirectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Proxy Descriptor
// =============================================================================

/// An unauthenticated relay that fetches a target URL on our behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    pub name: String,
    /// URL template containing `{url}`.
    pub template: String,
}

impl ProxyDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    /// Parse a `NAME=TEMPLATE` command-line value.
    ///
    /// # Errors
    ///
    /// Returns an error when the `=` separator is missing or the result
    /// fails [`ProxyDescriptor::validate`].
    pub fn from_arg(arg: &str) -> Result<Self> {
        let (name, template) = arg.split_once('=').ok_or_else(|| M3uiError::ConfigInvalid {
            key: "proxy".to_string(),
            value: arg.to_string(),
            message: "expected NAME=TEMPLATE".to_string(),
        })?;
        let proxy = Self::new(name.trim(), template.trim());
        proxy.validate()?;
        Ok(proxy)
    }

    /// Embed the URL-encoded target into the relay template.
    #[must_use]
    pub fn wrap(&self, target: &str) -> String {
        self.template
            .replace(URL_PLACEHOLDER, &urlencoding::encode(target))
    }

    /// Check the name is non-empty and the template yields an http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns [`M3uiError::ConfigInvalid`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| M3uiError::ConfigInvalid {
            key: format!("proxies.{}", self.name),
            value: self.template.clone(),
            message: message.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("proxy name must not be empty"));
        }
        if !self.template.contains(URL_PLACEHOLDER) {
            return Err(invalid("template must contain {url}"));
        }
        let sample = self.wrap("http://provider.invalid/player_api.php");
        match url::Url::parse(&sample) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(()),
            Ok(_) => Err(invalid("template must be an http(s) URL")),
            Err(e) => Err(invalid(&format!("template is not a URL: {e}"))),
        }
    }
}

/// Relays used when the config declares none.
#[must_use]
pub fn default_proxies() -> Vec<ProxyDescriptor> {
    vec![
        ProxyDescriptor::new("allorigins", "https://api.allorigins.win/raw?url={url}"),
        ProxyDescriptor::new("corsproxy", "https://corsproxy.io/?url={url}"),
        ProxyDescriptor::new("codetabs", "https://api.codetabs.com/v1/proxy?quest={url}"),
    ]
}

// =============================================================================
// Strategy
// =============================================================================

/// One way of reaching the provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Proxy(ProxyDescriptor),
}

impl Strategy {
    /// Stable identifier used in logs and attempt records.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Direct => "direct".to_string(),
            Self::Proxy(proxy) => format!("proxy:{}", proxy.name),
        }
    }

    /// URL actually requested for `endpoint`.
    #[must_use]
    pub fn request_url(&self, endpoint: &str) -> String {
        match self {
            Self::Direct => endpoint.to_string(),
            Self::Proxy(proxy) => proxy.wrap(endpoint),
        }
    }

    /// Provenance tag for profiles obtained through this strategy.
    #[must_use]
    pub fn source(&self) -> ProfileSource {
        match self {
            Self::Direct => ProfileSource::Direct,
            Self::Proxy(proxy) => ProfileSource::Proxy(proxy.name.clone()),
        }
    }
}

// =============================================================================
// Attempt Records
// =============================================================================

/// Why a single strategy attempt did not yield an account body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Connection, DNS, TLS or timeout failure.
    Network(String),
    /// Non-2xx response status.
    Http(u16),
    /// Body was not valid JSON.
    MalformedResponse,
    /// JSON body without a `user_info` object.
    FieldMissing,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http(status) => write!(f, "HTTP {status}"),
            Self::MalformedResponse => f.write_str("response is not valid JSON"),
            Self::FieldMissing => f.write_str("response has no user_info object"),
        }
    }
}

/// Classified outcome recorded for every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum AttemptOutcome {
    Success,
    NetworkError(String),
    HttpError(u16),
    MalformedResponse,
    FieldMissing,
}

impl AttemptOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<&AttemptFailure> for AttemptOutcome {
    fn from(failure: &AttemptFailure) -> Self {
        match failure {
            AttemptFailure::Network(msg) => Self::NetworkError(msg.clone()),
            AttemptFailure::Http(status) => Self::HttpError(*status),
            AttemptFailure::MalformedResponse => Self::MalformedResponse,
            AttemptFailure::FieldMissing => Self::FieldMissing,
        }
    }
}

/// Record of a single strategy invocation, kept for diagnostics only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionAttempt {
    pub strategy_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
}

// =============================================================================
// Fetch Plan
// =============================================================================

/// Ordered strategy list, shared read-only by every extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub direct_policy: DirectPolicy,
    pub proxies: Vec<ProxyDescriptor>,
}

impl Default for FetchPlan {
    fn default() -> Self {
        Self::new(DirectPolicy::default(), default_proxies())
    }
}

impl FetchPlan {
    #[must_use]
    pub const fn new(direct_policy: DirectPolicy, proxies: Vec<ProxyDescriptor>) -> Self {
        Self {
            direct_policy,
            proxies,
        }
    }

    /// Whether the direct strategy runs for a playlist of this scheme.
    #[must_use]
    pub const fn direct_eligible(&self, scheme: Scheme) -> bool {
        self.direct_policy.allows(scheme)
    }

    /// Strategies in execution order for a playlist of this scheme.
    #[must_use]
    pub fn strategies(&self, scheme: Scheme) -> Vec<Strategy> {
        let direct = self
            .direct_eligible(scheme)
            .then_some(Strategy::Direct);
        direct
            .into_iter()
            .chain(self.proxies.iter().cloned().map(Strategy::Proxy))
            .collect()
    }
}
