//! Core data models.
//!
//! [`AccountProfile`] is the canonical contract handed to whatever owns the
//! client record (form state, record store). Everything else here is
//! diagnostics around it.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::credentials::{PlaylistCredentials, Scheme};
use super::fetch_plan::{DirectPolicy, ExtractionAttempt, ProxyDescriptor};

// =============================================================================
// Profile Enums
// =============================================================================

/// Subscription tier reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanTier {
    Trial,
    Premium,
}

impl PlanTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "Trial",
            Self::Premium => "Premium",
        }
    }
}

/// Account state, collapsed to two values.
///
/// Providers report richer strings (`Expired`, `Banned`, `Disabled`...).
/// The raw value survives in [`AccountProfile::observation_summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

/// Where the profile data came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum ProfileSource {
    /// Provider answered a request made without a relay.
    Direct,
    /// Provider answered through the named proxy.
    Proxy(String),
    /// Nothing answered; fields were synthesized from the credentials.
    Simulated,
}

impl ProfileSource {
    /// Whether the profile carries remote data.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        !matches!(self, Self::Simulated)
    }
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Proxy(name) => write!(f, "proxy ({name})"),
            Self::Simulated => f.write_str("simulated"),
        }
    }
}

// =============================================================================
// Account Profile
// =============================================================================

/// Normalized account profile used to pre-fill a client record.
///
/// # Invariants
/// - `source == Simulated` implies `expires_at` is `None` and `bouquets`
///   is empty.
/// - Remote sources imply the profile was built from a provider body with a
///   `user_info` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub username: String,
    pub password: String,
    pub plan_tier: PlanTier,
    pub status: AccountStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_limit: Option<u32>,

    #[serde(default)]
    pub bouquets: Vec<String>,

    pub observation_summary: String,
    pub source: ProfileSource,
}

// =============================================================================
// Extraction Results
// =============================================================================

/// A completed extraction with its diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub profile: AccountProfile,
    pub attempts: Vec<ExtractionAttempt>,
    pub progress: Vec<String>,
}

/// Result of a pre-flight-valid extraction call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ExtractionOutcome {
    /// A profile was produced (remote or simulated).
    Completed(Extraction),
    /// The caller cancelled before a profile was produced.
    #[serde(rename_all = "camelCase")]
    Cancelled {
        attempts: Vec<ExtractionAttempt>,
        progress: Vec<String>,
    },
}

impl ExtractionOutcome {
    /// The profile, if the extraction ran to completion.
    #[must_use]
    pub const fn profile(&self) -> Option<&AccountProfile> {
        match self {
            Self::Completed(extraction) => Some(&extraction.profile),
            Self::Cancelled { .. } => None,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> &[ExtractionAttempt] {
        match self {
            Self::Completed(extraction) => &extraction.attempts,
            Self::Cancelled { attempts, .. } => attempts,
        }
    }

    #[must_use]
    pub fn progress(&self) -> &[String] {
        match self {
            Self::Completed(extraction) => &extraction.progress,
            Self::Cancelled { progress, .. } => progress,
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

// =============================================================================
// Command Payloads
// =============================================================================

/// One playlist URL's result as reported by `m3ui extract`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReport {
    /// `username@host` of the playlist.
    pub account: String,
    pub result: ExtractionOutcome,
}

/// What `m3ui inspect` recovers from a URL without touching the network.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub scheme: Scheme,
    pub host: String,
    pub username: String,
    /// Masked unless the caller asked for it in clear.
    pub password: String,
    pub endpoint: String,
}

impl Inspection {
    #[must_use]
    pub fn new(credentials: &PlaylistCredentials, show_password: bool) -> Self {
        let (password, endpoint) = if show_password {
            (credentials.password.clone(), credentials.endpoint())
        } else {
            (credentials.masked_password(), credentials.redacted_endpoint())
        };
        Self {
            scheme: credentials.scheme,
            host: credentials.host.clone(),
            username: credentials.username.clone(),
            password,
            endpoint,
        }
    }
}

/// The resolved fetch plan as shown by `m3ui proxies`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyChain {
    pub direct_policy: DirectPolicy,
    pub timeout_seconds: u64,
    pub fetch_bouquets: bool,
    pub proxies: Vec<ProxyDescriptor>,
    pub config_path: String,
}

// =============================================================================
// Robot Output
// =============================================================================

/// Stable JSON envelope for machine consumers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,

    #[serde(default)]
    pub errors: Vec<String>,

    pub meta: RobotMeta,
}

/// Metadata for robot output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotMeta {
    pub format: String,
    pub runtime: String,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self::with_errors(command, data, Vec::new())
    }

    /// Create with errors.
    pub fn with_errors(command: impl Into<String>, data: T, errors: Vec<String>) -> Self {
        Self {
            schema_version: "m3ui.v1".to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors,
            meta: RobotMeta {
                format: "json".to_string(),
                runtime: "cli".to_string(),
            },
        }
    }
}
