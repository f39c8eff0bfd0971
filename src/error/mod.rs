//! Error types for m3ui.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Two layers of errors exist:
//! - [`ExtractError`]: the only failures the extraction pipeline ever hands
//!   back to a caller. Both are pre-flight input problems detected before any
//!   network traffic.
//! - [`M3uiError`]: crate-wide error for the CLI and configuration layers.
//!
//! Per-strategy network failures are not errors at this level at all; they
//! are recorded as [`crate::core::fetch_plan::AttemptFailure`] values and
//! absorbed by the attempt sequencer.
//!
//! Each `M3uiError` has a stable error code (e.g., `M3UI-I001`) for
//! programmatic handling.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller supplied an unusable playlist URL.
    Input,
    /// Connection, timeout or relay failures.
    Network,
    /// Config file parsing, validation, or invalid flag values.
    Configuration,
    /// Internal errors (I/O, serialization, unexpected state).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Input => "Input error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Input => "I",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success (including simulated profiles).
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Invalid playlist URL, missing credentials, bad config
    InputError = 3,
    /// Operation cancelled (Ctrl-C)
    Cancelled = 130,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

// =============================================================================
// Extraction errors
// =============================================================================

/// Pre-flight failures surfaced by the extraction pipeline.
///
/// Every network-layer problem is absorbed into a (possibly simulated)
/// profile, so these two variants are the complete failure surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The input is not a well-formed absolute http(s) URL.
    #[error("invalid playlist URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// The URL parsed but lacks a non-empty `username` or `password`.
    #[error("playlist URL is missing the '{missing}' query parameter")]
    CredentialsMissing { missing: &'static str },
}

// =============================================================================
// Crate error
// =============================================================================

/// Main error type for m3ui operations.
#[derive(Error, Debug)]
pub enum M3uiError {
    /// Playlist URL rejected before any network attempt.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Extraction abandoned by the caller.
    #[error("extraction cancelled")]
    Cancelled,

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid value in configuration or on the command line.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid {
        key: String,
        value: String,
        message: String,
    },

    /// Generic network error (client construction and the like).
    #[error("network error: {0}")]
    Network(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure wrapped with context, such as an unreadable config file.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl M3uiError {
    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Extract(_) | Self::Config(_) | Self::ConfigInvalid { .. } => ExitCode::InputError,
            Self::Cancelled => ExitCode::Cancelled,
            Self::Network(_) | Self::Io(_) | Self::Json(_) | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Extract(_) => ErrorCategory::Input,
            Self::Network(_) => ErrorCategory::Network,
            Self::Config(_) | Self::ConfigInvalid { .. } => ErrorCategory::Configuration,
            Self::Cancelled | Self::Io(_) | Self::Json(_) | Self::Other(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `M3UI-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Extract(ExtractError::InvalidUrl { .. }) => "M3UI-I001",
            Self::Extract(ExtractError::CredentialsMissing { .. }) => "M3UI-I002",

            Self::Network(_) => "M3UI-N099",

            Self::Config(_) => "M3UI-C001",
            Self::ConfigInvalid { .. } => "M3UI-C002",

            Self::Io(_) => "M3UI-X001",
            Self::Json(_) => "M3UI-X002",
            Self::Cancelled => "M3UI-X010",
            Self::Other(_) => "M3UI-X099",
        }
    }

    /// A one-line hint telling the operator what to do next.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Extract(ExtractError::InvalidUrl { .. }) => Some(
                "Paste the full playlist link, e.g. http://host:port/get.php?username=U&password=P"
                    .to_string(),
            ),
            Self::Extract(ExtractError::CredentialsMissing { missing }) => Some(format!(
                "Ask the subscriber for a playlist link that includes '{missing}=' in its query string"
            )),
            Self::Config(_) | Self::ConfigInvalid { .. } => {
                Some("Check config.toml or run `m3ui proxies` to see the resolved settings".to_string())
            }
            Self::Network(_) => {
                Some("Check your internet connection or raise --timeout".to_string())
            }
            Self::Cancelled | Self::Io(_) | Self::Json(_) | Self::Other(_) => None,
        }
    }
}

/// Result type alias for m3ui operations.
pub type Result<T> = std::result::Result<T, M3uiError>;

// =============================================================================
// Tests
// =============================================================================
