//! Diagnostic logging via `tracing-subscriber`.
//!
//! Stdout carries command output only; logs go to stderr or, when
//! `M3UI_LOG_FILE` is set, are appended to that file.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const LOG_LEVEL_ENV: &str = "M3UI_LOG";
pub const LOG_FORMAT_ENV: &str = "M3UI_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "M3UI_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, no timestamps.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
    /// Single-line terse output with targets.
    Compact,
}

impl LogFormat {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" | "pretty" => Some(Self::Human),
            "json" | "jsonl" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Parse a level name; `verbose` is accepted as an alias for debug.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "verbose" | "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Level,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::ERROR,
            format: LogFormat::Human,
            file: None,
        }
    }
}

impl LogSettings {
    /// Merge CLI flag over environment variable over config file level.
    ///
    /// `verbose` raises the level to at least debug; `json_output` forces
    /// JSON lines.
    #[must_use]
    pub fn resolve(
        cli_level: Option<&str>,
        file_level: Option<&str>,
        json_output: bool,
        verbose: bool,
    ) -> Self {
        let defaults = Self::default();

        let mut level = cli_level
            .and_then(parse_level)
            .or_else(|| env_value(LOG_LEVEL_ENV).as_deref().and_then(parse_level))
            .or_else(|| file_level.and_then(parse_level))
            .unwrap_or(defaults.level);
        if verbose && level < Level::DEBUG {
            level = Level::DEBUG;
        }

        let format = if json_output {
            LogFormat::Json
        } else {
            env_value(LOG_FORMAT_ENV)
                .as_deref()
                .and_then(LogFormat::from_arg)
                .unwrap_or(defaults.format)
        };

        Self {
            level,
            format,
            file: env_value(LOG_FILE_ENV).map(PathBuf::from),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("m3ui={}", self.level.to_string().to_lowercase()))
        })
    }

    fn writer(&self) -> BoxMakeWriter {
        self.file
            .as_ref()
            .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok())
            .map_or_else(|| BoxMakeWriter::new(std::io::stderr), BoxMakeWriter::new)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(settings: &LogSettings) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.filter())
        .with_writer(settings.writer());

    match settings.format {
        LogFormat::Json => builder
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .ok(),
        LogFormat::Compact => builder.compact().with_target(true).try_init().ok(),
        LogFormat::Human => builder.with_target(false).without_time().try_init().ok(),
    };
}
