//! Phase-aware logging for integration tests.
//!
//! Every line goes to stderr (captured by the harness unless `--nocapture`)
//! prefixed with the test name, the current phase and elapsed time, so a
//! failing CI run shows where in the test it stopped.
//!
//! ```rust,ignore
//! let log = TestLogger::new("extract_direct_success");
//! log.phase("setup");
//! // ...
//! log.finish_ok();
//! ```
//!
//! `TEST_LOG_LEVEL` (trace, debug, info, warn, error; default info) filters
//! the output.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn from_env() -> Self {
        match std::env::var("TEST_LOG_LEVEL")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "trace" | "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Per-test logger.
pub struct TestLogger {
    name: String,
    started: Instant,
    phase: Mutex<String>,
    min_level: Level,
}

impl TestLogger {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let logger = Self {
            name: name.to_string(),
            started: Instant::now(),
            phase: Mutex::new("init".to_string()),
            min_level: Level::from_env(),
        };
        logger.info("start");
        logger
    }

    fn emit(&self, level: Level, message: &str) {
        if level < self.min_level {
            return;
        }
        let phase = self.phase.lock().map(|p| p.clone()).unwrap_or_default();
        eprintln!(
            "[{:>5}] {} ({phase}, +{}ms) {message}",
            level.label(),
            self.name,
            self.started.elapsed().as_millis()
        );
    }

    pub fn phase(&self, phase: &str) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase.to_string();
        }
        self.debug(&format!("phase -> {phase}"));
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    /// Record an outgoing request made by the code under test.
    pub fn http_request(&self, method: &str, url: &str) {
        self.debug(&format!("{method} {url}"));
    }

    /// Record a CLI invocation.
    pub fn command(&self, args: &[&str]) {
        self.debug(&format!("m3ui {}", args.join(" ")));
    }

    pub fn finish_ok(&self) {
        self.info("ok");
    }

    pub fn finish_err(&self, reason: &str) {
        self.emit(Level::Error, &format!("failed: {reason}"));
    }
}
