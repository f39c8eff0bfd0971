//! Human-readable progress reporting during an extraction.
//!
//! The sequencer announces every step before it happens. Reports are a side
//! channel only; nothing in the pipeline branches on them.

use std::sync::Mutex;

/// Receives status lines such as `"Testing proxy 2 of 3 (corsproxy)..."`.
pub trait ProgressSink: Send + Sync {
    fn report(&self, status: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, status: &str) {
        self(status);
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&self, _status: &str) {}
}

/// Forwards reports to an inner sink and keeps an ordered copy.
pub struct ProgressLog<'a> {
    inner: &'a dyn ProgressSink,
    lines: Mutex<Vec<String>>,
}

impl<'a> ProgressLog<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn ProgressSink) -> Self {
        Self {
            inner,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Reports recorded so far, in emission order.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ProgressSink for ProgressLog<'_> {
    fn report(&self, status: &str) {
        tracing::debug!(status, "Progress");
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(status.to_string());
        }
        self.inner.report(status);
    }
}

// Status line builders, kept together so the wording stays consistent.

pub(crate) fn trying_direct(position: usize, total: usize) -> String {
    format!("Trying direct access (strategy {position} of {total})...")
}

pub(crate) fn skipping_direct() -> String {
    "Skipping direct access: plain-HTTP provider must be reached through a proxy".to_string()
}

pub(crate) fn testing_proxy(index: usize, count: usize, name: &str) -> String {
    format!("Testing proxy {index} of {count} ({name})...")
}

pub(crate) fn succeeded(via: &str) -> String {
    format!("Account data received via {via}")
}

pub(crate) fn fetching_bouquets() -> String {
    "Fetching bouquet list...".to_string()
}

pub(crate) fn exhausted() -> String {
    "All strategies failed, using simulated data...".to_string()
}

pub(crate) fn cancelled() -> String {
    "Extraction cancelled".to_string()
}
