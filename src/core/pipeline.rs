//! Attempt sequencer.
//!
//! Runs the fetch plan's strategies strictly one after another. The first
//! attempt that yields a body with `user_info` wins and nothing after it
//! runs; any classified failure moves on to the next strategy without retry.
//! Every attempt is bounded by a timeout and abandoned on cancellation.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::credentials::Scheme;
use super::fetch_plan::{AttemptOutcome, ExtractionAttempt, FetchPlan, Strategy};
use super::progress::{self, ProgressSink};
use super::transport::{Transport, TransportResponse, classify_account};

/// Longest provider body kept on a failed attempt record.
const MAX_DIAGNOSTIC_BODY: usize = 2048;

/// Terminal state of one sequencer run.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceResult {
    /// A strategy produced a provider body containing `user_info`.
    Succeeded { body: Value, strategy: Strategy },
    /// Every eligible strategy failed.
    Exhausted,
    /// The cancellation token fired first.
    Cancelled,
}

/// Result plus the attempt log, in execution order.
#[derive(Debug, Clone)]
pub struct SequenceReport {
    pub result: SequenceResult,
    pub attempts: Vec<ExtractionAttempt>,
}

/// Drives one extraction's strategies; one instance per call.
pub struct AttemptSequencer<'a> {
    transport: &'a dyn Transport,
    attempt_timeout: Duration,
    progress: &'a dyn ProgressSink,
    cancel: &'a CancellationToken,
}

impl<'a> AttemptSequencer<'a> {
    #[must_use]
    pub fn new(
        transport: &'a dyn Transport,
        attempt_timeout: Duration,
        progress: &'a dyn ProgressSink,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            transport,
            attempt_timeout,
            progress,
            cancel,
        }
    }

    /// Run the plan against the introspection `endpoint`.
    pub async fn run(&self, plan: &FetchPlan, scheme: Scheme, endpoint: &str) -> SequenceReport {
        let strategies = plan.strategies(scheme);
        let total = strategies.len();
        let proxy_count = plan.proxies.len();
        let mut attempts = Vec::with_capacity(total);

        if !plan.direct_eligible(scheme) {
            tracing::debug!(%scheme, policy = %plan.direct_policy, "Direct strategy not eligible, skipping");
            self.progress.report(&progress::skipping_direct());
        }

        let mut proxy_index = 0;
        for (position, strategy) in strategies.into_iter().enumerate() {
            let status = match &strategy {
                Strategy::Direct => progress::trying_direct(position + 1, total),
                Strategy::Proxy(proxy) => {
                    proxy_index += 1;
                    progress::testing_proxy(proxy_index, proxy_count, &proxy.name)
                }
            };
            self.progress.report(&status);

            let strategy_id = strategy.id();
            tracing::info!(strategy = %strategy_id, "Trying fetch strategy");

            let started_at = Utc::now();
            let start = Instant::now();
            let Some(response) = self.fetch(&strategy.request_url(endpoint)).await else {
                tracing::info!(strategy = %strategy_id, "Extraction cancelled mid-attempt");
                self.progress.report(&progress::cancelled());
                return SequenceReport {
                    result: SequenceResult::Cancelled,
                    attempts,
                };
            };
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            let raw_body = response.as_ref().ok().map(|r| truncate(&r.body));
            match classify_account(response) {
                Ok(body) => {
                    tracing::info!(strategy = %strategy_id, duration_ms, "Fetch succeeded");
                    attempts.push(ExtractionAttempt {
                        strategy_id,
                        started_at,
                        duration_ms,
                        outcome: AttemptOutcome::Success,
                        raw_body: None,
                    });
                    self.progress.report(&progress::succeeded(&strategy.source().to_string()));
                    return SequenceReport {
                        result: SequenceResult::Succeeded { body, strategy },
                        attempts,
                    };
                }
                Err(failure) => {
                    tracing::warn!(
                        strategy = %strategy_id,
                        error = %failure,
                        duration_ms,
                        "Fetch failed"
                    );
                    attempts.push(ExtractionAttempt {
                        strategy_id,
                        started_at,
                        duration_ms,
                        outcome: AttemptOutcome::from(&failure),
                        raw_body,
                    });
                }
            }
        }

        tracing::warn!(attempts = attempts.len(), "All fetch strategies failed");
        self.progress.report(&progress::exhausted());
        SequenceReport {
            result: SequenceResult::Exhausted,
            attempts,
        }
    }

    /// One guarded GET: `None` when cancelled, timeout folded into `Err`.
    pub async fn fetch(&self, url: &str) -> Option<Result<TransportResponse, String>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = tokio::time::timeout(self.attempt_timeout, self.transport.get(url)) => {
                Some(result.unwrap_or_else(|_| {
                    Err(format!("timed out after {}s", self.attempt_timeout.as_secs_f32()))
                }))
            }
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_DIAGNOSTIC_BODY).collect()
}
