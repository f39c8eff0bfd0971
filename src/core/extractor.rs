//! Extraction orchestrator.
//!
//! Single entry point for turning a playlist URL into an [`AccountProfile`]:
//! parse, build the endpoint, run the attempt sequencer, then either
//! normalize the provider body or synthesize a placeholder.
//!
//! Only [`ExtractError`] ever reaches the caller. Network trouble of any
//! kind ends in a simulated profile; cancellation ends in
//! [`ExtractionOutcome::Cancelled`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::credentials::PlaylistCredentials;
use super::fallback::synthesize;
use super::fetch_plan::{FetchPlan, Strategy};
use super::http::{DEFAULT_TIMEOUT, HttpTransport};
use super::models::{AccountProfile, Extraction, ExtractionOutcome};
use super::normalize::{normalize, parse_bouquets};
use super::pipeline::{AttemptSequencer, SequenceResult};
use super::progress::{self, ProgressLog, ProgressSink};
use super::transport::{Transport, classify_categories};
use crate::error::{ExtractError, Result};

/// Read-only settings shared by every extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Upper bound for each individual strategy attempt.
    pub attempt_timeout: Duration,
    pub plan: FetchPlan,
    /// Whether to query live categories after a successful introspection.
    pub fetch_bouquets: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_TIMEOUT,
            plan: FetchPlan::default(),
            fetch_bouquets: true,
        }
    }
}

/// Runs extractions; cheap to share, holds no per-call state.
#[derive(Clone)]
pub struct Extractor {
    transport: Arc<dyn Transport>,
    config: ExtractorConfig,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: ExtractorConfig) -> Self {
        Self { transport, config }
    }

    /// Extractor over a real HTTP client honouring the attempt timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn http(config: ExtractorConfig) -> Result<Self> {
        let transport = HttpTransport::with_timeout(config.attempt_timeout)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract an account profile from `raw_url`.
    ///
    /// Progress lines go to `progress` as they happen and are also returned
    /// in the outcome.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidUrl`] or [`ExtractError::CredentialsMissing`],
    /// both raised before any request is made.
    pub async fn extract(
        &self,
        raw_url: &str,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> std::result::Result<ExtractionOutcome, ExtractError> {
        let credentials = PlaylistCredentials::parse(raw_url)?;
        let endpoint = credentials.endpoint();
        tracing::debug!(
            scheme = %credentials.scheme,
            host = %credentials.host,
            username = %credentials.username,
            endpoint = %credentials.redacted_endpoint(),
            "Parsed playlist credentials"
        );

        let log = ProgressLog::new(progress);
        let (profile, attempts) = {
            let sequencer =
                AttemptSequencer::new(self.transport.as_ref(), self.config.attempt_timeout, &log, cancel);
            let report = sequencer
                .run(&self.config.plan, credentials.scheme, &endpoint)
                .await;

            let profile = match report.result {
                SequenceResult::Succeeded { body, strategy } => {
                    match self.bouquets(&sequencer, &log, &strategy, &credentials).await {
                        Some(bouquets) => Some(Self::build_profile(
                            &body,
                            &strategy,
                            &credentials,
                            bouquets,
                        )),
                        None => {
                            log.report(&progress::cancelled());
                            None
                        }
                    }
                }
                SequenceResult::Exhausted => Some(synthesize(&credentials)),
                SequenceResult::Cancelled => None,
            };
            (profile, report.attempts)
        };
        let progress = log.into_lines();

        Ok(match profile {
            Some(profile) => {
                tracing::info!(source = %profile.source, "Extraction complete");
                ExtractionOutcome::Completed(Extraction {
                    profile,
                    attempts,
                    progress,
                })
            }
            None => ExtractionOutcome::Cancelled { attempts, progress },
        })
    }

    /// Category names through the strategy that already worked.
    ///
    /// `None` only when cancelled; every other failure yields an empty list.
    async fn bouquets(
        &self,
        sequencer: &AttemptSequencer<'_>,
        log: &ProgressLog<'_>,
        strategy: &Strategy,
        credentials: &PlaylistCredentials,
    ) -> Option<Vec<String>> {
        if !self.config.fetch_bouquets {
            return Some(Vec::new());
        }

        log.report(&progress::fetching_bouquets());
        let url = strategy.request_url(&credentials.categories_endpoint());
        let response = sequencer.fetch(&url).await?;
        match classify_categories(response) {
            Ok(body) => {
                let bouquets = parse_bouquets(&body);
                tracing::debug!(count = bouquets.len(), "Fetched bouquets");
                Some(bouquets)
            }
            Err(failure) => {
                tracing::warn!(strategy = %strategy.id(), error = %failure, "Bouquet lookup failed");
                Some(Vec::new())
            }
        }
    }

    fn build_profile(
        body: &serde_json::Value,
        strategy: &Strategy,
        credentials: &PlaylistCredentials,
        bouquets: Vec<String>,
    ) -> AccountProfile {
        normalize(body, strategy.source(), credentials, bouquets).unwrap_or_else(|failure| {
            // the sequencer only accepts bodies with user_info
            tracing::error!(error = %failure, "Accepted body failed normalization");
            synthesize(credentials)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch_plan::{DirectPolicy, ProxyDescriptor};
    use crate::core::models::{AccountStatus, PlanTier, ProfileSource};
    use crate::core::progress::Silent;
    use crate::test_utils::{
        SAMPLE_CATEGORIES_ENDPOINT, SAMPLE_ENDPOINT, SAMPLE_PLAYLIST_URL, StubTransport,
        categories_body, user_info_body,
    };
    use chrono::NaiveDate;
    use tracing_test::traced_test;

    fn config() -> ExtractorConfig {
        ExtractorConfig {
            attempt_timeout: Duration::from_secs(5),
            plan: FetchPlan::new(
                DirectPolicy::HttpsOnly,
                vec![
                    ProxyDescriptor::new("first", "https://first.example/?u={url}"),
                    ProxyDescriptor::new("second", "https://second.example/?u={url}"),
                ],
            ),
            fetch_bouquets: true,
        }
    }

    async fn extract(stub: Arc<StubTransport>, url: &str) -> ExtractionOutcome {
        Extractor::new(stub, config())
            .extract(url, &Silent, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn direct_success_matches_stub() {
        let stub = Arc::new(
            StubTransport::new()
                .respond(SAMPLE_ENDPOINT, 200, &user_info_body())
                .respond(SAMPLE_CATEGORIES_ENDPOINT, 200, &categories_body(&["Sports", "Movies"])),
        );
        let outcome = extract(stub.clone(), SAMPLE_PLAYLIST_URL).await;
        let profile = outcome.profile().unwrap();

        assert_eq!(profile.username, "john");
        assert_eq!(profile.password, "secret123");
        assert_eq!(profile.plan_tier, PlanTier::Premium);
        assert_eq!(profile.status, AccountStatus::Active);
        assert_eq!(profile.expires_at, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(profile.device_limit, Some(2));
        assert_eq!(profile.bouquets, vec!["Sports", "Movies"]);
        assert_eq!(profile.source, ProfileSource::Direct);
        assert_eq!(stub.calls(), vec![SAMPLE_ENDPOINT, SAMPLE_CATEGORIES_ENDPOINT]);
    }

    #[tokio::test]
    async fn bouquets_go_through_the_winning_proxy() {
        let first = ProxyDescriptor::new("first", "https://first.example/?u={url}");
        let stub = Arc::new(
            StubTransport::new()
                .respond(&first.wrap(SAMPLE_ENDPOINT), 200, &user_info_body())
                .respond(
                    &first.wrap(SAMPLE_CATEGORIES_ENDPOINT),
                    200,
                    &categories_body(&["Kids"]),
                ),
        );
        let outcome = extract(stub.clone(), SAMPLE_PLAYLIST_URL).await;
        let profile = outcome.profile().unwrap();

        assert_eq!(profile.source, ProfileSource::Proxy("first".to_string()));
        assert_eq!(profile.bouquets, vec!["Kids"]);
        assert_eq!(stub.calls_to(&first.wrap(SAMPLE_ENDPOINT)), 1);
        assert_eq!(stub.calls_to(&config().plan.proxies[1].wrap(SAMPLE_ENDPOINT)), 0);
    }

    #[tokio::test]
    async fn failed_bouquet_lookup_leaves_list_empty() {
        let stub = Arc::new(StubTransport::new().respond(SAMPLE_ENDPOINT, 200, &user_info_body()));
        let outcome = extract(stub, SAMPLE_PLAYLIST_URL).await;
        let profile = outcome.profile().unwrap();
        assert_eq!(profile.source, ProfileSource::Direct);
        assert!(profile.bouquets.is_empty());
    }

    #[tokio::test]
    async fn bouquet_lookup_can_be_disabled() {
        let stub = Arc::new(StubTransport::new().respond(SAMPLE_ENDPOINT, 200, &user_info_body()));
        let mut cfg = config();
        cfg.fetch_bouquets = false;
        Extractor::new(stub.clone(), cfg)
            .extract(SAMPLE_PLAYLIST_URL, &Silent, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(stub.total_calls(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn password_stays_out_of_logs() {
        let stub = Arc::new(StubTransport::new().respond(SAMPLE_ENDPOINT, 200, &user_info_body()));
        extract(stub, SAMPLE_PLAYLIST_URL).await;

        assert!(logs_contain("Parsed playlist credentials"));
        assert!(logs_contain("password=s********"));
        assert!(!logs_contain("secret123"));
    }

    #[tokio::test]
    async fn all_failures_yield_simulated_profile() {
        let stub = Arc::new(StubTransport::new());
        let outcome = extract(stub.clone(), SAMPLE_PLAYLIST_URL).await;
        let profile = outcome.profile().unwrap();

        assert_eq!(profile.source, ProfileSource::Simulated);
        assert_eq!(profile.expires_at, None);
        assert!(profile.bouquets.is_empty());
        assert_eq!(profile.device_limit, Some(1));
        assert_eq!(profile.username, "john");
        assert_eq!(outcome.attempts().len(), 3);
        assert_eq!(
            outcome.progress().last().map(String::as_str),
            Some("All strategies failed, using simulated data...")
        );
    }

    #[tokio::test]
    async fn missing_credentials_make_no_requests() {
        let stub = Arc::new(StubTransport::new());
        let err = Extractor::new(stub.clone(), config())
            .extract(
                "https://iptv.example.com/get.php?username=john",
                &Silent,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ExtractError::CredentialsMissing { missing: "password" });
        assert_eq!(stub.total_calls(), 0);
    }

    #[tokio::test]
    async fn repeated_extraction_is_deterministic() {
        let stub = Arc::new(StubTransport::new().respond(SAMPLE_ENDPOINT, 200, &user_info_body()));
        let a = extract(stub.clone(), SAMPLE_PLAYLIST_URL).await;
        let b = extract(stub, SAMPLE_PLAYLIST_URL).await;
        assert_eq!(a.profile(), b.profile());
    }

    #[tokio::test]
    async fn cancellation_is_distinct_from_simulated() {
        let stub = Arc::new(
            StubTransport::new()
                .respond(SAMPLE_ENDPOINT, 200, &user_info_body())
                .with_delay(Duration::from_secs(30)),
        );
        let cancel = CancellationToken::new();
        let extractor = Extractor::new(stub.clone(), config());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let outcome = extractor
            .extract(SAMPLE_PLAYLIST_URL, &Silent, &cancel)
            .await
            .unwrap();

        assert!(outcome.is_cancelled());
        assert!(outcome.profile().is_none());
        assert_eq!(stub.total_calls(), 1);
    }

    #[tokio::test]
    async fn cancelling_during_bouquet_lookup_discards_the_profile() {
        let stub = Arc::new(
            StubTransport::new()
                .respond(SAMPLE_ENDPOINT, 200, &user_info_body())
                .respond(SAMPLE_CATEGORIES_ENDPOINT, 200, &categories_body(&["Sports"]))
                .delay_url(SAMPLE_CATEGORIES_ENDPOINT, Duration::from_secs(30)),
        );
        let cancel = CancellationToken::new();
        let extractor = Extractor::new(stub.clone(), config());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let outcome = extractor
            .extract(SAMPLE_PLAYLIST_URL, &Silent, &cancel)
            .await
            .unwrap();

        assert!(outcome.is_cancelled());
        assert!(outcome.profile().is_none());
        assert_eq!(stub.calls(), vec![SAMPLE_ENDPOINT, SAMPLE_CATEGORIES_ENDPOINT]);
        assert_eq!(outcome.attempts().len(), 1);
        assert_eq!(
            outcome.progress().last(),
            Some(&progress::cancelled())
        );
    }
}
