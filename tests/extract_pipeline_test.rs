//! End-to-end extraction through the real HTTP transport.
//!
//! A wiremock server plays the IPTV provider and others play CORS relays,
//! so strategy ordering, relay URL wrapping, bouquet lookup and fallback
//! all run over actual sockets.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use m3ui::core::extractor::{Extractor, ExtractorConfig};
use m3ui::core::fetch_plan::{AttemptOutcome, DirectPolicy, FetchPlan, ProxyDescriptor};
use m3ui::core::http::HttpTransport;
use m3ui::core::models::{AccountStatus, ExtractionOutcome, PlanTier, ProfileSource};
use m3ui::core::progress::Silent;
use m3ui::error::ExtractError;

use common::fixtures::{
    account_body, account_endpoint, categories_body, mount_provider, playlist_url, relay_template,
};
use common::logger::TestLogger;

fn extractor(direct: DirectPolicy, proxies: Vec<ProxyDescriptor>, timeout: Duration) -> Extractor {
    let config = ExtractorConfig {
        attempt_timeout: timeout,
        plan: FetchPlan::new(direct, proxies),
        fetch_bouquets: true,
    };
    let transport = HttpTransport::with_timeout(timeout).expect("client");
    Extractor::new(Arc::new(transport), config)
}

/// Provider that rejects every request, as a geo-blocked panel would.
async fn blocked_provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    server
}

/// Relay that answers for `provider`'s account and category endpoints.
async fn working_relay(provider: &MockServer) -> MockServer {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw"))
        .and(query_param("url", account_endpoint(provider)))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
        .expect(1)
        .mount(&relay)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw"))
        .and(query_param(
            "url",
            format!("{}&action=get_live_categories", account_endpoint(provider)),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(categories_body()))
        .expect(1)
        .mount(&relay)
        .await;
    relay
}

async fn failing_relay(status: u16) -> MockServer {
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream error"))
        .mount(&relay)
        .await;
    relay
}

#[tokio::test]
async fn direct_success_normalizes_sample_account() {
    let log = TestLogger::new("direct_success_normalizes_sample_account");
    log.phase("setup");
    let provider = MockServer::start().await;
    mount_provider(&provider, account_body(), categories_body()).await;

    log.phase("execute");
    let outcome = extractor(DirectPolicy::Always, vec![], Duration::from_secs(5))
        .extract(&playlist_url(&provider), &Silent, &CancellationToken::new())
        .await
        .expect("valid url");

    log.phase("verify");
    let profile = outcome.profile().expect("completed");
    assert_eq!(profile.username, "john");
    assert_eq!(profile.password, "secret123");
    assert_eq!(profile.plan_tier, PlanTier::Premium);
    assert_eq!(profile.status, AccountStatus::Active);
    assert_eq!(profile.expires_at, NaiveDate::from_ymd_opt(2025, 1, 1));
    assert_eq!(profile.device_limit, Some(2));
    assert_eq!(profile.bouquets, vec!["Sports", "News", "Movies"]);
    assert_eq!(profile.source, ProfileSource::Direct);
    assert!(profile.observation_summary.contains("Expires: 1735689600 (2025-01-01)"));

    assert_eq!(outcome.attempts().len(), 1);
    assert_eq!(outcome.attempts()[0].strategy_id, "direct");
    assert_eq!(outcome.attempts()[0].outcome, AttemptOutcome::Success);
    assert_eq!(provider.received_requests().await.map(|r| r.len()), Some(2));
    log.finish_ok();
}

#[tokio::test]
async fn blocked_direct_falls_through_to_first_relay() {
    let log = TestLogger::new("blocked_direct_falls_through_to_first_relay");
    let provider = blocked_provider().await;
    let relay = working_relay(&provider).await;
    let unused = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&unused)
        .await;

    let proxies = vec![
        ProxyDescriptor::new("relay-a", relay_template(&relay, "/raw")),
        ProxyDescriptor::new("relay-b", relay_template(&unused, "/raw")),
    ];
    let outcome = extractor(DirectPolicy::Always, proxies, Duration::from_secs(5))
        .extract(&playlist_url(&provider), &Silent, &CancellationToken::new())
        .await
        .expect("valid url");

    let profile = outcome.profile().expect("completed");
    assert_eq!(profile.source, ProfileSource::Proxy("relay-a".to_string()));
    assert_eq!(profile.bouquets.len(), 3);

    let ids: Vec<_> = outcome.attempts().iter().map(|a| a.strategy_id.as_str()).collect();
    assert_eq!(ids, ["direct", "proxy:relay-a"]);
    assert_eq!(outcome.attempts()[0].outcome, AttemptOutcome::HttpError(403));
    // relay-b never contacted: checked by `.expect(0)` on drop
    log.finish_ok();
}

#[tokio::test]
async fn plain_http_playlist_skips_direct_by_default() {
    let log = TestLogger::new("plain_http_playlist_skips_direct_by_default");
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body()))
        .expect(0)
        .mount(&provider)
        .await;
    let relay = working_relay(&provider).await;

    let outcome = extractor(
        DirectPolicy::HttpsOnly,
        vec![ProxyDescriptor::new("relay", relay_template(&relay, "/raw"))],
        Duration::from_secs(5),
    )
    .extract(&playlist_url(&provider), &Silent, &CancellationToken::new())
    .await
    .expect("valid url");

    assert_eq!(
        outcome.profile().map(|p| p.source.clone()),
        Some(ProfileSource::Proxy("relay".to_string()))
    );
    assert!(outcome.progress()[0].starts_with("Skipping direct access"));
    assert_eq!(outcome.progress()[1], "Testing proxy 1 of 1 (relay)...");
    log.finish_ok();
}

#[tokio::test]
async fn malformed_relay_advances_to_next() {
    let log = TestLogger::new("malformed_relay_advances_to_next");
    let provider = blocked_provider().await;

    let html = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Too many requests</html>"))
        .expect(1)
        .mount(&html)
        .await;
    let relay = working_relay(&provider).await;

    let outcome = extractor(
        DirectPolicy::Never,
        vec![
            ProxyDescriptor::new("html", relay_template(&html, "/raw")),
            ProxyDescriptor::new("good", relay_template(&relay, "/raw")),
        ],
        Duration::from_secs(5),
    )
    .extract(&playlist_url(&provider), &Silent, &CancellationToken::new())
    .await
    .expect("valid url");

    assert_eq!(
        outcome.profile().map(|p| p.source.clone()),
        Some(ProfileSource::Proxy("good".to_string()))
    );
    assert_eq!(outcome.attempts()[0].outcome, AttemptOutcome::MalformedResponse);
    assert!(provider.received_requests().await.is_some_and(|r| r.is_empty()));
    log.finish_ok();
}

#[tokio::test]
async fn every_strategy_failing_yields_simulated_profile() {
    let log = TestLogger::new("every_strategy_failing_yields_simulated_profile");
    let provider = blocked_provider().await;
    let a = failing_relay(500).await;
    let b = failing_relay(502).await;

    let outcome = extractor(
        DirectPolicy::Always,
        vec![
            ProxyDescriptor::new("a", relay_template(&a, "/raw")),
            ProxyDescriptor::new("b", relay_template(&b, "/raw")),
        ],
        Duration::from_secs(5),
    )
    .extract(&playlist_url(&provider), &Silent, &CancellationToken::new())
    .await
    .expect("valid url");

    let profile = outcome.profile().expect("completed");
    assert_eq!(profile.source, ProfileSource::Simulated);
    assert_eq!(profile.username, "john");
    assert_eq!(profile.password, "secret123");
    assert_eq!(profile.plan_tier, PlanTier::Premium);
    assert_eq!(profile.status, AccountStatus::Active);
    assert_eq!(profile.expires_at, None);
    assert_eq!(profile.device_limit, Some(1));
    assert!(profile.bouquets.is_empty());

    let outcomes: Vec<_> = outcome.attempts().iter().map(|a| a.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        [
            AttemptOutcome::HttpError(403),
            AttemptOutcome::HttpError(500),
            AttemptOutcome::HttpError(502)
        ]
    );
    assert_eq!(
        outcome.progress().last().map(String::as_str),
        Some("All strategies failed, using simulated data...")
    );
    log.finish_ok();
}

#[tokio::test]
async fn slow_relay_times_out_and_next_one_wins() {
    let log = TestLogger::new("slow_relay_times_out_and_next_one_wins");
    let provider = blocked_provider().await;

    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(account_body())
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&slow)
        .await;
    let relay = working_relay(&provider).await;

    let outcome = extractor(
        DirectPolicy::Never,
        vec![
            ProxyDescriptor::new("slow", relay_template(&slow, "/raw")),
            ProxyDescriptor::new("fast", relay_template(&relay, "/raw")),
        ],
        Duration::from_millis(500),
    )
    .extract(&playlist_url(&provider), &Silent, &CancellationToken::new())
    .await
    .expect("valid url");

    assert!(matches!(
        outcome.attempts()[0].outcome,
        AttemptOutcome::NetworkError(_)
    ));
    assert_eq!(
        outcome.profile().map(|p| p.source.clone()),
        Some(ProfileSource::Proxy("fast".to_string()))
    );
    log.finish_ok();
}

#[tokio::test]
async fn missing_password_makes_no_requests() {
    let log = TestLogger::new("missing_password_makes_no_requests");
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let url = format!("{}/get.php?username=john&type=m3u", provider.uri());
    let err = extractor(DirectPolicy::Always, vec![], Duration::from_secs(5))
        .extract(&url, &Silent, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err, ExtractError::CredentialsMissing { missing: "password" });
    log.finish_ok();
}

#[tokio::test]
async fn cancellation_stops_a_slow_extraction() {
    let log = TestLogger::new("cancellation_stops_a_slow_extraction");
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(account_body())
                .set_delay(Duration::from_secs(20)),
        )
        .mount(&provider)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let outcome = extractor(DirectPolicy::Always, vec![], Duration::from_secs(30))
        .extract(&playlist_url(&provider), &Silent, &cancel)
        .await
        .expect("valid url");

    assert!(matches!(outcome, ExtractionOutcome::Cancelled { .. }));
    assert!(started.elapsed() < Duration::from_secs(10));
    log.finish_ok();
}
