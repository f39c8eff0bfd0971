//! Extract command implementation.

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::cli::args::ExtractArgs;
use crate::core::credentials::PlaylistCredentials;
use crate::core::extractor::Extractor;
use crate::core::models::{ExtractReport, ExtractionOutcome};
use crate::error::{ExtractError, M3uiError, Result};
use crate::render;
use crate::storage::ResolvedConfig;

/// Per-URL results in input order.
#[derive(Debug, Clone)]
pub(crate) struct ExtractResults {
    pub reports: Vec<ExtractReport>,
    pub failures: Vec<(String, ExtractError)>,
}

impl ExtractResults {
    fn error_lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|(label, err)| format!("{label}: {err}"))
            .collect()
    }
}

/// Execute the extract command.
///
/// Progress lines go to stderr as they happen. Results are printed before
/// any pre-flight failure or cancellation is turned into the command error.
pub async fn execute(
    args: &ExtractArgs,
    config: &ResolvedConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let extractor = Extractor::http(config.extractor_config())?;
    let results = run_extractions(&extractor, &args.urls, cancel).await;

    let errors = results.error_lines();
    if !results.reports.is_empty() || !errors.is_empty() {
        let output = render::render_extractions(
            &results.reports,
            &errors,
            config.format,
            config.pretty,
            config.no_color,
        )?;
        println!("{output}");
    }

    if let Some((_, err)) = results.failures.into_iter().next() {
        return Err(M3uiError::Extract(err));
    }
    if results.reports.iter().any(|r| r.result.is_cancelled()) {
        return Err(M3uiError::Cancelled);
    }
    Ok(())
}

/// Run one extraction per URL concurrently.
pub(crate) async fn run_extractions(
    extractor: &Extractor,
    urls: &[String],
    cancel: &CancellationToken,
) -> ExtractResults {
    let tagged = urls.len() > 1;

    let runs = urls.iter().enumerate().map(|(index, url)| {
        let label = account_label(url).unwrap_or_else(|| format!("url #{}", index + 1));
        async move {
            let prefix = if tagged { format!("[{label}] ") } else { String::new() };
            let sink = |status: &str| eprintln!("{prefix}{status}");
            let result = extractor.extract(url, &sink, cancel).await;
            (label, result)
        }
    });

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (label, result) in join_all(runs).await {
        match result {
            Ok(outcome) => {
                log_outcome(&label, &outcome);
                reports.push(ExtractReport {
                    account: label,
                    result: outcome,
                });
            }
            Err(err) => {
                tracing::warn!(account = %label, error = %err, "Playlist URL rejected");
                failures.push((label, err));
            }
        }
    }

    ExtractResults { reports, failures }
}

fn account_label(url: &str) -> Option<String> {
    PlaylistCredentials::parse(url)
        .ok()
        .map(|c| format!("{}@{}", c.username, c.host))
}

fn log_outcome(label: &str, outcome: &ExtractionOutcome) {
    match outcome.profile() {
        Some(profile) => tracing::debug!(
            account = %label,
            source = %profile.source,
            attempts = outcome.attempts().len(),
            "Extraction finished"
        ),
        None => tracing::info!(account = %label, "Extraction cancelled"),
    }
}
