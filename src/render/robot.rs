//! Robot-mode output (JSON and Markdown).
//!
//! JSON is wrapped in the [`RobotOutput`] envelope so consumers can check
//! `schemaVersion` before reading `data`.

use serde::Serialize;

use crate::core::models::{ExtractReport, ExtractionOutcome, Inspection, RobotOutput, StrategyChain};
use crate::error::Result;

/// Render any value as JSON.
pub fn render_json<T: Serialize>(output: &T) -> Result<String> {
    Ok(serde_json::to_string(output)?)
}

/// Render any value as pretty JSON.
pub fn render_json_pretty<T: Serialize>(output: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

/// Wrap `data` in the envelope for `command` and serialize it.
pub fn render_envelope<T: Serialize>(
    command: &str,
    data: T,
    errors: Vec<String>,
    pretty: bool,
) -> Result<String> {
    let output = RobotOutput::with_errors(command, data, errors);
    if pretty {
        render_json_pretty(&output)
    } else {
        render_json(&output)
    }
}

/// Render extraction results as Markdown.
pub fn render_extractions_md(reports: &[ExtractReport], errors: &[String]) -> Result<String> {
    let mut output = String::new();

    for report in reports {
        match &report.result {
            ExtractionOutcome::Completed(extraction) => {
                let profile = &extraction.profile;
                output.push_str(&format!("## {} ({})\n", report.account, profile.source));
                output.push_str(&format!("- username: {}\n", profile.username));
                output.push_str(&format!("- password: {}\n", profile.password));
                output.push_str(&format!("- plan: {}\n", profile.plan_tier.as_str()));
                output.push_str(&format!("- status: {}\n", profile.status.as_str()));
                if let Some(expires) = profile.expires_at {
                    output.push_str(&format!("- expires: {}\n", expires.format("%Y-%m-%d")));
                }
                if let Some(limit) = profile.device_limit {
                    output.push_str(&format!("- device_limit: {limit}\n"));
                }
                if !profile.bouquets.is_empty() {
                    output.push_str(&format!("- bouquets: {}\n", profile.bouquets.join(", ")));
                }
                output.push_str(&format!("- summary: {}\n", profile.observation_summary));
                output.push_str(&format!("- attempts: {}\n", extraction.attempts.len()));
            }
            ExtractionOutcome::Cancelled { attempts, .. } => {
                output.push_str(&format!("## {} (cancelled)\n", report.account));
                output.push_str(&format!("- attempts: {}\n", attempts.len()));
            }
        }
        output.push('\n');
    }

    if !errors.is_empty() {
        output.push_str("## Errors\n");
        for error in errors {
            output.push_str(&format!("- {error}\n"));
        }
    }

    Ok(output)
}

/// Render parsed credentials as Markdown.
pub fn render_inspection_md(inspection: &Inspection) -> Result<String> {
    let mut output = String::new();
    output.push_str(&format!("## {}\n", inspection.host));
    output.push_str(&format!("- scheme: {}\n", inspection.scheme));
    output.push_str(&format!("- username: {}\n", inspection.username));
    output.push_str(&format!("- password: {}\n", inspection.password));
    output.push_str(&format!("- endpoint: {}\n", inspection.endpoint));
    Ok(output)
}

/// Render the strategy order as a Markdown list.
pub fn render_strategy_chain_md(chain: &StrategyChain) -> Result<String> {
    let mut output = String::from("## Fetch strategies\n");
    output.push_str(&format!("0. direct ({})\n", chain.direct_policy));
    for (i, proxy) in chain.proxies.iter().enumerate() {
        output.push_str(&format!("{}. {} `{}`\n", i + 1, proxy.name, proxy.template));
    }
    output.push_str(&format!("\n- timeout_seconds: {}\n", chain.timeout_seconds));
    output.push_str(&format!("- fetch_bouquets: {}\n", chain.fetch_bouquets));
    output.push_str(&format!("- config: {}\n", chain.config_path));
    Ok(output)
}
