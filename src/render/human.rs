//! Human-readable terminal output.

use colored::{Color, Colorize};

use crate::core::fetch_plan::DirectPolicy;
use crate::core::models::{
    AccountProfile, AccountStatus, ExtractReport, ExtractionOutcome, Inspection, StrategyChain,
};
use crate::error::Result;

/// Column width of the field labels.
const LABEL_WIDTH: usize = 12;

fn paint(text: &str, color: Color, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        text.color(color).to_string()
    }
}

fn heading(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        text.bold().to_string()
    }
}

fn field(label: &str, value: &str) -> String {
    format!("  {:<LABEL_WIDTH$} {value}", format!("{label}:"))
}

/// Render extraction results, one block per URL, then rejected URLs.
pub fn render_extractions(
    reports: &[ExtractReport],
    errors: &[String],
    no_color: bool,
) -> Result<String> {
    let mut blocks: Vec<String> = reports
        .iter()
        .map(|report| render_report(report, no_color))
        .collect();

    if !errors.is_empty() {
        let mut lines = vec![paint("Rejected", Color::Red, no_color)];
        lines.extend(errors.iter().map(|e| format!("  {e}")));
        blocks.push(format!("{}\n", lines.join("\n")));
    }
    Ok(blocks.join("\n"))
}

fn render_report(report: &ExtractReport, no_color: bool) -> String {
    match &report.result {
        ExtractionOutcome::Completed(extraction) => {
            render_profile(&report.account, &extraction.profile, no_color)
        }
        ExtractionOutcome::Cancelled { attempts, .. } => format!(
            "{}\n{}\n",
            heading(&report.account, no_color),
            paint(
                &format!("  Cancelled after {} attempt(s)", attempts.len()),
                Color::Yellow,
                no_color
            )
        ),
    }
}

fn render_profile(account: &str, profile: &AccountProfile, no_color: bool) -> String {
    let remote = profile.source.is_remote();
    let source_color = if remote { Color::Cyan } else { Color::Yellow };
    let status_color = match profile.status {
        AccountStatus::Active => Color::Green,
        AccountStatus::Inactive => Color::Red,
    };

    let mut lines = vec![format!(
        "{}  {}",
        heading(account, no_color),
        paint(&format!("[{}]", profile.source), source_color, no_color)
    )];

    if !remote {
        lines.push(paint(
            "  Provider unreachable; values below are placeholders",
            Color::Yellow,
            no_color,
        ));
    }

    lines.push(field("Username", &profile.username));
    lines.push(field("Password", &profile.password));
    lines.push(field("Plan", profile.plan_tier.as_str()));
    lines.push(field(
        "Status",
        &paint(profile.status.as_str(), status_color, no_color),
    ));
    lines.push(field(
        "Expires",
        &profile
            .expires_at
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string()),
    ));
    lines.push(field(
        "Devices",
        &profile
            .device_limit
            .map_or_else(|| "-".to_string(), |n| n.to_string()),
    ));
    let bouquets = if profile.bouquets.is_empty() {
        "-".to_string()
    } else {
        profile.bouquets.join(", ")
    };
    lines.push(field("Bouquets", &bouquets));
    if !profile.observation_summary.is_empty() {
        lines.push(field("Observed", &profile.observation_summary));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render parsed credentials.
pub fn render_inspection(inspection: &Inspection, no_color: bool) -> Result<String> {
    let lines = [
        heading(&inspection.host, no_color),
        field("Scheme", inspection.scheme.as_str()),
        field("Username", &inspection.username),
        field("Password", &inspection.password),
        field("Endpoint", &inspection.endpoint),
    ];
    Ok(format!("{}\n", lines.join("\n")))
}

/// Render the strategy order.
pub fn render_strategy_chain(chain: &StrategyChain, no_color: bool) -> Result<String> {
    let mut lines = vec![heading("Fetch strategies (tried in order)", no_color)];

    let direct_note = match chain.direct_policy {
        DirectPolicy::HttpsOnly => "https playlists only",
        DirectPolicy::Always => "always",
        DirectPolicy::Never => "disabled",
    };
    lines.push(format!(
        "  0. {} ({direct_note})",
        paint("direct", Color::Cyan, no_color)
    ));
    for (i, proxy) in chain.proxies.iter().enumerate() {
        lines.push(format!(
            "  {}. {}  {}",
            i + 1,
            paint(&proxy.name, Color::Cyan, no_color),
            proxy.template
        ));
    }

    lines.push(String::new());
    lines.push(field("Timeout", &format!("{}s per attempt", chain.timeout_seconds)));
    lines.push(field(
        "Bouquets",
        if chain.fetch_bouquets { "fetched" } else { "skipped" },
    ));
    lines.push(field("Config", &chain.config_path));

    Ok(format!("{}\n", lines.join("\n")))
}
