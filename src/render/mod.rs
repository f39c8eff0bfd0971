//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use crate::cli::args::OutputFormat;
use crate::core::models::{ExtractReport, Inspection, StrategyChain};
use crate::error::Result;

pub use error::render_error;

/// Render extraction results; `errors` are per-URL pre-flight failures.
pub fn render_extractions(
    reports: &[ExtractReport],
    errors: &[String],
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_extractions(reports, errors, no_color),
        OutputFormat::Json => robot::render_envelope("extract", reports, errors.to_vec(), pretty),
        OutputFormat::Md => robot::render_extractions_md(reports, errors),
    }
}

/// Render the result of `inspect`.
pub fn render_inspection(
    inspection: &Inspection,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_inspection(inspection, no_color),
        OutputFormat::Json => robot::render_envelope("inspect", inspection, Vec::new(), pretty),
        OutputFormat::Md => robot::render_inspection_md(inspection),
    }
}

/// Render the result of `proxies`.
pub fn render_strategy_chain(
    chain: &StrategyChain,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_strategy_chain(chain, no_color),
        OutputFormat::Json => robot::render_envelope("proxies", chain, Vec::new(), pretty),
        OutputFormat::Md => robot::render_strategy_chain_md(chain),
    }
}
