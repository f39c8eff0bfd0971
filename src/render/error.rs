//! Error rendering.
//!
//! Human mode prints a short `Error [CODE]: message` block to stderr;
//! JSON and Markdown modes print a structured object so scripts can branch
//! on `errorCode`.

use colored::Colorize;

use crate::cli::args::OutputFormat;
use crate::error::M3uiError;

/// Render an error for the given output format.
#[must_use]
pub fn render_error(error: &M3uiError, format: OutputFormat, no_color: bool, pretty: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        // Md consumers are usually agents too
        OutputFormat::Md => render_error_json(error, true),
        OutputFormat::Human => render_simple(error, no_color),
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &M3uiError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| render_simple(error, true))
}

fn render_simple(error: &M3uiError, no_color: bool) -> String {
    let header = format!("Error [{}]: {error}", error.error_code());
    let mut lines = vec![if no_color {
        header
    } else {
        header.red().bold().to_string()
    }];

    if let Some(hint) = error.hint() {
        lines.push(format!("Hint: {hint}"));
    }

    lines.join("\n")
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorJson {
    error_code: &'static str,
    category: String,
    message: String,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &M3uiError) -> Self {
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            exit_code: error.exit_code().into(),
            hint: error.hint(),
        }
    }
}
