//! Inspect command: parse a playlist URL without any network traffic.

use crate::cli::args::{InspectArgs, OutputFormat};
use crate::core::credentials::PlaylistCredentials;
use crate::core::models::Inspection;
use crate::error::Result;
use crate::render;

/// Execute the inspect command.
///
/// # Errors
///
/// Returns the parser's `InvalidUrl` / `CredentialsMissing` error.
pub fn execute(
    args: &InspectArgs,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<()> {
    let credentials = PlaylistCredentials::parse(&args.url)?;
    tracing::debug!(host = %credentials.host, "Inspecting playlist URL");

    let inspection = Inspection::new(&credentials, args.show_password);
    let output = render::render_inspection(&inspection, format, pretty, no_color)?;
    println!("{output}");
    Ok(())
}
