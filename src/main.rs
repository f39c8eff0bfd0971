//! m3ui - IPTV playlist account extraction
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use m3ui::cli::{Cli, Commands};
use m3ui::core::logging::{self, LogSettings};
use m3ui::storage::ResolvedConfig;
use m3ui::util::env::{should_use_color, stderr_is_tty};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config first so its log_level can seed the subscriber.
    let resolved = ResolvedConfig::resolve(&cli, cli.transport_args());
    let file_level = resolved.as_ref().ok().and_then(|c| c.log_level.clone());
    logging::init(&LogSettings::resolve(
        cli.log_level.as_deref(),
        file_level.as_deref(),
        cli.json_output,
        cli.verbose,
    ));

    let (format, pretty, no_color) = resolved.as_ref().map_or(
        (cli.effective_format(), cli.pretty, cli.no_color),
        |c| (c.format, c.pretty, c.no_color),
    );

    let result = match resolved {
        Ok(mut config) => {
            config.no_color = !should_use_color(config.no_color);
            run(&cli, &config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            let no_color = no_color || !stderr_is_tty();
            eprintln!(
                "{}",
                m3ui::render::render_error(&e, format, no_color, pretty)
            );
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: &Cli, config: &ResolvedConfig) -> m3ui::Result<()> {
    match &cli.command {
        Commands::Extract(args) => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, cancelling extraction");
                    on_interrupt.cancel();
                }
            });
            m3ui::cli::extract::execute(args, config, &cancel).await
        }

        Commands::Inspect(args) => {
            m3ui::cli::inspect::execute(args, config.format, config.pretty, config.no_color)
        }

        Commands::Proxies(_) => m3ui::cli::proxies::execute(config),
    }
}
