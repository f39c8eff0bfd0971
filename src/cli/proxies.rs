//! Proxies command: show the resolved strategy order.

use crate::core::models::StrategyChain;
use crate::error::Result;
use crate::render;
use crate::storage::ResolvedConfig;

/// Build the strategy chain view from resolved settings.
#[must_use]
pub fn strategy_chain(config: &ResolvedConfig) -> StrategyChain {
    StrategyChain {
        direct_policy: config.direct_policy,
        timeout_seconds: config.timeout.as_secs(),
        fetch_bouquets: config.fetch_bouquets,
        proxies: config.proxies.clone(),
        config_path: config.config_path.display().to_string(),
    }
}

/// Execute the proxies command.
pub fn execute(config: &ResolvedConfig) -> Result<()> {
    tracing::debug!(
        direct = %config.direct_policy,
        direct_source = %config.sources.direct_policy,
        proxies_source = %config.sources.proxies,
        "Resolved fetch plan"
    );
    let chain = strategy_chain(config);
    let output =
        render::render_strategy_chain(&chain, config.format, config.pretty, config.no_color)?;
    println!("{output}");
    Ok(())
}
