//! Configuration file loading and management.
//!
//! Loads `config.toml` from the platform config directory
//! (`~/.config/m3ui/config.toml` on Linux), or from `M3UI_CONFIG`.
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `M3UI_FORMAT`: Output format (human, json, md)
//! - `M3UI_TIMEOUT`: Per-attempt timeout in seconds
//! - `M3UI_DIRECT`: Direct policy (https-only, always, never)
//! - `M3UI_NO_BOUQUETS`: Skip the bouquet lookup (1, true, yes)
//! - `M3UI_NO_COLOR` or `NO_COLOR`: Disable colors
//! - `M3UI_PRETTY`: Pretty-print JSON output (1, true, yes)
//! - `M3UI_CONFIG`: Override config file path

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use super::AppPaths;
use crate::cli::args::{Cli, OutputFormat, TransportArgs};
use crate::core::extractor::ExtractorConfig;
use crate::core::fetch_plan::{DirectPolicy, FetchPlan, ProxyDescriptor, default_proxies};
use crate::error::{M3uiError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable for output format.
pub const ENV_FORMAT: &str = "M3UI_FORMAT";
/// Environment variable for the per-attempt timeout in seconds.
pub const ENV_TIMEOUT: &str = "M3UI_TIMEOUT";
/// Environment variable for the direct policy.
pub const ENV_DIRECT: &str = "M3UI_DIRECT";
/// Environment variable to skip the bouquet lookup.
pub const ENV_NO_BOUQUETS: &str = "M3UI_NO_BOUQUETS";
/// Environment variable to disable colors.
pub const ENV_NO_COLOR: &str = "M3UI_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";
/// Environment variable for pretty JSON output.
pub const ENV_PRETTY: &str = "M3UI_PRETTY";
/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "M3UI_CONFIG";

/// Accepted per-attempt timeout range, in seconds.
const TIMEOUT_BOUNDS: std::ops::RangeInclusive<u64> = 1..=300;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Final settings after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub format: OutputFormat,
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub direct_policy: DirectPolicy,
    /// Relays in the order they are tried.
    pub proxies: Vec<ProxyDescriptor>,
    pub fetch_bouquets: bool,
    pub no_color: bool,
    pub pretty: bool,
    /// Log level from the config file, used when neither flag nor env sets one.
    pub log_level: Option<String>,
    /// Path the config was read from (it may not exist).
    pub config_path: PathBuf,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub format: ConfigSource,
    pub timeout: ConfigSource,
    pub direct_policy: ConfigSource,
    pub proxies: ConfigSource,
    pub fetch_bouquets: ConfigSource,
    pub no_color: ConfigSource,
    pub pretty: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is invalid, or any
    /// flag or env value is out of range.
    pub fn resolve(cli: &Cli, transport: Option<&TransportArgs>) -> Result<Self> {
        let config_path = Self::config_path();
        let config = Config::load_from(&config_path)?;
        config.validate()?;

        let mut sources = ConfigSources::default();

        let format = Self::resolve_format(cli, &config, &mut sources.format)?;
        let timeout = Self::resolve_timeout(transport, &config, &mut sources.timeout)?;
        let direct_policy = Self::resolve_direct(transport, &config, &mut sources.direct_policy)?;
        let proxies = Self::resolve_proxies(transport, &config, &mut sources.proxies)?;
        let fetch_bouquets =
            Self::resolve_fetch_bouquets(transport, &config, &mut sources.fetch_bouquets);
        let no_color = Self::resolve_no_color(cli, &config, &mut sources.no_color);
        let pretty = Self::resolve_pretty(cli, &config, &mut sources.pretty);

        Ok(Self {
            format,
            timeout,
            direct_policy,
            proxies,
            fetch_bouquets,
            no_color,
            pretty,
            log_level: config.general.log_level,
            config_path,
            sources,
        })
    }

    /// Extraction settings derived from this configuration.
    #[must_use]
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            attempt_timeout: self.timeout,
            plan: FetchPlan::new(self.direct_policy, self.proxies.clone()),
            fetch_bouquets: self.fetch_bouquets,
        }
    }

    /// Config file location, respecting the `M3UI_CONFIG` override.
    fn config_path() -> PathBuf {
        std::env::var(ENV_CONFIG)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(Config::config_path, PathBuf::from)
    }

    /// Resolve output format setting.
    fn resolve_format(
        cli: &Cli,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<OutputFormat> {
        // 1. CLI --json flag (shorthand)
        if cli.json {
            *source = ConfigSource::Cli;
            return Ok(OutputFormat::Json);
        }

        // clap fills in "human" when --format is absent, so only a
        // non-default value counts as explicit.
        if cli.format != OutputFormat::Human {
            *source = ConfigSource::Cli;
            return Ok(cli.format);
        }

        // 2. Environment variable
        if let Some(format_env) = env_value(ENV_FORMAT) {
            *source = ConfigSource::Env;
            return Self::parse_format(&format_env);
        }

        // 3. Config file
        if let Some(ref format_str) = config.output.format {
            *source = ConfigSource::ConfigFile;
            return Self::parse_format(format_str);
        }

        // 4. Default
        *source = ConfigSource::Default;
        Ok(OutputFormat::Human)
    }

    /// Parse a format string into `OutputFormat`.
    fn parse_format(s: &str) -> Result<OutputFormat> {
        match s.trim().to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Md),
            _ => Err(M3uiError::Config(format!(
                "Invalid format '{s}'. Valid formats: human, json, md"
            ))),
        }
    }

    fn resolve_timeout(
        transport: Option<&TransportArgs>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<Duration> {
        if let Some(seconds) = transport.and_then(|t| t.timeout) {
            *source = ConfigSource::Cli;
            return check_timeout("--timeout", seconds).map(Duration::from_secs);
        }

        if let Some(raw) = env_value(ENV_TIMEOUT) {
            *source = ConfigSource::Env;
            let seconds = raw.parse::<u64>().map_err(|_| M3uiError::ConfigInvalid {
                key: ENV_TIMEOUT.to_string(),
                value: raw.clone(),
                message: "expected a whole number of seconds".to_string(),
            })?;
            return check_timeout(ENV_TIMEOUT, seconds).map(Duration::from_secs);
        }

        *source = if config.general.timeout_seconds == GeneralConfig::default().timeout_seconds {
            ConfigSource::Default
        } else {
            ConfigSource::ConfigFile
        };
        Ok(Duration::from_secs(config.general.timeout_seconds))
    }

    fn resolve_direct(
        transport: Option<&TransportArgs>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<DirectPolicy> {
        if let Some(raw) = transport.and_then(|t| t.direct.as_deref()) {
            *source = ConfigSource::Cli;
            return parse_direct("--direct", raw);
        }

        if let Some(raw) = env_value(ENV_DIRECT) {
            *source = ConfigSource::Env;
            return parse_direct(ENV_DIRECT, &raw);
        }

        *source = if config.transport.direct == DirectPolicy::default() {
            ConfigSource::Default
        } else {
            ConfigSource::ConfigFile
        };
        Ok(config.transport.direct)
    }

    /// CLI `--proxy` values replace the configured list; an empty config
    /// list means the built-in relays.
    fn resolve_proxies(
        transport: Option<&TransportArgs>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<Vec<ProxyDescriptor>> {
        if let Some(args) = transport.filter(|t| !t.proxies.is_empty()) {
            *source = ConfigSource::Cli;
            let proxies = args
                .proxies
                .iter()
                .map(|arg| ProxyDescriptor::from_arg(arg))
                .collect::<Result<Vec<_>>>()?;
            check_unique_names(&proxies)?;
            return Ok(proxies);
        }

        if !config.proxies.is_empty() {
            *source = ConfigSource::ConfigFile;
            return Ok(config.proxies.clone());
        }

        *source = ConfigSource::Default;
        Ok(default_proxies())
    }

    fn resolve_fetch_bouquets(
        transport: Option<&TransportArgs>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> bool {
        if transport.is_some_and(|t| t.no_bouquets) {
            *source = ConfigSource::Cli;
            return false;
        }

        if is_env_truthy(ENV_NO_BOUQUETS) {
            *source = ConfigSource::Env;
            return false;
        }

        if !config.transport.fetch_bouquets {
            *source = ConfigSource::ConfigFile;
            return false;
        }

        *source = ConfigSource::Default;
        true
    }

    /// Resolve `no_color` setting.
    fn resolve_no_color(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        // 1. CLI --no-color flag
        if cli.no_color {
            *source = ConfigSource::Cli;
            return true;
        }

        // 2. Environment variable (M3UI_NO_COLOR or standard NO_COLOR)
        if is_env_truthy(ENV_NO_COLOR) || std::env::var_os(ENV_NO_COLOR_STD).is_some() {
            *source = ConfigSource::Env;
            return true;
        }

        // 3. Config file (inverted: config.output.color = false means no_color = true)
        if !config.output.color {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    fn resolve_pretty(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.pretty {
            *source = ConfigSource::Cli;
            return true;
        }

        if is_env_truthy(ENV_PRETTY) {
            *source = ConfigSource::Env;
            return true;
        }

        if config.output.pretty {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var: &str) -> bool {
    std::env::var(var)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn check_timeout(key: &str, seconds: u64) -> Result<u64> {
    if TIMEOUT_BOUNDS.contains(&seconds) {
        Ok(seconds)
    } else {
        Err(M3uiError::ConfigInvalid {
            key: key.to_string(),
            value: seconds.to_string(),
            message: "timeout must be between 1 and 300 seconds".to_string(),
        })
    }
}

fn parse_direct(key: &str, raw: &str) -> Result<DirectPolicy> {
    DirectPolicy::from_arg(raw).ok_or_else(|| M3uiError::ConfigInvalid {
        key: key.to_string(),
        value: raw.to_string(),
        message: "expected https-only, always or never".to_string(),
    })
}

fn check_unique_names(proxies: &[ProxyDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for proxy in proxies {
        if !seen.insert(proxy.name.as_str()) {
            return Err(M3uiError::ConfigInvalid {
                key: format!("proxies.{}", proxy.name),
                value: proxy.template.clone(),
                message: "proxy names must be unique".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Config File
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub transport: TransportConfig,
    /// Ordered relay list; empty means the built-in relays.
    pub proxies: Vec<ProxyDescriptor>,
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Per-attempt timeout in seconds.
    pub timeout_seconds: u64,
    /// Default log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
}

/// How the provider is reached.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub direct: DirectPolicy,
    /// Look up live categories after a successful introspection.
    pub fetch_bouquets: bool,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, md).
    pub format: Option<String>,
    /// Whether to use colors in output.
    pub color: bool,
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            log_level: None,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            direct: DirectPolicy::HttpsOnly,
            fetch_bouquets: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            pretty: false,
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but is unreadable or invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| M3uiError::Config(format!("Invalid config file {}: {e}", path.display())))
    }

    /// Get the default config file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        AppPaths::new().config_file()
    }

    /// Validate configuration values.
    ///
    /// Checks the timeout bounds, the output format, and that every proxy
    /// has a unique non-empty name and a usable `{url}` template.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        check_timeout("general.timeout_seconds", self.general.timeout_seconds)?;

        if let Some(format) = &self.output.format {
            if !["human", "json", "md"].contains(&format.as_str()) {
                return Err(M3uiError::Config(format!(
                    "Invalid format \"{format}\". Valid formats: human, json, md"
                )));
            }
        }

        for proxy in &self.proxies {
            proxy.validate()?;
        }
        check_unique_names(&self.proxies)
    }
}
