//! Configuration storage.

pub mod config;
pub mod paths;

pub use config::{
    Config, ConfigSource, ConfigSources, ENV_CONFIG, ENV_DIRECT, ENV_FORMAT, ENV_NO_BOUQUETS,
    ENV_NO_COLOR, ENV_NO_COLOR_STD, ENV_PRETTY, ENV_TIMEOUT, ResolvedConfig,
};
pub use paths::AppPaths;
