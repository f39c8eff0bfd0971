//! Platform locations for the config file.

use directories::ProjectDirs;
use std::path::PathBuf;

/// File name of the TOML config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
}

impl AppPaths {
    /// Resolve the per-user config directory for m3ui.
    ///
    /// Falls back to `./.m3ui` when no home directory can be determined.
    #[must_use]
    pub fn new() -> Self {
        let config = ProjectDirs::from("dev", "m3ui", "m3ui").map_or_else(
            || PathBuf::from(".m3ui"),
            |dirs| dirs.config_dir().to_path_buf(),
        );
        Self { config }
    }

    /// Default location of `config.toml`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE_NAME)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
