//! OS-specific directories for config and log files.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const APP_NAME: &str = "cosmos-particles";

/// Where the host keeps `config.ron` and log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds JSON log files.
    pub log_dir: PathBuf,
}

impl AppDirs {
    /// Resolve platform directories without creating them on disk.
    pub fn resolve() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Resolve directories under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Use `config_dir` for config and put logs beside it.
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        let log_dir = config_dir.join("logs");
        Self {
            config_dir,
            log_dir,
        }
    }
}
