//! Configuration loading for buildinfo

pub mod schema;

pub use schema::InfoConfig;

use crate::error::{InfoError, InfoResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("buildinfo")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> InfoResult<InfoConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            debug!("Config file not found, using defaults");
            return Ok(InfoConfig::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> InfoResult<InfoConfig> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| InfoError::io(format!("reading config from {}", path.display()), e))?;

        let config = toml::from_str(&content).map_err(|e| InfoError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
