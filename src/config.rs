//! Configuration for the log manager

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::level::{self, Level};

/// Subfolder of the platform cache directory that holds day files by default
pub const DEFAULT_SUBDIRECTORY: &str = "daylog";

/// Serializable manager configuration
///
/// ```toml
/// storage_dir = "~/logs/myapp"
/// min_level = "warning"
/// echo = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Storage directory override; `~` and environment variables are expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,

    /// Entries below this level are dropped (default: debug)
    #[serde(default, with = "level::by_name")]
    pub min_level: Level,

    /// Echo stored entries to the console (default: off)
    #[serde(default)]
    pub echo: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            min_level: Level::Debug,
            echo: false,
        }
    }
}

impl ManagerConfig {
    /// Load configuration from a TOML file, or return default if not found
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Resolve the storage directory: the expanded override, or the default location
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => {
                let expanded = shellexpand::full(dir)
                    .with_context(|| format!("Failed to expand storage directory '{}'", dir))?;
                Ok(PathBuf::from(expanded.as_ref()))
            }
            None => Ok(default_storage_dir()),
        }
    }
}

/// Default storage location (`<cache dir>/daylog`)
/// Falls back to `<temp dir>/daylog` if no cache directory can be determined
pub fn default_storage_dir() -> PathBuf {
    try_default_storage_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine cache directory, using temp directory for logs");
        std::env::temp_dir().join(DEFAULT_SUBDIRECTORY)
    })
}

/// Try to get the default storage location, returning None if the cache dir is unavailable
pub fn try_default_storage_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|c| c.join(DEFAULT_SUBDIRECTORY))
}
