//! Configuration file handling.
//!
//! Settings come from, in order of precedence: command-line flags, an explicit
//! `--config` file, `<config_dir>/doxy-search/config.toml`, then defaults.

use crate::validate::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "doxy-search";
const CONFIG_FILE: &str = "config.toml";

/// Error returned when a configuration file is unreadable or invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory for parsed-table cache files. Defaults to the platform cache
    /// directory.
    pub cache_dir: Option<PathBuf>,
    pub cache_enabled: bool,
    /// Parsed tables kept in memory per catalog.
    pub lru_capacity: usize,
    /// Suggestions shown when a lookup misses.
    pub suggestions: usize,
    pub validation: ValidationOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            cache_enabled: true,
            lru_capacity: 64,
            suggestions: 5,
            validation: ValidationOptions::default(),
        }
    }
}

impl Config {
    /// Parses a config from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit` if given (it must exist), otherwise the per-user
    /// config file if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&text, &path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Cache directory to use, or `None` when caching is disabled or no
    /// location could be determined.
    pub fn effective_cache_dir(&self) -> Option<PathBuf> {
        if !self.cache_enabled {
            return None;
        }
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR)))
    }
}

/// `<config_dir>/doxy-search/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
