//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/wordlite/config.toml)
//! 3. Environment variables (WORDLITE_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "WORDLITE";

/// Default number of full records kept in the store's cache
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the document collection
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum number of records cached in memory (0 disables the cache)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Directory exports are written to (current directory when unset)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Log file path (logs go to stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            export_dir: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Configuration rooted at `data_dir`, everything else defaulted
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (WORDLITE_DATA_DIR, WORDLITE_CACHE_CAPACITY, ...)
    /// 2. Config file (~/.config/wordlite/config.toml or WORDLITE_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // WORDLITE_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // WORDLITE_CACHE_CAPACITY
        if let Ok(val) = std::env::var(format!("{}_CACHE_CAPACITY", ENV_PREFIX)) {
            self.cache_capacity = val
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}_CACHE_CAPACITY: {:?}", ENV_PREFIX, val))?;
        }

        // WORDLITE_EXPORT_DIR
        if let Ok(val) = std::env::var(format!("{}_EXPORT_DIR", ENV_PREFIX)) {
            self.export_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // WORDLITE_LOG_FILE
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Set a single value by key, as used by `wordlite config set`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        if matches!(key, "data_dir" | "cache_capacity") && value.trim().is_empty() {
            bail!("{} needs a value; it can't be cleared", key);
        }

        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "cache_capacity" => {
                self.cache_capacity = value
                    .parse()
                    .with_context(|| format!("Invalid cache_capacity: {:?}", value))?
            }
            "export_dir" => {
                self.export_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "log_file" => {
                self.log_file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => bail!(
                "Unknown configuration key '{}'. Valid keys: data_dir, cache_capacity, export_dir, log_file",
                key
            ),
        }
        Ok(())
    }

    /// Save configuration to the given file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with WORDLITE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordlite")
            .join("config.toml")
    }

    /// Get the path to the document collection file
    pub fn documents_path(&self) -> PathBuf {
        self.data_dir.join("documents.json")
    }

    /// Directory exports are written to
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordlite")
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}
