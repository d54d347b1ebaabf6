//! Configuration management for harvest
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::extract::SourceId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetching configuration
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Which sources to ingest
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// HTTP fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User agent string
    #[serde(default = "default_fetch_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Maximum redirects followed per request
    #[serde(default = "default_fetch_max_redirects")]
    pub max_redirects: usize,
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Only return records from the last N days
    #[serde(default = "default_query_since_days")]
    pub default_since_days: u32,
}

/// Source selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Source identifiers ingested by default
    #[serde(default = "default_enabled_sources")]
    pub enabled: Vec<String>,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for harvest data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_fetch_user_agent(),
            timeout_secs: default_fetch_timeout(),
            max_redirects: default_fetch_max_redirects(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_since_days: default_query_since_days(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_sources(),
        }
    }
}

impl PathsConfig {
    fn under(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.toml"),
            db_file: base.join("content.db"),
            base_dir: base,
        }
    }
}

impl Config {
    /// Get the default base directory for harvest (~/.harvest)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".harvest")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Default configuration rooted at `base_dir` (or the default base dir)
    pub fn with_base_dir(base_dir: Option<PathBuf>) -> Self {
        Self {
            paths: PathsConfig::under(base_dir.unwrap_or_else(Self::default_base_dir)),
            ..Self::default()
        }
    }

    /// Default configuration stored at exactly `config_path`, with the
    /// database next to it
    pub fn at_path(config_path: &Path) -> Self {
        let base = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            paths: PathsConfig {
                config_file: config_path.to_path_buf(),
                ..PathsConfig::under(base)
            },
            ..Self::default()
        }
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.paths = Self::at_path(config_path).paths;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Enabled sources, parsed
    pub fn enabled_sources(&self) -> Result<Vec<SourceId>> {
        self.sources.enabled.iter().map(|s| s.parse()).collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(Error::Config("fetch.user_agent must not be empty".to_string()));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(Error::Config(
                "fetch.timeout_secs must be positive".to_string(),
            ));
        }

        if self.query.default_since_days == 0 {
            return Err(Error::Config(
                "query.default_since_days must be positive".to_string(),
            ));
        }

        self.enabled_sources()?;

        Ok(())
    }
}
