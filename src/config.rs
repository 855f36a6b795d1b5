//! Notemind configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Notemind configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotemindConfig {
    /// Language model configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Background processing configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl NotemindConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            crate::Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Default configuration file location (`<data_dir>/config.toml`).
    pub fn default_path() -> PathBuf {
        StorageConfig::default_data_dir().join("config.toml")
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API credential. Empty means AI features are disabled (fail soft).
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// OpenAI-compatible API base URL
    pub base_url: String,

    /// Per-request timeout in seconds; a timeout is a regular gateway failure
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            base_url: "http://127.0.0.1:1234/v1".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl AiConfig {
    /// True when an API credential is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Background processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Run the enrichment + synthesis cycle automatically
    pub enabled: bool,

    /// Seconds between scheduled cycles
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 3600,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory for notes and memory; defaults to `~/.notemind`
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the effective data directory.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    fn default_data_dir() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".notemind")
    }
}
