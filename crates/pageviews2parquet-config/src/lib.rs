// pageviews2parquet-config - Configuration for the hourly ingestion job
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from PAGEVIEWS2PARQUET_CONFIG env var
// 3. Config file contents from PAGEVIEWS2PARQUET_CONFIG_CONTENT env var
// 4. Default config file locations (./config.toml, ./.pageviews2parquet.toml)
// 5. Built-in defaults (lowest priority)
//
// Command-line flags are applied on top by the binary.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use validation::MAX_ROW_GROUP_SIZE;

pub const DEFAULT_BASE_URL: &str = "https://dumps.wikimedia.org/other/pageviews";
pub const DEFAULT_OUTPUT_ROOT: &str = "data/raw/pageviews";
pub const DEFAULT_SCRATCH_DIR: &str = "data/raw";
pub const DEFAULT_ROW_GROUP_SIZE: usize = 32 * 1024;

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote dump archive configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root of the dump archive; year/month segments are appended to it
    pub base_url: String,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("pageviews2parquet/{}", env!("CARGO_PKG_VERSION"))
}

/// Local storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for the date/hour partition tree
    pub output_root: String,
    /// Where the compressed dump is downloaded before parsing
    pub scratch_dir: String,
    pub parquet_row_group_size: usize,
    /// Keep the downloaded dump after a successful run
    pub keep_scratch: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_root: DEFAULT_OUTPUT_ROOT.to_string(),
            scratch_dir: DEFAULT_SCRATCH_DIR.to_string(),
            parquet_row_group_size: DEFAULT_ROW_GROUP_SIZE,
            keep_scratch: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration starting from an explicit file (CLI --config flag)
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Merge defaults, config file and environment without validating.
    ///
    /// For callers that apply higher-priority overrides (CLI flags) and
    /// call [`RuntimeConfig::validate`] afterwards.
    pub fn load_unvalidated() -> Result<Self> {
        sources::load_config_unvalidated()
    }

    /// [`RuntimeConfig::load_from_path`] without the validation step
    pub fn load_from_path_unvalidated(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path_unvalidated(path)
    }

    /// Parse configuration from TOML text, filling gaps with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
