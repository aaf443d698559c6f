// Configuration source loading
//
// Priority order:
// 1. Environment variables (PAGEVIEWS2PARQUET_* prefix)
// 2. Config file path from PAGEVIEWS2PARQUET_CONFIG
// 3. Inline config content from PAGEVIEWS2PARQUET_CONFIG_CONTENT
// 4. Default config files (./config.toml, ./.pageviews2parquet.toml)
// 5. Built-in defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::*;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_FILES: &[&str] = &["./config.toml", "./.pageviews2parquet.toml"];

/// Load configuration using process environment and default file locations.
pub fn load_config() -> Result<RuntimeConfig> {
    load_with_env(&StdEnvSource)
}

/// Merge file and environment sources without validating, so callers can
/// layer their own overrides first.
pub fn load_config_unvalidated() -> Result<RuntimeConfig> {
    merge_with_env(&StdEnvSource)
}

/// Load configuration from a specific file path (for CLI --config flag).
/// Returns error if file doesn't exist or can't be parsed.
/// Environment overrides still apply on top of the file.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let config = load_from_file_path_unvalidated(path)?;
    config.validate()?;
    Ok(config)
}

/// Same as `load_from_file_path`, minus validation.
pub fn load_from_file_path_unvalidated(path: impl AsRef<Path>) -> Result<RuntimeConfig> {
    let mut config = read_config_file(path.as_ref())?;
    env_overrides::apply_env_overrides(&mut config, &StdEnvSource)?;
    Ok(config)
}

pub(crate) fn load_with_env<E: EnvSource>(env: &E) -> Result<RuntimeConfig> {
    let config = merge_with_env(env)?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn merge_with_env<E: EnvSource>(env: &E) -> Result<RuntimeConfig> {
    let mut config = match load_from_file(env)? {
        Some(file_config) => file_config,
        None => RuntimeConfig::default(),
    };

    env_overrides::apply_env_overrides(&mut config, env)?;
    Ok(config)
}

fn load_from_file<E: EnvSource>(env: &E) -> Result<Option<RuntimeConfig>> {
    if let Some(path) = env.get("CONFIG") {
        return read_config_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        let config = RuntimeConfig::from_toml_str(&content).with_context(|| {
            format!(
                "Failed to parse inline config from {}CONFIG_CONTENT",
                ENV_PREFIX
            )
        })?;
        return Ok(Some(config));
    }

    for path in DEFAULT_CONFIG_FILES {
        let path = Path::new(path);
        if path.exists() {
            return read_config_file(path).map(Some);
        }
    }

    Ok(None)
}

fn read_config_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    RuntimeConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}
