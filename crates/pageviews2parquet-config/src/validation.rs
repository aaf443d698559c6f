// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

/// Largest accepted `storage.parquet_row_group_size`
pub const MAX_ROW_GROUP_SIZE: usize = 10_000_000;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_source_config(&config.source)?;
    validate_storage_config(&config.storage)?;

    if config.logging.level.trim().is_empty() {
        bail!("logging.level must not be empty");
    }

    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<()> {
    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        bail!("source.base_url must not be empty");
    }

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        bail!(
            "source.base_url must be an http(s) URL, got '{}'",
            config.base_url
        );
    }

    if config.user_agent.trim().is_empty() {
        bail!("source.user_agent must not be empty");
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    if config.output_root.trim().is_empty() {
        bail!("storage.output_root must not be empty");
    }

    if config.scratch_dir.trim().is_empty() {
        bail!("storage.scratch_dir must not be empty");
    }

    if config.parquet_row_group_size == 0 {
        bail!("storage.parquet_row_group_size must be greater than 0");
    }

    if config.parquet_row_group_size > MAX_ROW_GROUP_SIZE {
        bail!(
            "storage.parquet_row_group_size must be at most {}, got {}",
            MAX_ROW_GROUP_SIZE,
            config.parquet_row_group_size
        );
    }

    // Builders hold one row group in memory before it is encoded
    if config.parquet_row_group_size > 1_000_000 {
        warn!(
            parquet_row_group_size = config.parquet_row_group_size,
            "storage.parquet_row_group_size is very large; may cause memory issues"
        );
    }

    Ok(())
}
