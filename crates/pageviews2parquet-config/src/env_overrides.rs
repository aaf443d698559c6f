use crate::{LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "PAGEVIEWS2PARQUET_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides. Keys are passed without `ENV_PREFIX`.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Source
    if let Some(url) = get_env_string(env, "BASE_URL") {
        config.source.base_url = url;
    }
    if let Some(agent) = get_env_string(env, "USER_AGENT") {
        config.source.user_agent = agent;
    }

    // Storage
    if let Some(root) = get_env_string(env, "OUTPUT_ROOT") {
        config.storage.output_root = root;
    }
    if let Some(dir) = get_env_string(env, "SCRATCH_DIR") {
        config.storage.scratch_dir = dir;
    }
    if let Some(size) = get_env_usize(env, "PARQUET_ROW_GROUP_SIZE")? {
        config.storage.parquet_row_group_size = size;
    }
    if let Some(keep) = get_env_bool(env, "KEEP_SCRATCH")? {
        config.storage.keep_scratch = keep;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .with_context(|| format!("Invalid {}LOG_FORMAT value", ENV_PREFIX))?;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match get_env_string(env, key) {
        Some(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|e| anyhow!("Invalid {}{} value '{}': {}", ENV_PREFIX, key, value, e)),
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(anyhow!(
                "Invalid {}{} value '{}': expected true or false",
                ENV_PREFIX,
                key,
                value
            )),
        },
        None => Ok(None),
    }
}
