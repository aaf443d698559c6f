use anyhow::{Context, Result};
use clap::Parser;
use pageviews2parquet::{IngestError, IngestRequest};
use pageviews2parquet_config::RuntimeConfig;
use pageviews2parquet_core::HourPartition;
use std::path::PathBuf;

/// Convert one hour of Wikimedia pageview dumps into a Parquet partition
#[derive(Parser)]
#[command(name = "pageviews2parquet")]
#[command(version)]
#[command(
    about = "Convert one hour of Wikimedia pageview dumps into a Parquet partition",
    long_about = None
)]
struct Cli {
    /// UTC date to ingest (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: String,

    /// UTC hour to ingest (0-23)
    #[arg(long, value_name = "HOUR")]
    hour: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root directory for Parquet partitions (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Directory for the downloaded dump (overrides config file)
    #[arg(long, value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    /// Dump archive root URL (overrides config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Parse an already-downloaded dump instead of fetching it
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Keep the downloaded dump after a successful run
    #[arg(long)]
    keep_scratch: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Validate the run key before touching disk or network
    let partition = HourPartition::parse(&cli.date, &cli.hour).map_err(IngestError::from)?;

    // Step 2: Resolve configuration (file/env, then CLI flags)
    let config = resolve_config(&cli)?;

    // Step 3: Initialize tracing
    pageviews2parquet::init_tracing(&config.logging);

    let request = IngestRequest {
        partition,
        input: cli.input,
    };

    // Step 4: Run the single unit of work
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(pageviews2parquet::run(&config, request))?;

    Ok(())
}

/// CLI flags sit above env and file values, so validation waits until every
/// layer is merged.
fn resolve_config(cli: &Cli) -> Result<RuntimeConfig, IngestError> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load_from_path_unvalidated(path).map_err(|e| {
            IngestError::configuration(format!(
                "failed to load config from {}: {:#}",
                path.display(),
                e
            ))
        })?,
        None => RuntimeConfig::load_unvalidated()
            .map_err(|e| IngestError::configuration(format!("{:#}", e)))?,
    };

    apply_cli_overrides(&mut config, cli);
    config
        .validate()
        .map_err(|e| IngestError::configuration(format!("{:#}", e)))?;

    Ok(config)
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.storage.output_root = output.to_string_lossy().to_string();
    }

    if let Some(scratch) = &cli.scratch_dir {
        config.storage.scratch_dir = scratch.to_string_lossy().to_string();
    }

    if let Some(base_url) = &cli.base_url {
        config.source.base_url = base_url.clone();
    }

    if cli.keep_scratch {
        config.storage.keep_scratch = true;
    }

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}
