// pageviews2parquet - hourly pageview dump ingestion
//
// One invocation handles one (date, hour):
// 1. Resolve the dump URL and stream it into the scratch directory
//    (or take an already-downloaded local file)
// 2. Decompress and parse it into records, encoding Parquet as we go
// 3. Write the partition file under the output root
// 4. Remove the scratch download
//
// Configuration is passed in explicitly; nothing here reads the environment.

use pageviews2parquet_config::RuntimeConfig;
use pageviews2parquet_core::{dump_file_name, dump_url, HourPartition, ParquetOptions};
use pageviews2parquet_writer::{remove_scratch, write_partition, Storage, WriteResult};
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub mod error;
pub mod fetch;
mod init;

pub use error::IngestError;
pub use fetch::{FetchError, Fetcher};
pub use init::init_tracing;

/// What to ingest
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub partition: HourPartition,
    /// Parse this local dump instead of downloading one. Never deleted.
    pub input: Option<PathBuf>,
}

impl IngestRequest {
    pub fn download(partition: HourPartition) -> Self {
        Self {
            partition,
            input: None,
        }
    }

    pub fn local(partition: HourPartition, input: impl Into<PathBuf>) -> Self {
        Self {
            partition,
            input: Some(input.into()),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub partition: HourPartition,
    /// URL or local path the records were read from
    pub source: String,
    /// Bytes transferred, when the dump was downloaded
    pub bytes_downloaded: Option<u64>,
    pub lines_read: u64,
    pub rows: u64,
    pub output: WriteResult,
}

/// Run one ingestion.
pub async fn run(config: &RuntimeConfig, request: IngestRequest) -> Result<IngestReport, IngestError> {
    let partition = request.partition;
    let storage = Storage::from_config(&config.storage)?;

    // Step 1: Obtain the compressed dump
    let (dump_path, source, scratch_name, bytes_downloaded) = match request.input {
        Some(path) => {
            info!(path = %path.display(), "Using local pageview dump");
            let source = path.display().to_string();
            (path, source, None, None)
        }
        None => {
            let url = dump_url(&config.source.base_url, &partition);
            let name = dump_file_name(&partition);
            info!(url = %url, "Downloading pageview dump");

            let fetcher = Fetcher::new(&config.source.user_agent)?;
            let scratch = fetcher.fetch_to_scratch(&url, &storage, &name).await?;
            info!(
                bytes = scratch.size,
                path = %scratch.path.display(),
                "Download complete"
            );
            (scratch.path, url, Some(name), Some(scratch.size))
        }
    };

    // Step 2: Parse and encode
    let file = File::open(&dump_path).map_err(|e| {
        IngestError::Decode(anyhow::Error::new(e).context(format!(
            "Failed to open pageview dump {}",
            dump_path.display()
        )))
    })?;

    let options = ParquetOptions {
        row_group_size: config.storage.parquet_row_group_size,
        source: source.clone(),
    };
    let processed = pageviews2parquet_core::process_gzip_dump(file, partition, &options)
        .map_err(IngestError::from_processing)?;
    info!(
        rows = processed.rows,
        lines_read = processed.lines_read,
        "Parsed pageview dump"
    );

    // Step 3: Persist
    info!(
        output_root = %storage.output_root().display(),
        partition = %partition,
        "Saving partition"
    );
    let output = write_partition(
        &storage,
        &partition,
        processed.parquet_bytes,
        processed.rows,
    )
    .await?;

    // Step 4: Clean up the download
    if let Some(name) = scratch_name {
        if config.storage.keep_scratch {
            debug!(path = %dump_path.display(), "Keeping scratch download");
        } else if let Err(err) = remove_scratch(&storage, &name).await {
            warn!(error = %err, "Failed to remove scratch download");
        }
    }

    info!(
        path = %output.path.display(),
        bytes = output.file_size,
        rows = output.row_count,
        "Done"
    );

    Ok(IngestReport {
        partition,
        source,
        bytes_downloaded,
        lines_read: processed.lines_read,
        rows: processed.rows,
        output,
    })
}
