//! Partition and scratch writes
//!
//! Partition files are written in one shot from encoded bytes. Scratch files
//! are streamed chunk by chunk. Both land under a staging name first and only
//! appear under their final name after a rename; aborting discards the
//! staged bytes.

use crate::error::{Result, WriterError};
use crate::storage::{staging_path, Storage};
use chrono::{DateTime, Utc};
use opendal::{Buffer, Operator};
use pageviews2parquet_core::{partition_path, HourPartition};
use std::path::PathBuf;

/// Result of a partition write
#[derive(Clone, Debug)]
pub struct WriteResult {
    /// Location of the file on disk
    pub path: PathBuf,
    /// Path relative to the output root (`YYYY/MM/DD/HH.parquet`)
    pub relative_path: String,
    /// File size in bytes
    pub file_size: u64,
    /// Number of rows written
    pub row_count: u64,
    /// Timestamp when write completed
    pub completed_at: DateTime<Utc>,
}

/// Write Parquet bytes for one hour to `<output_root>/YYYY/MM/DD/HH.parquet`.
///
/// Intermediate directories are created as needed. The bytes are written to
/// `YYYY/MM/DD/.HH.parquet.tmp` and renamed over the target, so an existing
/// file for the same hour is replaced in one step.
pub async fn write_partition(
    storage: &Storage,
    partition: &HourPartition,
    parquet_bytes: Vec<u8>,
    row_count: u64,
) -> Result<WriteResult> {
    let relative_path = partition_path(partition);
    let staged = staging_path(&relative_path, "tmp");
    let file_size = parquet_bytes.len() as u64;
    let op = storage.output_operator();

    tracing::debug!(
        path = %relative_path,
        rows = row_count,
        bytes = file_size,
        "Writing partition"
    );

    let published = match op.write(&staged, parquet_bytes).await {
        Ok(_) => op.rename(&staged, &relative_path).await,
        Err(err) => Err(err),
    };
    if let Err(err) = published {
        discard(op, &staged).await;
        return Err(WriterError::from_opendal(err, &relative_path, |p, r| {
            WriterError::write_failure(p, r)
        }));
    }

    Ok(WriteResult {
        path: storage.output_root().join(&relative_path),
        relative_path,
        file_size,
        row_count,
        completed_at: Utc::now(),
    })
}

/// A completed scratch download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScratchFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Streaming writer for a scratch file
pub struct ScratchWriter {
    name: String,
    part_name: String,
    path: PathBuf,
    operator: Operator,
    writer: opendal::Writer,
    bytes_written: u64,
}

impl ScratchWriter {
    /// Open `name` under the scratch directory for streaming writes.
    ///
    /// Bytes go to `.<name>.part` until [`ScratchWriter::close`].
    pub async fn open(storage: &Storage, name: &str) -> Result<Self> {
        let operator = storage.scratch_operator()?;
        let part_name = staging_path(name, "part");
        let writer = operator
            .writer(&part_name)
            .await
            .map_err(|e| scratch_error(e, name))?;

        Ok(Self {
            name: name.to_string(),
            part_name,
            path: storage.scratch_path(name),
            operator,
            writer,
            bytes_written: 0,
        })
    }

    pub async fn write(&mut self, chunk: impl Into<Buffer>) -> Result<()> {
        let chunk: Buffer = chunk.into();
        let len = chunk.len() as u64;
        self.writer
            .write(chunk)
            .await
            .map_err(|e| scratch_error(e, &self.name))?;
        self.bytes_written += len;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Finish the download and move it under its final name
    pub async fn close(mut self) -> Result<ScratchFile> {
        let published = match self.writer.close().await {
            Ok(_) => self.operator.rename(&self.part_name, &self.name).await,
            Err(err) => Err(err),
        };
        if let Err(err) = published {
            discard(&self.operator, &self.part_name).await;
            return Err(scratch_error(err, &self.name));
        }

        Ok(ScratchFile {
            name: self.name,
            path: self.path,
            size: self.bytes_written,
        })
    }

    /// Discard everything written so far
    pub async fn abort(mut self) -> Result<()> {
        tracing::debug!(name = %self.name, bytes = self.bytes_written, "Aborting scratch write");
        // Plain fs writers cannot abort; release the handle, then drop the file
        if let Err(err) = self.writer.close().await {
            tracing::debug!(error = %err, "Closing partial scratch write failed");
        }
        self.operator
            .delete(&self.part_name)
            .await
            .map_err(|e| scratch_error(e, &self.name))
    }
}

/// Delete a scratch file. Missing files are not an error.
pub async fn remove_scratch(storage: &Storage, name: &str) -> Result<()> {
    storage
        .scratch_operator()?
        .delete(name)
        .await
        .map_err(|e| scratch_error(e, name))
}

async fn discard(op: &Operator, path: &str) {
    if let Err(err) = op.delete(path).await {
        tracing::warn!(path, error = %err, "Failed to remove staged file");
    }
}

fn scratch_error(err: opendal::Error, name: &str) -> WriterError {
    WriterError::from_opendal(err, name, |p, r| WriterError::scratch_failure(p, r))
}
