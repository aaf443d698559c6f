//! Run-level error taxonomy
//!
//! Every variant is fatal: the run stops and the binary exits non-zero.
//! Malformed dump lines never surface here; they are dropped by the parser.

use crate::fetch::FetchError;
use pageviews2parquet_core::PartitionError;
use pageviews2parquet_writer::WriterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Bad date/hour, unreadable config, or a value that failed validation.
    /// Raised before any network or storage activity.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transfer failed: {0}")]
    Transfer(#[source] FetchError),

    #[error("Failed to decode pageview dump: {0:#}")]
    Decode(anyhow::Error),

    #[error("Failed to encode Parquet: {0:#}")]
    Encode(anyhow::Error),

    #[error(transparent)]
    Write(#[from] WriterError),
}

impl IngestError {
    pub fn configuration(err: impl std::fmt::Display) -> Self {
        Self::Configuration(err.to_string())
    }

    /// Classify a failure from the parse/encode stage.
    ///
    /// Anything rooted in an I/O error came from reading the compressed
    /// stream; everything else is an Arrow/Parquet problem.
    pub(crate) fn from_processing(err: anyhow::Error) -> Self {
        if err.chain().any(|cause| cause.is::<std::io::Error>()) {
            Self::Decode(err)
        } else {
            Self::Encode(err)
        }
    }
}

impl From<PartitionError> for IngestError {
    fn from(err: PartitionError) -> Self {
        Self::configuration(err)
    }
}

impl From<FetchError> for IngestError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Storage(inner) => Self::Write(inner),
            other => Self::Transfer(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_processing_errors_are_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt deflate stream");
        let err = Err::<(), _>(io)
            .context("Failed to read pageview dump")
            .unwrap_err();
        assert!(matches!(
            IngestError::from_processing(err),
            IngestError::Decode(_)
        ));

        let err = anyhow::anyhow!("schema mismatch");
        assert!(matches!(
            IngestError::from_processing(err),
            IngestError::Encode(_)
        ));
    }

    #[test]
    fn test_partition_errors_are_configuration() {
        let err: IngestError = PartitionError::InvalidHour {
            input: "24".to_string(),
        }
        .into();
        assert!(matches!(err, IngestError::Configuration(_)));
        assert!(err.to_string().contains("invalid hour '24'"));
    }

    #[test]
    fn test_fetch_storage_errors_become_write_errors() {
        let err: IngestError =
            FetchError::Storage(WriterError::scratch_failure("dump.gz", "disk full")).into();
        assert!(matches!(err, IngestError::Write(_)));
        assert!(err.to_string().contains("[E003]"));
    }
}
