// Streaming Parquet encoder for one hourly partition
//
// Records are pulled from the producer, buffered in Arrow builders for at
// most one row group, and flushed into the ArrowWriter. Snappy compression
// and dictionary encoding keep the output small; page statistics keep it
// prunable by query engines.

use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use std::io::{self, Write};

use crate::dump::{ArrowConverter, PageviewRecord};
use crate::hour::HourPartition;
use crate::schema::pageviews_schema_arc;

pub const DEFAULT_ROW_GROUP_SIZE: usize = 32 * 1024;

/// Knobs for the Parquet encoder
#[derive(Debug, Clone)]
pub struct ParquetOptions {
    /// Maximum rows per row group; also bounds how many records are buffered
    pub row_group_size: usize,
    /// Where the records came from (URL or local path), embedded in file metadata
    pub source: String,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            source: String::new(),
        }
    }
}

/// Outcome of encoding a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub rows: u64,
    pub row_groups: usize,
}

/// Encoded partition held in memory until it is handed to storage
#[derive(Debug)]
pub struct EncodedPartition {
    pub bytes: Vec<u8>,
    pub summary: EncodeSummary,
}

pub fn writer_properties(partition: &HourPartition, options: &ParquetOptions) -> WriterProperties {
    let metadata = vec![
        KeyValue {
            key: "pageviews2parquet.version".to_string(),
            value: Some(env!("CARGO_PKG_VERSION").to_string()),
        },
        KeyValue {
            key: "pageviews.date".to_string(),
            value: Some(partition.date_string()),
        },
        KeyValue {
            key: "pageviews.hour".to_string(),
            value: Some(partition.hour().to_string()),
        },
        KeyValue {
            key: "pageviews.source".to_string(),
            value: Some(options.source.clone()),
        },
    ];

    WriterProperties::builder()
        .set_dictionary_enabled(true)
        .set_statistics_enabled(EnabledStatistics::Page)
        .set_compression(Compression::SNAPPY)
        .set_data_page_size_limit(256 * 1024) // 256 KiB data pages balance CPU vs. IO
        .set_write_batch_size(8 * 1024)
        .set_max_row_group_size(options.row_group_size.max(1))
        .set_dictionary_page_size_limit(128 * 1024)
        .set_key_value_metadata(Some(metadata))
        .build()
}

/// Stream records into a Parquet file written to `writer`.
///
/// A producer that yields no records still produces a valid file carrying
/// the full schema. The first `Err` from the producer aborts encoding.
pub fn write_records_into<I, W>(
    records: I,
    partition: &HourPartition,
    options: &ParquetOptions,
    writer: &mut W,
) -> Result<EncodeSummary>
where
    I: IntoIterator<Item = io::Result<PageviewRecord>>,
    W: Write + Send,
{
    let row_group_size = options.row_group_size.max(1);
    let props = writer_properties(partition, options);
    let mut arrow_writer = ArrowWriter::try_new(writer, pageviews_schema_arc(), Some(props))
        .context("Failed to create Parquet writer")?;

    let mut converter = ArrowConverter::with_capacity(*partition, row_group_size);
    let mut rows: u64 = 0;
    let mut row_groups = 0;

    for record in records {
        let record = record.context("Failed to read pageview dump")?;
        converter.push(&record);
        rows += 1;

        if converter.len() >= row_group_size {
            let batch = converter.flush()?;
            arrow_writer
                .write(&batch)
                .context("Failed to write Parquet row group")?;
            row_groups += 1;
        }
    }

    if !converter.is_empty() {
        let batch = converter.flush()?;
        arrow_writer
            .write(&batch)
            .context("Failed to write Parquet row group")?;
        row_groups += 1;
    }

    arrow_writer
        .close()
        .context("Failed to finalize Parquet file")?;

    tracing::debug!(rows, row_groups, "Encoded partition {}", partition);

    Ok(EncodeSummary { rows, row_groups })
}

/// Stream records into an in-memory Parquet file.
pub fn encode_records<I>(
    records: I,
    partition: &HourPartition,
    options: &ParquetOptions,
) -> Result<EncodedPartition>
where
    I: IntoIterator<Item = io::Result<PageviewRecord>>,
{
    let mut bytes = Vec::new();
    let summary = write_records_into(records, partition, options, &mut bytes)?;
    Ok(EncodedPartition { bytes, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use ::parquet::file::reader::{FileReader, SerializedFileReader};

    fn partition() -> HourPartition {
        HourPartition::parse("2024-01-15", "3").unwrap()
    }

    fn record(page: &str, views: i64) -> io::Result<PageviewRecord> {
        Ok(PageviewRecord {
            project: "en".to_string(),
            page: page.to_string(),
            views,
            date: partition().date(),
            hour: 3,
        })
    }

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_encode_records() {
        let encoded = encode_records(
            vec![record("A", 1), record("B", 2)],
            &partition(),
            &ParquetOptions::default(),
        )
        .unwrap();

        assert_eq!(encoded.summary.rows, 2);
        // Parquet files start with "PAR1" magic bytes
        assert_eq!(&encoded.bytes[0..4], b"PAR1");
    }

    #[test]
    fn test_empty_producer_writes_valid_file() {
        let encoded =
            encode_records(Vec::new(), &partition(), &ParquetOptions::default()).unwrap();
        assert_eq!(encoded.summary.rows, 0);
        assert_eq!(encoded.summary.row_groups, 0);

        let file = write_temp(&encoded.bytes);
        let builder = ParquetRecordBatchReaderBuilder::try_new(file.reopen().unwrap()).unwrap();
        assert_eq!(builder.schema().fields().len(), 5);
        assert_eq!(builder.metadata().file_metadata().num_rows(), 0);
    }

    #[test]
    fn test_row_groups_bounded() {
        let options = ParquetOptions {
            row_group_size: 2,
            source: "test".to_string(),
        };
        let records = (0..5).map(|i| record(&format!("P{i}"), i));
        let encoded = encode_records(records, &partition(), &options).unwrap();

        assert_eq!(encoded.summary.rows, 5);
        assert_eq!(encoded.summary.row_groups, 3);
    }

    #[test]
    fn test_oversized_row_group_size_encodes() {
        let options = ParquetOptions {
            row_group_size: 1 << 62,
            source: "test".to_string(),
        };
        let encoded = encode_records(vec![record("A", 1)], &partition(), &options).unwrap();

        assert_eq!(encoded.summary.rows, 1);
        assert_eq!(encoded.summary.row_groups, 1);
    }

    #[test]
    fn test_producer_error_aborts() {
        let records = vec![
            record("A", 1),
            Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt deflate stream")),
        ];
        let err = encode_records(records, &partition(), &ParquetOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("corrupt deflate stream"));
    }

    #[test]
    fn test_file_metadata_embedded() {
        let options = ParquetOptions {
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            source: "https://example.org/pageviews-20240115-030000.gz".to_string(),
        };
        let encoded = encode_records(vec![record("A", 1)], &partition(), &options).unwrap();

        let file = write_temp(&encoded.bytes);
        let reader = SerializedFileReader::new(file.reopen().unwrap()).unwrap();
        let kv = reader
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .cloned()
            .unwrap_or_default();
        let lookup = |key: &str| {
            kv.iter()
                .find(|entry| entry.key == key)
                .and_then(|entry| entry.value.clone())
        };

        assert_eq!(lookup("pageviews.date").as_deref(), Some("2024-01-15"));
        assert_eq!(lookup("pageviews.hour").as_deref(), Some("3"));
        assert_eq!(
            lookup("pageviews.source").as_deref(),
            Some("https://example.org/pageviews-20240115-030000.gz")
        );
    }
}
