// pageviews2parquet-core - Platform-agnostic core logic
//
// This crate contains the PURE processing logic for turning an hourly
// pageview dump into a Parquet partition. No networking, no async, no
// filesystem layout decisions beyond naming the partition file.
//
// - Essence: dump bytes → records → Parquet bytes
// - Accident: download, scratch files, storage (handled by the other crates)

use anyhow::Result;
use std::io::Read;

pub mod dump;
pub mod hour;
pub mod locator;
pub mod parquet;
pub mod schema;

// Re-export commonly used types
pub use dump::{PageviewRecord, PageviewRecords};
pub use hour::{HourPartition, PartitionError};
pub use locator::{dump_file_name, dump_url};
pub use self::parquet::{partition_path, EncodedPartition, ParquetOptions};
pub use schema::pageviews_schema;

/// Result of converting one hourly dump
#[derive(Debug)]
pub struct ProcessingResult {
    pub parquet_bytes: Vec<u8>,
    pub partition: HourPartition,
    pub lines_read: u64,
    pub rows: u64,
}

/// Convert a gzip-compressed hourly dump into Parquet bytes.
///
/// Records stream from the decoder into the encoder; malformed lines are
/// dropped. Fails only when the compressed stream cannot be read or the
/// Parquet file cannot be produced.
pub fn process_gzip_dump<R: Read>(
    reader: R,
    partition: HourPartition,
    options: &ParquetOptions,
) -> Result<ProcessingResult> {
    let mut records = PageviewRecords::from_gzip(reader, partition);
    let encoded = parquet::encode_records(records.by_ref(), &partition, options)?;

    Ok(ProcessingResult {
        parquet_bytes: encoded.bytes,
        partition,
        lines_read: records.lines_read(),
        rows: encoded.summary.rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_process_empty_dump() {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        let result =
            process_gzip_dump(Cursor::new(gzip("")), partition, &ParquetOptions::default())
                .unwrap();

        assert_eq!(result.rows, 0);
        assert_eq!(result.lines_read, 0);
        // Parquet files start with "PAR1" magic bytes
        assert_eq!(&result.parquet_bytes[0..4], b"PAR1");
    }

    #[test]
    fn test_process_counts_lines_and_rows() {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        let result = process_gzip_dump(
            Cursor::new(gzip("en A 1 0\nbroken\nen B 2 0\n")),
            partition,
            &ParquetOptions::default(),
        )
        .unwrap();

        assert_eq!(result.lines_read, 3);
        assert_eq!(result.rows, 2);
    }
}
