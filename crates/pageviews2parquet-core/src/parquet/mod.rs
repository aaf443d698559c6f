// Parquet file writing
//
// This module handles streaming pageview records into Parquet format and
// naming the resulting partition file.

pub mod partition;
pub mod writer;

pub use partition::{partition_path, PARQUET_EXTENSION};
pub use writer::{
    encode_records, write_records_into, writer_properties, EncodeSummary, EncodedPartition,
    ParquetOptions, DEFAULT_ROW_GROUP_SIZE,
};
