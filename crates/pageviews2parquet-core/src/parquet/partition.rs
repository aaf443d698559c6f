// Partition path generation for time-based organization
//
// One file per hour, nested by calendar date:
// {year}/{month}/{day}/{hour}.parquet

use crate::hour::HourPartition;

pub const PARQUET_EXTENSION: &str = "parquet";

/// Generate the output path for an hourly partition, relative to the output root
///
/// Format: `{YYYY}/{MM}/{DD}/{HH}.parquet`
pub fn partition_path(partition: &HourPartition) -> String {
    format!(
        "{:04}/{:02}/{:02}/{:02}.{}",
        partition.year(),
        partition.month(),
        partition.day(),
        partition.hour(),
        PARQUET_EXTENSION
    )
}
