// Dump locator construction
//
// The archive groups hourly dumps by year and year-month:
// {base}/{YYYY}/{YYYY}-{MM}/pageviews-{YYYYMMDD}-{HH}0000.gz

use crate::hour::HourPartition;

/// File name of the hourly dump, e.g. `pageviews-20240115-030000.gz`.
pub fn dump_file_name(partition: &HourPartition) -> String {
    format!(
        "pageviews-{:04}{:02}{:02}-{:02}0000.gz",
        partition.year(),
        partition.month(),
        partition.day(),
        partition.hour()
    )
}

/// Fully qualified URL of the hourly dump under `base_url`.
///
/// A trailing slash on `base_url` is tolerated.
pub fn dump_url(base_url: &str, partition: &HourPartition) -> String {
    format!(
        "{}/{:04}/{:04}-{:02}/{}",
        base_url.trim_end_matches('/'),
        partition.year(),
        partition.year(),
        partition.month(),
        dump_file_name(partition)
    )
}
