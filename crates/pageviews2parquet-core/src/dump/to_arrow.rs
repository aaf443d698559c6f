// Convert pageview records to Arrow RecordBatches
//
// Builders are reused across flushes so a long dump is turned into a series
// of bounded batches rather than one large table.

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Builder, RecordBatch, StringBuilder};
use std::sync::Arc;

use super::reader::PageviewRecord;
use crate::hour::HourPartition;
use crate::schema::pageviews_schema_arc;

/// Default capacity for builders when expected row count is unknown
const DEFAULT_BUILDER_CAPACITY: usize = 1024;

/// Upper bound on up-front allocation; builders still grow past it on demand
pub const MAX_BUILDER_CAPACITY: usize = 64 * 1024;

/// Accumulates records for one partition into Arrow columns
pub struct ArrowConverter {
    project_builder: StringBuilder,
    page_builder: StringBuilder,
    views_builder: Int64Builder,
    date_builder: StringBuilder,
    hour_builder: Int64Builder,

    // Run context, identical for every row
    date: String,
    hour: i64,
    current_row_count: usize,
}

impl ArrowConverter {
    pub fn new(partition: HourPartition) -> Self {
        Self::with_capacity(partition, DEFAULT_BUILDER_CAPACITY)
    }

    /// Create a converter with a capacity hint (typically the row group size).
    ///
    /// The hint is clamped to `MAX_BUILDER_CAPACITY` rows.
    pub fn with_capacity(partition: HourPartition, capacity: usize) -> Self {
        let capacity = capacity.min(MAX_BUILDER_CAPACITY);
        let date = partition.date_string();
        Self {
            project_builder: StringBuilder::with_capacity(capacity, capacity * 8),
            page_builder: StringBuilder::with_capacity(capacity, capacity * 32),
            views_builder: Int64Builder::with_capacity(capacity),
            date_builder: StringBuilder::with_capacity(capacity, capacity * date.len()),
            hour_builder: Int64Builder::with_capacity(capacity),
            date,
            hour: i64::from(partition.hour()),
            current_row_count: 0,
        }
    }

    /// Append one record. The record's own date/hour are ignored in favour of
    /// the partition the converter was built for.
    pub fn push(&mut self, record: &PageviewRecord) {
        self.project_builder.append_value(&record.project);
        self.page_builder.append_value(&record.page);
        self.views_builder.append_value(record.views);
        self.date_builder.append_value(&self.date);
        self.hour_builder.append_value(self.hour);
        self.current_row_count += 1;
    }

    pub fn len(&self) -> usize {
        self.current_row_count
    }

    pub fn is_empty(&self) -> bool {
        self.current_row_count == 0
    }

    /// Drain the buffered rows into a RecordBatch, leaving the converter
    /// empty and ready for more.
    pub fn flush(&mut self) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.project_builder.finish()),
            Arc::new(self.page_builder.finish()),
            Arc::new(self.views_builder.finish()),
            Arc::new(self.date_builder.finish()),
            Arc::new(self.hour_builder.finish()),
        ];
        self.current_row_count = 0;

        RecordBatch::try_new(pageviews_schema_arc(), columns)
            .context("Failed to assemble pageview RecordBatch")
    }
}

/// Convert a slice of records into a single RecordBatch
pub fn records_to_batch(partition: HourPartition, records: &[PageviewRecord]) -> Result<RecordBatch> {
    let mut converter = ArrowConverter::with_capacity(partition, records.len());
    for record in records {
        converter.push(record);
    }
    converter.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array, StringArray};

    fn record(project: &str, page: &str, views: i64) -> PageviewRecord {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        PageviewRecord {
            project: project.to_string(),
            page: page.to_string(),
            views,
            date: partition.date(),
            hour: partition.hour(),
        }
    }

    #[test]
    fn test_capacity_hint_is_clamped() {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        let mut converter = ArrowConverter::with_capacity(partition, usize::MAX);
        converter.push(&record("en", "Main_Page", 120));

        let batch = converter.flush().unwrap();
        assert_eq!(batch.num_rows(), 1);
    }

    #[test]
    fn test_records_to_batch() {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        let batch = records_to_batch(
            partition,
            &[record("en", "Main_Page", 120), record("fr", "Accueil", 77)],
        )
        .unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 5);

        let pages = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(pages.value(0), "Main_Page");

        let views = batch
            .column(2)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(views.value(0), 120);
        assert_eq!(views.value(1), 77);

        let dates = batch
            .column(3)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(dates.value(1), "2024-01-15");

        let hours = batch
            .column(4)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(hours.null_count(), 0);
        assert_eq!(hours.value(0), 3);
    }

    #[test]
    fn test_flush_resets_converter() {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        let mut converter = ArrowConverter::new(partition);
        converter.push(&record("en", "A", 1));
        converter.push(&record("en", "B", 2));
        assert_eq!(converter.len(), 2);

        let first = converter.flush().unwrap();
        assert_eq!(first.num_rows(), 2);
        assert!(converter.is_empty());

        converter.push(&record("en", "C", 3));
        let second = converter.flush().unwrap();
        assert_eq!(second.num_rows(), 1);
    }

    #[test]
    fn test_empty_flush_has_schema() {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        let batch = ArrowConverter::new(partition).flush().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.schema(), pageviews_schema_arc());
    }
}
