// Arrow schema for hourly pageview partitions
//
// Column types mirror the frame the job has always produced: strings for
// text and the run date, 64-bit integers for counts and the hour.

use arrow::datatypes::{DataType, Field, Schema};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

pub mod field {
    pub const PROJECT: &str = "project";
    pub const PAGE: &str = "page";
    pub const VIEWS: &str = "views";
    pub const DATE: &str = "date";
    pub const HOUR: &str = "hour";
}

pub const SCHEMA_VERSION_KEY: &str = "pageviews2parquet.schema_version";
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Returns the Arrow schema for pageview records
pub fn pageviews_schema() -> Schema {
    pageviews_schema_arc().as_ref().clone()
}

/// Returns a cached `Arc<Schema>` for the pageview schema.
pub fn pageviews_schema_arc() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| Arc::new(build_schema())))
}

fn build_schema() -> Schema {
    let fields = vec![
        Field::new(field::PROJECT, DataType::Utf8, false),
        Field::new(field::PAGE, DataType::Utf8, false),
        Field::new(field::VIEWS, DataType::Int64, false),
        Field::new(field::DATE, DataType::Utf8, false),
        Field::new(field::HOUR, DataType::Int64, false),
    ];

    let metadata = HashMap::from([(SCHEMA_VERSION_KEY.to_string(), SCHEMA_VERSION.to_string())]);

    Schema::new_with_metadata(fields, metadata)
}
