// Hourly pageview dump handling
//
// Raw line format → borrowed line view → owned record → Arrow batch.

pub mod line;
pub mod reader;
pub mod to_arrow;

pub use line::{parse_line, PageviewLine};
pub use reader::{PageviewRecord, PageviewRecords};
pub use to_arrow::{records_to_batch, ArrowConverter};
