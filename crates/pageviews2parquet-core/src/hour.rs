// Validated (date, hour) run key
//
// Every path and URL the job touches is derived from this pair, so it is
// checked once at the edge and carried as a Copy value afterwards.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use thiserror::Error;

/// Date format accepted on the command line and written to the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Highest valid hour of day (UTC).
pub const MAX_HOUR: u8 = 23;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("invalid hour '{input}': expected an integer between 0 and 23")]
    InvalidHour { input: String },
}

/// One hour of one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourPartition {
    date: NaiveDate,
    hour: u8,
}

impl HourPartition {
    pub fn new(date: NaiveDate, hour: u8) -> Result<Self, PartitionError> {
        if hour > MAX_HOUR {
            return Err(PartitionError::InvalidHour {
                input: hour.to_string(),
            });
        }
        Ok(Self { date, hour })
    }

    /// Parse the string forms used on the command line.
    pub fn parse(date: &str, hour: &str) -> Result<Self, PartitionError> {
        let date = parse_date(date)?;
        let hour = hour
            .trim()
            .parse::<u8>()
            .map_err(|_| PartitionError::InvalidHour {
                input: hour.to_string(),
            })?;
        Self::new(date, hour)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// `YYYY-MM-DD`, the value stored in the `date` column.
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for HourPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00 UTC", self.date.format(DATE_FORMAT), self.hour)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, PartitionError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| PartitionError::InvalidDate {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_partition() {
        let partition = HourPartition::parse("2024-01-15", "3").unwrap();
        assert_eq!(partition.year(), 2024);
        assert_eq!(partition.month(), 1);
        assert_eq!(partition.day(), 15);
        assert_eq!(partition.hour(), 3);
        assert_eq!(partition.date_string(), "2024-01-15");
    }

    #[test]
    fn test_hour_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(HourPartition::new(date, 0).is_ok());
        assert!(HourPartition::new(date, 23).is_ok());
        assert_eq!(
            HourPartition::new(date, 24),
            Err(PartitionError::InvalidHour {
                input: "24".to_string()
            })
        );
        assert!(HourPartition::parse("2024-01-15", "-1").is_err());
        assert!(HourPartition::parse("2024-01-15", "noon").is_err());
    }

    #[test]
    fn test_invalid_dates_rejected() {
        for input in ["2024-13-01", "2024-02-30", "15/01/2024", "", "yesterday"] {
            assert!(
                matches!(
                    HourPartition::parse(input, "0"),
                    Err(PartitionError::InvalidDate { .. })
                ),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_leap_day_accepted() {
        let partition = HourPartition::parse("2024-02-29", "23").unwrap();
        assert_eq!(partition.to_string(), "2024-02-29 23:00 UTC");
    }
}
