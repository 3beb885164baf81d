//! Calendar-day helpers used for grouping and output encoding.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::CalendarError;
use crate::units::parse_loose_date;

/// Truncates a UTC timestamp to its calendar day, dropping time-of-day.
pub fn truncate_to_day(time: NaiveDateTime) -> NaiveDate {
    time.date()
}

/// Month of year (1..=12).
pub fn month_of(date: NaiveDate) -> u8 {
    date.month() as u8
}

/// Parses a configuration date such as `1971-01-01`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] if the string is not a valid
/// `Y-M-D` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, CalendarError> {
    parse_loose_date(value.trim()).ok_or_else(|| CalendarError::InvalidDate {
        value: value.to_string(),
    })
}

/// Encodes dates as whole days since `epoch` (standard calendar).
pub fn encode_days(dates: &[NaiveDate], epoch: NaiveDate) -> Vec<f64> {
    dates
        .iter()
        .map(|d| d.signed_duration_since(epoch).num_days() as f64)
        .collect()
}
