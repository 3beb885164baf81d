//! Errors from CF time decoding and date parsing.

/// Error type for the gcmqm-calendar crate.
///
/// Covers malformed CF `units` strings, calendars the decoder does not
/// support, and offsets that cannot be turned into a date.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// A 365-day calendar date was built with a month outside 1..=12.
    #[error("month {month} is outside 1..=12")]
    InvalidMonth {
        /// Month as given.
        month: u8,
    },

    /// A 365-day calendar date was built with a day past the month's end.
    #[error("day {day} does not exist in month {month} of a 365-day year (last day {max_day})")]
    InvalidDay {
        /// Day as given.
        day: u8,
        /// Month of the date.
        month: u8,
        /// Last day of that month.
        max_day: u8,
    },

    /// Returned when a time `units` attribute cannot be parsed.
    #[error("invalid time units '{units}': {reason}")]
    InvalidUnits {
        /// The offending units string.
        units: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a plain date string cannot be parsed.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The offending date string.
        value: String,
    },

    /// Returned for calendars other than standard/gregorian and noleap.
    #[error("unsupported calendar: '{name}'")]
    UnsupportedCalendar {
        /// The calendar attribute value.
        name: String,
    },

    /// Returned when an offset is not finite or overflows the date range.
    #[error("time offset {offset} cannot be converted to a date")]
    OffsetOutOfRange {
        /// The offending offset, in the units of the time axis.
        offset: f64,
    },
}
