//! Inclusive coordinate and date ranges used for spatial/temporal subsetting.

use chrono::NaiveDate;

use crate::error::GridError;

/// Inclusive `[min, max]` coordinate range.
///
/// Selection compares coordinate values, so the order of the axis in the
/// file (ascending or descending latitudes) does not matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBounds`] if either end is not finite or
    /// `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, GridError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GridError::InvalidBounds {
                reason: format!("bounds must be finite, got [{min}, {max}]"),
            });
        }
        if min > max {
            return Err(GridError::InvalidBounds {
                reason: format!("min {min} exceeds max {max}"),
            });
        }
        Ok(Self { min, max })
    }

    /// Lower end.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper end.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether `value` lies within the range, ends included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Inclusive `[start, end]` date range; the end date is included whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateBounds {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBounds`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, GridError> {
        if start > end {
            return Err(GridError::InvalidBounds {
                reason: format!("start {start} is after end {end}"),
            });
        }
        Ok(Self { start, end })
    }

    /// First included date.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last included date.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` lies within the range, ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
