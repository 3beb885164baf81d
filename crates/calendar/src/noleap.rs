//! Month tables for the 365-day no-leap calendar.

use crate::error::CalendarError;

/// Number of days in each month (index 0 unused, index 1 = January, ..., index 12 = December).
const DAYS_PER_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// 0-based day-of-year on which each month starts (index 0 unused).
const MONTH_START: [u16; 13] = [0, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Days in one no-leap year.
pub(crate) const DAYS_PER_YEAR: i64 = 365;

/// 0-based day-of-year (0..=364) of `(month, day)` in the no-leap calendar.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] or [`CalendarError::InvalidDay`]
/// when the pair does not exist, which includes February 29.
pub(crate) fn day_index(month: u8, day: u8) -> Result<u16, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth { month });
    }
    let max_day = DAYS_PER_MONTH[month as usize];
    if !(1..=max_day).contains(&day) {
        return Err(CalendarError::InvalidDay {
            day,
            month,
            max_day,
        });
    }
    Ok(MONTH_START[month as usize] + u16::from(day) - 1)
}

/// `(month, day)` for a 0-based day-of-year; `index` is reduced modulo 365.
pub(crate) fn month_day(index: u16) -> (u8, u8) {
    let index = index % DAYS_PER_YEAR as u16;
    let month = (1..=12u8)
        .rev()
        .find(|&m| MONTH_START[m as usize] <= index)
        .unwrap_or(1);
    let day = index - MONTH_START[month as usize] + 1;
    (month, day as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip_all_days() {
        for i in 0..365u16 {
            let (m, d) = month_day(i);
            assert_eq!(day_index(m, d).unwrap(), i, "round trip failed at {i}");
        }
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(month_day(0), (1, 1));
        assert_eq!(month_day(58), (2, 28));
        assert_eq!(month_day(59), (3, 1));
        assert_eq!(month_day(364), (12, 31));
    }

    #[test]
    fn feb_29_rejected() {
        assert_eq!(
            day_index(2, 29).unwrap_err(),
            CalendarError::InvalidDay {
                day: 29,
                month: 2,
                max_day: 28,
            }
        );
    }

    #[test]
    fn invalid_month_rejected() {
        assert_eq!(
            day_index(0, 1).unwrap_err(),
            CalendarError::InvalidMonth { month: 0 }
        );
    }
}
