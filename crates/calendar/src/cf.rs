//! Supported CF calendars and decoding of numeric offsets into timestamps.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

use crate::error::CalendarError;
use crate::noleap;
use crate::units::TimeUnits;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calendar of a CF time axis.
///
/// `Standard` treats every date with proleptic Gregorian arithmetic; the
/// Julian/Gregorian switch of 1582 is not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfCalendar {
    /// `standard`, `gregorian`, `proleptic_gregorian`.
    #[default]
    Standard,
    /// `noleap`, `365_day`.
    NoLeap,
}

impl CfCalendar {
    /// Parses a CF `calendar` attribute value (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnsupportedCalendar`] for `360_day`,
    /// `all_leap`, `julian` and anything unrecognised.
    pub fn parse(name: &str) -> Result<Self, CalendarError> {
        match name.trim().to_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::Standard),
            "noleap" | "365_day" => Ok(Self::NoLeap),
            _ => Err(CalendarError::UnsupportedCalendar {
                name: name.to_string(),
            }),
        }
    }
}

/// Decodes CF offsets into UTC timestamps.
///
/// # Errors
///
/// Returns [`CalendarError::OffsetOutOfRange`] for non-finite offsets or
/// results outside chrono's range, and [`CalendarError::InvalidDay`] when a
/// no-leap axis references February 29.
pub fn decode_times(
    units: &TimeUnits,
    calendar: CfCalendar,
    offsets: &[f64],
) -> Result<Vec<NaiveDateTime>, CalendarError> {
    match calendar {
        CfCalendar::Standard => offsets
            .iter()
            .map(|&offset| decode_standard(units, offset))
            .collect(),
        CfCalendar::NoLeap => {
            let reference = units.reference();
            let ref_index = noleap::day_index(reference.month() as u8, reference.day() as u8)?;
            offsets
                .iter()
                .map(|&offset| decode_noleap(units, ref_index, offset))
                .collect()
        }
    }
}

fn decode_standard(units: &TimeUnits, offset: f64) -> Result<NaiveDateTime, CalendarError> {
    let millis = offset_millis(units, offset)?;
    units
        .reference()
        .checked_add_signed(TimeDelta::milliseconds(millis))
        .ok_or(CalendarError::OffsetOutOfRange { offset })
}

fn decode_noleap(
    units: &TimeUnits,
    ref_index: u16,
    offset: f64,
) -> Result<NaiveDateTime, CalendarError> {
    let reference = units.reference();
    let out_of_range = CalendarError::OffsetOutOfRange { offset };

    let tod_millis = i64::from(reference.num_seconds_from_midnight()) * 1_000
        + i64::from(reference.nanosecond() / 1_000_000);
    let total = offset_millis(units, offset)?
        .checked_add(tod_millis)
        .ok_or(out_of_range.clone())?;

    let millis_per_day = (SECONDS_PER_DAY * 1_000.0) as i64;
    let days = total.div_euclid(millis_per_day);
    let rem = total.rem_euclid(millis_per_day);

    let day_number = i64::from(ref_index) + days;
    let year = i64::from(reference.year()) + day_number.div_euclid(noleap::DAYS_PER_YEAR);
    let (month, day) = noleap::month_day(day_number.rem_euclid(noleap::DAYS_PER_YEAR) as u16);

    let year = i32::try_from(year).map_err(|_| out_of_range.clone())?;
    let date = NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        .ok_or(out_of_range.clone())?;
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(TimeDelta::milliseconds(rem)))
        .ok_or(out_of_range)
}

fn offset_millis(units: &TimeUnits, offset: f64) -> Result<i64, CalendarError> {
    let millis = (offset * units.unit().seconds() * 1_000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 / 2.0 {
        return Err(CalendarError::OffsetOutOfRange { offset });
    }
    Ok(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> TimeUnits {
        s.parse().unwrap()
    }

    #[test]
    fn parse_calendar_names() {
        assert_eq!(CfCalendar::parse("gregorian").unwrap(), CfCalendar::Standard);
        assert_eq!(
            CfCalendar::parse("proleptic_gregorian").unwrap(),
            CfCalendar::Standard
        );
        assert_eq!(CfCalendar::parse("STANDARD").unwrap(), CfCalendar::Standard);
        assert_eq!(CfCalendar::parse("365_day").unwrap(), CfCalendar::NoLeap);
        assert_eq!(CfCalendar::parse("noleap").unwrap(), CfCalendar::NoLeap);
        assert!(matches!(
            CfCalendar::parse("360_day"),
            Err(CalendarError::UnsupportedCalendar { .. })
        ));
    }

    #[test]
    fn standard_crosses_leap_day() {
        let u = units("days since 2000-02-28");
        let t = decode_times(&u, CfCalendar::Standard, &[1.0, 2.0]).unwrap();
        assert_eq!(t[0].date(), NaiveDate::from_ymd_opt(2000, 2, 29).unwrap());
        assert_eq!(t[1].date(), NaiveDate::from_ymd_opt(2000, 3, 1).unwrap());
    }

    #[test]
    fn noleap_skips_leap_day() {
        let u = units("days since 2000-02-28");
        let t = decode_times(&u, CfCalendar::NoLeap, &[1.0, 365.0]).unwrap();
        assert_eq!(t[0].date(), NaiveDate::from_ymd_opt(2000, 3, 1).unwrap());
        assert_eq!(t[1].date(), NaiveDate::from_ymd_opt(2001, 2, 28).unwrap());
    }

    #[test]
    fn noleap_negative_offsets() {
        let u = units("days since 2001-01-01");
        let t = decode_times(&u, CfCalendar::NoLeap, &[-1.0, -365.0]).unwrap();
        assert_eq!(t[0].date(), NaiveDate::from_ymd_opt(2000, 12, 31).unwrap());
        assert_eq!(t[1].date(), NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn noleap_keeps_time_of_day() {
        let u = units("hours since 1980-06-15 12:00:00");
        let t = decode_times(&u, CfCalendar::NoLeap, &[6.5]).unwrap();
        assert_eq!(t[0].to_string(), "1980-06-15 18:30:00");
    }

    #[test]
    fn noleap_rejects_feb_29_reference() {
        let u = units("days since 2000-02-29");
        assert!(decode_times(&u, CfCalendar::NoLeap, &[0.0]).is_err());
    }

    #[test]
    fn fractional_days_standard() {
        let u = units("days since 1980-06-15");
        let t = decode_times(&u, CfCalendar::Standard, &[0.5]).unwrap();
        assert_eq!(t[0].to_string(), "1980-06-15 12:00:00");
    }

    #[test]
    fn non_finite_offset_rejected() {
        let u = units("days since 1970-01-01");
        assert!(matches!(
            decode_times(&u, CfCalendar::Standard, &[f64::NAN]),
            Err(CalendarError::OffsetOutOfRange { .. })
        ));
        assert!(decode_times(&u, CfCalendar::NoLeap, &[f64::INFINITY]).is_err());
    }

    #[test]
    fn empty_offsets() {
        let u = units("days since 1970-01-01");
        assert!(decode_times(&u, CfCalendar::Standard, &[]).unwrap().is_empty());
    }
}
