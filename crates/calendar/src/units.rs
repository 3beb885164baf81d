//! Parsing of CF `units` strings of the form `<unit> since <reference>`.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::CalendarError;

/// Unit of a CF time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// `days`, `day`, `d`
    Days,
    /// `hours`, `hour`, `hrs`, `h`
    Hours,
    /// `minutes`, `minute`, `mins`, `min`
    Minutes,
    /// `seconds`, `second`, `secs`, `sec`, `s`
    Seconds,
}

impl TimeUnit {
    /// Length of one unit in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            Self::Days => 86_400.0,
            Self::Hours => 3_600.0,
            Self::Minutes => 60.0,
            Self::Seconds => 1.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "days" | "day" | "d" => Some(Self::Days),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(Self::Hours),
            "minutes" | "minute" | "mins" | "min" => Some(Self::Minutes),
            "seconds" | "second" | "secs" | "sec" | "s" => Some(Self::Seconds),
            _ => None,
        }
    }
}

/// A parsed CF time `units` attribute.
///
/// The reference time is normalised to UTC when the string carries an
/// explicit `+HH:MM` / `-HH:MM` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    unit: TimeUnit,
    reference: NaiveDateTime,
}

impl TimeUnits {
    /// Creates units from a unit and a UTC reference time.
    pub fn new(unit: TimeUnit, reference: NaiveDateTime) -> Self {
        Self { unit, reference }
    }

    /// The offset unit.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The reference ("since") time in UTC.
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }
}

impl FromStr for TimeUnits {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CalendarError::InvalidUnits {
            units: s.to_string(),
            reason: reason.to_string(),
        };

        // "days since 1949-12-1T00:00:00Z" splits date and time on 'T'.
        let normalised = split_iso_t(s.trim());
        let mut tokens = normalised.split_whitespace();

        let unit = tokens
            .next()
            .and_then(TimeUnit::parse)
            .ok_or_else(|| invalid("unknown or missing unit"))?;
        if !tokens.next().is_some_and(|t| t.eq_ignore_ascii_case("since")) {
            return Err(invalid("expected '<unit> since <date>'"));
        }
        let date_str = tokens.next().ok_or_else(|| invalid("missing reference date"))?;
        let date = parse_loose_date(date_str).ok_or_else(|| invalid("bad reference date"))?;

        let mut time = NaiveTime::MIN;
        let mut shift = TimeDelta::zero();
        for token in tokens {
            let token = token.trim_end_matches('Z');
            if token.is_empty() || token.eq_ignore_ascii_case("utc") {
                continue;
            }
            if let Some(rest) = token.strip_prefix('+').or_else(|| token.strip_prefix('-')) {
                let minutes = parse_zone(rest).ok_or_else(|| invalid("bad zone offset"))?;
                // Local = UTC + offset, so UTC = local - offset.
                let sign = if token.starts_with('-') { -1 } else { 1 };
                shift = TimeDelta::minutes(-sign * minutes);
                continue;
            }
            time = parse_loose_time(token).ok_or_else(|| invalid("bad reference time"))?;
        }

        Ok(Self {
            unit,
            reference: date.and_time(time) + shift,
        })
    }
}

/// Replaces an ISO-8601 `T` date/time separator with a space.
fn split_iso_t(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let between_digits = i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(char::is_ascii_digit);
            if c == 'T' && between_digits { ' ' } else { c }
        })
        .collect()
}

/// Parses `Y-M-D` with optional zero padding (`1949-12-1`).
pub(crate) fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses `H[:M[:S[.fff]]]`.
fn parse_loose_time(s: &str) -> Option<NaiveTime> {
    let mut parts = s.splitn(3, ':');
    let hour = parts.next()?.parse::<u32>().ok()?;
    let minute = parts.next().map_or(Some(0), |m| m.parse::<u32>().ok())?;
    let seconds = parts.next().map_or(Some(0.0), |v| v.parse::<f64>().ok())?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let whole = seconds.trunc() as u32;
    let nanos = ((seconds - seconds.trunc()) * 1e9).round() as u32;
    NaiveTime::from_hms_nano_opt(hour, minute, whole, nanos.min(999_999_999))
}

/// Parses `HH:MM`, `HHMM` or `HH` into minutes.
fn parse_zone(s: &str) -> Option<i64> {
    let (h, m) = match s.split_once(':') {
        Some((h, m)) => (h, m),
        None if s.len() == 4 => s.split_at(2),
        None => (s, "0"),
    };
    Some(h.parse::<i64>().ok()? * 60 + m.parse::<i64>().ok()?)
}
