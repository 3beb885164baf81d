//! Error types for gcmqm-grid.

use std::path::PathBuf;

use chrono::NaiveDate;

/// Error type for all fallible operations in the gcmqm-grid crate.
///
/// Covers file access, NetCDF library failures, layout problems in the
/// gridded input, and lookup failures for variables and metadata.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when a requested variable is not present in a source.
    #[error("variable '{name}' not found in {location}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// File path or other description of the source.
        location: String,
    },

    /// Returned when a variable has no dimension matching a required axis.
    #[error("variable '{variable}' has no {axis} dimension")]
    MissingDimension {
        /// Variable that was inspected.
        variable: String,
        /// Axis that could not be identified (`time`, `lat` or `lon`).
        axis: &'static str,
    },

    /// Returned when a dimension or array has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension or array.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Wraps an error from the gcmqm-calendar crate.
    #[error("calendar error: {0}")]
    Calendar(#[from] gcmqm_calendar::CalendarError),

    /// Returned when no output metadata is known for a variable name.
    #[error("no metadata for variable '{name}' (known: pr, tas)")]
    UnknownVariable {
        /// The variable name that was looked up.
        name: String,
    },

    /// Returned when two table rows map to the same grid position.
    #[error("duplicate row at time={time}, lat={lat}, lon={lon}")]
    DuplicateIndex {
        /// Time of the duplicated row.
        time: NaiveDate,
        /// Latitude of the duplicated row.
        lat: f64,
        /// Longitude of the duplicated row.
        lon: f64,
    },

    /// Returned when a coordinate or date range is malformed.
    #[error("invalid bounds: {reason}")]
    InvalidBounds {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a filesystem operation fails.
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl From<netcdf::Error> for GridError {
    fn from(e: netcdf::Error) -> Self {
        GridError::Netcdf {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = GridError::FileNotFound {
            path: PathBuf::from("/tmp/missing.nc"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.nc");
    }

    #[test]
    fn display_missing_variable() {
        let err = GridError::MissingVariable {
            name: "tave".to_string(),
            location: "input/aphro/aphrodite_tave.nc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "variable 'tave' not found in input/aphro/aphrodite_tave.nc"
        );
    }

    #[test]
    fn display_missing_dimension() {
        let err = GridError::MissingDimension {
            variable: "pr".to_string(),
            axis: "lat",
        };
        assert_eq!(err.to_string(), "variable 'pr' has no lat dimension");
    }

    #[test]
    fn display_unknown_variable() {
        let err = GridError::UnknownVariable {
            name: "huss".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no metadata for variable 'huss' (known: pr, tas)"
        );
    }

    #[test]
    fn display_duplicate_index() {
        let err = GridError::DuplicateIndex {
            time: NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(),
            lat: 22.5,
            lon: 75.5,
        };
        assert_eq!(
            err.to_string(),
            "duplicate row at time=1990-01-02, lat=22.5, lon=75.5"
        );
    }

    #[test]
    fn from_calendar_error() {
        let cal = gcmqm_calendar::CalendarError::UnsupportedCalendar {
            name: "360_day".to_string(),
        };
        let err = GridError::from(cal);
        assert!(err.to_string().starts_with("calendar error: "));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<GridError>();
    }
}
