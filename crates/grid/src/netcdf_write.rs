//! CF-style NetCDF output of a [`Gridded`] variable.

use std::path::Path;

use chrono::{DateTime, NaiveDate};
use gcmqm_calendar::encode_days;
use tracing::info;

use crate::error::GridError;
use crate::gridded::Gridded;

/// Units of the written time axis.
pub const TIME_UNITS: &str = "days since 1970-01-01";

/// Calendar of the written time axis.
pub const TIME_CALENDAR: &str = "standard";

fn epoch() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

/// Writes `gridded` to `path`, creating parent directories as needed.
///
/// The file has an unlimited `time` dimension, `lat`/`lon` coordinate
/// variables and the data variable with its metadata attributes and a `NaN`
/// `_FillValue`. An existing file at `path` is replaced.
///
/// # Errors
///
/// Returns [`GridError::Io`] if a directory cannot be created, or
/// [`GridError::Netcdf`] if writing fails.
pub fn write_netcdf(path: &Path, gridded: &Gridded) -> Result<(), GridError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| GridError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let [nt, ny, nx] = gridded.shape();
    let mut file = netcdf::create(path)?;

    file.add_unlimited_dimension("time")?;
    file.add_dimension("lat", ny)?;
    file.add_dimension("lon", nx)?;

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("standard_name", "time")?;
        var.put_attribute("units", TIME_UNITS)?;
        var.put_attribute("calendar", TIME_CALENDAR)?;
        if nt > 0 {
            let days = encode_days(gridded.times(), epoch());
            var.put_values(&days, 0..nt)?;
        }
    }
    {
        let mut var = file.add_variable::<f64>("lat", &["lat"])?;
        var.put_attribute("standard_name", "latitude")?;
        var.put_attribute("long_name", "Latitude")?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(gridded.lats(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["lon"])?;
        var.put_attribute("standard_name", "longitude")?;
        var.put_attribute("long_name", "Longitude")?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(gridded.lons(), ..)?;
    }
    {
        let meta = gridded.meta();
        let mut var = file.add_variable::<f64>(gridded.name(), &["time", "lat", "lon"])?;
        var.put_attribute("_FillValue", f64::NAN)?;
        var.put_attribute("standard_name", meta.standard_name)?;
        var.put_attribute("long_name", meta.long_name)?;
        var.put_attribute("units", meta.units)?;
        if nt > 0 {
            var.put_values(gridded.data(), (0..nt, 0..ny, 0..nx))?;
        }
    }

    info!(
        path = %path.display(),
        variable = gridded.name(),
        nt,
        ny,
        nx,
        "wrote gridded variable"
    );
    Ok(())
}
