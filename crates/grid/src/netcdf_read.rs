//! NetCDF-backed [`GridSource`].

use std::path::{Path, PathBuf};

use gcmqm_calendar::{CfCalendar, TimeUnits, decode_times};
use netcdf::AttributeValue;
use tracing::{debug, info};

use crate::error::GridError;
use crate::grid::Grid;
use crate::source::GridSource;

const TIME_ALIASES: &[&str] = &["time", "t"];
const LAT_ALIASES: &[&str] = &["lat", "latitude", "y"];
const LON_ALIASES: &[&str] = &["lon", "longitude", "x"];

/// Reads variables from one NetCDF file.
///
/// The variable must have a time, a latitude and a longitude dimension
/// (matched by name, case-insensitively). Any other dimension must have
/// length 1 and is squeezed out, as APHRODITE's `lev`. `_FillValue` and
/// `missing_value` become `NaN`, and `scale_factor`/`add_offset` are applied.
#[derive(Debug, Clone)]
pub struct NetcdfSource {
    path: PathBuf,
}

impl NetcdfSource {
    /// Creates a source for `path`. The file is opened on each load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridSource for NetcdfSource {
    fn grid(&self, name: &str) -> Result<Grid, GridError> {
        let file = open_file(&self.path)?;
        let grid = read_grid(&file, name, &self.path)?;
        let [nt, ny, nx] = grid.shape();
        info!(
            path = %self.path.display(),
            variable = name,
            nt,
            ny,
            nx,
            "read gridded variable"
        );
        Ok(grid)
    }
}

/// Open a NetCDF file at `path`, returning [`GridError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, GridError> {
    if !path.exists() {
        return Err(GridError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Position of each named axis within a variable's dimension list.
struct AxisLayout {
    time: usize,
    lat: usize,
    lon: usize,
    names: Vec<String>,
    lens: Vec<usize>,
}

fn find_axis(names: &[String], aliases: &[&str]) -> Option<usize> {
    names
        .iter()
        .position(|n| aliases.iter().any(|a| n.eq_ignore_ascii_case(a)))
}

fn layout(var: &netcdf::Variable<'_>, var_name: &str) -> Result<AxisLayout, GridError> {
    let names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let lens: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let missing = |axis| GridError::MissingDimension {
        variable: var_name.to_string(),
        axis,
    };
    let time = find_axis(&names, TIME_ALIASES).ok_or_else(|| missing("time"))?;
    let lat = find_axis(&names, LAT_ALIASES).ok_or_else(|| missing("lat"))?;
    let lon = find_axis(&names, LON_ALIASES).ok_or_else(|| missing("lon"))?;

    for (i, (name, &len)) in names.iter().zip(&lens).enumerate() {
        if i == time || i == lat || i == lon {
            continue;
        }
        if len != 1 {
            return Err(GridError::DimensionMismatch {
                name: name.clone(),
                expected: 1,
                got: len,
            });
        }
        debug!(variable = var_name, dimension = %name, "squeezed singleton dimension");
    }

    Ok(AxisLayout {
        time,
        lat,
        lon,
        names,
        lens,
    })
}

fn read_grid(file: &netcdf::File, var_name: &str, path: &Path) -> Result<Grid, GridError> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| GridError::MissingVariable {
            name: var_name.to_string(),
            location: path.display().to_string(),
        })?;
    let axes = layout(&var, var_name)?;

    let lats = read_coordinate(file, &axes.names[axes.lat], path)?;
    let lons = read_coordinate(file, &axes.names[axes.lon], path)?;
    let times = read_time_axis(file, &axes.names[axes.time], path)?;

    let raw = var.get_values::<f64, _>(..)?;
    let packing = Packing::from_variable(&var);
    let unpacked: Vec<f64> = raw.into_iter().map(|v| packing.unpack(v)).collect();

    // Reorder from file dimension order to [t, lat, lon]. Squeezed
    // dimensions have length 1 and contribute index 0.
    let ndim = axes.lens.len();
    let mut strides = vec![1usize; ndim];
    for i in (0..ndim.saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * axes.lens[i + 1];
    }
    let (nt, ny, nx) = (
        axes.lens[axes.time],
        axes.lens[axes.lat],
        axes.lens[axes.lon],
    );
    let mut data = Vec::with_capacity(nt * ny * nx);
    for t in 0..nt {
        for y in 0..ny {
            for x in 0..nx {
                let idx = t * strides[axes.time] + y * strides[axes.lat] + x * strides[axes.lon];
                data.push(unpacked[idx]);
            }
        }
    }

    Grid::new(times, lats, lons, data)
}

/// Reads the 1-D coordinate variable that shares its name with a dimension.
fn read_coordinate(file: &netcdf::File, name: &str, path: &Path) -> Result<Vec<f64>, GridError> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridError::MissingVariable {
            name: name.to_string(),
            location: path.display().to_string(),
        })?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Reads and decodes the time coordinate through its CF `units` and
/// `calendar` attributes. A missing `calendar` means `standard`.
fn read_time_axis(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<chrono::NaiveDateTime>, GridError> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridError::MissingVariable {
            name: name.to_string(),
            location: path.display().to_string(),
        })?;
    let offsets = var.get_values::<f64, _>(..)?;
    let units_str = string_attribute(&var, "units").ok_or_else(|| {
        GridError::from(gcmqm_calendar::CalendarError::InvalidUnits {
            units: String::new(),
            reason: format!("time variable '{name}' has no string 'units' attribute"),
        })
    })?;
    let units: TimeUnits = units_str.parse()?;
    let calendar = match string_attribute(&var, "calendar") {
        Some(c) => CfCalendar::parse(&c)?,
        None => CfCalendar::Standard,
    };
    Ok(decode_times(&units, calendar, &offsets)?)
}

fn string_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(v) => v.into_iter().next(),
        _ => None,
    }
}

/// First numeric element of an attribute, as `f64`.
fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    let value = match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => v,
        AttributeValue::Float(v) => f64::from(v),
        AttributeValue::Int(v) => f64::from(v),
        AttributeValue::Short(v) => f64::from(v),
        AttributeValue::Schar(v) => f64::from(v),
        AttributeValue::Uchar(v) => f64::from(v),
        AttributeValue::Ushort(v) => f64::from(v),
        AttributeValue::Uint(v) => f64::from(v),
        AttributeValue::Longlong(v) => v as f64,
        AttributeValue::Ulonglong(v) => v as f64,
        AttributeValue::Doubles(v) => *v.first()?,
        AttributeValue::Floats(v) => f64::from(*v.first()?),
        AttributeValue::Ints(v) => f64::from(*v.first()?),
        AttributeValue::Shorts(v) => f64::from(*v.first()?),
        _ => return None,
    };
    Some(value)
}

/// CF masking and packing attributes of a data variable.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Packing {
    fill_value: Option<f64>,
    missing_value: Option<f64>,
    scale_factor: f64,
    add_offset: f64,
}

impl Packing {
    fn from_variable(var: &netcdf::Variable<'_>) -> Self {
        Self {
            fill_value: numeric_attribute(var, "_FillValue"),
            missing_value: numeric_attribute(var, "missing_value"),
            scale_factor: numeric_attribute(var, "scale_factor").unwrap_or(1.0),
            add_offset: numeric_attribute(var, "add_offset").unwrap_or(0.0),
        }
    }

    /// Masks against the packed value, then unpacks.
    fn unpack(&self, raw: f64) -> f64 {
        if self.fill_value == Some(raw) || self.missing_value == Some(raw) {
            return f64::NAN;
        }
        raw * self.scale_factor + self.add_offset
    }
}
