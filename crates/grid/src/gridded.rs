//! Reassembly of tables into labelled grids ready for output.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::GridError;
use crate::table::GridTable;

/// Output attributes of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableMeta {
    /// CF `standard_name`.
    pub standard_name: &'static str,
    /// CF `long_name`.
    pub long_name: &'static str,
    /// CF `units`.
    pub units: &'static str,
}

/// Looks up the fixed output metadata for `name`.
///
/// # Errors
///
/// Returns [`GridError::UnknownVariable`] for any name other than `pr` and
/// `tas`.
pub fn lookup_metadata(name: &str) -> Result<VariableMeta, GridError> {
    match name {
        "pr" => Ok(VariableMeta {
            standard_name: "precipitation",
            long_name: "Precipitation",
            units: "mm",
        }),
        "tas" => Ok(VariableMeta {
            standard_name: "temperature",
            long_name: "Temperature",
            units: "C",
        }),
        _ => Err(GridError::UnknownVariable {
            name: name.to_string(),
        }),
    }
}

/// A labelled `(time, lat, lon)` grid with output metadata.
///
/// Axes are sorted ascending; `data` is flattened in `[t, lat, lon]` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Gridded {
    name: String,
    meta: VariableMeta,
    times: Vec<NaiveDate>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    data: Vec<f64>,
}

impl Gridded {
    /// Variable name written to the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output attributes.
    pub fn meta(&self) -> VariableMeta {
        self.meta
    }

    /// Time axis.
    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    /// Latitude axis.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude axis.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Flattened data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// `[nt, ny, nx]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.times.len(), self.lats.len(), self.lons.len()]
    }

    /// Value at the given axis indices.
    pub fn value(&self, t: usize, y: usize, x: usize) -> f64 {
        let [_, ny, nx] = self.shape();
        self.data[(t * ny + y) * nx + x]
    }
}

/// Converts `table` into a grid named `name`.
///
/// Metadata is resolved before anything else. Axes are the sorted unique
/// times, latitudes and longitudes of the rows; positions with no row are
/// `NaN`.
///
/// # Errors
///
/// Returns [`GridError::UnknownVariable`] if `name` has no metadata, or
/// [`GridError::DuplicateIndex`] if two rows share a position.
pub fn to_grid(table: &GridTable, name: &str) -> Result<Gridded, GridError> {
    let meta = lookup_metadata(name)?;

    let times: Vec<NaiveDate> = table
        .rows()
        .iter()
        .map(|r| r.time)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let lats = sorted_unique(table.rows().iter().map(|r| r.lat));
    let lons = sorted_unique(table.rows().iter().map(|r| r.lon));

    let (ny, nx) = (lats.len(), lons.len());
    let mut data = vec![f64::NAN; times.len() * ny * nx];
    let mut filled = vec![false; data.len()];

    for row in table.rows() {
        // Every row's coordinates are on the axes by construction.
        let (Ok(t), Some(y), Some(x)) = (
            times.binary_search(&row.time),
            position(&lats, row.lat),
            position(&lons, row.lon),
        ) else {
            continue;
        };
        let idx = (t * ny + y) * nx + x;
        if filled[idx] {
            return Err(GridError::DuplicateIndex {
                time: row.time,
                lat: row.lat,
                lon: row.lon,
            });
        }
        filled[idx] = true;
        data[idx] = row.value;
    }

    Ok(Gridded {
        name: name.to_string(),
        meta,
        times,
        lats,
        lons,
        data,
    })
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    v.dedup_by(|a, b| a == b);
    v
}

fn position(axis: &[f64], value: f64) -> Option<usize> {
    axis.binary_search_by(|probe| {
        if probe == &value {
            Ordering::Equal
        } else {
            probe.total_cmp(&value)
        }
    })
    .ok()
}
