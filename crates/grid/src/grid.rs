//! In-memory `(time, lat, lon)` grid of one variable.

use chrono::NaiveDateTime;

use crate::error::GridError;

/// A single gridded variable as loaded from a source.
///
/// `data` is flattened in `[t, lat, lon]` order with `lon` varying fastest.
/// Missing values are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    times: Vec<NaiveDateTime>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    data: Vec<f64>,
}

impl Grid {
    /// Creates a grid after checking that `data` matches the axis lengths.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if
    /// `data.len() != times.len() * lats.len() * lons.len()`.
    pub fn new(
        times: Vec<NaiveDateTime>,
        lats: Vec<f64>,
        lons: Vec<f64>,
        data: Vec<f64>,
    ) -> Result<Self, GridError> {
        let expected = times.len() * lats.len() * lons.len();
        if data.len() != expected {
            return Err(GridError::DimensionMismatch {
                name: "grid data".to_string(),
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            times,
            lats,
            lons,
            data,
        })
    }

    /// Time axis.
    pub fn times(&self) -> &[NaiveDateTime] {
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

    /// Value at time index `t`, latitude index `y`, longitude index `x`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn value(&self, t: usize, y: usize, x: usize) -> f64 {
        let [_, ny, nx] = self.shape();
        assert!(y < ny && x < nx, "grid index out of range");
        self.data[(t * ny + y) * nx + x]
    }
}
