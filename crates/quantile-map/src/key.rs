//! Grid cell key identifying one fit/apply unit.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::QuantileMapError;

/// A `(longitude, latitude, month)` triple.
///
/// Equality and hashing compare the exact bit patterns of the coordinates
/// (with `-0.0` folded into `0.0`). Observation and model grids must share
/// identical coordinate values for their keys to meet.
#[derive(Debug, Clone, Copy)]
pub struct CellKey {
    lon: f64,
    lat: f64,
    month: u8,
}

impl CellKey {
    /// Creates a key.
    ///
    /// # Errors
    ///
    /// Returns [`QuantileMapError::InvalidMonth`] if `month` is outside 1..=12.
    pub fn new(lon: f64, lat: f64, month: u8) -> Result<Self, QuantileMapError> {
        if !(1..=12).contains(&month) {
            return Err(QuantileMapError::InvalidMonth { month });
        }
        Ok(Self {
            lon: fold_zero(lon),
            lat: fold_zero(lat),
            month,
        })
    }

    /// Longitude of the cell.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude of the cell.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Calendar month (1..=12).
    pub fn month(&self) -> u8 {
        self.month
    }

    fn bits(&self) -> (u64, u64, u8) {
        (self.lon.to_bits(), self.lat.to_bits(), self.month)
    }
}

fn fold_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl PartialEq for CellKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for CellKey {}

impl Hash for CellKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(lon={}, lat={}, month={})",
            self.lon, self.lat, self.month
        )
    }
}
