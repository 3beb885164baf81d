//! Tabular (row per time/lat/lon) form of a gridded variable.

use chrono::NaiveDate;
use gcmqm_calendar::truncate_to_day;
use tracing::debug;

use crate::bounds::{Bounds, DateBounds};
use crate::descriptor::VariableDescriptor;
use crate::error::GridError;
use crate::source::GridSource;

/// One `(time, lat, lon, value)` observation. Missing values are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow {
    /// Calendar day of the record.
    pub time: NaiveDate,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Value after any load-time adjustment.
    pub value: f64,
}

/// Ordered rows of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTable {
    variable: String,
    rows: Vec<TableRow>,
}

impl GridTable {
    /// Wraps `rows` as a table of `variable`.
    pub fn new(variable: impl Into<String>, rows: Vec<TableRow>) -> Self {
        Self {
            variable: variable.into(),
            rows,
        }
    }

    /// Name of the variable the rows were read from.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The rows, in table order.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Consumes the table, returning its rows.
    pub fn into_rows(self) -> Vec<TableRow> {
        self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Averages rows that share `(lon, lat, time)`.
    ///
    /// The result is sorted by `(lon, lat, time)`. A group containing a `NaN`
    /// averages to `NaN`.
    pub fn collapse_duplicates(self) -> Self {
        let mut rows = self.rows;
        rows.sort_by(|a, b| {
            a.lon
                .total_cmp(&b.lon)
                .then(a.lat.total_cmp(&b.lat))
                .then(a.time.cmp(&b.time))
        });

        let n_in = rows.len();
        let mut out: Vec<TableRow> = Vec::with_capacity(n_in);
        let mut group: Vec<f64> = Vec::new();
        let mut start = 0;
        while start < rows.len() {
            let first = rows[start];
            let mut end = start + 1;
            while end < rows.len() && same_position(&rows[end], &first) {
                end += 1;
            }
            group.clear();
            group.extend(rows[start..end].iter().map(|r| r.value));
            out.push(TableRow {
                value: gcmqm_stats::mean(&group),
                ..first
            });
            start = end;
        }

        debug!(
            variable = %self.variable,
            rows_in = n_in,
            rows_out = out.len(),
            "collapsed duplicate rows"
        );
        Self {
            variable: self.variable,
            rows: out,
        }
    }
}

fn same_position(a: &TableRow, b: &TableRow) -> bool {
    a.lon == b.lon && a.lat == b.lat && a.time == b.time
}

/// Loads `descriptor` from `source` and flattens the selected sub-grid into
/// rows.
///
/// Every axis is cut to its inclusive bounds, the descriptor's adjustment is
/// applied to each value, and timestamps are truncated to their calendar day.
/// Rows are emitted in `(time, lat, lon)` order.
///
/// # Errors
///
/// Returns [`GridError::MissingVariable`] if the source has no such variable,
/// or any error the source raises while loading.
pub fn to_table<S: GridSource + ?Sized>(
    source: &S,
    descriptor: &VariableDescriptor,
    lon_bounds: Bounds,
    lat_bounds: Bounds,
    time_bounds: DateBounds,
) -> Result<GridTable, GridError> {
    let grid = source.grid(descriptor.name())?;
    let [_, ny, nx] = grid.shape();

    let t_idx: Vec<(usize, NaiveDate)> = grid
        .times()
        .iter()
        .map(|&t| truncate_to_day(t))
        .enumerate()
        .filter(|(_, d)| time_bounds.contains(*d))
        .collect();
    let y_idx: Vec<usize> = (0..ny)
        .filter(|&y| lat_bounds.contains(grid.lats()[y]))
        .collect();
    let x_idx: Vec<usize> = (0..nx)
        .filter(|&x| lon_bounds.contains(grid.lons()[x]))
        .collect();

    let adjustment = descriptor.adjustment();
    let mut rows = Vec::with_capacity(t_idx.len() * y_idx.len() * x_idx.len());
    for &(t, time) in &t_idx {
        for &y in &y_idx {
            for &x in &x_idx {
                rows.push(TableRow {
                    time,
                    lat: grid.lats()[y],
                    lon: grid.lons()[x],
                    value: adjustment.apply(grid.value(t, y, x)),
                });
            }
        }
    }

    debug!(
        variable = descriptor.name(),
        times = t_idx.len(),
        lats = y_idx.len(),
        lons = x_idx.len(),
        "selected sub-grid"
    );
    Ok(GridTable::new(descriptor.name(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Adjustment;
    use crate::grid::Grid;
    use crate::source::MemorySource;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(time: NaiveDate, lat: f64, lon: f64, value: f64) -> TableRow {
        TableRow {
            time,
            lat,
            lon,
            value,
        }
    }

    fn source() -> MemorySource {
        let times = vec![
            date(1980, 6, 15).and_hms_opt(18, 30, 0).unwrap(),
            date(1980, 6, 16).and_hms_opt(0, 0, 0).unwrap(),
            date(1980, 6, 17).and_hms_opt(12, 0, 0).unwrap(),
        ];
        // Descending latitudes as in many model files.
        let lats = vec![30.0, 25.0, 20.0];
        let lons = vec![70.0, 75.0];
        let data: Vec<f64> = (0..18).map(|i| i as f64).collect();
        MemorySource::new().with_grid("tas", Grid::new(times, lats, lons, data).unwrap())
    }

    #[test]
    fn selection_is_inclusive_and_ordered() {
        let table = to_table(
            &source(),
            &VariableDescriptor::new("tas"),
            Bounds::new(75.0, 80.0).unwrap(),
            Bounds::new(20.0, 25.0).unwrap(),
            DateBounds::new(date(1980, 6, 15), date(1980, 6, 16)).unwrap(),
        )
        .unwrap();

        assert_eq!(table.variable(), "tas");
        let expected = vec![
            row(date(1980, 6, 15), 25.0, 75.0, 3.0),
            row(date(1980, 6, 15), 20.0, 75.0, 5.0),
            row(date(1980, 6, 16), 25.0, 75.0, 9.0),
            row(date(1980, 6, 16), 20.0, 75.0, 11.0),
        ];
        assert_eq!(table.rows(), expected.as_slice());
    }

    #[test]
    fn timestamps_truncated_to_day() {
        let table = to_table(
            &source(),
            &VariableDescriptor::new("tas"),
            Bounds::new(70.0, 70.0).unwrap(),
            Bounds::new(30.0, 30.0).unwrap(),
            DateBounds::new(date(1980, 6, 15), date(1980, 6, 15)).unwrap(),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].time, date(1980, 6, 15));
    }

    #[test]
    fn adjustment_applied() {
        let descriptor = VariableDescriptor::new("tas").with_adjustment(Adjustment::Add(-273.15));
        let table = to_table(
            &source(),
            &descriptor,
            Bounds::new(70.0, 70.0).unwrap(),
            Bounds::new(30.0, 30.0).unwrap(),
            DateBounds::new(date(1980, 6, 17), date(1980, 6, 17)).unwrap(),
        )
        .unwrap();
        assert_relative_eq!(table.rows()[0].value, 12.0 - 273.15, epsilon = 1e-9);
    }

    #[test]
    fn unknown_variable_is_lookup_error() {
        let err = to_table(
            &source(),
            &VariableDescriptor::new("pr"),
            Bounds::new(0.0, 1.0).unwrap(),
            Bounds::new(0.0, 1.0).unwrap(),
            DateBounds::new(date(1980, 1, 1), date(1980, 1, 1)).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, GridError::MissingVariable { .. }));
    }

    #[test]
    fn collapse_averages_duplicates() {
        let d = date(2000, 1, 1);
        let table = GridTable::new(
            "pr",
            vec![
                row(d, 22.5, 75.5, 10.0),
                row(date(2000, 1, 2), 22.5, 75.5, 1.0),
                row(d, 22.5, 75.5, 12.0),
                row(d, 22.5, 70.0, 3.0),
            ],
        );
        let collapsed = table.collapse_duplicates();
        assert_eq!(
            collapsed.rows(),
            &[
                row(d, 22.5, 70.0, 3.0),
                row(d, 22.5, 75.5, 11.0),
                row(date(2000, 1, 2), 22.5, 75.5, 1.0),
            ]
        );
    }

    #[test]
    fn collapse_propagates_nan() {
        let d = date(2000, 1, 1);
        let table = GridTable::new(
            "pr",
            vec![row(d, 1.0, 1.0, f64::NAN), row(d, 1.0, 1.0, 2.0)],
        );
        let collapsed = table.collapse_duplicates();
        assert_eq!(collapsed.len(), 1);
        assert!(collapsed.rows()[0].value.is_nan());
    }
}
