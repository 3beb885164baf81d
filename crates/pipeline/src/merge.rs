//! Pairing of model and observation rows, month grouping, and reassembly.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDate;
use gcmqm_calendar::month_of;
use gcmqm_grid::{GridTable, TableRow};
use gcmqm_quantile_map::{CellKey, CellSample, CellSeries, CorrectedSeries, QuantileMapError};

/// A model row with its matching observation (`NaN` when none matched).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedRow {
    /// Calendar day.
    pub time: NaiveDate,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Model value.
    pub modeled: f64,
    /// Observed value.
    pub observed: f64,
}

/// Join key: exact coordinates with `-0.0` folded into `0.0`.
type PositionKey = (u64, u64, NaiveDate);

fn position_key(lon: f64, lat: f64, time: NaiveDate) -> PositionKey {
    let fold = |v: f64| if v == 0.0 { 0.0f64 } else { v };
    (fold(lon).to_bits(), fold(lat).to_bits(), time)
}

/// Right-joins `observed` onto `model` on `(lon, lat, time)`.
///
/// Every model row appears in the output, in model order. A model row with
/// no observation gets `NaN`; a model row matching several observation rows
/// appears once per match.
pub fn pair_observations(model: &GridTable, observed: &GridTable) -> Vec<PairedRow> {
    let mut lookup: HashMap<PositionKey, Vec<f64>> = HashMap::new();
    for r in observed.rows() {
        lookup
            .entry(position_key(r.lon, r.lat, r.time))
            .or_default()
            .push(r.value);
    }

    let mut out = Vec::with_capacity(model.len());
    for r in model.rows() {
        let pair = |observed| PairedRow {
            time: r.time,
            lat: r.lat,
            lon: r.lon,
            modeled: r.value,
            observed,
        };
        match lookup.get(&position_key(r.lon, r.lat, r.time)) {
            Some(values) => out.extend(values.iter().map(|&v| pair(v))),
            None => out.push(pair(f64::NAN)),
        }
    }
    out
}

/// Number of rows whose observation is present.
pub fn count_matched(rows: &[PairedRow]) -> usize {
    rows.iter().filter(|r| !r.observed.is_nan()).count()
}

/// Groups paired rows by `(lon, lat, month)` in first-appearance order.
///
/// # Errors
///
/// Returns [`QuantileMapError::InvalidMonth`] only if a date yields a month
/// outside 1..=12.
pub fn group_pairs(rows: &[PairedRow]) -> Result<Vec<CellSample>, QuantileMapError> {
    let mut index: HashMap<CellKey, usize> = HashMap::new();
    let mut groups: Vec<CellSample> = Vec::new();
    for r in rows {
        let key = CellKey::new(r.lon, r.lat, month_of(r.time))?;
        let slot = match index.entry(key) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                groups.push(CellSample {
                    key,
                    observed: Vec::new(),
                    modeled: Vec::new(),
                });
                *e.insert(groups.len() - 1)
            }
        };
        groups[slot].observed.push(r.observed);
        groups[slot].modeled.push(r.modeled);
    }
    Ok(groups)
}

/// Groups model rows by `(lon, lat, month)` in first-appearance order,
/// keeping each group's rows in table order.
///
/// # Errors
///
/// Returns [`QuantileMapError::InvalidMonth`] only if a date yields a month
/// outside 1..=12.
pub fn group_series(table: &GridTable) -> Result<Vec<CellSeries>, QuantileMapError> {
    let mut index: HashMap<CellKey, usize> = HashMap::new();
    let mut groups: Vec<CellSeries> = Vec::new();
    for r in table.rows() {
        let key = CellKey::new(r.lon, r.lat, month_of(r.time))?;
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(CellSeries {
                key,
                times: Vec::new(),
                values: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].times.push(r.time);
        groups[slot].values.push(r.value);
    }
    Ok(groups)
}

/// Flattens corrected series back into a table in `(time, lat, lon)` order.
pub fn reassemble(variable: &str, corrected: &[CorrectedSeries]) -> GridTable {
    let mut rows: Vec<TableRow> = corrected
        .iter()
        .flat_map(|c| {
            c.times.iter().zip(&c.values).map(|(&time, &value)| TableRow {
                time,
                lat: c.key.lat(),
                lon: c.key.lon(),
                value,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then(a.lat.total_cmp(&b.lat))
            .then(a.lon.total_cmp(&b.lon))
    });
    GridTable::new(variable, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, m, d).unwrap()
    }

    fn row(time: NaiveDate, lat: f64, lon: f64, value: f64) -> TableRow {
        TableRow {
            time,
            lat,
            lon,
            value,
        }
    }

    #[test]
    fn right_join_keeps_every_model_row() {
        let model = GridTable::new(
            "pr",
            vec![
                row(date(1, 1), 10.0, 70.0, 1.0),
                row(date(1, 2), 10.0, 70.0, 2.0),
                row(date(1, 1), 10.0, 70.5, 3.0),
            ],
        );
        let obs = GridTable::new(
            "precip",
            vec![
                row(date(1, 1), 10.0, 70.0, 10.0),
                // No model counterpart.
                row(date(1, 1), 11.0, 70.0, 99.0),
            ],
        );
        let pairs = pair_observations(&model, &obs);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].observed, 10.0);
        assert!(pairs[1].observed.is_nan());
        assert!(pairs[2].observed.is_nan());
        assert_eq!(
            pairs.iter().map(|p| p.modeled).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
        assert_eq!(count_matched(&pairs), 1);
    }

    #[test]
    fn duplicate_observations_multiply_rows() {
        let model = GridTable::new("pr", vec![row(date(1, 1), 0.0, 0.0, 1.0)]);
        let obs = GridTable::new(
            "precip",
            vec![
                row(date(1, 1), -0.0, 0.0, 5.0),
                row(date(1, 1), 0.0, 0.0, 6.0),
            ],
        );
        let pairs = pair_observations(&model, &obs);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].observed, 5.0);
        assert_eq!(pairs[1].observed, 6.0);
    }

    #[test]
    fn grouping_by_month_first_appearance() {
        let table = GridTable::new(
            "tas",
            vec![
                row(date(2, 1), 1.0, 1.0, 1.0),
                row(date(1, 1), 1.0, 1.0, 2.0),
                row(date(2, 2), 1.0, 1.0, 3.0),
                row(date(2, 1), 1.0, 2.0, 4.0),
            ],
        );
        let groups = group_series(&table).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, CellKey::new(1.0, 1.0, 2).unwrap());
        assert_eq!(groups[0].values, vec![1.0, 3.0]);
        assert_eq!(groups[0].times, vec![date(2, 1), date(2, 2)]);
        assert_eq!(groups[1].key.month(), 1);
        assert_eq!(groups[2].key.lon(), 2.0);
    }

    #[test]
    fn pairs_grouped_with_both_sides() {
        let pairs = vec![
            PairedRow {
                time: date(7, 1),
                lat: 22.5,
                lon: 75.5,
                modeled: 1.0,
                observed: 2.0,
            },
            PairedRow {
                time: date(7, 2),
                lat: 22.5,
                lon: 75.5,
                modeled: 3.0,
                observed: f64::NAN,
            },
        ];
        let groups = group_pairs(&pairs).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key.month(), 7);
        assert_eq!(groups[0].modeled, vec![1.0, 3.0]);
        assert!(groups[0].observed[1].is_nan());
    }

    #[test]
    fn reassembly_orders_by_time_lat_lon() {
        let a = CorrectedSeries {
            key: CellKey::new(75.0, 20.0, 1).unwrap(),
            times: vec![date(1, 2), date(1, 1)],
            values: vec![2.0, 1.0],
            fitted: true,
        };
        let b = CorrectedSeries {
            key: CellKey::new(70.0, 20.0, 1).unwrap(),
            times: vec![date(1, 1)],
            values: vec![3.0],
            fitted: false,
        };
        let table = reassemble("tas", &[a, b]);
        assert_eq!(
            table.rows(),
            &[
                row(date(1, 1), 20.0, 70.0, 3.0),
                row(date(1, 1), 20.0, 75.0, 1.0),
                row(date(1, 2), 20.0, 75.0, 2.0),
            ]
        );
    }
}
