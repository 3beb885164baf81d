//! Application of a fit table to model series.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::info;

use crate::key::CellKey;
use crate::mapper::QuantileMapper;
use crate::table::FitTable;

/// Model values for one cell, in time order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSeries {
    /// The cell the series belongs to.
    pub key: CellKey,
    /// Record dates, index-aligned with `values`.
    pub times: Vec<NaiveDate>,
    /// Model values.
    pub values: Vec<f64>,
}

/// A corrected series; `times` is carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedSeries {
    /// The cell the series belongs to.
    pub key: CellKey,
    /// Record dates, identical to the input series.
    pub times: Vec<NaiveDate>,
    /// Corrected values.
    pub values: Vec<f64>,
    /// Whether a fitted correction was found for the cell.
    pub fitted: bool,
}

/// Corrects one series with the entry for its cell, or the fallback.
pub fn apply_cell<M: QuantileMapper>(
    mapper: &M,
    table: &FitTable<M::Correction>,
    series: &CellSeries,
) -> CorrectedSeries {
    let correction = table.lookup(&series.key);
    CorrectedSeries {
        key: series.key,
        times: series.times.clone(),
        values: mapper.apply(&series.values, correction),
        fitted: correction.is_some(),
    }
}

/// Corrects every series in parallel; output order matches input order.
pub fn apply_all<M: QuantileMapper>(
    mapper: &M,
    table: &FitTable<M::Correction>,
    series: &[CellSeries],
) -> Vec<CorrectedSeries> {
    let out: Vec<CorrectedSeries> = series
        .par_iter()
        .map(|s| apply_cell(mapper, table, s))
        .collect();
    let fallback = out.iter().filter(|c| !c.fitted).count();
    info!(cells = out.len(), fallback, "corrections applied");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QmConfig;
    use crate::mapper::StandardMapper;
    use crate::table::{CellSample, build_fit_table};
    use approx::assert_relative_eq;

    #[test]
    fn unfitted_cell_uses_identity() {
        let mapper = StandardMapper::new(QmConfig::new()).unwrap();
        let table = FitTable::new();
        let series = CellSeries {
            key: CellKey::new(10.0, 20.0, 1).unwrap(),
            times: vec![NaiveDate::from_ymd_opt(2050, 1, 3).unwrap()],
            values: vec![4.2],
        };
        let out = apply_cell(&mapper, &table, &series);
        assert!(!out.fitted);
        assert_eq!(out.values, vec![4.2]);
        assert_eq!(out.times, series.times);
    }

    #[test]
    fn order_preserved() {
        let mapper = StandardMapper::new(QmConfig::new()).unwrap();
        let key = CellKey::new(1.0, 1.0, 2).unwrap();
        let sample = CellSample {
            key,
            observed: (0..30).map(|i| i as f64 + 1.0).collect(),
            modeled: (0..30).map(|i| i as f64).collect(),
        };
        let table = build_fit_table(&mapper, &[sample]).unwrap();

        let date = NaiveDate::from_ymd_opt(2000, 2, 1).unwrap();
        let series: Vec<CellSeries> = (0..8)
            .map(|i| CellSeries {
                key: CellKey::new(1.0 + (i % 2) as f64, 1.0, 2).unwrap(),
                times: vec![date],
                values: vec![i as f64],
            })
            .collect();
        let out = apply_all(&mapper, &table, &series);
        for (i, c) in out.iter().enumerate() {
            assert_eq!(c.key, series[i].key);
            if i % 2 == 0 {
                assert!(c.fitted);
                assert_relative_eq!(c.values[0], i as f64 + 1.0, epsilon = 1e-9);
            } else {
                assert!(!c.fitted);
                assert_relative_eq!(c.values[0], i as f64);
            }
        }
    }
}
