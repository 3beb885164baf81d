//! The fit table: one fitted correction per `(lon, lat, month)` cell.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::QuantileMapError;
use crate::key::CellKey;
use crate::mapper::QuantileMapper;

/// Paired training values for one cell.
///
/// `observed` and `modeled` are index-aligned; either side may hold `NaN`
/// where a record had no counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSample {
    /// The cell the values belong to.
    pub key: CellKey,
    /// Observed values.
    pub observed: Vec<f64>,
    /// Model values.
    pub modeled: Vec<f64>,
}

/// Fitted corrections keyed by cell.
///
/// Cells whose sample could not support a fit are recorded as skipped and
/// have no entry.
#[derive(Debug, Clone)]
pub struct FitTable<C> {
    fits: HashMap<CellKey, C>,
    skipped: Vec<CellKey>,
    skipped_set: HashSet<CellKey>,
}

impl<C> FitTable<C> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            fits: HashMap::new(),
            skipped: Vec::new(),
            skipped_set: HashSet::new(),
        }
    }

    /// Records the fit outcome for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`QuantileMapError::DuplicateKey`] if `key` was already
    /// recorded, fitted or skipped.
    pub fn insert(&mut self, key: CellKey, fit: Option<C>) -> Result<(), QuantileMapError> {
        if self.fits.contains_key(&key) || self.skipped_set.contains(&key) {
            return Err(QuantileMapError::DuplicateKey {
                key: key.to_string(),
            });
        }
        match fit {
            Some(c) => {
                self.fits.insert(key, c);
            }
            None => {
                self.skipped_set.insert(key);
                self.skipped.push(key);
            }
        }
        Ok(())
    }

    /// The correction fitted for `key`, if any.
    pub fn lookup(&self, key: &CellKey) -> Option<&C> {
        self.fits.get(key)
    }

    /// Whether `key` has a fitted correction.
    pub fn contains(&self, key: &CellKey) -> bool {
        self.fits.contains_key(key)
    }

    /// Number of fitted cells.
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    /// Whether no cell was fitted.
    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    /// Cells that were present in the training data but could not be fitted,
    /// in insertion order.
    pub fn skipped(&self) -> &[CellKey] {
        &self.skipped
    }
}

impl<C> Default for FitTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fits every cell of `samples` independently.
///
/// Cells are fitted in parallel; a cell's result depends only on its own
/// sample.
///
/// # Errors
///
/// Returns [`QuantileMapError::DuplicateKey`] if two samples share a key.
pub fn build_fit_table<M: QuantileMapper>(
    mapper: &M,
    samples: &[CellSample],
) -> Result<FitTable<M::Correction>, QuantileMapError> {
    let fits: Vec<Option<M::Correction>> = samples
        .par_iter()
        .map(|s| mapper.fit(&s.observed, &s.modeled))
        .collect();

    let mut table = FitTable::new();
    for (sample, fit) in samples.iter().zip(fits) {
        if fit.is_none() {
            debug!(cell = %sample.key, n = sample.observed.len(), "cell not fitted");
        }
        table.insert(sample.key, fit)?;
    }

    info!(
        cells = samples.len(),
        fitted = table.len(),
        skipped = table.skipped().len(),
        "fit table built"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QmConfig;
    use crate::mapper::StandardMapper;

    fn key(lon: f64, lat: f64, month: u8) -> CellKey {
        CellKey::new(lon, lat, month).unwrap()
    }

    fn ramp(n: usize, offset: f64) -> Vec<f64> {
        (0..n).map(|i| offset + i as f64).collect()
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut table: FitTable<u8> = FitTable::new();
        table.insert(key(1.0, 2.0, 3), Some(1)).unwrap();
        let err = table.insert(key(1.0, 2.0, 3), Some(2)).unwrap_err();
        assert!(matches!(err, QuantileMapError::DuplicateKey { .. }));
        assert_eq!(table.lookup(&key(1.0, 2.0, 3)), Some(&1));
    }

    #[test]
    fn duplicate_skipped_rejected() {
        let mut table: FitTable<u8> = FitTable::new();
        table.insert(key(1.0, 2.0, 3), None).unwrap();
        assert!(table.insert(key(1.0, 2.0, 3), Some(1)).is_err());
    }

    #[test]
    fn build_records_fitted_and_skipped() {
        let mapper = StandardMapper::new(QmConfig::new()).unwrap();
        let samples = vec![
            CellSample {
                key: key(75.5, 22.5, 7),
                observed: ramp(40, 2.0),
                modeled: ramp(40, 0.0),
            },
            CellSample {
                key: key(75.5, 22.5, 8),
                observed: ramp(3, 0.0),
                modeled: ramp(3, 0.0),
            },
        ];
        let table = build_fit_table(&mapper, &samples).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains(&key(75.5, 22.5, 7)));
        assert_eq!(table.skipped(), &[key(75.5, 22.5, 8)]);
    }

    #[test]
    fn build_rejects_duplicate_samples() {
        let mapper = StandardMapper::new(QmConfig::new()).unwrap();
        let sample = CellSample {
            key: key(0.0, 0.0, 1),
            observed: ramp(20, 0.0),
            modeled: ramp(20, 0.0),
        };
        let err = build_fit_table(&mapper, &[sample.clone(), sample]).unwrap_err();
        assert!(matches!(err, QuantileMapError::DuplicateKey { .. }));
    }

    #[test]
    fn many_skipped_cells_keep_order() {
        // Land-only observations: every ocean cell pairs with NaN.
        let mapper = StandardMapper::new(QmConfig::new()).unwrap();
        let samples: Vec<CellSample> = (0..100)
            .flat_map(|i| (0..100).map(move |j| (i, j)))
            .flat_map(|(i, j)| {
                let (lon, lat) = (60.0 + i as f64 * 0.25, 5.0 + j as f64 * 0.25);
                (1..=6).map(move |m| key(lon, lat, m))
            })
            .map(|key| CellSample {
                key,
                observed: vec![f64::NAN; 30],
                modeled: ramp(30, 0.0),
            })
            .collect();

        let table = build_fit_table(&mapper, &samples).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.skipped().len(), 60_000);
        assert!(table.skipped().iter().zip(&samples).all(|(k, s)| *k == s.key));

        let mut table = table;
        let err = table.insert(samples[59_999].key, None).unwrap_err();
        assert!(matches!(err, QuantileMapError::DuplicateKey { .. }));
    }
}
