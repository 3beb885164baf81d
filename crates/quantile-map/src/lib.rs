//! Per-cell quantile mapping of model output onto observations.
//!
//! A correction is fitted independently for every `(lon, lat, month)` cell
//! from paired observed/model values over the historical period, then applied
//! to model series of any experiment.
//!
//! # Pipeline
//!
//! 1. **Fit** one [`FittedCorrection`] per [`CellKey`] into a [`FitTable`]
//! 2. **Apply** the table to [`CellSeries`]: cells without a fit use the
//!    configured [`Fallback`]
//!
//! With a wet-day threshold, the model dry-day frequency is matched to the
//! observed one before the wet values are mapped.
//!
//! # Glossary
//!
//! - **qstep**: probability spacing of empirical quantile knots
//! - **MME**: Method of Moments Estimation (shape = mean²/var, scale = var/mean)
//! - **p_dry**: fraction of observed values at or below the wet-day threshold
//!
//! # Quick Start
//!
//! ```
//! use gcmqm_quantile_map::{
//!     CellKey, CellSample, CellSeries, QmConfig, StandardMapper, apply_all, build_fit_table,
//! };
//!
//! let key = CellKey::new(75.5, 22.5, 7).unwrap();
//! let sample = CellSample {
//!     key,
//!     observed: (0..50).map(|i| 2.0 + i as f64).collect(),
//!     modeled: (0..50).map(|i| i as f64).collect(),
//! };
//!
//! let mapper = StandardMapper::new(QmConfig::new()).unwrap();
//! let table = build_fit_table(&mapper, &[sample]).unwrap();
//!
//! let series = CellSeries {
//!     key,
//!     times: vec![chrono::NaiveDate::from_ymd_opt(2050, 7, 1).unwrap()],
//!     values: vec![10.0],
//! };
//! let out = apply_all(&mapper, &table, &[series]);
//! assert!((out[0].values[0] - 12.0).abs() < 1e-9);
//! ```

mod apply;
mod config;
mod correction;
mod empirical;
mod error;
mod gamma;
mod key;
mod mapper;
mod table;

pub use apply::{CellSeries, CorrectedSeries, apply_all, apply_cell};
pub use config::{Extrapolation, Fallback, FitMethod, QmConfig};
pub use correction::{FittedCorrection, Transform, WetDay};
pub use empirical::EmpiricalMap;
pub use error::QuantileMapError;
pub use gamma::WetGamma;
pub use key::CellKey;
pub use mapper::{QuantileMapper, StandardMapper};
pub use table::{CellSample, FitTable, build_fit_table};
