//! Gamma fits of wet-day samples.

use statrs::distribution::{ContinuousCDF, Gamma};

/// Variance below which a sample is treated as constant.
const MIN_VARIANCE: f64 = 1e-10;

/// A Gamma distribution fitted to one side of a cell's wet values.
///
/// Parameters come from the method of moments: `shape = mean² / var` and
/// `scale = var / mean`.
#[derive(Debug, Clone, Copy)]
pub struct WetGamma {
    shape: f64,
    scale: f64,
    dist: Gamma,
}

impl WetGamma {
    /// Fits a sample of strictly wet values.
    ///
    /// Returns `None` for fewer than 3 distinct values, a near-constant
    /// sample, or a non-positive mean.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let sorted = gcmqm_stats::sorted_finite(values);
        if distinct(&sorted) < 3 {
            return None;
        }
        let mean = gcmqm_stats::mean(&sorted);
        let var = gcmqm_stats::variance(&sorted);
        if mean <= 0.0 || var <= MIN_VARIANCE {
            return None;
        }
        Self::from_shape_scale(mean * mean / var, var / mean)
    }

    /// Builds the distribution directly; `None` unless both parameters are
    /// finite and positive.
    pub fn from_shape_scale(shape: f64, scale: f64) -> Option<Self> {
        if !(shape.is_finite() && shape > 0.0 && scale.is_finite() && scale > 0.0) {
            return None;
        }
        // statrs takes (shape, rate).
        let dist = Gamma::new(shape, scale.recip()).ok()?;
        Some(Self { shape, scale, dist })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn mean(&self) -> f64 {
        self.shape * self.scale
    }

    pub(crate) fn cdf(&self, x: f64) -> f64 {
        self.dist.cdf(x)
    }

    pub(crate) fn quantile(&self, p: f64) -> f64 {
        self.dist.inverse_cdf(p)
    }
}

impl PartialEq for WetGamma {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.scale == other.scale
    }
}

fn distinct(sorted: &[f64]) -> usize {
    match sorted.first() {
        None => 0,
        Some(_) => 1 + sorted.windows(2).filter(|w| w[1] - w[0] > MIN_VARIANCE).count(),
    }
}
