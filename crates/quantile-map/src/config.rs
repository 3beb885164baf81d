//! Configuration for quantile mapping.

use crate::error::QuantileMapError;

/// Distribution model used to fit the per-cell transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMethod {
    /// Empirical quantiles joined by linear interpolation.
    #[default]
    Empirical,
    /// Gamma-to-Gamma mapping with method-of-moments fits (wet days only).
    Gamma,
}

/// Behaviour of the empirical transform outside the fitted model range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Shift by the correction found at the nearest end quantile.
    #[default]
    Constant,
    /// Return the nearest end observed quantile.
    Clamp,
}

/// What the applier does for a cell with no fitted correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Pass the model values through unchanged.
    #[default]
    Identity,
    /// Emit `NaN` for every value.
    Missing,
}

impl Fallback {
    /// Applies the fallback to `values`.
    pub fn apply(self, values: &[f64]) -> Vec<f64> {
        match self {
            Self::Identity => values.to_vec(),
            Self::Missing => vec![f64::NAN; values.len()],
        }
    }
}

/// Configuration for quantile-mapping fitting and application.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use gcmqm_quantile_map::{FitMethod, QmConfig};
///
/// let config = QmConfig::new()
///     .with_method(FitMethod::Gamma)
///     .with_wet_day_threshold(Some(0.1))
///     .with_min_pairs(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct QmConfig {
    method: FitMethod,
    qstep: f64,
    min_pairs: usize,
    wet_day_threshold: Option<f64>,
    extrapolation: Extrapolation,
    fallback: Fallback,
}

impl QmConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `method = Empirical`, `qstep = 0.01`, `min_pairs = 10`,
    /// `wet_day_threshold = None`, `extrapolation = Constant`,
    /// `fallback = Identity`.
    pub fn new() -> Self {
        Self {
            method: FitMethod::Empirical,
            qstep: 0.01,
            min_pairs: 10,
            wet_day_threshold: None,
            extrapolation: Extrapolation::Constant,
            fallback: Fallback::Identity,
        }
    }

    // --- Builder methods ---

    /// Sets the fitting method.
    pub fn with_method(mut self, m: FitMethod) -> Self {
        self.method = m;
        self
    }

    /// Sets the probability step between empirical quantile knots.
    pub fn with_qstep(mut self, q: f64) -> Self {
        self.qstep = q;
        self
    }

    /// Sets the minimum number of complete (observed, modeled) pairs.
    pub fn with_min_pairs(mut self, n: usize) -> Self {
        self.min_pairs = n;
        self
    }

    /// Sets the wet-day threshold; `None` disables wet-day handling.
    pub fn with_wet_day_threshold(mut self, t: Option<f64>) -> Self {
        self.wet_day_threshold = t;
        self
    }

    /// Sets the extrapolation rule of the empirical transform.
    pub fn with_extrapolation(mut self, e: Extrapolation) -> Self {
        self.extrapolation = e;
        self
    }

    /// Sets the policy for cells without a fit.
    pub fn with_fallback(mut self, f: Fallback) -> Self {
        self.fallback = f;
        self
    }

    // --- Accessors ---

    /// Returns the fitting method.
    pub fn method(&self) -> FitMethod {
        self.method
    }

    /// Returns the probability step between quantile knots.
    pub fn qstep(&self) -> f64 {
        self.qstep
    }

    /// Returns the minimum number of complete pairs required to fit.
    pub fn min_pairs(&self) -> usize {
        self.min_pairs
    }

    /// Returns the wet-day threshold, if any.
    pub fn wet_day_threshold(&self) -> Option<f64> {
        self.wet_day_threshold
    }

    /// Returns the extrapolation rule.
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Returns the fallback policy.
    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Validates this configuration.
    ///
    /// Checks that `qstep` is finite and in (0, 0.5], `min_pairs` is at
    /// least 2, the wet-day threshold (if set) is finite and non-negative,
    /// and that the Gamma method has a wet-day threshold.
    pub fn validate(&self) -> Result<(), QuantileMapError> {
        if !self.qstep.is_finite() || self.qstep <= 0.0 || self.qstep > 0.5 {
            return Err(QuantileMapError::InvalidConfig {
                reason: format!("qstep must be in (0, 0.5], got {}", self.qstep),
            });
        }

        if self.min_pairs < 2 {
            return Err(QuantileMapError::InvalidConfig {
                reason: format!("min_pairs must be >= 2, got {}", self.min_pairs),
            });
        }

        if let Some(t) = self.wet_day_threshold
            && (!t.is_finite() || t < 0.0)
        {
            return Err(QuantileMapError::InvalidConfig {
                reason: format!("wet_day_threshold must be finite and >= 0, got {t}"),
            });
        }

        if self.method == FitMethod::Gamma && self.wet_day_threshold.is_none() {
            return Err(QuantileMapError::InvalidConfig {
                reason: "gamma method requires a wet_day_threshold".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for QmConfig {
    fn default() -> Self {
        Self::new()
    }
}
