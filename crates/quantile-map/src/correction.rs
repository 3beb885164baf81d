//! Fitted per-cell corrections and their application to value series.

use tracing::trace;

use crate::config::{FitMethod, QmConfig};
use crate::empirical::EmpiricalMap;
use crate::gamma::WetGamma;

/// Epsilon constant used for clamping CDF probabilities away from 0 and 1.
const EPS: f64 = 1e-12;

/// Wet-day thresholds: observed values at or below `observed` are dry, and
/// modeled values at or below `model` are mapped to dry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WetDay {
    observed: f64,
    model: f64,
}

impl WetDay {
    /// Observed-side threshold.
    pub fn observed(&self) -> f64 {
        self.observed
    }

    /// Model-side threshold matching the observed dry-day frequency.
    pub fn model(&self) -> f64 {
        self.model
    }
}

/// The value transform of a fitted correction.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Empirical quantile knots.
    Empirical(EmpiricalMap),
    /// Model and observed Gamma distributions.
    Gamma {
        /// Distribution of wet modeled values.
        model: WetGamma,
        /// Distribution of wet observed values.
        observed: WetGamma,
    },
    /// The observed record has no wet values: everything maps to dry.
    AllDry,
}

/// A monotonic quantile transform fitted for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCorrection {
    wet_day: Option<WetDay>,
    transform: Transform,
}

impl FittedCorrection {
    /// Fits a correction from complete pairs (no NaN on either side).
    ///
    /// Returns `None` when the data cannot support a transform: too few wet
    /// values, a constant model sample, or a failed Gamma fit.
    pub(crate) fn fit(observed: &[f64], modeled: &[f64], config: &QmConfig) -> Option<Self> {
        let sorted_obs = gcmqm_stats::sorted_finite(observed);
        let sorted_mod = gcmqm_stats::sorted_finite(modeled);
        if sorted_obs.is_empty() || sorted_mod.is_empty() {
            return None;
        }

        let (wet_day, obs_sample, mod_sample) = match config.wet_day_threshold() {
            Some(threshold) => {
                let n_dry = sorted_obs.iter().filter(|&&v| v <= threshold).count();
                let p_dry = n_dry as f64 / sorted_obs.len() as f64;
                let model_threshold = if n_dry == 0 {
                    f64::NEG_INFINITY
                } else {
                    gcmqm_stats::quantile_type7(&sorted_mod, p_dry)
                };
                let wet = WetDay {
                    observed: threshold,
                    model: model_threshold,
                };
                if n_dry == sorted_obs.len() {
                    return Some(Self {
                        wet_day: Some(wet),
                        transform: Transform::AllDry,
                    });
                }
                let obs_wet: Vec<f64> = sorted_obs
                    .into_iter()
                    .filter(|&v| v > threshold)
                    .collect();
                let mod_wet: Vec<f64> = sorted_mod
                    .into_iter()
                    .filter(|&v| v > model_threshold)
                    .collect();
                (Some(wet), obs_wet, mod_wet)
            }
            None => (None, sorted_obs, sorted_mod),
        };

        if obs_sample.len() < 2 || mod_sample.len() < 2 {
            trace!(
                n_obs = obs_sample.len(),
                n_mod = mod_sample.len(),
                "too few values for a transform"
            );
            return None;
        }

        let transform = match config.method() {
            FitMethod::Empirical => {
                Transform::Empirical(EmpiricalMap::fit(&obs_sample, &mod_sample, config.qstep())?)
            }
            FitMethod::Gamma => Transform::Gamma {
                model: WetGamma::fit(&mod_sample)?,
                observed: WetGamma::fit(&obs_sample)?,
            },
        };

        Some(Self { wet_day, transform })
    }

    /// Wet-day thresholds, if wet-day handling was configured.
    pub fn wet_day(&self) -> Option<WetDay> {
        self.wet_day
    }

    /// The fitted transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Maps every value of `values`; NaN inputs stay NaN.
    pub(crate) fn apply(&self, values: &[f64], config: &QmConfig) -> Vec<f64> {
        values
            .iter()
            .map(|&x| {
                if x.is_nan() {
                    return x;
                }
                if let Some(wet) = self.wet_day
                    && x <= wet.model
                {
                    return 0.0;
                }

                let mapped = match &self.transform {
                    Transform::Empirical(map) => map.map(x, config.extrapolation()),
                    Transform::Gamma { model, observed } => {
                        observed.quantile(model.cdf(x).clamp(EPS, 1.0 - EPS))
                    }
                    Transform::AllDry => 0.0,
                };

                if !mapped.is_finite() {
                    x
                } else if self.wet_day.is_some() && mapped < 0.0 {
                    0.0
                } else {
                    mapped
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Extrapolation;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Gamma as GammaDist};

    fn sample_gamma(shape: f64, scale: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let dist = GammaDist::new(shape, scale).unwrap();
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    #[test]
    fn empirical_without_wet_days_shifts() {
        let obs: Vec<f64> = (0..100).map(|i| 20.0 + i as f64 * 0.1).collect();
        let modl: Vec<f64> = (0..100).map(|i| 17.0 + i as f64 * 0.1).collect();
        let fit = FittedCorrection::fit(&obs, &modl, &QmConfig::new()).unwrap();
        assert!(fit.wet_day().is_none());
        let out = fit.apply(&[18.0, 30.0], &QmConfig::new());
        assert_relative_eq!(out[0], 21.0, epsilon = 1e-9);
        // Beyond the top knot: constant shift of +3.
        assert_relative_eq!(out[1], 33.0, epsilon = 1e-9);
    }

    #[test]
    fn wet_day_frequency_is_matched() {
        // Observed: 40% dry. Model: drizzles everywhere (never exactly 0).
        let mut obs = vec![0.0; 40];
        obs.extend((1..=60).map(|i| i as f64));
        let modl: Vec<f64> = (0..100).map(|i| 0.05 + i as f64 * 0.5).collect();
        let config = QmConfig::new().with_wet_day_threshold(Some(0.0));

        let fit = FittedCorrection::fit(&obs, &modl, &config).unwrap();
        let wet = fit.wet_day().unwrap();
        assert_relative_eq!(wet.observed(), 0.0);
        assert!(wet.model() > 0.05);

        let out = fit.apply(&modl, &config);
        let n_dry = out.iter().filter(|&&v| v == 0.0).count();
        assert_eq!(n_dry, 40);
        assert!(out.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn all_dry_observations_map_to_zero() {
        let obs = vec![0.0; 30];
        let modl: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let config = QmConfig::new().with_wet_day_threshold(Some(0.1));
        let fit = FittedCorrection::fit(&obs, &modl, &config).unwrap();
        assert_eq!(fit.transform(), &Transform::AllDry);
        assert!(fit.apply(&[0.0, 5.0, 100.0], &config).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn gamma_method_moves_mean_toward_observed() {
        let obs = sample_gamma(2.0, 4.0, 600, 1); // mean 8
        let modl = sample_gamma(2.0, 2.0, 600, 2); // mean 4
        let config = QmConfig::new()
            .with_method(FitMethod::Gamma)
            .with_wet_day_threshold(Some(0.0));
        let fit = FittedCorrection::fit(&obs, &modl, &config).unwrap();
        assert!(matches!(fit.transform(), Transform::Gamma { .. }));

        let out = fit.apply(&modl, &config);
        let mean_out = gcmqm_stats::mean(&out);
        assert_relative_eq!(mean_out, 8.0, epsilon = 8.0 * 0.15);
    }

    #[test]
    fn nan_passes_through() {
        let obs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let fit = FittedCorrection::fit(&obs, &obs, &QmConfig::new()).unwrap();
        let out = fit.apply(&[f64::NAN, 10.0], &QmConfig::new());
        assert!(out[0].is_nan());
        assert_relative_eq!(out[1], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn clamp_extrapolation_respected() {
        let obs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let modl: Vec<f64> = (0..50).map(|i| i as f64 * 2.0).collect();
        let config = QmConfig::new().with_extrapolation(Extrapolation::Clamp);
        let fit = FittedCorrection::fit(&obs, &modl, &config).unwrap();
        let out = fit.apply(&[500.0], &config);
        assert_relative_eq!(out[0], 49.0, epsilon = 1e-9);
    }

    #[test]
    fn too_few_wet_values_is_not_fittable() {
        let mut obs = vec![0.0; 20];
        obs[0] = 3.0;
        let modl: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let config = QmConfig::new().with_wet_day_threshold(Some(0.0));
        assert!(FittedCorrection::fit(&obs, &modl, &config).is_none());
    }
}
