//! Empirical quantile transform: model quantiles mapped to observed quantiles.

use gcmqm_stats::quantile_type7;

use crate::config::Extrapolation;

/// Piecewise-linear map through paired quantile knots.
///
/// `model` is strictly increasing; `observed[i]` is the target for
/// `model[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalMap {
    model: Vec<f64>,
    observed: Vec<f64>,
}

impl EmpiricalMap {
    /// Builds knots at probabilities `0, qstep, …, 1` from sorted samples.
    ///
    /// Model knots that tie are merged and their observed targets averaged.
    /// Returns `None` if either sample is empty or all model knots coincide.
    pub(crate) fn fit(sorted_obs: &[f64], sorted_mod: &[f64], qstep: f64) -> Option<Self> {
        if sorted_obs.is_empty() || sorted_mod.is_empty() {
            return None;
        }

        let probs = probabilities(qstep);
        let mut model: Vec<f64> = Vec::with_capacity(probs.len());
        let mut observed: Vec<f64> = Vec::with_capacity(probs.len());
        let mut tie_count = 0usize;

        for p in probs {
            let m = quantile_type7(sorted_mod, p);
            let o = quantile_type7(sorted_obs, p);

            match model.last() {
                Some(&last) if last == m => {
                    // Running mean over the tied block.
                    tie_count += 1;
                    let prev = observed.last_mut()?;
                    *prev += (o - *prev) / tie_count as f64;
                }
                _ => {
                    model.push(m);
                    observed.push(o);
                    tie_count = 1;
                }
            }
        }

        if model.len() < 2 {
            return None;
        }
        Some(Self { model, observed })
    }

    /// Model-side knots.
    pub fn model_knots(&self) -> &[f64] {
        &self.model
    }

    /// Observed-side knots.
    pub fn observed_knots(&self) -> &[f64] {
        &self.observed
    }

    /// Maps one value.
    pub(crate) fn map(&self, x: f64, extrapolation: Extrapolation) -> f64 {
        let n = self.model.len();
        let (first_m, last_m) = (self.model[0], self.model[n - 1]);
        let (first_o, last_o) = (self.observed[0], self.observed[n - 1]);

        if x < first_m {
            return match extrapolation {
                Extrapolation::Constant => x + (first_o - first_m),
                Extrapolation::Clamp => first_o,
            };
        }
        if x > last_m {
            return match extrapolation {
                Extrapolation::Constant => x + (last_o - last_m),
                Extrapolation::Clamp => last_o,
            };
        }

        let hi = self.model.partition_point(|&k| k <= x);
        if hi >= n {
            return last_o;
        }
        let lo = hi - 1;
        let t = (x - self.model[lo]) / (self.model[hi] - self.model[lo]);
        self.observed[lo] + t * (self.observed[hi] - self.observed[lo])
    }
}

/// Knot probabilities `0, qstep, 2·qstep, …` below 1, then exactly 1.
fn probabilities(qstep: f64) -> Vec<f64> {
    let mut probs: Vec<f64> = (0..)
        .map(|k| k as f64 * qstep)
        .take_while(|&p| p < 1.0 - 1e-9)
        .collect();
    probs.push(1.0);
    probs
}
