//! The fit/apply seam between the fit table and the distribution mapping.

use crate::config::QmConfig;
use crate::correction::FittedCorrection;
use crate::error::QuantileMapError;

/// A quantile-mapping method: fits a per-cell correction from paired samples
/// and applies it to a model series.
///
/// Implementations must be `Sync` so that fit tables can be built and applied
/// across cells in parallel.
pub trait QuantileMapper: Sync {
    /// The fitted, per-cell state.
    type Correction: Send + Sync;

    /// Fits a correction from index-aligned observed and modeled values.
    ///
    /// Returns `None` when the pair set cannot support a transform.
    fn fit(&self, observed: &[f64], modeled: &[f64]) -> Option<Self::Correction>;

    /// Applies `correction` to `values`, or the fallback when it is `None`.
    fn apply(&self, values: &[f64], correction: Option<&Self::Correction>) -> Vec<f64>;
}

/// Quantile mapper driven by a validated [`QmConfig`].
#[derive(Debug, Clone)]
pub struct StandardMapper {
    config: QmConfig,
}

impl StandardMapper {
    /// Creates a mapper after validating `config`.
    pub fn new(config: QmConfig) -> Result<Self, QuantileMapError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The mapper configuration.
    pub fn config(&self) -> &QmConfig {
        &self.config
    }
}

impl QuantileMapper for StandardMapper {
    type Correction = FittedCorrection;

    fn fit(&self, observed: &[f64], modeled: &[f64]) -> Option<FittedCorrection> {
        // Only complete pairs count towards the fit.
        let (obs, modl): (Vec<f64>, Vec<f64>) = observed
            .iter()
            .zip(modeled)
            .filter(|(o, m)| o.is_finite() && m.is_finite())
            .map(|(&o, &m)| (o, m))
            .unzip();

        if obs.len() < self.config.min_pairs() {
            return None;
        }
        FittedCorrection::fit(&obs, &modl, &self.config)
    }

    fn apply(&self, values: &[f64], correction: Option<&FittedCorrection>) -> Vec<f64> {
        match correction {
            Some(c) => c.apply(values, &self.config),
            None => self.config.fallback().apply(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Fallback;

    #[test]
    fn invalid_config_rejected() {
        let err = StandardMapper::new(QmConfig::new().with_qstep(0.0)).unwrap_err();
        assert!(matches!(err, QuantileMapError::InvalidConfig { .. }));
    }

    #[test]
    fn incomplete_pairs_are_dropped() {
        let mapper = StandardMapper::new(QmConfig::new().with_min_pairs(5)).unwrap();
        let obs = [1.0, f64::NAN, 3.0, 4.0, f64::NAN, 6.0];
        let modl = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0];
        // Only three complete pairs.
        assert!(mapper.fit(&obs, &modl).is_none());
    }

    #[test]
    fn min_pairs_boundary() {
        let obs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mapper = StandardMapper::new(QmConfig::new().with_min_pairs(10)).unwrap();
        assert!(mapper.fit(&obs, &obs).is_some());
        let mapper = StandardMapper::new(QmConfig::new().with_min_pairs(11)).unwrap();
        assert!(mapper.fit(&obs, &obs).is_none());
    }

    #[test]
    fn fallback_when_unfitted() {
        let values = [1.0, 2.0];
        let identity = StandardMapper::new(QmConfig::new()).unwrap();
        assert_eq!(identity.apply(&values, None), values.to_vec());

        let missing =
            StandardMapper::new(QmConfig::new().with_fallback(Fallback::Missing)).unwrap();
        assert!(missing.apply(&values, None).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn mapper_is_send_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<StandardMapper>();
        assert_impl::<FittedCorrection>();
    }
}
