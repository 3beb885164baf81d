//! Error types for gcmqm-pipeline.

use gcmqm_grid::GridError;
use gcmqm_quantile_map::QuantileMapError;

/// Error type for all fallible operations in the gcmqm-pipeline crate.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Wraps a read, conversion or write failure.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Wraps a quantile-mapping failure.
    #[error(transparent)]
    QuantileMap(#[from] QuantileMapError),

    /// Returned when a run plan is inconsistent.
    #[error("invalid run plan: {reason}")]
    InvalidPlan {
        /// Description of the problem.
        reason: String,
    },

    /// Returned under strict alignment when no model row of the historical
    /// experiment found an observation.
    #[error("no observation matched any '{experiment}' row of {gcm} for variable '{variable}'")]
    NoPairs {
        /// Variable being corrected.
        variable: String,
        /// GCM being corrected.
        gcm: String,
        /// Historical experiment name.
        experiment: String,
    },
}
