//! Where the pipeline reads its inputs and puts its outputs.

use std::collections::HashMap;

use gcmqm_grid::{GridError, GridSource, Gridded, MemorySource};

/// The kind and identity of a file the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output<'a> {
    /// Subset observations under the model variable name.
    Observed {
        /// Output variable name.
        variable: &'a str,
    },
    /// Subset, adjusted model data before correction.
    Raw {
        /// Output variable name.
        variable: &'a str,
        /// GCM name.
        gcm: &'a str,
        /// Experiment name.
        experiment: &'a str,
    },
    /// Bias-corrected model data.
    Corrected {
        /// Output variable name.
        variable: &'a str,
        /// GCM name.
        gcm: &'a str,
        /// Experiment name.
        experiment: &'a str,
    },
}

/// Storage backend for a run.
///
/// Sources are only opened when the pipeline loads from them.
pub trait DataStore {
    /// Source type returned for inputs.
    type Source: GridSource;

    /// The observation input holding `obs_name`.
    fn observations(&self, obs_name: &str) -> Self::Source;

    /// The model input of `variable` for one GCM and experiment.
    fn model(&self, variable: &str, gcm: &str, experiment: &str) -> Self::Source;

    /// Persists one output grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the grid cannot be written.
    fn write(&mut self, output: Output<'_>, gridded: &Gridded) -> Result<(), GridError>;
}

/// Owned form of [`Output`], used as a map key by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputKey {
    /// See [`Output::Observed`].
    Observed(String),
    /// See [`Output::Raw`]: `(variable, gcm, experiment)`.
    Raw(String, String, String),
    /// See [`Output::Corrected`]: `(variable, gcm, experiment)`.
    Corrected(String, String, String),
}

impl From<Output<'_>> for OutputKey {
    fn from(output: Output<'_>) -> Self {
        match output {
            Output::Observed { variable } => Self::Observed(variable.to_string()),
            Output::Raw {
                variable,
                gcm,
                experiment,
            } => Self::Raw(variable.into(), gcm.into(), experiment.into()),
            Output::Corrected {
                variable,
                gcm,
                experiment,
            } => Self::Corrected(variable.into(), gcm.into(), experiment.into()),
        }
    }
}

/// A [`DataStore`] held entirely in memory.
///
/// Observation variables live in one source; each `(gcm, experiment)` model
/// input is its own source. Unregistered inputs resolve to an empty source,
/// so loading from them fails with a missing-variable error.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    observations: MemorySource,
    models: HashMap<(String, String), MemorySource>,
    outputs: HashMap<OutputKey, Gridded>,
    write_order: Vec<OutputKey>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the observation source.
    pub fn with_observations(mut self, source: MemorySource) -> Self {
        self.observations = source;
        self
    }

    /// Sets the model source for a GCM and experiment.
    pub fn with_model(
        mut self,
        gcm: impl Into<String>,
        experiment: impl Into<String>,
        source: MemorySource,
    ) -> Self {
        self.models.insert((gcm.into(), experiment.into()), source);
        self
    }

    /// A written output, if any.
    pub fn output(&self, key: &OutputKey) -> Option<&Gridded> {
        self.outputs.get(key)
    }

    /// Keys of all writes, in write order.
    pub fn write_order(&self) -> &[OutputKey] {
        &self.write_order
    }
}

impl DataStore for MemoryStore {
    type Source = MemorySource;

    fn observations(&self, _obs_name: &str) -> MemorySource {
        self.observations.clone()
    }

    fn model(&self, _variable: &str, gcm: &str, experiment: &str) -> MemorySource {
        self.models
            .get(&(gcm.to_string(), experiment.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn write(&mut self, output: Output<'_>, gridded: &Gridded) -> Result<(), GridError> {
        let key = OutputKey::from(output);
        self.write_order.push(key.clone());
        self.outputs.insert(key, gridded.clone());
        Ok(())
    }
}
