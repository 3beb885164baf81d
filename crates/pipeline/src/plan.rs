//! The run plan: what to correct, where and over which periods.

use std::collections::HashSet;

use chrono::NaiveDate;
use gcmqm_grid::{Bounds, DateBounds, VariableDescriptor, lookup_metadata};
use gcmqm_quantile_map::QmConfig;

use crate::error::PipelineError;

/// Name of the historical experiment unless configured otherwise.
pub const DEFAULT_HISTORICAL: &str = "hist";

/// A variable to correct.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    descriptor: VariableDescriptor,
    obs_name: String,
    qm: QmConfig,
}

impl VariableSpec {
    /// Creates a variable entry.
    ///
    /// `obs_name` is the name of the matching variable in the observation
    /// file; `qm` configures its quantile mapping.
    pub fn new(descriptor: VariableDescriptor, obs_name: impl Into<String>, qm: QmConfig) -> Self {
        Self {
            descriptor,
            obs_name: obs_name.into(),
            qm,
        }
    }

    /// Model/output variable name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Model variable with its load-time adjustment.
    pub fn descriptor(&self) -> &VariableDescriptor {
        &self.descriptor
    }

    /// Observation variable name.
    pub fn obs_name(&self) -> &str {
        &self.obs_name
    }

    /// Quantile-mapping configuration.
    pub fn qm(&self) -> &QmConfig {
        &self.qm
    }
}

/// A GCM and its per-model handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcmSpec {
    name: String,
    collapse_duplicates: bool,
}

impl GcmSpec {
    /// Creates a GCM entry without duplicate collapsing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collapse_duplicates: false,
        }
    }

    /// Averages rows sharing `(lon, lat, time)` after loading.
    pub fn with_collapse_duplicates(mut self, collapse: bool) -> Self {
        self.collapse_duplicates = collapse;
        self
    }

    /// GCM name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether duplicate rows are averaged.
    pub fn collapse_duplicates(&self) -> bool {
        self.collapse_duplicates
    }
}

/// An experiment and its time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentSpec {
    name: String,
    time_bounds: DateBounds,
}

impl ExperimentSpec {
    /// Creates an experiment entry.
    pub fn new(name: impl Into<String>, time_bounds: DateBounds) -> Self {
        Self {
            name: name.into(),
            time_bounds,
        }
    }

    /// Experiment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inclusive time window loaded for this experiment.
    pub fn time_bounds(&self) -> DateBounds {
        self.time_bounds
    }
}

/// Everything a run needs besides the data store and the mapper.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use gcmqm_grid::{Bounds, DateBounds, VariableDescriptor};
/// use gcmqm_pipeline::{ExperimentSpec, GcmSpec, RunPlan, VariableSpec};
/// use gcmqm_quantile_map::QmConfig;
///
/// let window = |a, b| {
///     DateBounds::new(
///         NaiveDate::from_ymd_opt(a, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(b, 12, 31).unwrap(),
///     )
///     .unwrap()
/// };
/// let plan = RunPlan::new(
///     Bounds::new(60.0, 100.0).unwrap(),
///     Bounds::new(5.0, 40.0).unwrap(),
///     vec![VariableSpec::new(VariableDescriptor::new("tas"), "tave", QmConfig::new())],
///     vec![GcmSpec::new("CCSM4")],
///     vec![
///         ExperimentSpec::new("hist", window(1971, 2005)),
///         ExperimentSpec::new("rcp85", window(2006, 2100)),
///     ],
/// );
/// assert!(plan.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    lon_bounds: Bounds,
    lat_bounds: Bounds,
    variables: Vec<VariableSpec>,
    gcms: Vec<GcmSpec>,
    experiments: Vec<ExperimentSpec>,
    historical: String,
    obs_time_bounds: DateBounds,
    strict_alignment: bool,
}

impl RunPlan {
    /// Creates a plan with the default historical name (`hist`), the
    /// default observation window (1971-01-01 to 2000-12-31) and lenient
    /// alignment.
    pub fn new(
        lon_bounds: Bounds,
        lat_bounds: Bounds,
        variables: Vec<VariableSpec>,
        gcms: Vec<GcmSpec>,
        experiments: Vec<ExperimentSpec>,
    ) -> Self {
        Self {
            lon_bounds,
            lat_bounds,
            variables,
            gcms,
            experiments,
            historical: DEFAULT_HISTORICAL.to_string(),
            obs_time_bounds: default_obs_time_bounds(),
            strict_alignment: false,
        }
    }

    /// Sets the name of the historical experiment.
    pub fn with_historical(mut self, name: impl Into<String>) -> Self {
        self.historical = name.into();
        self
    }

    /// Sets the observation window.
    pub fn with_obs_time_bounds(mut self, bounds: DateBounds) -> Self {
        self.obs_time_bounds = bounds;
        self
    }

    /// Fails the run when the historical experiment pairs with no
    /// observation, instead of warning.
    pub fn with_strict_alignment(mut self, strict: bool) -> Self {
        self.strict_alignment = strict;
        self
    }

    pub fn lon_bounds(&self) -> Bounds {
        self.lon_bounds
    }

    pub fn lat_bounds(&self) -> Bounds {
        self.lat_bounds
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    pub fn gcms(&self) -> &[GcmSpec] {
        &self.gcms
    }

    pub fn experiments(&self) -> &[ExperimentSpec] {
        &self.experiments
    }

    pub fn historical(&self) -> &str {
        &self.historical
    }

    pub fn obs_time_bounds(&self) -> DateBounds {
        self.obs_time_bounds
    }

    pub fn strict_alignment(&self) -> bool {
        self.strict_alignment
    }

    /// Whether `experiment` is the calibration experiment.
    pub fn is_historical(&self, experiment: &ExperimentSpec) -> bool {
        experiment.name() == self.historical
    }

    /// Checks that the plan can run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPlan`] if any list is empty, a name
    /// repeats within a list, there is not exactly one historical experiment,
    /// or a variable has no output metadata. Quantile-mapping options are
    /// checked through [`QmConfig::validate`].
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |reason: String| Err(PipelineError::InvalidPlan { reason });

        if self.variables.is_empty() {
            return invalid("no variables configured".to_string());
        }
        if self.gcms.is_empty() {
            return invalid("no GCMs configured".to_string());
        }
        if self.experiments.is_empty() {
            return invalid("no experiments configured".to_string());
        }

        if let Some(name) = first_repeat(self.variables.iter().map(VariableSpec::name)) {
            return invalid(format!("variable '{name}' listed more than once"));
        }
        if let Some(name) = first_repeat(self.gcms.iter().map(GcmSpec::name)) {
            return invalid(format!("GCM '{name}' listed more than once"));
        }
        if let Some(name) = first_repeat(self.experiments.iter().map(ExperimentSpec::name)) {
            return invalid(format!("experiment '{name}' listed more than once"));
        }
        if !self.experiments.iter().any(|e| self.is_historical(e)) {
            return invalid(format!(
                "no experiment named '{}' to calibrate against",
                self.historical
            ));
        }

        for v in &self.variables {
            if lookup_metadata(v.name()).is_err() {
                return invalid(format!("no output metadata for variable '{}'", v.name()));
            }
            v.qm().validate()?;
        }
        Ok(())
    }
}

fn default_obs_time_bounds() -> DateBounds {
    let start = NaiveDate::from_ymd_opt(1971, 1, 1).expect("valid date");
    let end = NaiveDate::from_ymd_opt(2000, 12, 31).expect("valid date");
    DateBounds::new(start, end).expect("1971 precedes 2000")
}

fn first_repeat<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names.into_iter().find(|n| !seen.insert(*n))
}
