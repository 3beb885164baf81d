//! The variable → GCM → experiment correction loop.

use gcmqm_grid::{GridTable, VariableDescriptor, to_grid, to_table};
use gcmqm_quantile_map::{
    FitTable, QmConfig, QuantileMapError, QuantileMapper, apply_all, build_fit_table,
};
use tracing::{debug, info, info_span, warn};

use crate::error::PipelineError;
use crate::merge::{count_matched, group_pairs, group_series, pair_observations, reassemble};
use crate::plan::{ExperimentSpec, GcmSpec, RunPlan, VariableSpec};
use crate::store::{DataStore, Output};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Output files written (observed, raw and corrected).
    pub files_written: usize,
    /// Cells with a fitted correction, summed over fit tables.
    pub cells_fitted: usize,
    /// Cells that were present in a historical experiment but not fittable.
    pub cells_skipped: usize,
    /// Applied cell series that used the fallback, summed over experiments.
    pub cells_fallback: usize,
    /// Historical runs with no paired observation.
    pub unaligned: usize,
}

/// Runs a [`RunPlan`] against a [`DataStore`].
///
/// `mapper_factory` builds one mapper per variable from its [`QmConfig`].
pub struct Pipeline<S, F> {
    plan: RunPlan,
    store: S,
    mapper_factory: F,
}

impl<S, F, M> Pipeline<S, F>
where
    S: DataStore,
    F: Fn(&QmConfig) -> Result<M, QuantileMapError>,
    M: QuantileMapper,
{
    /// Creates a pipeline after validating `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPlan`] or
    /// [`PipelineError::QuantileMap`] if the plan is invalid.
    pub fn new(plan: RunPlan, store: S, mapper_factory: F) -> Result<Self, PipelineError> {
        plan.validate()?;
        Ok(Self {
            plan,
            store,
            mapper_factory,
        })
    }

    /// The plan being run.
    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Consumes the pipeline, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Executes the whole plan.
    ///
    /// # Errors
    ///
    /// Stops at the first read, conversion, write or fit-table error, or a
    /// missing pairing under strict alignment.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        // Clone so the loop can borrow the store mutably.
        let plan = self.plan.clone();
        for variable in plan.variables() {
            self.run_variable(&plan, variable, &mut summary)?;
        }
        info!(
            files = summary.files_written,
            fitted = summary.cells_fitted,
            skipped = summary.cells_skipped,
            fallback = summary.cells_fallback,
            "run complete"
        );
        Ok(summary)
    }

    fn run_variable(
        &mut self,
        plan: &RunPlan,
        variable: &VariableSpec,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let _span = info_span!("variable", name = variable.name()).entered();

        let obs_source = self.store.observations(variable.obs_name());
        let observed = to_table(
            &obs_source,
            &VariableDescriptor::new(variable.obs_name()),
            plan.lon_bounds(),
            plan.lat_bounds(),
            plan.obs_time_bounds(),
        )?;
        info!(rows = observed.len(), "loaded observations");
        self.write(
            Output::Observed {
                variable: variable.name(),
            },
            &observed,
            variable.name(),
            summary,
        )?;

        let mapper = (self.mapper_factory)(variable.qm())?;
        for gcm in plan.gcms() {
            self.run_gcm(plan, variable, gcm, &mapper, &observed, summary)?;
        }
        Ok(())
    }

    fn run_gcm(
        &mut self,
        plan: &RunPlan,
        variable: &VariableSpec,
        gcm: &GcmSpec,
        mapper: &M,
        observed: &GridTable,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let _span = info_span!("gcm", name = gcm.name()).entered();

        // Lives for this (variable, GCM) pair only.
        let mut fits: FitTable<M::Correction> = FitTable::new();
        for experiment in plan.experiments() {
            let _span = info_span!("experiment", name = experiment.name()).entered();

            let model = self.load_model(plan, variable, gcm, experiment)?;
            self.write(
                Output::Raw {
                    variable: variable.name(),
                    gcm: gcm.name(),
                    experiment: experiment.name(),
                },
                &model,
                variable.name(),
                summary,
            )?;

            if plan.is_historical(experiment) {
                let pairs = pair_observations(&model, observed);
                let matched = count_matched(&pairs);
                if matched == 0 {
                    if plan.strict_alignment() {
                        return Err(PipelineError::NoPairs {
                            variable: variable.name().to_string(),
                            gcm: gcm.name().to_string(),
                            experiment: experiment.name().to_string(),
                        });
                    }
                    warn!(
                        rows = pairs.len(),
                        "no model row matched an observation; every cell will fall back"
                    );
                    summary.unaligned += 1;
                }
                let samples = group_pairs(&pairs)?;
                debug!(rows = pairs.len(), matched, cells = samples.len(), "paired");
                fits = build_fit_table(mapper, &samples)?;
                summary.cells_fitted += fits.len();
                summary.cells_skipped += fits.skipped().len();
            }

            let series = group_series(&model)?;
            let corrected = apply_all(mapper, &fits, &series);
            summary.cells_fallback += corrected.iter().filter(|c| !c.fitted).count();

            let table = reassemble(variable.name(), &corrected);
            self.write(
                Output::Corrected {
                    variable: variable.name(),
                    gcm: gcm.name(),
                    experiment: experiment.name(),
                },
                &table,
                variable.name(),
                summary,
            )?;
        }
        Ok(())
    }

    fn load_model(
        &self,
        plan: &RunPlan,
        variable: &VariableSpec,
        gcm: &GcmSpec,
        experiment: &ExperimentSpec,
    ) -> Result<GridTable, PipelineError> {
        let source = self
            .store
            .model(variable.name(), gcm.name(), experiment.name());
        let mut table = to_table(
            &source,
            variable.descriptor(),
            plan.lon_bounds(),
            plan.lat_bounds(),
            experiment.time_bounds(),
        )?;
        if gcm.collapse_duplicates() {
            table = table.collapse_duplicates();
        }
        info!(rows = table.len(), "loaded model data");
        Ok(table)
    }

    fn write(
        &mut self,
        output: Output<'_>,
        table: &GridTable,
        name: &str,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let gridded = to_grid(table, name)?;
        self.store.write(output, &gridded)?;
        summary.files_written += 1;
        Ok(())
    }
}
