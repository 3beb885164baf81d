use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use gcmqm_pipeline::Pipeline;
use gcmqm_quantile_map::StandardMapper;

use crate::cli::RunArgs;
use crate::config;
use crate::convert;
use crate::paths::Layout;
use crate::store::NetcdfStore;

/// Run bias correction end to end.
pub fn run(args: RunArgs) -> Result<()> {
    let _span = info_span!("run", config = %args.config.display()).entered();

    // Step 1: Load config and build the plan
    let config = config::load(&args.config)?;
    let plan = convert::build_plan(&config)?;
    info!(
        variables = plan.variables().len(),
        gcms = plan.gcms().len(),
        experiments = plan.experiments().len(),
        historical = plan.historical(),
        "plan built"
    );

    // Step 2: Resolve the file layout next to the config file
    let layout = Layout::new(&config.paths).relative_to(config_dir(&args.config));
    let store = NetcdfStore::new(layout);

    // Step 3: Fit and apply
    let mut pipeline = Pipeline::new(plan, store, |qm| StandardMapper::new(qm.clone()))
        .context("invalid run plan")?;
    let summary = pipeline.run().context("bias correction failed")?;

    info!(
        files_written = summary.files_written,
        cells_fitted = summary.cells_fitted,
        cells_skipped = summary.cells_skipped,
        cells_fallback = summary.cells_fallback,
        unaligned = summary.unaligned,
        "run complete"
    );
    Ok(())
}

pub(crate) fn config_dir(config: &Path) -> &Path {
    config.parent().unwrap_or(Path::new("."))
}
