use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use gcmqm_pipeline::{Output, RunPlan};

use crate::cli::PlanArgs;
use crate::config;
use crate::convert;
use crate::paths::Layout;
use crate::run_cmd::config_dir;

/// Validate the config and print the inputs and outputs of a run.
pub fn run(args: PlanArgs) -> Result<()> {
    let config = config::load(&args.config)?;
    let plan = convert::build_plan(&config)?;
    let layout = Layout::new(&config.paths).relative_to(config_dir(&args.config));

    let inputs = inputs(&plan, &layout);
    let missing = inputs.iter().filter(|p| !p.exists()).count();

    println!("inputs:");
    for path in &inputs {
        let mark = if path.exists() { " " } else { "!" };
        println!("  {mark} {}", path.display());
    }
    println!("outputs:");
    for path in outputs(&plan, &layout) {
        println!("    {}", path.display());
    }

    if missing > 0 {
        warn!(missing, "some input files do not exist");
    }
    Ok(())
}

/// Distinct input files, sorted.
fn inputs(plan: &RunPlan, layout: &Layout) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    for v in plan.variables() {
        files.insert(layout.observation_input(v.obs_name()));
        for g in plan.gcms() {
            for e in plan.experiments() {
                files.insert(layout.model_input(v.name(), g.name(), e.name()));
            }
        }
    }
    files
}

/// Output files in the order a run writes them.
fn outputs(plan: &RunPlan, layout: &Layout) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for v in plan.variables() {
        let variable = v.name();
        files.push(layout.output(Output::Observed { variable }));
        for g in plan.gcms() {
            for e in plan.experiments() {
                let (gcm, experiment) = (g.name(), e.name());
                files.push(layout.output(Output::Raw {
                    variable,
                    gcm,
                    experiment,
                }));
                files.push(layout.output(Output::Corrected {
                    variable,
                    gcm,
                    experiment,
                }));
            }
        }
    }
    files
}
