//! File naming for inputs and outputs.

use std::path::{Path, PathBuf};

use gcmqm_pipeline::Output;

use crate::config::PathsToml;

/// Directory layout and file naming of a run.
#[derive(Debug, Clone)]
pub struct Layout {
    obs_input: PathBuf,
    model_input: PathBuf,
    obs_output: PathBuf,
    model_output: PathBuf,
    bc_output: PathBuf,
}

impl Layout {
    pub fn new(paths: &PathsToml) -> Self {
        Self {
            obs_input: paths.obs_input.clone(),
            model_input: paths.model_input.clone(),
            obs_output: paths.obs_output.clone(),
            model_output: paths.model_output.clone(),
            bc_output: paths.bc_output.clone(),
        }
    }

    /// Resolves relative directories against `base`.
    pub fn relative_to(self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        Self {
            obs_input: join(self.obs_input),
            model_input: join(self.model_input),
            obs_output: join(self.obs_output),
            model_output: join(self.model_output),
            bc_output: join(self.bc_output),
        }
    }

    /// `aphrodite_<obs_name>.nc` in the observation input directory.
    pub fn observation_input(&self, obs_name: &str) -> PathBuf {
        self.obs_input.join(format!("aphrodite_{obs_name}.nc"))
    }

    /// Model input file. Precipitation lives in its own `_pr` file; every
    /// other variable shares `<experiment>_<gcm>.nc`.
    pub fn model_input(&self, variable: &str, gcm: &str, experiment: &str) -> PathBuf {
        let file = if variable == "pr" {
            format!("{experiment}_{gcm}_pr.nc")
        } else {
            format!("{experiment}_{gcm}.nc")
        };
        self.model_input.join(file)
    }

    pub fn output(&self, output: Output<'_>) -> PathBuf {
        match output {
            Output::Observed { variable } => {
                self.obs_output.join(format!("aphrodite_{variable}.nc"))
            }
            Output::Raw {
                variable,
                gcm,
                experiment,
            } => self
                .model_output
                .join(format!("{experiment}_{gcm}_{variable}.nc")),
            Output::Corrected {
                variable,
                gcm,
                experiment,
            } => self
                .bc_output
                .join(format!("{experiment}_{gcm}_{variable}.nc")),
        }
    }
}
