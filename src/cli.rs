use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Quantile-mapping bias correction of GCM output against gridded
/// observations.
#[derive(Parser)]
#[command(
    name = "gcmqm",
    version,
    about = "Quantile-mapping bias correction of GCM output"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace). `run` logs at
    /// info or above.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Verbosity passed to logging: `run` reports file progress by default.
    pub fn log_verbosity(&self) -> u8 {
        match self.command {
            Command::Run(_) => self.verbose.max(1),
            Command::Plan(_) => self.verbose,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run bias correction for every variable, GCM and experiment.
    Run(RunArgs),
    /// Validate the configuration and list the files a run would touch.
    Plan(PlanArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gcmqm.toml")]
    pub config: PathBuf,
}

/// Arguments for the `plan` subcommand.
#[derive(clap::Args)]
pub struct PlanArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gcmqm.toml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verbosity(args: &[&str]) -> u8 {
        Cli::try_parse_from(args).unwrap().log_verbosity()
    }

    #[test]
    fn run_logs_progress_by_default() {
        assert_eq!(verbosity(&["gcmqm", "run"]), 1);
        assert_eq!(verbosity(&["gcmqm", "-vv", "run"]), 2);
        assert_eq!(verbosity(&["gcmqm", "run", "-vvv", "--config", "x.toml"]), 3);
    }

    #[test]
    fn plan_stays_quiet_by_default() {
        assert_eq!(verbosity(&["gcmqm", "plan"]), 0);
        assert_eq!(verbosity(&["gcmqm", "plan", "-v"]), 1);
    }
}
