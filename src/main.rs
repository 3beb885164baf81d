mod cli;
mod config;
mod convert;
mod logging;
mod paths;
mod plan_cmd;
mod run_cmd;
mod store;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_verbosity());

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run_cmd::run(args),
        Command::Plan(args) => plan_cmd::run(args),
    }
}
