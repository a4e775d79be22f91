use std::process::ExitCode;

use clap::Parser;

mod cli;
mod config;
mod dual;
mod error;
mod isochrones;
mod logging;
mod origins;
mod output;
mod signal;

use cli::{Cli, Command};
use config::RunFile;
use error::CliError;

fn run(cli: Cli) -> Result<(), CliError> {
    logging::init_logging(cli.log_level.as_deref())?;

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Command::Isochrones { run, budgets } => {
            let file = RunFile::from_path(&run)?;
            isochrones::run(&file, budgets.as_deref())
        }
        Command::Dual { run, cost_limit } => {
            let file = RunFile::from_path(&run)?;
            dual::run(&file, cost_limit)
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
