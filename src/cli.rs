use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "terrachrone")]
#[command(author, version, about = "Terrain-weighted network isochrones", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `terrachrone_core=trace`; overrides `RUST_LOG`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Worker threads, all cores when omitted
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Isochrones of one origin for ascending travel-time budgets
    Isochrones {
        /// TOML run file
        run: PathBuf,
        /// Budgets in minutes, e.g. "5,10,15" or "2,5;7,5"
        #[arg(short, long)]
        budgets: Option<String>,
    },
    /// Isochrones of two origin sets and their intersection
    Dual {
        /// TOML run file
        run: PathBuf,
        /// Cost limit, replaces the one in the run file
        #[arg(short, long)]
        cost_limit: Option<f64>,
    },
}
