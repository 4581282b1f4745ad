//! Command-line front end for the BBN kinetics engine.
//!
//! `run` evolves a universe described by a YAML configuration, `resume`
//! continues from a checkpoint and `inspect` summarises a finished or
//! interrupted run. Ctrl-C stops the evolution after the current step and
//! still writes a checkpoint and manifest.

use std::error::Error;
use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use commands::{
    inspect::{self, InspectArgs},
    resume::{self, ResumeArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "bbn-sim", about = "Non-equilibrium BBN kinetics CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve a universe from a YAML configuration.
    Run(RunArgs),
    /// Continue an interrupted run from a checkpoint file.
    Resume(ResumeArgs),
    /// Summarise a run directory, manifest or checkpoint.
    Inspect(InspectArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(args).await,
        Command::Resume(args) => resume::run(args).await,
        Command::Inspect(args) => inspect::run(&args),
    }
}

fn write_json<P: AsRef<Path>, T: serde::Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
