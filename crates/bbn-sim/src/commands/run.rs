use std::error::Error;
use std::fs;
use std::path::PathBuf;

use bbn_evolve::RunConfig;
use clap::Args;

use super::{evolve_until_interrupted, report};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration describing the run.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory; overrides `output.run_directory`.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Worker threads for collision integrals; overrides `parallel.threads`.
    #[arg(long)]
    pub threads: Option<usize>,
    /// Terminal temperature in MeV; overrides `params.t_final`.
    #[arg(long)]
    pub t_final: Option<f64>,
    /// Checkpoint interval in steps; overrides `checkpoint.interval`.
    #[arg(long)]
    pub checkpoint_every: Option<usize>,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(out) = args.out {
        config.output.run_directory = Some(out);
    }
    if let Some(threads) = args.threads {
        config.parallel.threads = threads;
    }
    if let Some(t_final) = args.t_final {
        config.params.t_final = t_final;
    }
    if let Some(interval) = args.checkpoint_every {
        config.checkpoint.interval = interval;
    }
    config.validate()?;

    // Effective configuration, overrides included.
    if let Some(run_dir) = &config.output.run_directory {
        fs::create_dir_all(run_dir)?;
        fs::write(run_dir.join("config.yaml"), serde_yaml::to_string(&config)?)?;
    }

    let summary = evolve_until_interrupted(move |stop| bbn_evolve::run_with(&config, &stop)).await?;
    report(&summary)
}
