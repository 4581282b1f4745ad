use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::{evolve_until_interrupted, report};

#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Checkpoint file written by `bbn-sim run`.
    #[arg(long)]
    pub checkpoint: PathBuf,
}

pub async fn run(args: ResumeArgs) -> Result<(), Box<dyn Error>> {
    let checkpoint = args.checkpoint;
    let summary =
        evolve_until_interrupted(move |stop| bbn_evolve::resume_with(&checkpoint, &stop)).await?;
    report(&summary)
}
