use std::error::Error;

use bbn_core::BbnError;
use bbn_evolve::{RunSummary, StopFlag};
use tracing::{info, warn};

use crate::write_json;

pub mod inspect;
pub mod resume;
pub mod run;

/// Runs `job` on a blocking thread while Ctrl-C raises its stop flag.
pub async fn evolve_until_interrupted<F>(job: F) -> Result<RunSummary, Box<dyn Error>>
where
    F: FnOnce(StopFlag) -> Result<RunSummary, BbnError> + Send + 'static,
{
    let stop = StopFlag::new();
    let watcher = {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping after the current step");
                stop.request();
            }
        })
    };
    let outcome = tokio::task::spawn_blocking(move || job(stop)).await;
    watcher.abort();
    Ok(outcome??)
}

/// Logs the outcome and stores `summary.json` next to the manifest.
pub fn report(summary: &RunSummary) -> Result<(), Box<dyn Error>> {
    match summary.manifest_path.as_deref().and_then(|path| path.parent()) {
        Some(run_dir) => write_json(run_dir.join("summary.json"), summary)?,
        None => println!("{}", serde_json::to_string_pretty(summary)?),
    }
    if summary.interrupted {
        warn!(
            steps = summary.steps,
            checkpoint = ?summary.checkpoints.last(),
            "run interrupted; resume from the last checkpoint"
        );
    } else {
        info!(
            steps = summary.steps,
            temperature = summary.final_state.temperature,
            a_t = summary.final_state.a_t,
            hash = %summary.final_state_hash,
            "run complete"
        );
    }
    Ok(())
}
