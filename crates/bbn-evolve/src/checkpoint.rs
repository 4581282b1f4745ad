use std::fs;
use std::path::{Path, PathBuf};

use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_core::CosmologicalState;
use bbn_kinetics::{History, RegimeTransition, Species};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;

/// Everything needed to continue a run exactly where it stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointPayload {
    /// Steps completed when the checkpoint was written.
    pub step: usize,
    /// Configuration snapshot associated with the run.
    pub config: RunConfig,
    /// Cosmological state after `step` steps.
    pub state: CosmologicalState,
    /// Species with their distributions and collision histories.
    pub species: Vec<Species>,
    /// Past temperature-equation right-hand sides.
    pub fractions: History<f64>,
    /// Right-hand side of the last completed step.
    pub fraction: f64,
    /// Regime transitions observed so far.
    pub transitions: Vec<RegimeTransition>,
}

impl CheckpointPayload {
    /// Restores the payload from disk.
    pub fn load(path: &Path) -> Result<Self, BbnError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("checkpoint-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("checkpoint-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Writes the payload to disk.
    pub fn store(&self, path: &Path) -> Result<(), BbnError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                BbnError::Serde(
                    ErrorInfo::new("checkpoint-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string(self).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("checkpoint-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("checkpoint-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

/// Checkpoint file path for a given step count.
pub fn checkpoint_path(root: &Path, step: usize) -> PathBuf {
    root.join(format!("ckpt_{step:05}.json"))
}

/// Deletes the oldest checkpoints until at most `max_to_keep` remain.
pub fn enforce_retention(paths: &mut Vec<PathBuf>, max_to_keep: usize) -> Result<(), BbnError> {
    while paths.len() > max_to_keep {
        let path = paths.remove(0);
        fs::remove_file(&path).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("checkpoint-remove", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
    }
    Ok(())
}
