use std::fs;
use std::path::{Path, PathBuf};

use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_core::CosmologicalState;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;

/// Structured manifest describing a completed or interrupted run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Steps completed.
    pub steps: usize,
    /// Whether the run stopped before reaching the final temperature.
    pub interrupted: bool,
    /// Cosmological state at the end of the run.
    pub final_state: CosmologicalState,
    /// SHA-256 of the canonical final state and species.
    pub final_state_hash: String,
    /// Evolution log relative to the run directory.
    pub evolution_file: Option<PathBuf>,
    /// Checkpoint files retained at the end of the run.
    pub checkpoints: Vec<PathBuf>,
    /// Per-species end-state exports.
    pub end_state_files: Vec<PathBuf>,
    /// RFC 3339 timestamp of manifest creation.
    pub created_at: String,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), BbnError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                BbnError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, BbnError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
