//! Run configuration, particle catalog, reference interactions and the
//! evolution loop of the BBN kinetics engine.

#![deny(missing_docs)]

/// Particle presets.
pub mod catalog;
/// Checkpoint payloads and retention.
pub mod checkpoint;
/// YAML run configuration.
pub mod config;
/// Interaction contract and reference interactions.
pub mod interactions;
/// Run manifests.
pub mod manifest;
/// Flavour mixing of collision integrals.
pub mod mixing;
/// Evolution log sinks.
pub mod sink;
/// The evolution loop.
pub mod universe;

pub use checkpoint::{checkpoint_path, CheckpointPayload};
pub use config::{
    CheckpointConfig, EvolutionParams, InteractionConfig, KineticsConfig, MixingConfig,
    OutputConfig, ParallelConfig, RunConfig, SpeciesConfig,
};
pub use interactions::{Attachment, DecayInteraction, Interaction, RelaxationInteraction};
pub use manifest::RunManifest;
pub use mixing::FlavourMixing;
pub use sink::{read_rows, CsvSink, MemorySink, OutputSink, SnapshotRow};
pub use universe::{
    resume, resume_with, resume_with_sink, run, run_with, run_with_sink, RunSummary,
    SpeciesEndState, StopFlag, Universe,
};
