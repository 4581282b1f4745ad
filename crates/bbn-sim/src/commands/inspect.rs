use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use bbn_evolve::{read_rows, CheckpointPayload, RunManifest, SpeciesEndState};
use clap::Args;
use serde_json::{json, Value};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Run directory, manifest file or checkpoint file.
    #[arg(long)]
    pub input: PathBuf,
    /// Number of trailing evolution log rows to include.
    #[arg(long, default_value_t = 0)]
    pub rows: usize,
}

pub fn run(args: &InspectArgs) -> Result<(), Box<dyn Error>> {
    let is_checkpoint = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("ckpt_"));
    let report = if is_checkpoint {
        inspect_checkpoint(&args.input)?
    } else if args.input.is_dir() {
        inspect_manifest(&args.input, &args.input.join("manifest.json"), args.rows)?
    } else {
        let run_dir = args.input.parent().unwrap_or_else(|| Path::new("."));
        inspect_manifest(run_dir, &args.input, args.rows)?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn inspect_manifest(run_dir: &Path, path: &Path, rows: usize) -> Result<Value, Box<dyn Error>> {
    let manifest = RunManifest::load(path)?;
    let mut species = Vec::with_capacity(manifest.end_state_files.len());
    for file in &manifest.end_state_files {
        let export: SpeciesEndState = serde_json::from_str(&fs::read_to_string(run_dir.join(file))?)?;
        species.push(json!({
            "name": export.name,
            "regime": export.regime,
            "temperature": export.temperature,
            "a_t": export.a_t,
            "density": export.density,
            "energy_density": export.energy_density,
        }));
    }
    let tail = match (&manifest.evolution_file, rows) {
        (Some(file), rows) if rows > 0 => {
            let all = read_rows(&run_dir.join(file))?;
            let start = all.len().saturating_sub(rows);
            serde_json::to_value(&all[start..])?
        }
        _ => Value::Null,
    };
    Ok(json!({
        "steps": manifest.steps,
        "interrupted": manifest.interrupted,
        "temperature": manifest.final_state.temperature,
        "a_t": manifest.final_state.a_t,
        "time_s": manifest.final_state.time_seconds(),
        "final_state_hash": manifest.final_state_hash,
        "created_at": manifest.created_at,
        "checkpoints": manifest.checkpoints,
        "species": species,
        "rows": tail,
    }))
}

fn inspect_checkpoint(path: &Path) -> Result<Value, Box<dyn Error>> {
    let payload = CheckpointPayload::load(path)?;
    let species: Vec<Value> = payload
        .species
        .iter()
        .map(|species| {
            json!({
                "name": species.name(),
                "regime": species.regime(),
                "temperature": species.temperature(),
                "a_t": species.a_t(),
                "history": species.history().len(),
            })
        })
        .collect();
    Ok(json!({
        "step": payload.step,
        "temperature": payload.state.temperature,
        "a_t": payload.state.a_t,
        "time_s": payload.state.time_seconds(),
        "fraction": payload.fraction,
        "species": species,
        "transitions": payload.transitions,
    }))
}
