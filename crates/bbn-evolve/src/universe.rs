use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_core::{stable_hash_string, CosmologicalState};
use bbn_kinetics::integrators::{adams_bashforth_correction, order_for};
use bbn_kinetics::{
    CollisionDriver, GridExecutor, History, RayonExecutor, Regime, RegimeTransition,
    SequentialExecutor, Species,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::checkpoint::{self, CheckpointPayload};
use crate::config::{OutputConfig, RunConfig};
use crate::interactions::{self, Interaction};
use crate::manifest::RunManifest;
use crate::mixing::FlavourMixing;
use crate::sink::{CsvSink, MemorySink, OutputSink, SnapshotRow};

/// Cooperative cancellation flag checked between steps.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Creates a flag that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the loop to stop after the current step.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary returned to callers after a run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps completed.
    pub steps: usize,
    /// Whether the run stopped before reaching the final temperature.
    pub interrupted: bool,
    /// Cosmological state at the end of the run.
    pub final_state: CosmologicalState,
    /// SHA-256 of the canonical final state and species.
    pub final_state_hash: String,
    /// Regime transitions in the order they happened.
    pub transitions: Vec<RegimeTransition>,
    /// Evolution log, if written to disk.
    pub evolution_path: Option<PathBuf>,
    /// Manifest path, if emitted.
    pub manifest_path: Option<PathBuf>,
    /// Checkpoint files retained at the end of the run.
    pub checkpoints: Vec<PathBuf>,
    /// Per-species end-state exports.
    pub end_state_files: Vec<PathBuf>,
}

/// Per-species export written at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesEndState {
    /// Species name.
    pub name: String,
    /// Species symbol.
    pub symbol: String,
    /// Final regime.
    pub regime: Regime,
    /// Species temperature in MeV (frozen at decoupling).
    pub temperature: f64,
    /// Species comoving temperature in MeV.
    pub a_t: f64,
    /// Number density in MeV³.
    pub density: f64,
    /// Energy density in MeV⁴.
    pub energy_density: f64,
    /// Grid momenta.
    pub grid: Vec<f64>,
    /// Occupation numbers on the grid.
    pub distribution: Vec<f64>,
}

#[derive(Serialize)]
struct FinalState<'a> {
    state: &'a CosmologicalState,
    species: &'a [Species],
}

/// The expanding universe: cosmological state, species and interactions.
#[derive(Debug)]
pub struct Universe {
    config: RunConfig,
    state: CosmologicalState,
    species: Vec<Species>,
    interactions: Vec<Arc<dyn Interaction>>,
    mixing: Option<FlavourMixing>,
    driver: CollisionDriver,
    executor: Box<dyn GridExecutor>,
    fractions: History<f64>,
    fraction: f64,
    step: usize,
    transitions: Vec<RegimeTransition>,
}

fn build_executor(threads: usize) -> Result<Box<dyn GridExecutor>, BbnError> {
    if threads == 0 {
        Ok(Box::new(SequentialExecutor::new()))
    } else {
        Ok(Box::new(RayonExecutor::new(threads)?))
    }
}

fn refresh_state(state: &mut CosmologicalState, species: &[Species], step: usize) -> Result<(), BbnError> {
    let densities: Vec<f64> = species.iter().map(|s| s.energy_density(state)).collect();
    let total = densities.iter().sum::<f64>();
    state.update(total).map_err(|err| {
        let err = err.with_context("step", step.to_string());
        match species
            .iter()
            .zip(&densities)
            .find(|(_, rho)| !rho.is_finite() || **rho < 0.0)
        {
            Some((offender, _)) => err.with_context("species", offender.name()),
            None => err,
        }
    })
}

impl Universe {
    /// Builds the initial universe described by `config`.
    ///
    /// Species start in equilibrium with the plasma at `t_initial` and the
    /// Hubble rate is initialised from their total energy density.
    pub fn new(config: RunConfig) -> Result<Self, BbnError> {
        config.validate()?;
        let params = &config.params;
        let mut state = CosmologicalState::new(
            params.t_initial,
            params.t_final,
            params.dy,
            params.mass_normalization,
        )?;
        let species = config
            .resolve_species()?
            .into_iter()
            .map(|spec| Species::new(spec, &config.grid, &state, config.kinetics.interpolation))
            .collect::<Result<Vec<_>, _>>()?;
        refresh_state(&mut state, &species, 0)?;
        Self::assemble(config, state, species, History::default(), 0.0, 0, Vec::new())
    }

    /// Rebuilds a universe from a checkpoint.
    pub fn from_checkpoint(payload: CheckpointPayload) -> Result<Self, BbnError> {
        payload.config.validate()?;
        if payload.species.len() != payload.config.species.len() {
            return Err(BbnError::Serde(
                ErrorInfo::new("checkpoint-species", "checkpoint species do not match its configuration")
                    .with_context("expected", payload.config.species.len().to_string())
                    .with_context("actual", payload.species.len().to_string()),
            ));
        }
        for species in &payload.species {
            species.validate_state()?;
        }
        Self::assemble(
            payload.config,
            payload.state,
            payload.species,
            payload.fractions,
            payload.fraction,
            payload.step,
            payload.transitions,
        )
    }

    fn assemble(
        config: RunConfig,
        state: CosmologicalState,
        species: Vec<Species>,
        fractions: History<f64>,
        fraction: f64,
        step: usize,
        transitions: Vec<RegimeTransition>,
    ) -> Result<Self, BbnError> {
        let interactions = config.interactions.iter().map(interactions::from_config).collect();
        let mixing = config
            .mixing
            .as_ref()
            .map(|mixing| FlavourMixing::new(mixing, &species))
            .transpose()?;
        let executor = build_executor(config.parallel.threads)?;
        Ok(Self {
            driver: CollisionDriver::new(config.kinetics.integration_order),
            config,
            state,
            species,
            interactions,
            mixing,
            executor,
            fractions,
            fraction,
            step,
            transitions,
        })
    }

    /// Registers an additional interaction.
    pub fn add_interaction(&mut self, interaction: Arc<dyn Interaction>) {
        self.interactions.push(interaction);
    }

    /// Configuration of the run.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Current cosmological state.
    pub fn state(&self) -> &CosmologicalState {
        &self.state
    }

    /// Species in evaluation order.
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Steps completed.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Right-hand side of the temperature equation at the last step.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Regime transitions observed so far.
    pub fn transitions(&self) -> &[RegimeTransition] {
        &self.transitions
    }

    /// Whether the terminal temperature has been reached.
    pub fn finished(&self) -> bool {
        self.state.finished()
    }

    /// Sum of species energy densities.
    pub fn total_energy_density(&self) -> f64 {
        self.species.iter().map(|s| s.energy_density(&self.state)).sum()
    }

    /// Evolution log row for the current state.
    pub fn snapshot(&self) -> SnapshotRow {
        SnapshotRow::capture(self.step, &self.state, self.fraction)
    }

    /// Checkpoint payload for the current state.
    pub fn checkpoint_payload(&self) -> CheckpointPayload {
        CheckpointPayload {
            step: self.step,
            config: self.config.clone(),
            state: self.state.clone(),
            species: self.species.clone(),
            fractions: self.fractions.clone(),
            fraction: self.fraction,
            transitions: self.transitions.clone(),
        }
    }

    /// Stable hash of the state and species.
    pub fn state_hash(&self) -> Result<String, BbnError> {
        stable_hash_string(&FinalState {
            state: &self.state,
            species: &self.species,
        })
    }

    /// Advances the universe by one step of `dy`.
    pub fn make_step(&mut self) -> Result<(), BbnError> {
        let step = self.step + 1;
        let dy = self.state.dy;
        let dx = self.state.step_size();

        for species in &mut self.species {
            if let Some(transition) = species.update(&self.state) {
                info!(
                    step,
                    species = %transition.species,
                    from = transition.from.as_str(),
                    to = transition.to.as_str(),
                    temperature = transition.temperature,
                    "regime transition"
                );
                self.transitions.push(transition);
            }
        }

        for interaction in &self.interactions {
            for attachment in interaction.initialize(&self.state, &self.species) {
                let target = self
                    .species
                    .iter_mut()
                    .find(|candidate| candidate.name() == attachment.species)
                    .ok_or_else(|| {
                        BbnError::Config(
                            ErrorInfo::new("unknown-species", "interaction attached to an unknown species")
                                .with_context("interaction", interaction.name())
                                .with_context("species", attachment.species.clone()),
                        )
                    })?;
                target.attach(attachment.integral);
            }
        }

        let mut integrals = Vec::with_capacity(self.species.len());
        for species in &self.species {
            let integral = self
                .driver
                .compute(species, self.state.a, dy, self.executor.as_ref())
                .map_err(|err| err.with_context("step", step.to_string()))?;
            integrals.push(integral);
        }
        if let Some(mixing) = &self.mixing {
            mixing.apply(&mut integrals);
        }
        for (species, integral) in self.species.iter_mut().zip(integrals) {
            species
                .apply_collision_integral(integral, dy)
                .map_err(|err| err.with_context("step", step.to_string()))?;
        }

        let (numerator, denominator) = self.species.iter().fold((0.0, 0.0), |(n, d), s| {
            (n + s.numerator(&self.state), d + s.denominator(&self.state))
        });
        let fraction = self.state.x * numerator / denominator;
        self.step = step;
        if !fraction.is_finite() {
            return Err(BbnError::Divergence(
                ErrorInfo::new(
                    "temperature-fraction",
                    "temperature equation right-hand side is not finite",
                )
                .with_context("step", step.to_string())
                .with_context("numerator", numerator.to_string())
                .with_context("denominator", denominator.to_string()),
            ));
        }

        let history: Vec<f64> = std::iter::once(fraction)
            .chain(self.fractions.newest_first().copied())
            .collect();
        let order = order_for(self.fractions.len());
        self.state.a_t += adams_bashforth_correction(&history, dy, order);
        self.fractions.push(fraction);
        self.fraction = fraction;

        self.state.x += dx;
        refresh_state(&mut self.state, &self.species, step)
    }

    /// Runs until the terminal temperature or a stop request.
    ///
    /// The initial state is logged as step 0 for fresh runs. Checkpoints, end
    /// states and the manifest are written when the configuration names a run
    /// directory. The executor is closed before final output is produced.
    pub fn evolve(&mut self, sink: &mut dyn OutputSink, stop: &StopFlag) -> Result<RunSummary, BbnError> {
        let layout = ResolvedOutput::new(&self.config.output);
        let mut checkpoints = Vec::new();
        let log_every = self.config.log_every.max(1);
        let interval = self.config.checkpoint.interval;

        if self.step == 0 {
            sink.append(&self.snapshot())?;
        }
        info!(
            species = self.species.len(),
            interactions = self.interactions.len(),
            executor = self.executor.name(),
            start_step = self.step,
            "evolution started"
        );

        let mut interrupted = false;
        while !self.finished() {
            if stop.is_requested() {
                warn!(step = self.step, "stop requested, finishing early");
                interrupted = true;
                break;
            }
            if self.step % log_every == 0 {
                info!(
                    step = self.step,
                    t_s = self.state.time_seconds(),
                    a_t = self.state.a_t,
                    temperature = self.state.temperature,
                    a = self.state.a,
                    "progress"
                );
            }
            self.make_step()?;
            sink.append(&self.snapshot())?;
            if interval > 0 && self.step % interval == 0 {
                if let Some(path) = self.write_checkpoint(&layout)? {
                    checkpoints.push(path);
                    checkpoint::enforce_retention(&mut checkpoints, self.config.checkpoint.max_to_keep)?;
                }
            }
        }
        sink.flush()?;
        self.executor.close();

        if interrupted {
            let already_saved = checkpoints
                .last()
                .is_some_and(|path| path == &checkpoint::checkpoint_path(&layout.checkpoint_dir(), self.step));
            if !already_saved {
                if let Some(path) = self.write_checkpoint(&layout)? {
                    checkpoints.push(path);
                }
            }
        }

        let final_state_hash = self.state_hash()?;
        let end_state_files = match &layout.run_directory {
            Some(run_dir) => self.write_end_state(&run_dir.join(&layout.end_state_dir))?,
            None => Vec::new(),
        };
        let evolution_path = sink.path().map(Path::to_path_buf);

        let manifest_path = match &layout.run_directory {
            Some(run_dir) => {
                let relative = |path: &PathBuf| {
                    path.strip_prefix(run_dir)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| path.clone())
                };
                let manifest = RunManifest {
                    config: self.config.clone(),
                    steps: self.step,
                    interrupted,
                    final_state: self.state.clone(),
                    final_state_hash: final_state_hash.clone(),
                    evolution_file: evolution_path.as_ref().map(relative),
                    checkpoints: checkpoints.iter().map(relative).collect(),
                    end_state_files: end_state_files.iter().map(relative).collect(),
                    created_at: chrono::Utc::now().to_rfc3339(),
                };
                let path = run_dir.join(&layout.manifest_file);
                manifest.write(&path)?;
                Some(path)
            }
            None => None,
        };

        info!(
            steps = self.step,
            interrupted,
            temperature = self.state.temperature,
            hash = %final_state_hash,
            "evolution finished"
        );

        Ok(RunSummary {
            steps: self.step,
            interrupted,
            final_state: self.state.clone(),
            final_state_hash,
            transitions: self.transitions.clone(),
            evolution_path,
            manifest_path,
            checkpoints,
            end_state_files,
        })
    }

    fn write_checkpoint(&self, layout: &ResolvedOutput) -> Result<Option<PathBuf>, BbnError> {
        if layout.run_directory.is_none() {
            return Ok(None);
        }
        let path = checkpoint::checkpoint_path(&layout.checkpoint_dir(), self.step);
        self.checkpoint_payload().store(&path)?;
        Ok(Some(path))
    }

    fn write_end_state(&self, dir: &Path) -> Result<Vec<PathBuf>, BbnError> {
        fs::create_dir_all(dir).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("end-state-mkdir", err.to_string())
                    .with_context("path", dir.display().to_string()),
            )
        })?;
        let mut files = Vec::with_capacity(self.species.len());
        for species in &self.species {
            let export = SpeciesEndState {
                name: species.name().to_string(),
                symbol: species.symbol().to_string(),
                regime: species.regime(),
                temperature: species.temperature(),
                a_t: species.a_t(),
                density: species.density(&self.state),
                energy_density: species.energy_density(&self.state),
                grid: species.grid().points().to_vec(),
                distribution: species.view(self.state.a).sample(),
            };
            let path = dir.join(format!("{}.json", species.symbol()));
            let json = serde_json::to_string_pretty(&export).map_err(|err| {
                BbnError::Serde(
                    ErrorInfo::new("end-state-serialize", err.to_string())
                        .with_context("species", species.name()),
                )
            })?;
            fs::write(&path, json).map_err(|err| {
                BbnError::Serde(
                    ErrorInfo::new("end-state-write", err.to_string())
                        .with_context("path", path.display().to_string()),
                )
            })?;
            files.push(path);
        }
        Ok(files)
    }
}

struct ResolvedOutput {
    run_directory: Option<PathBuf>,
    evolution_file: PathBuf,
    manifest_file: PathBuf,
    checkpoint_dir: PathBuf,
    end_state_dir: PathBuf,
}

impl ResolvedOutput {
    fn new(config: &OutputConfig) -> Self {
        Self {
            run_directory: config.run_directory.clone(),
            evolution_file: config.evolution_file.clone(),
            manifest_file: config.manifest_file.clone(),
            checkpoint_dir: config.checkpoint_dir.clone(),
            end_state_dir: config.end_state_dir.clone(),
        }
    }

    fn checkpoint_dir(&self) -> PathBuf {
        match &self.run_directory {
            Some(run_dir) => run_dir.join(&self.checkpoint_dir),
            None => self.checkpoint_dir.clone(),
        }
    }

    fn evolution_path(&self) -> Option<PathBuf> {
        self.run_directory
            .as_ref()
            .map(|run_dir| run_dir.join(&self.evolution_file))
    }
}

fn default_sink(config: &RunConfig, resume_step: Option<usize>) -> Result<Box<dyn OutputSink>, BbnError> {
    match ResolvedOutput::new(&config.output).evolution_path() {
        Some(path) => match resume_step {
            Some(step) => Ok(Box::new(CsvSink::resume(&path, step)?)),
            None => Ok(Box::new(CsvSink::create(&path)?)),
        },
        None => Ok(Box::new(MemorySink::new())),
    }
}

/// Runs a fresh evolution, logging to the configured run directory.
pub fn run(config: &RunConfig) -> Result<RunSummary, BbnError> {
    run_with(config, &StopFlag::new())
}

/// Runs a fresh evolution that stops early when `stop` is raised.
pub fn run_with(config: &RunConfig, stop: &StopFlag) -> Result<RunSummary, BbnError> {
    let mut sink = default_sink(config, None)?;
    run_with_sink(config, sink.as_mut(), stop)
}

/// Runs a fresh evolution into a caller-supplied sink.
pub fn run_with_sink(
    config: &RunConfig,
    sink: &mut dyn OutputSink,
    stop: &StopFlag,
) -> Result<RunSummary, BbnError> {
    let mut universe = Universe::new(config.clone())?;
    universe.evolve(sink, stop)
}

/// Resumes a run from a checkpoint file.
pub fn resume(path: &Path) -> Result<RunSummary, BbnError> {
    resume_with(path, &StopFlag::new())
}

/// Resumes a run from a checkpoint file, honouring `stop`.
pub fn resume_with(path: &Path, stop: &StopFlag) -> Result<RunSummary, BbnError> {
    let payload = CheckpointPayload::load(path)?;
    let mut sink = default_sink(&payload.config, Some(payload.step))?;
    let mut universe = Universe::from_checkpoint(payload)?;
    universe.evolve(sink.as_mut(), stop)
}

/// Resumes a run from a checkpoint file into a caller-supplied sink.
pub fn resume_with_sink(
    path: &Path,
    sink: &mut dyn OutputSink,
    stop: &StopFlag,
) -> Result<RunSummary, BbnError> {
    let payload = CheckpointPayload::load(path)?;
    let mut universe = Universe::from_checkpoint(payload)?;
    universe.evolve(sink, stop)
}
