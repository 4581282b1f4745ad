use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_core::{CosmologicalState, UNITS};
use bbn_kinetics::{Grid, GridSpec, IntegrationOrder, InterpolationMode, SpeciesSpec, Statistics};
use serde::{Deserialize, Serialize};

use crate::catalog;

/// YAML-configurable parameters governing a kinetics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Temperature bounds and step size.
    #[serde(default)]
    pub params: EvolutionParams,
    /// Momentum grid shared by species without their own grid.
    #[serde(default)]
    pub grid: GridSpec,
    /// Particle species taking part in the run, in evaluation order.
    #[serde(default = "default_species")]
    pub species: Vec<SpeciesConfig>,
    /// Interactions attaching collision integrals each step.
    #[serde(default)]
    pub interactions: Vec<InteractionConfig>,
    /// Optional flavour mixing of collision integrals.
    #[serde(default)]
    pub mixing: Option<MixingConfig>,
    /// Numerical choices of the kinetic solver.
    #[serde(default)]
    pub kinetics: KineticsConfig,
    /// Worker pool for collision integrals.
    #[serde(default)]
    pub parallel: ParallelConfig,
    /// Progress log cadence in steps.
    #[serde(default = "default_log_every")]
    pub log_every: usize,
    /// Checkpointing behaviour.
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    /// Output directory configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_species() -> Vec<SpeciesConfig> {
    ["photon", "electron", "neutrino_e", "neutrino_mu", "neutrino_tau"]
        .into_iter()
        .map(SpeciesConfig::preset)
        .collect()
}

fn default_log_every() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            params: EvolutionParams::default(),
            grid: GridSpec::default(),
            species: default_species(),
            interactions: Vec::new(),
            mixing: None,
            kinetics: KineticsConfig::default(),
            parallel: ParallelConfig::default(),
            log_every: default_log_every(),
            checkpoint: CheckpointConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, BbnError> {
        serde_yaml::from_str(contents)
            .map_err(|err| BbnError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self, BbnError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            BbnError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| err.with_context("path", path.display().to_string()))
    }

    /// Resolves every species entry into a full specification.
    pub fn resolve_species(&self) -> Result<Vec<SpeciesSpec>, BbnError> {
        self.species.iter().map(SpeciesConfig::resolve).collect()
    }

    /// Checks the configuration for errors that would otherwise surface mid-run.
    pub fn validate(&self) -> Result<(), BbnError> {
        CosmologicalState::new(
            self.params.t_initial,
            self.params.t_final,
            self.params.dy,
            self.params.mass_normalization,
        )?;
        Grid::new(self.grid.clone())?;

        if self.species.is_empty() {
            return Err(BbnError::config("empty-species", "no species configured"));
        }
        let specs = self.resolve_species()?;
        let mut names = BTreeSet::new();
        for spec in &specs {
            spec.validate()?;
            if let Some(grid) = &spec.grid {
                Grid::new(grid.clone()).map_err(|err| err.with_context("species", spec.name.clone()))?;
            }
            if !names.insert(spec.name.as_str()) {
                return Err(BbnError::Config(
                    ErrorInfo::new("duplicate-species", "species names must be unique")
                        .with_context("species", spec.name.clone()),
                ));
            }
        }

        let known = |name: &str| -> Result<(), BbnError> {
            if names.contains(name) {
                Ok(())
            } else {
                Err(BbnError::Config(
                    ErrorInfo::new("unknown-species", "reference to a species that is not configured")
                        .with_context("species", name),
                ))
            }
        };
        for interaction in &self.interactions {
            known(interaction.species())?;
            interaction.validate()?;
        }
        if let Some(mixing) = &self.mixing {
            for name in &mixing.species {
                known(name)?;
            }
            mixing.validate()?;
        }

        if self.log_every == 0 {
            return Err(BbnError::config("log-every", "log cadence must be at least one step"));
        }
        if self.checkpoint.interval > 0 && self.checkpoint.max_to_keep == 0 {
            return Err(BbnError::Config(
                ErrorInfo::new(
                    "checkpoint-retention",
                    "periodic checkpoints need a retention of at least one",
                )
                .with_context("interval", self.checkpoint.interval.to_string())
                .with_hint("set checkpoint.max_to_keep >= 1 or checkpoint.interval to 0"),
            ));
        }
        Ok(())
    }
}

/// Temperature bounds and integration step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionParams {
    /// Initial temperature in MeV.
    #[serde(default = "default_t_initial")]
    pub t_initial: f64,
    /// Terminal temperature in MeV.
    #[serde(default = "default_t_final")]
    pub t_final: f64,
    /// Logarithmic step in the scale factor.
    #[serde(default = "default_dy")]
    pub dy: f64,
    /// Normalisation `m` of `x = a · m`, in MeV.
    #[serde(default = "default_mass_normalization")]
    pub mass_normalization: f64,
}

fn default_t_initial() -> f64 {
    10.0 * UNITS.mev
}

fn default_t_final() -> f64 {
    10.0 * UNITS.kev
}

fn default_dy() -> f64 {
    0.025
}

fn default_mass_normalization() -> f64 {
    UNITS.mev
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            t_initial: default_t_initial(),
            t_final: default_t_final(),
            dy: default_dy(),
            mass_normalization: default_mass_normalization(),
        }
    }
}

/// One configured species: a catalog preset with overrides, or a custom definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Catalog preset name (`photon`, `electron`, `neutrino_e`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Species name; required without a preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short symbol; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Quantum statistics; required without a preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
    /// Degrees of freedom; required without a preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dof: Option<f64>,
    /// Rest mass in MeV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    /// Decoupling temperature in MeV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoupling_temperature: Option<f64>,
    /// Species-specific momentum grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSpec>,
}

impl SpeciesConfig {
    /// Entry referring to a catalog preset without overrides.
    pub fn preset(name: &str) -> Self {
        Self {
            preset: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Produces the species specification described by this entry.
    pub fn resolve(&self) -> Result<SpeciesSpec, BbnError> {
        let mut spec = match &self.preset {
            Some(preset) => catalog::preset(preset).ok_or_else(|| {
                BbnError::Config(
                    ErrorInfo::new("unknown-preset", "no catalog entry with this name")
                        .with_context("preset", preset.clone())
                        .with_hint(format!("known presets: {}", catalog::PRESETS.join(", "))),
                )
            })?,
            None => {
                let missing = |field: &str| {
                    BbnError::Config(
                        ErrorInfo::new(
                            "species-incomplete",
                            "custom species need a name, statistics and degrees of freedom",
                        )
                        .with_context("field", field),
                    )
                };
                let name = self.name.clone().ok_or_else(|| missing("name"))?;
                SpeciesSpec {
                    symbol: self.symbol.clone().unwrap_or_else(|| name.clone()),
                    statistics: self.statistics.ok_or_else(|| missing("statistics"))?,
                    dof: self.dof.ok_or_else(|| missing("dof"))?,
                    name,
                    mass: 0.0,
                    decoupling_temperature: 0.0,
                    grid: None,
                }
            }
        };
        if self.preset.is_some() {
            if let Some(name) = &self.name {
                spec.name = name.clone();
            }
            if let Some(symbol) = &self.symbol {
                spec.symbol = symbol.clone();
            }
            if let Some(statistics) = self.statistics {
                spec.statistics = statistics;
            }
            if let Some(dof) = self.dof {
                spec.dof = dof;
            }
        }
        if let Some(mass) = self.mass {
            spec.mass = mass;
        }
        if let Some(decoupling) = self.decoupling_temperature {
            spec.decoupling_temperature = decoupling;
        }
        if self.grid.is_some() {
            spec.grid = self.grid.clone();
        }
        Ok(spec)
    }
}

/// Interaction definitions understood by the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InteractionConfig {
    /// Relaxation of a decoupled species toward the plasma equilibrium.
    Relaxation {
        /// Target species name.
        species: String,
        /// Relaxation rate per e-fold of expansion.
        #[serde(default = "default_relaxation_rate")]
        rate: f64,
    },
    /// Free decay of a massive decoupled species.
    Decay {
        /// Decaying species name.
        species: String,
        /// Rest-frame lifetime in seconds.
        lifetime: f64,
    },
}

fn default_relaxation_rate() -> f64 {
    1.0
}

impl InteractionConfig {
    /// Name of the species the interaction acts on.
    pub fn species(&self) -> &str {
        match self {
            InteractionConfig::Relaxation { species, .. } | InteractionConfig::Decay { species, .. } => {
                species
            }
        }
    }

    fn validate(&self) -> Result<(), BbnError> {
        let (code, value) = match self {
            InteractionConfig::Relaxation { rate, .. } => ("relaxation-rate", *rate),
            InteractionConfig::Decay { lifetime, .. } => ("decay-lifetime", *lifetime),
        };
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(BbnError::Config(
                ErrorInfo::new(code, "interaction parameter must be positive and finite")
                    .with_context("species", self.species())
                    .with_context("value", value.to_string()),
            ))
        }
    }
}

/// Linear mixing of collision integrals between flavours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixingConfig {
    /// Mixed species, in pattern order.
    pub species: Vec<String>,
    /// Square matrix: `I_A ← Σ_B pattern[A][B] · I_B`.
    pub pattern: Vec<Vec<f64>>,
}

impl MixingConfig {
    fn validate(&self) -> Result<(), BbnError> {
        let n = self.species.len();
        let square = self.pattern.len() == n && self.pattern.iter().all(|row| row.len() == n);
        if n == 0 || !square {
            return Err(BbnError::Config(
                ErrorInfo::new("mixing-pattern", "mixing pattern must be a square matrix over the listed species")
                    .with_context("species", n.to_string())
                    .with_context("rows", self.pattern.len().to_string()),
            ));
        }
        if self.pattern.iter().flatten().any(|weight| !weight.is_finite()) {
            return Err(BbnError::config("mixing-pattern", "mixing weights must be finite"));
        }
        Ok(())
    }
}

/// Numerical choices of the kinetic solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KineticsConfig {
    /// Interpolation between grid nodes.
    #[serde(default)]
    pub interpolation: InterpolationMode,
    /// Order of integration and summation of collision terms.
    #[serde(default)]
    pub integration_order: IntegrationOrder,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Worker threads for collision integrals; 0 evaluates on the loop thread.
    #[serde(default)]
    pub threads: usize,
}

/// Checkpointing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Interval in steps between checkpoint writes (0 disables checkpoints).
    #[serde(default)]
    pub interval: usize,
    /// Maximum number of checkpoints to retain; must be positive when `interval` is.
    #[serde(default = "default_checkpoint_retention")]
    pub max_to_keep: usize,
}

fn default_checkpoint_retention() -> usize {
    4
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval: 0,
            max_to_keep: default_checkpoint_retention(),
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Nothing is written when unset.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Evolution log filename relative to `run_directory`.
    #[serde(default = "default_evolution_filename")]
    pub evolution_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Subdirectory used for checkpoint files.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    /// Directory for final per-species exports.
    #[serde(default = "default_end_state_dir")]
    pub end_state_dir: PathBuf,
}

fn default_evolution_filename() -> PathBuf {
    PathBuf::from("evolution.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

fn default_end_state_dir() -> PathBuf {
    PathBuf::from("end_state")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            evolution_file: default_evolution_filename(),
            manifest_file: default_manifest_filename(),
            checkpoint_dir: default_checkpoint_dir(),
            end_state_dir: default_end_state_dir(),
        }
    }
}
