use std::fmt;
use std::sync::Arc;

use bbn_core::errors::BbnError;
use bbn_core::{CosmologicalState, UNITS};
use bbn_kinetics::distribution::equilibrium;
use bbn_kinetics::{CollisionIntegral, DistributionView, FamilyKey, GainLoss, Species};

use crate::config::InteractionConfig;

/// Collision integral bound to a species for the current step.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Name of the species receiving the integral.
    pub species: String,
    /// The integral itself.
    pub integral: Arc<dyn CollisionIntegral>,
}

/// Source of collision integrals, consulted once per step.
///
/// Implementations inspect the state and the species after the regime
/// update and return the integrals that are active for this step. The
/// returned integrals should capture every state value they need.
pub trait Interaction: Send + Sync + fmt::Debug {
    /// Human readable label.
    fn name(&self) -> &str;

    /// Integrals active for the current step.
    fn initialize(&self, state: &CosmologicalState, species: &[Species]) -> Vec<Attachment>;
}

fn find<'s>(species: &'s [Species], name: &str) -> Option<&'s Species> {
    species.iter().find(|candidate| candidate.name() == name)
}

/// Relaxation toward the plasma equilibrium at a fixed rate per e-fold.
///
/// Gain `κ f_eq(p; aT_plasma)` and loss `κ` drive the occupation toward the
/// equilibrium shape at the current plasma temperature.
#[derive(Debug, Clone)]
pub struct RelaxationInteraction {
    name: String,
    species: String,
    rate: f64,
}

impl RelaxationInteraction {
    /// Relaxation of `species` with rate `rate` per e-fold.
    pub fn new(species: impl Into<String>, rate: f64) -> Self {
        let species = species.into();
        Self {
            name: format!("{species} relaxation"),
            species,
            rate,
        }
    }
}

#[derive(Debug)]
struct RelaxationIntegral {
    rate: f64,
    bath_a_t: f64,
}

impl CollisionIntegral for RelaxationIntegral {
    fn family(&self) -> FamilyKey {
        FamilyKey::new("relaxation")
    }

    fn integrand_at(&self, p0: f64, view: &DistributionView<'_>) -> Result<GainLoss, BbnError> {
        let target = equilibrium(view.statistics, p0, view.mass, view.a, self.bath_a_t);
        Ok(GainLoss::new(self.rate * target, self.rate))
    }
}

impl Interaction for RelaxationInteraction {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, state: &CosmologicalState, species: &[Species]) -> Vec<Attachment> {
        match find(species, &self.species) {
            Some(target) if !target.in_equilibrium() => vec![Attachment {
                species: self.species.clone(),
                integral: Arc::new(RelaxationIntegral {
                    rate: self.rate,
                    bath_a_t: state.a_t,
                }),
            }],
            _ => Vec::new(),
        }
    }
}

/// Free decay of a massive species with a rest-frame lifetime.
///
/// The loss rate per e-fold is `(Γ / H) · M̃ / E`, the time-dilated width in
/// units of the expansion rate. There is no gain term.
#[derive(Debug, Clone)]
pub struct DecayInteraction {
    name: String,
    species: String,
    width: f64,
}

impl DecayInteraction {
    /// Decay of `species` with lifetime `lifetime_s` seconds.
    pub fn new(species: impl Into<String>, lifetime_s: f64) -> Self {
        let species = species.into();
        Self {
            name: format!("{species} decay"),
            species,
            width: 1.0 / (lifetime_s * UNITS.s),
        }
    }

    /// Decay width `Γ` in MeV.
    pub fn width(&self) -> f64 {
        self.width
    }
}

#[derive(Debug)]
struct DecayIntegral {
    width_per_efold: f64,
}

impl CollisionIntegral for DecayIntegral {
    fn family(&self) -> FamilyKey {
        FamilyKey::new("decay")
    }

    fn integrand_at(&self, p0: f64, view: &DistributionView<'_>) -> Result<GainLoss, BbnError> {
        let energy = view.energy(p0);
        let dilation = if energy > 0.0 {
            view.mass * view.a / energy
        } else {
            0.0
        };
        Ok(GainLoss::new(0.0, self.width_per_efold * dilation))
    }
}

impl Interaction for DecayInteraction {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, state: &CosmologicalState, species: &[Species]) -> Vec<Attachment> {
        match find(species, &self.species) {
            Some(target) if !target.in_equilibrium() && state.hubble > 0.0 => vec![Attachment {
                species: self.species.clone(),
                integral: Arc::new(DecayIntegral {
                    width_per_efold: self.width / state.hubble,
                }),
            }],
            _ => Vec::new(),
        }
    }
}

/// Builds the interaction described by a configuration entry.
pub fn from_config(config: &InteractionConfig) -> Arc<dyn Interaction> {
    match config {
        InteractionConfig::Relaxation { species, rate } => {
            Arc::new(RelaxationInteraction::new(species.clone(), *rate))
        }
        InteractionConfig::Decay { species, lifetime } => {
            Arc::new(DecayInteraction::new(species.clone(), *lifetime))
        }
    }
}
