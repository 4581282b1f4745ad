//! Mutable cosmological state threaded through every evolution step.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::errors::{BbnError, ErrorInfo};
use crate::units::{CONST, UNITS};

/// Cosmological parameters of a single simulation run.
///
/// The evolution loop owns exactly one instance and passes it explicitly to
/// species and interactions. The control variable is the normalised scale
/// factor `x`; the primary unknown is the comoving temperature `aT`. The
/// physical scale factor, temperature, time and Hubble rate are derived from
/// them in [`CosmologicalState::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmologicalState {
    /// Initial physical temperature of the run.
    pub t_initial: f64,
    /// Terminal physical temperature; the run stops once `temperature` drops to it.
    pub t_final: f64,
    /// Arbitrary normalisation of the conformal scale factor, `x = a · m`.
    pub mass_normalization: f64,
    /// Logarithmic step size in the evolution variable, `dy = d ln x`.
    pub dy: f64,
    /// Scale factor increment of the current step.
    pub dx: f64,
    /// Normalised scale factor.
    pub x: f64,
    /// Comoving temperature `a · T`.
    pub a_t: f64,
    /// Physical scale factor.
    pub a: f64,
    /// Physical temperature.
    pub temperature: f64,
    /// Cosmic time in MeV⁻¹.
    pub time: f64,
    /// Hubble expansion rate in MeV.
    pub hubble: f64,
    /// Total energy density in MeV⁴.
    pub rho: f64,
}

impl CosmologicalState {
    /// Infers the initial state from the temperature bounds.
    ///
    /// The initial scale factor is `1 / (T_initial / MeV)` so that `aT` starts
    /// at 1 MeV.
    pub fn new(
        t_initial: f64,
        t_final: f64,
        dy: f64,
        mass_normalization: f64,
    ) -> Result<Self, BbnError> {
        if !t_initial.is_finite() || t_initial <= 0.0 {
            return Err(BbnError::Config(
                ErrorInfo::new("initial-temperature", "initial temperature must be positive")
                    .with_context("t_initial", t_initial.to_string()),
            ));
        }
        if !t_final.is_finite() || t_final < 0.0 || t_final >= t_initial {
            return Err(BbnError::Config(
                ErrorInfo::new(
                    "temperature-bounds",
                    "final temperature must be non-negative and below the initial temperature",
                )
                .with_context("t_initial", t_initial.to_string())
                .with_context("t_final", t_final.to_string()),
            ));
        }
        if !dy.is_finite() || dy <= 0.0 {
            return Err(BbnError::Config(
                ErrorInfo::new("step-size", "evolution step must be positive and finite")
                    .with_context("dy", dy.to_string()),
            ));
        }
        if !mass_normalization.is_finite() || mass_normalization <= 0.0 {
            return Err(BbnError::config(
                "mass-normalization",
                "scale factor normalisation must be positive",
            ));
        }
        let a = 1.0 / (t_initial / UNITS.mev);
        Ok(Self {
            t_initial,
            t_final,
            mass_normalization,
            dy,
            dx: 0.0,
            x: a * mass_normalization,
            a_t: a * t_initial,
            a,
            temperature: t_initial,
            time: 0.0,
            hubble: 0.0,
            rho: 0.0,
        })
    }

    /// Computes and stores the scale factor increment for the next step.
    pub fn step_size(&mut self) -> f64 {
        self.dx = self.x * (self.dy.exp() - 1.0);
        self.dx
    }

    /// Whether the terminal temperature has been reached.
    pub fn finished(&self) -> bool {
        self.temperature <= self.t_final
    }

    /// Hubble rate implied by the Friedmann equation for the given energy density.
    pub fn hubble_rate(rho: f64) -> f64 {
        (8.0 / 3.0 * PI * CONST.g * rho).sqrt()
    }

    /// Refreshes all derived quantities from `x`, `aT` and the total energy density.
    ///
    /// Time advances as `Δt = (a_new / a_old − 1) / H`, using the Hubble rate of
    /// the energy density passed in.
    pub fn update(&mut self, rho: f64) -> Result<(), BbnError> {
        if !rho.is_finite() || rho < 0.0 {
            return Err(BbnError::Divergence(
                ErrorInfo::new("energy-density", "total energy density is negative or not finite")
                    .with_context("rho", rho.to_string()),
            ));
        }
        let hubble = Self::hubble_rate(rho);
        if !hubble.is_finite() || hubble <= 0.0 {
            return Err(BbnError::Divergence(
                ErrorInfo::new("hubble-rate", "Hubble rate is not finite and positive")
                    .with_context("hubble", hubble.to_string())
                    .with_context("rho", rho.to_string()),
            ));
        }
        self.rho = rho;
        self.hubble = hubble;

        let old_a = self.a;
        self.a = self.x / self.mass_normalization;
        self.temperature = self.a_t / self.a;
        self.time += (self.a / old_a - 1.0) / self.hubble;
        Ok(())
    }

    /// Cosmic time in seconds.
    pub fn time_seconds(&self) -> f64 {
        self.time / UNITS.s
    }
}
