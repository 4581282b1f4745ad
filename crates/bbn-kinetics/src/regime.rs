use serde::{Deserialize, Serialize};

/// Ratio between temperature and mass at which the regime switches.
///
/// A species is treated as radiation while `T > M · REGIME_FACTOR` and as dust
/// once `T · REGIME_FACTOR < M`.
pub const REGIME_FACTOR: f64 = 10.0;

/// Dynamical treatment applied to a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    /// Ultra-relativistic equilibrium: the mass is neglected and all values are analytic.
    Radiation,
    /// Non-relativistic equilibrium: Boltzmann-limit analytic formulas.
    Dust,
    /// Equilibrium with mass comparable to temperature: exact Bose/Fermi integrals.
    Intermediate,
    /// Decoupled: the stored distribution function is the only source of truth.
    NonEquilibrium,
}

impl Regime {
    /// Classifies a species from its temperature, mass and decoupling temperature.
    pub fn classify(temperature: f64, mass: f64, decoupling_temperature: f64) -> Regime {
        if temperature <= decoupling_temperature {
            Regime::NonEquilibrium
        } else if temperature > mass * REGIME_FACTOR {
            Regime::Radiation
        } else if temperature * REGIME_FACTOR < mass {
            Regime::Dust
        } else {
            Regime::Intermediate
        }
    }

    /// Whether the regime describes a species in thermal equilibrium.
    pub fn in_equilibrium(self) -> bool {
        self != Regime::NonEquilibrium
    }

    /// Stable lower-case label used in logs and artefacts.
    pub fn as_str(self) -> &'static str {
        match self {
            Regime::Radiation => "radiation",
            Regime::Dust => "dust",
            Regime::Intermediate => "intermediate",
            Regime::NonEquilibrium => "non-equilibrium",
        }
    }
}
