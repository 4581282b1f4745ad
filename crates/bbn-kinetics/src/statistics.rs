use serde::{Deserialize, Serialize};

/// Quantum statistics of a particle species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistics {
    /// Fermi-Dirac, `1 / (e^E + 1)`.
    Fermion,
    /// Bose-Einstein, `1 / (e^E − 1)`.
    Boson,
}

impl Statistics {
    /// Sign entering the occupation denominator: `+1` for fermions, `−1` for bosons.
    pub fn eta(self) -> f64 {
        match self {
            Statistics::Fermion => 1.0,
            Statistics::Boson => -1.0,
        }
    }

    /// Equilibrium occupation number at reduced energy `e = E / T`.
    pub fn occupation(self, e: f64) -> f64 {
        1.0 / (e.exp() + self.eta())
    }

    /// `−df/de` at reduced energy `e`, written as `f (1 − η f)`.
    pub fn occupation_slope(self, e: f64) -> f64 {
        let f = self.occupation(e);
        f * (1.0 - self.eta() * f)
    }

    /// Ratio of the massless number density to the Bose-Einstein one.
    pub fn density_factor(self) -> f64 {
        match self {
            Statistics::Fermion => 0.75,
            Statistics::Boson => 1.0,
        }
    }

    /// Ratio of the massless energy density to the Bose-Einstein one.
    pub fn energy_factor(self) -> f64 {
        match self {
            Statistics::Fermion => 0.875,
            Statistics::Boson => 1.0,
        }
    }
}
