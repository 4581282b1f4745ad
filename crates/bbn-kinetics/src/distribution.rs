use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::statistics::Statistics;

/// Largest log-odds magnitude kept during interpolation.
///
/// Empty or saturated nodes map to infinite log-odds; capping them keeps the
/// linear blend finite while still inverting to an occupation of zero.
const LOG_ODDS_CAP: f64 = 700.0;

/// Strategy used to evaluate a stored distribution between grid nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    /// Linear in conformal energy after mapping occupations to `ln(1/f − η)`.
    ///
    /// `η` is +1 for fermions and −1 for bosons, so the map is exactly linear
    /// in energy for either equilibrium shape. A fixed `ln(1/f − 1)` would only
    /// be exact for fermions.
    #[default]
    LogOdds,
    /// Plain linear interpolation in momentum.
    Linear,
}

/// Conformal energy `sqrt(p² + (M a)²)`, or `|p|` for massless species.
pub fn conformal_energy(p: f64, mass: f64, a: f64) -> f64 {
    if mass == 0.0 {
        p.abs()
    } else {
        let conformal_mass = mass * a;
        (p * p + conformal_mass * conformal_mass).sqrt()
    }
}

/// Equilibrium occupation at conformal momentum `p` and comoving temperature `a_t`.
pub fn equilibrium(statistics: Statistics, p: f64, mass: f64, a: f64, a_t: f64) -> f64 {
    statistics.occupation(conformal_energy(p, mass, a) / a_t)
}

fn log_odds(value: f64, eta: f64) -> f64 {
    let odds = 1.0 / value - eta;
    if odds > 0.0 {
        odds.ln().clamp(-LOG_ODDS_CAP, LOG_ODDS_CAP)
    } else {
        0.0
    }
}

/// Read-only snapshot of a species distribution, shared with collision integrals.
///
/// Views borrow the species grid and values, so they are cheap to build and
/// `Sync` for the parallel executor.
#[derive(Debug, Clone, Copy)]
pub struct DistributionView<'a> {
    /// Quantum statistics of the species.
    pub statistics: Statistics,
    /// Rest mass in MeV.
    pub mass: f64,
    /// Scale factor at which energies are evaluated.
    pub a: f64,
    /// Comoving temperature used by the equilibrium closed form.
    pub a_t: f64,
    /// Whether the species is still in equilibrium.
    pub in_equilibrium: bool,
    /// Momentum grid of the stored values.
    pub grid: &'a Grid,
    /// Stored occupations, one per grid node.
    pub values: &'a [f64],
    /// Interpolation strategy between nodes.
    pub mode: InterpolationMode,
}

impl<'a> DistributionView<'a> {
    /// Conformal energy of momentum `p` for this species.
    pub fn energy(&self, p: f64) -> f64 {
        conformal_energy(p, self.mass, self.a)
    }

    /// Closed-form equilibrium occupation at momentum `p`.
    pub fn equilibrium(&self, p: f64) -> f64 {
        equilibrium(self.statistics, p, self.mass, self.a, self.a_t)
    }

    /// Occupation number at conformal momentum `p`.
    ///
    /// Equilibrium species and momenta above the grid use the closed form;
    /// exact grid hits return the stored value and everything else is
    /// interpolated from the bracketing nodes.
    pub fn evaluate(&self, p: f64) -> f64 {
        let p = p.abs();
        if self.in_equilibrium || p > self.grid.max() {
            return self.equilibrium(p);
        }
        if let Some(index) = self.grid.index_of(p) {
            return self.values[index];
        }

        let (lo, hi) = self.grid.bracket(p);
        let points = self.grid.points();
        match self.mode {
            InterpolationMode::LogOdds => {
                let eta = self.statistics.eta();
                let (e0, e1) = (self.energy(points[lo]), self.energy(points[hi]));
                let weight = (self.energy(p) - e0) / (e1 - e0);
                let (l0, l1) = (log_odds(self.values[lo], eta), log_odds(self.values[hi], eta));
                let ell = l0 + (l1 - l0) * weight;
                1.0 / (ell.exp() + eta)
            }
            InterpolationMode::Linear => {
                let weight = (p - points[lo]) / (points[hi] - points[lo]);
                self.values[lo] + (self.values[hi] - self.values[lo]) * weight
            }
        }
    }

    /// Occupations evaluated on every grid node.
    ///
    /// For decoupled species this is the stored array; equilibrium species
    /// report their closed form.
    pub fn sample(&self) -> Vec<f64> {
        self.grid.points().iter().map(|&p| self.evaluate(p)).collect()
    }
}
