use std::sync::Arc;

use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_core::CosmologicalState;
use serde::{Deserialize, Serialize};

use crate::distribution::{equilibrium, DistributionView, InterpolationMode};
use crate::grid::{Grid, GridSpec};
use crate::history::History;
use crate::integral::CollisionIntegral;
use crate::regime::Regime;
use crate::statistics::Statistics;
use crate::thermo::{formulas, ThermoContext};

/// Static identity of a particle species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSpec {
    /// Human readable name, also used to attach interactions.
    pub name: String,
    /// Short symbol used for artefact file names.
    pub symbol: String,
    /// Quantum statistics.
    pub statistics: Statistics,
    /// Internal degrees of freedom.
    pub dof: f64,
    /// Rest mass in MeV.
    pub mass: f64,
    /// Temperature at or below which the species leaves equilibrium.
    #[serde(default)]
    pub decoupling_temperature: f64,
    /// Momentum grid overriding the run default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridSpec>,
}

impl SpeciesSpec {
    /// Checks the numeric fields for physical sense.
    pub fn validate(&self) -> Result<(), BbnError> {
        let invalid = |code: &str, message: &str, value: f64| {
            BbnError::Config(
                ErrorInfo::new(code, message)
                    .with_context("species", self.name.clone())
                    .with_context("value", value.to_string()),
            )
        };
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(BbnError::config(
                "species-name",
                "species name and symbol must not be empty",
            ));
        }
        if !self.dof.is_finite() || self.dof <= 0.0 {
            return Err(invalid("species-dof", "degrees of freedom must be positive", self.dof));
        }
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(invalid("species-mass", "mass must be finite and non-negative", self.mass));
        }
        if !self.decoupling_temperature.is_finite() || self.decoupling_temperature < 0.0 {
            return Err(invalid(
                "species-decoupling",
                "decoupling temperature must be finite and non-negative",
                self.decoupling_temperature,
            ));
        }
        Ok(())
    }
}

/// Regime change reported by [`Species::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeTransition {
    /// Species name.
    pub species: String,
    /// Regime before the update.
    pub from: Regime,
    /// Regime after the update.
    pub to: Regime,
    /// Species temperature at which the change was detected.
    pub temperature: f64,
}

/// A particle species and its kinetic state.
///
/// While in equilibrium the species follows the plasma temperature and its
/// observables are analytic. After decoupling its temperature is frozen and
/// the stored distribution array evolves under collision integrals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    spec: SpeciesSpec,
    grid: Grid,
    temperature: f64,
    a_t: f64,
    regime: Regime,
    distribution: Vec<f64>,
    collision_integral: Vec<f64>,
    history: History<Vec<f64>>,
    #[serde(default)]
    interpolation: InterpolationMode,
    #[serde(skip)]
    integrals: Vec<Arc<dyn CollisionIntegral>>,
}

impl Species {
    /// Creates a species at the state's temperature with an equilibrium-shaped distribution.
    pub fn new(
        spec: SpeciesSpec,
        default_grid: &GridSpec,
        state: &CosmologicalState,
        interpolation: InterpolationMode,
    ) -> Result<Self, BbnError> {
        spec.validate()?;
        let grid_spec = spec.grid.clone().unwrap_or_else(|| default_grid.clone());
        let grid = Grid::new(grid_spec).map_err(|err| err.with_context("species", spec.name.clone()))?;
        let regime = Regime::classify(state.temperature, spec.mass, spec.decoupling_temperature);
        let samples = grid.len();
        let mut species = Self {
            spec,
            grid,
            temperature: state.temperature,
            a_t: state.a_t,
            regime,
            distribution: vec![0.0; samples],
            collision_integral: vec![0.0; samples],
            history: History::default(),
            interpolation,
            integrals: Vec::new(),
        };
        species.reseed(state.a);
        Ok(species)
    }

    /// Static identity.
    pub fn spec(&self) -> &SpeciesSpec {
        &self.spec
    }

    /// Species name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Species symbol.
    pub fn symbol(&self) -> &str {
        &self.spec.symbol
    }

    /// Momentum grid of the stored arrays.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Species temperature (frozen after decoupling).
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Species comoving temperature (frozen after decoupling).
    pub fn a_t(&self) -> f64 {
        self.a_t
    }

    /// Current regime.
    pub fn regime(&self) -> Regime {
        self.regime
    }

    /// Whether the species is still in equilibrium.
    pub fn in_equilibrium(&self) -> bool {
        self.regime.in_equilibrium()
    }

    /// Stored occupation numbers.
    pub fn distribution(&self) -> &[f64] {
        &self.distribution
    }

    /// Last applied collision integral.
    pub fn collision_integral(&self) -> &[f64] {
        &self.collision_integral
    }

    /// Past collision integrals, newest last.
    pub fn history(&self) -> &History<Vec<f64>> {
        &self.history
    }

    /// Interpolation strategy of the distribution view.
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    /// Collision integrals attached for the current step.
    pub fn integrals(&self) -> &[Arc<dyn CollisionIntegral>] {
        &self.integrals
    }

    /// Attaches a collision integral for the current step.
    pub fn attach(&mut self, integral: Arc<dyn CollisionIntegral>) {
        self.integrals.push(integral);
    }

    /// Checks that restored arrays match the species grid.
    ///
    /// Deserialized species rebuild their grid from its spec, but the stored
    /// distribution, last integral and history rows are taken as written.
    pub fn validate_state(&self) -> Result<(), BbnError> {
        let expected = self.grid.len();
        let rows = std::iter::once(("distribution", self.distribution.len()))
            .chain(std::iter::once(("collision_integral", self.collision_integral.len())))
            .chain(self.history.newest_first().map(|row| ("history", row.len())));
        for (field, actual) in rows {
            if actual != expected {
                return Err(BbnError::Serde(
                    ErrorInfo::new("checkpoint-species", "stored species array does not match its grid")
                        .with_context("species", self.spec.name.clone())
                        .with_context("field", field)
                        .with_context("expected", expected.to_string())
                        .with_context("actual", actual.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Drops every attached collision integral.
    pub fn clear_integrals(&mut self) {
        self.integrals.clear();
    }

    /// Re-evaluates the regime against the current state.
    ///
    /// A species that was in equilibrium first adopts the plasma temperature.
    /// If that makes it decouple, the distribution array is reseeded to the
    /// equilibrium shape at the refreshed comoving temperature.
    pub fn update(&mut self, state: &CosmologicalState) -> Option<RegimeTransition> {
        let previous = self.regime;
        if previous.in_equilibrium() {
            self.temperature = state.temperature;
            self.a_t = state.a_t;
        }
        let current = Regime::classify(
            self.temperature,
            self.spec.mass,
            self.spec.decoupling_temperature,
        );
        self.regime = current;
        if previous.in_equilibrium() && !current.in_equilibrium() {
            self.reseed(state.a);
        }
        (previous != current).then(|| RegimeTransition {
            species: self.spec.name.clone(),
            from: previous,
            to: current,
            temperature: self.temperature,
        })
    }

    fn reseed(&mut self, a: f64) {
        let (statistics, mass, a_t) = (self.spec.statistics, self.spec.mass, self.a_t);
        for (value, &p) in self.distribution.iter_mut().zip(self.grid.points()) {
            *value = equilibrium(statistics, p, mass, a, a_t);
        }
    }

    /// Read-only view of the distribution at scale factor `a`.
    pub fn view(&self, a: f64) -> DistributionView<'_> {
        DistributionView {
            statistics: self.spec.statistics,
            mass: self.spec.mass,
            a,
            a_t: self.a_t,
            in_equilibrium: self.in_equilibrium(),
            grid: &self.grid,
            values: &self.distribution,
            mode: self.interpolation,
        }
    }

    /// Applies one step of collision integral `integral` with step `dy`.
    ///
    /// Decoupled species advance `f += I · dy` and record `I` in their
    /// history. Equilibrium species only remember the integral. Attached
    /// integrals are cleared in both cases.
    pub fn apply_collision_integral(&mut self, integral: Vec<f64>, dy: f64) -> Result<(), BbnError> {
        if integral.len() != self.grid.len() {
            return Err(BbnError::Collision(
                ErrorInfo::new("integral-length", "collision integral does not match the grid")
                    .with_context("species", self.spec.name.clone())
                    .with_context("expected", self.grid.len().to_string())
                    .with_context("actual", integral.len().to_string()),
            ));
        }
        self.integrals.clear();
        if self.in_equilibrium() {
            self.collision_integral = integral;
            return Ok(());
        }
        for (value, rate) in self.distribution.iter_mut().zip(&integral) {
            *value += rate * dy;
        }
        if let Some(index) = self.distribution.iter().position(|value| !value.is_finite()) {
            return Err(BbnError::Divergence(
                ErrorInfo::new("distribution", "distribution function is not finite")
                    .with_context("species", self.spec.name.clone())
                    .with_context("index", index.to_string()),
            ));
        }
        self.history.push(integral.clone());
        self.collision_integral = integral;
        Ok(())
    }

    fn thermo<'s>(&'s self, state: &CosmologicalState) -> ThermoContext<'s> {
        ThermoContext {
            statistics: self.spec.statistics,
            dof: self.spec.dof,
            mass: self.spec.mass,
            temperature: self.temperature,
            a_t: self.a_t,
            a: state.a,
            x: state.x,
            grid: &self.grid,
            distribution: &self.distribution,
            collision_integral: &self.collision_integral,
        }
    }

    /// Number density in MeV³.
    pub fn density(&self, state: &CosmologicalState) -> f64 {
        (formulas(self.regime).density)(&self.thermo(state))
    }

    /// Energy density in MeV⁴.
    pub fn energy_density(&self, state: &CosmologicalState) -> f64 {
        (formulas(self.regime).energy_density)(&self.thermo(state))
    }

    /// Pressure in MeV⁴.
    pub fn pressure(&self, state: &CosmologicalState) -> f64 {
        (formulas(self.regime).pressure)(&self.thermo(state))
    }

    /// Contribution to the temperature-equation numerator.
    pub fn numerator(&self, state: &CosmologicalState) -> f64 {
        (formulas(self.regime).numerator)(&self.thermo(state))
    }

    /// Contribution to the temperature-equation denominator.
    pub fn denominator(&self, state: &CosmologicalState) -> f64 {
        (formulas(self.regime).denominator)(&self.thermo(state))
    }
}
