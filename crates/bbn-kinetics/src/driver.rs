use std::sync::Arc;
use std::time::Instant;

use bbn_core::errors::BbnError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distribution::DistributionView;
use crate::executor::GridExecutor;
use crate::history::History;
use crate::integral::{CollisionIntegral, FamilyKey, GainLoss};
use crate::integrators::{adams_moulton_solve, order_for};
use crate::species::Species;

/// How gain and loss terms of several integrals are combined at one momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationOrder {
    /// Group integrals by family and integrate each group in one call.
    #[default]
    SumFirst,
    /// Integrate every integral on its own and add the results.
    IntegralFirst,
}

/// Turns attached collision integrals into the per-step integral array.
///
/// The stored value at every node is `(f_predicted − f) / dy`, where
/// `f_predicted` solves the implicit Adams-Moulton step with the summed gain
/// and loss terms and the species' past integrals.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionDriver {
    order: IntegrationOrder,
}

impl CollisionDriver {
    /// Creates a driver using the given combination order.
    pub fn new(order: IntegrationOrder) -> Self {
        Self { order }
    }

    /// Combination order.
    pub fn order(&self) -> IntegrationOrder {
        self.order
    }

    /// Total gain and loss of `integrals` at momentum `p0`.
    pub fn sum_gain_loss(
        &self,
        p0: f64,
        integrals: &[Arc<dyn CollisionIntegral>],
        view: &DistributionView<'_>,
    ) -> Result<GainLoss, BbnError> {
        let mut total = GainLoss::ZERO;
        match self.order {
            IntegrationOrder::IntegralFirst => {
                for integral in integrals {
                    total += integral.integrand_at(p0, view)?;
                }
            }
            IntegrationOrder::SumFirst => {
                let mut groups: IndexMap<FamilyKey, Vec<Arc<dyn CollisionIntegral>>> =
                    IndexMap::new();
                for integral in integrals {
                    groups
                        .entry(integral.family())
                        .or_default()
                        .push(Arc::clone(integral));
                }
                for group in groups.values() {
                    if let Some(leader) = group.first() {
                        total += leader.integrate_group(p0, group, view)?;
                    }
                }
            }
        }
        Ok(total)
    }

    /// Collision integral at grid node `index` (momentum `p0`).
    pub fn integral_at(
        &self,
        index: usize,
        p0: f64,
        integrals: &[Arc<dyn CollisionIntegral>],
        view: &DistributionView<'_>,
        history: &History<Vec<f64>>,
        dy: f64,
    ) -> Result<f64, BbnError> {
        let GainLoss { gain, loss } = self.sum_gain_loss(p0, integrals, view)?;
        let current = view.evaluate(p0);
        let past: Vec<f64> = history
            .newest_first()
            .map(|row| row.get(index).copied().unwrap_or(0.0))
            .collect();
        let order = order_for(history.len());
        let predicted = adams_moulton_solve(current, &past, gain, loss, dy, order);
        Ok((predicted - current) / dy)
    }

    /// Collision integral of `species` on its whole grid.
    ///
    /// Species without attached integrals yield zeros without touching the
    /// executor.
    pub fn compute(
        &self,
        species: &Species,
        a: f64,
        dy: f64,
        executor: &dyn GridExecutor,
    ) -> Result<Vec<f64>, BbnError> {
        let integrals = species.integrals();
        if integrals.is_empty() {
            return Ok(vec![0.0; species.grid().len()]);
        }
        let started = Instant::now();
        let view = species.view(a);
        let history = species.history();
        let task = |index: usize, p0: f64| -> Result<f64, BbnError> {
            self.integral_at(index, p0, integrals, &view, history, dy)
        };
        let values = executor
            .map(species.grid().points(), &task)
            .map_err(|err| err.with_context("species", species.name()))?;
        debug!(
            species = species.name(),
            integrals = integrals.len(),
            executor = executor.name(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
            "collision integral computed"
        );
        Ok(values)
    }
}
