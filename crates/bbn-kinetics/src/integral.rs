use std::fmt;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use bbn_core::errors::BbnError;
use serde::{Deserialize, Serialize};

use crate::distribution::DistributionView;

/// Gain (`A`) and loss (`B`) terms of a collision integral at one momentum.
///
/// The integral is `A − B · f(p0)`, so a positive loss rate damps the
/// occupation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GainLoss {
    /// Gain term `A`, independent of `f(p0)`.
    pub gain: f64,
    /// Loss rate `B`, multiplying `f(p0)`.
    pub loss: f64,
}

impl GainLoss {
    /// Zero contribution.
    pub const ZERO: GainLoss = GainLoss {
        gain: 0.0,
        loss: 0.0,
    };

    /// Builds a gain/loss pair.
    pub fn new(gain: f64, loss: f64) -> Self {
        Self { gain, loss }
    }
}

impl Add for GainLoss {
    type Output = GainLoss;

    fn add(self, rhs: GainLoss) -> GainLoss {
        GainLoss {
            gain: self.gain + rhs.gain,
            loss: self.loss + rhs.loss,
        }
    }
}

impl AddAssign for GainLoss {
    fn add_assign(&mut self, rhs: GainLoss) {
        self.gain += rhs.gain;
        self.loss += rhs.loss;
    }
}

/// Identifier grouping integrals that share one batch integration routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FamilyKey(String);

impl FamilyKey {
    /// Creates a family key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Family name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One active Boltzmann collision term attached to a species for one step.
///
/// Implementations capture whatever state they need when created and must be
/// safe to call concurrently from executor workers.
pub trait CollisionIntegral: Send + Sync + fmt::Debug {
    /// Family used to batch integrals of the same kind.
    fn family(&self) -> FamilyKey;

    /// Gain and loss terms at conformal momentum `p0`.
    fn integrand_at(&self, p0: f64, view: &DistributionView<'_>) -> Result<GainLoss, BbnError>;

    /// Gain and loss summed over a group of integrals of this family.
    ///
    /// Called on the first member of each group with the whole group. The
    /// default adds member contributions in order; families with a shared
    /// quadrature can override it.
    fn integrate_group(
        &self,
        p0: f64,
        group: &[Arc<dyn CollisionIntegral>],
        view: &DistributionView<'_>,
    ) -> Result<GainLoss, BbnError> {
        let mut total = GainLoss::ZERO;
        for integral in group {
            total += integral.integrand_at(p0, view)?;
        }
        Ok(total)
    }
}
