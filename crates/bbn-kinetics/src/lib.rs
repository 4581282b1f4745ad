#![deny(missing_docs)]
#![doc = "Non-equilibrium kinetics primitives: momentum grids, regime classification, distribution interpolation, Adams multi-step integrators and the collision-integral driver."]

/// Collision-integral driver combining active integrals through the implicit solver.
pub mod driver;
/// Read-only distribution views and log-odds interpolation.
pub mod distribution;
/// Grid-point executors (sequential and rayon thread pool).
pub mod executor;
/// Momentum grids.
pub mod grid;
/// Fixed-capacity history ring buffer.
pub mod history;
/// Contract for externally supplied collision integrals.
pub mod integral;
/// Adams-Bashforth and Adams-Moulton multi-step integrators.
pub mod integrators;
/// Quadrature rules over sampled and analytic integrands.
pub mod quadrature;
/// Regime classification.
pub mod regime;
/// Particle species state machine.
pub mod species;
/// Quantum statistics.
pub mod statistics;
/// Per-regime thermodynamic formula table.
pub mod thermo;

pub use distribution::{DistributionView, InterpolationMode};
pub use driver::{CollisionDriver, IntegrationOrder};
pub use executor::{GridExecutor, GridTask, RayonExecutor, SequentialExecutor};
pub use grid::{Grid, GridSpec};
pub use history::History;
pub use integral::{CollisionIntegral, FamilyKey, GainLoss};
pub use regime::{Regime, REGIME_FACTOR};
pub use species::{RegimeTransition, Species, SpeciesSpec};
pub use statistics::Statistics;
