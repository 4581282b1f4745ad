//! Thermodynamic formulas per regime.
//!
//! Notation: `g` degrees of freedom, `τ = aT`, `M̃ = M a`, `E = sqrt(y² + M̃²)`.
//! The temperature equation is `d(aT)/dy = x N / D`; every species contributes
//! one term to the numerator `N` and one to the denominator `D`.

use std::f64::consts::PI;

use bbn_core::CONST;

use crate::distribution::conformal_energy;
use crate::grid::Grid;
use crate::quadrature::{simpson, simpson_samples, DEFAULT_INTERVALS};
use crate::regime::Regime;
use crate::statistics::Statistics;

/// Upper limit of intermediate-regime momentum integrals in units of `τ`.
pub const MOMENTUM_CUTOFF: f64 = 50.0;

/// Inputs shared by every formula.
#[derive(Debug, Clone, Copy)]
pub struct ThermoContext<'a> {
    /// Quantum statistics.
    pub statistics: Statistics,
    /// Degrees of freedom.
    pub dof: f64,
    /// Rest mass.
    pub mass: f64,
    /// Species temperature.
    pub temperature: f64,
    /// Species comoving temperature.
    pub a_t: f64,
    /// Scale factor of the universe.
    pub a: f64,
    /// Normalised scale factor of the universe.
    pub x: f64,
    /// Momentum grid of the stored arrays.
    pub grid: &'a Grid,
    /// Stored occupation numbers.
    pub distribution: &'a [f64],
    /// Last applied collision integral.
    pub collision_integral: &'a [f64],
}

/// Formula signature.
pub type ThermoFn = fn(&ThermoContext<'_>) -> f64;

/// Function table for one regime.
#[derive(Debug, Clone, Copy)]
pub struct RegimeFormulas {
    /// Number density.
    pub density: ThermoFn,
    /// Energy density.
    pub energy_density: ThermoFn,
    /// Pressure.
    pub pressure: ThermoFn,
    /// Contribution to the temperature-equation numerator.
    pub numerator: ThermoFn,
    /// Contribution to the temperature-equation denominator.
    pub denominator: ThermoFn,
}

const RADIATION: RegimeFormulas = RegimeFormulas {
    density: radiation_density,
    energy_density: radiation_energy_density,
    pressure: radiation_pressure,
    numerator: zero,
    denominator: radiation_denominator,
};

const DUST: RegimeFormulas = RegimeFormulas {
    density: dust_density,
    energy_density: dust_energy_density,
    pressure: dust_pressure,
    numerator: dust_numerator,
    denominator: dust_denominator,
};

const INTERMEDIATE: RegimeFormulas = RegimeFormulas {
    density: intermediate_density,
    energy_density: intermediate_energy_density,
    pressure: intermediate_pressure,
    numerator: intermediate_numerator,
    denominator: intermediate_denominator,
};

const NON_EQUILIBRIUM: RegimeFormulas = RegimeFormulas {
    density: non_equilibrium_density,
    energy_density: non_equilibrium_energy_density,
    pressure: non_equilibrium_pressure,
    numerator: non_equilibrium_numerator,
    denominator: zero,
};

/// Formula table for `regime`.
pub fn formulas(regime: Regime) -> &'static RegimeFormulas {
    match regime {
        Regime::Radiation => &RADIATION,
        Regime::Dust => &DUST,
        Regime::Intermediate => &INTERMEDIATE,
        Regime::NonEquilibrium => &NON_EQUILIBRIUM,
    }
}

fn zero(_: &ThermoContext<'_>) -> f64 {
    0.0
}

fn phase_space(ctx: &ThermoContext<'_>) -> f64 {
    ctx.dof / (2.0 * PI * PI)
}

fn conformal_mass(ctx: &ThermoContext<'_>) -> f64 {
    ctx.mass * ctx.a
}

// radiation

fn radiation_density(ctx: &ThermoContext<'_>) -> f64 {
    ctx.dof * ctx.statistics.density_factor() * CONST.zeta_3 / (PI * PI)
        * ctx.temperature.powi(3)
}

fn radiation_energy_density(ctx: &ThermoContext<'_>) -> f64 {
    ctx.dof * ctx.statistics.energy_factor() * PI * PI / 30.0 * ctx.temperature.powi(4)
}

fn radiation_pressure(ctx: &ThermoContext<'_>) -> f64 {
    radiation_energy_density(ctx) / 3.0
}

fn radiation_denominator(ctx: &ThermoContext<'_>) -> f64 {
    ctx.dof * ctx.statistics.energy_factor() * (2.0 * PI * PI / 15.0) * ctx.a_t.powi(3)
}

// dust

fn dust_comoving_density(ctx: &ThermoContext<'_>) -> f64 {
    let m = conformal_mass(ctx);
    ctx.dof * (m * ctx.a_t / (2.0 * PI)).powf(1.5) * (-m / ctx.a_t).exp()
}

fn dust_density(ctx: &ThermoContext<'_>) -> f64 {
    dust_comoving_density(ctx) / ctx.a.powi(3)
}

fn dust_energy_density(ctx: &ThermoContext<'_>) -> f64 {
    dust_density(ctx) * (ctx.mass + 1.5 * ctx.temperature)
}

fn dust_pressure(ctx: &ThermoContext<'_>) -> f64 {
    dust_density(ctx) * ctx.temperature
}

fn dust_numerator(ctx: &ThermoContext<'_>) -> f64 {
    let m = conformal_mass(ctx);
    dust_comoving_density(ctx) * m * m / (ctx.a_t * ctx.x)
}

fn dust_denominator(ctx: &ThermoContext<'_>) -> f64 {
    let ratio = conformal_mass(ctx) / ctx.a_t;
    dust_comoving_density(ctx) * (ratio * ratio + 3.0 * ratio + 3.75)
}

// intermediate

fn integrate_equilibrium<F>(ctx: &ThermoContext<'_>, weight: F) -> f64
where
    F: Fn(f64, f64, f64) -> f64,
{
    let m = conformal_mass(ctx);
    let tau = ctx.a_t;
    let statistics = ctx.statistics;
    simpson(
        |y| {
            let e = (y * y + m * m).sqrt();
            if e == 0.0 {
                return 0.0;
            }
            weight(y, e, statistics.occupation(e / tau))
        },
        0.0,
        MOMENTUM_CUTOFF * tau,
        DEFAULT_INTERVALS,
    )
}

fn integrate_equilibrium_slope<F>(ctx: &ThermoContext<'_>, weight: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let m = conformal_mass(ctx);
    let tau = ctx.a_t;
    let statistics = ctx.statistics;
    simpson(
        |y| {
            let e = (y * y + m * m).sqrt();
            if e == 0.0 {
                return 0.0;
            }
            weight(y, e) * statistics.occupation_slope(e / tau)
        },
        0.0,
        MOMENTUM_CUTOFF * tau,
        DEFAULT_INTERVALS,
    )
}

fn intermediate_density(ctx: &ThermoContext<'_>) -> f64 {
    phase_space(ctx) * integrate_equilibrium(ctx, |y, _, f| y * y * f) / ctx.a.powi(3)
}

fn intermediate_energy_density(ctx: &ThermoContext<'_>) -> f64 {
    phase_space(ctx) * integrate_equilibrium(ctx, |y, e, f| y * y * e * f) / ctx.a.powi(4)
}

fn intermediate_pressure(ctx: &ThermoContext<'_>) -> f64 {
    phase_space(ctx) * integrate_equilibrium(ctx, |y, e, f| y.powi(4) / (3.0 * e) * f)
        / ctx.a.powi(4)
}

fn intermediate_numerator(ctx: &ThermoContext<'_>) -> f64 {
    let m = conformal_mass(ctx);
    phase_space(ctx) * m * m / (ctx.a_t * ctx.x)
        * integrate_equilibrium_slope(ctx, |y, _| y * y)
}

fn intermediate_denominator(ctx: &ThermoContext<'_>) -> f64 {
    phase_space(ctx) / (ctx.a_t * ctx.a_t) * integrate_equilibrium_slope(ctx, |y, e| y * y * e * e)
}

// non-equilibrium

fn integrate_stored<F>(ctx: &ThermoContext<'_>, values: &[f64], weight: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let points = ctx.grid.points();
    let samples: Vec<f64> = points
        .iter()
        .zip(values)
        .map(|(&y, &value)| {
            let e = conformal_energy(y, ctx.mass, ctx.a);
            if e == 0.0 {
                0.0
            } else {
                weight(y, e) * value
            }
        })
        .collect();
    simpson_samples(points, &samples)
}

fn non_equilibrium_density(ctx: &ThermoContext<'_>) -> f64 {
    phase_space(ctx) * integrate_stored(ctx, ctx.distribution, |y, _| y * y) / ctx.a.powi(3)
}

fn non_equilibrium_energy_density(ctx: &ThermoContext<'_>) -> f64 {
    phase_space(ctx) * integrate_stored(ctx, ctx.distribution, |y, e| y * y * e) / ctx.a.powi(4)
}

fn non_equilibrium_pressure(ctx: &ThermoContext<'_>) -> f64 {
    phase_space(ctx) * integrate_stored(ctx, ctx.distribution, |y, e| y.powi(4) / (3.0 * e))
        / ctx.a.powi(4)
}

fn non_equilibrium_numerator(ctx: &ThermoContext<'_>) -> f64 {
    -phase_space(ctx) / ctx.x * integrate_stored(ctx, ctx.collision_integral, |y, e| y * y * e)
}
