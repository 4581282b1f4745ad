use bbn_kinetics::distribution::equilibrium;
use bbn_kinetics::{DistributionView, Grid, GridSpec, InterpolationMode, Statistics};
use proptest::prelude::*;

fn grid() -> Grid {
    Grid::new(GridSpec::Linear {
        min: 1e-3,
        max: 20.0,
        samples: 40,
    })
    .unwrap()
}

fn sampled(grid: &Grid, statistics: Statistics, mass: f64, a: f64, a_t: f64) -> Vec<f64> {
    grid.points()
        .iter()
        .map(|&p| equilibrium(statistics, p, mass, a, a_t))
        .collect()
}

fn view<'a>(
    grid: &'a Grid,
    values: &'a [f64],
    statistics: Statistics,
    mass: f64,
    in_equilibrium: bool,
    mode: InterpolationMode,
) -> DistributionView<'a> {
    DistributionView {
        statistics,
        mass,
        a: 0.5,
        a_t: 1.3,
        in_equilibrium,
        grid,
        values,
        mode,
    }
}

fn assert_relative(actual: f64, expected: f64, tol: f64) {
    let scale = expected.abs().max(1e-300);
    assert!(
        ((actual - expected) / scale).abs() < tol,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn equilibrium_species_use_closed_form_everywhere() {
    let grid = grid();
    let values = vec![0.0; grid.len()];
    let view = view(&grid, &values, Statistics::Fermion, 0.8, true, InterpolationMode::LogOdds);
    for p in [1e-3, 0.37, 5.0, 19.99, 25.0] {
        assert_relative(view.evaluate(p), view.equilibrium(p), 1e-15);
    }
    // continuous across the first node
    let first = grid.min();
    assert!((view.evaluate(first) - view.evaluate(first * (1.0 + 1e-9))).abs() < 1e-9);
}

#[test]
fn log_odds_reproduces_sampled_equilibrium() {
    let grid = grid();
    for statistics in [Statistics::Fermion, Statistics::Boson] {
        for mass in [0.0, 0.8] {
            let values = sampled(&grid, statistics, mass, 0.5, 1.3);
            let view = view(&grid, &values, statistics, mass, false, InterpolationMode::LogOdds);
            for p in [0.0123, 0.41, 3.3333, 7.77, 12.5, 19.3] {
                assert_relative(view.evaluate(p), view.equilibrium(p), 1e-9);
            }
        }
    }
}

#[test]
fn grid_hits_return_stored_values() {
    let grid = grid();
    let values: Vec<f64> = (0..grid.len()).map(|i| 0.01 * i as f64).collect();
    let view = view(&grid, &values, Statistics::Fermion, 0.0, false, InterpolationMode::LogOdds);
    for (idx, &p) in grid.points().iter().enumerate() {
        assert_eq!(view.evaluate(p), values[idx]);
    }
}

#[test]
fn outside_grid_behaviour() {
    let grid = grid();
    let values = sampled(&grid, Statistics::Fermion, 0.0, 0.5, 1.3);
    let view = view(&grid, &values, Statistics::Fermion, 0.0, false, InterpolationMode::LogOdds);
    // above the grid: closed form
    assert_eq!(view.evaluate(30.0), view.equilibrium(30.0));
    // below the grid: extrapolated from the first interval, exact for equilibrium data
    assert_relative(view.evaluate(1e-4), view.equilibrium(1e-4), 1e-9);
    // momentum sign is irrelevant
    assert_eq!(view.evaluate(-3.1), view.evaluate(3.1));
}

#[test]
fn linear_mode_stays_between_nodes() {
    let grid = grid();
    let values = sampled(&grid, Statistics::Fermion, 0.0, 0.5, 1.3);
    let view = view(&grid, &values, Statistics::Fermion, 0.0, false, InterpolationMode::Linear);
    let (lo, hi) = grid.bracket(3.3);
    let value = view.evaluate(3.3);
    assert!(value <= values[lo] && value >= values[hi]);
}

#[test]
fn depleted_nodes_do_not_raise() {
    let grid = grid();
    let mut values = vec![0.0; grid.len()];
    values[5] = 1.0;
    let view = view(&grid, &values, Statistics::Fermion, 0.0, false, InterpolationMode::LogOdds);
    for p in [0.2, 2.6, 2.7, 15.0] {
        assert!(view.evaluate(p).is_finite());
    }
}

proptest! {
    #[test]
    fn fermion_interpolation_stays_a_probability(p in -30.0f64..30.0, mass in 0.0f64..3.0) {
        let grid = grid();
        let values = sampled(&grid, Statistics::Fermion, mass, 0.5, 1.3);
        let view = view(&grid, &values, Statistics::Fermion, mass, false, InterpolationMode::LogOdds);
        let value = view.evaluate(p);
        prop_assert!(value.is_finite());
        prop_assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn equilibrium_arrays_interpolate_exactly(p in 1e-3f64..20.0, mass in 0.0f64..3.0) {
        let grid = grid();
        let values = sampled(&grid, Statistics::Fermion, mass, 0.5, 1.3);
        let view = view(&grid, &values, Statistics::Fermion, mass, false, InterpolationMode::LogOdds);
        let expected = view.equilibrium(p);
        prop_assert!(((view.evaluate(p) - expected) / expected).abs() < 1e-9);
    }
}
