use bbn_core::{BbnError, CosmologicalState};
use bbn_kinetics::distribution::equilibrium;
use bbn_kinetics::thermo::{formulas, ThermoContext};
use bbn_kinetics::{Grid, GridSpec, InterpolationMode, Regime, Species, SpeciesSpec, Statistics};

fn neutrino(decoupling: f64) -> SpeciesSpec {
    SpeciesSpec {
        name: "Electron neutrino".into(),
        symbol: "nu_e".into(),
        statistics: Statistics::Fermion,
        dof: 2.0,
        mass: 0.0,
        decoupling_temperature: decoupling,
        grid: None,
    }
}

fn state() -> CosmologicalState {
    CosmologicalState::new(10.0, 0.01, 0.025, 1.0).unwrap()
}

fn cool(state: &mut CosmologicalState, temperature: f64, a_t: f64) {
    state.a_t = a_t;
    state.a = a_t / temperature;
    state.x = state.a * state.mass_normalization;
    state.temperature = temperature;
}

#[test]
fn decoupling_reseeds_then_freezes() {
    let mut state = state();
    let mut species =
        Species::new(neutrino(5.0), &GridSpec::default(), &state, InterpolationMode::LogOdds)
            .unwrap();
    assert_eq!(species.regime(), Regime::Radiation);

    cool(&mut state, 6.0, 1.0);
    assert!(species.update(&state).is_none());
    assert_eq!(species.temperature(), 6.0);

    cool(&mut state, 4.9, 1.01);
    let transition = species.update(&state).expect("species decouples");
    assert_eq!(transition.from, Regime::Radiation);
    assert_eq!(transition.to, Regime::NonEquilibrium);
    assert_eq!(transition.temperature, 4.9);
    assert_eq!(species.a_t(), 1.01);
    for (&value, &p) in species.distribution().iter().zip(species.grid().points()) {
        let expected = equilibrium(Statistics::Fermion, p, 0.0, state.a, 1.01);
        assert!((value - expected).abs() < 1e-15);
    }

    let seeded = species.distribution().to_vec();
    cool(&mut state, 2.0, 1.05);
    assert!(species.update(&state).is_none());
    assert_eq!(species.temperature(), 4.9);
    assert_eq!(species.a_t(), 1.01);
    assert_eq!(species.distribution(), seeded.as_slice());
}

#[test]
fn collision_integral_updates_only_decoupled_species() {
    let state = state();
    let grid = GridSpec::Linear {
        min: 0.1,
        max: 5.0,
        samples: 8,
    };

    let mut coupled = Species::new(neutrino(1.0), &grid, &state, InterpolationMode::LogOdds).unwrap();
    let before = coupled.distribution().to_vec();
    coupled.apply_collision_integral(vec![1.0; 8], 0.1).unwrap();
    assert_eq!(coupled.distribution(), before.as_slice());
    assert!(coupled.history().is_empty());

    let mut decoupled =
        Species::new(neutrino(20.0), &grid, &state, InterpolationMode::LogOdds).unwrap();
    assert_eq!(decoupled.regime(), Regime::NonEquilibrium);
    let before = decoupled.distribution().to_vec();
    decoupled.apply_collision_integral(vec![0.5; 8], 0.1).unwrap();
    for (after, before) in decoupled.distribution().iter().zip(&before) {
        assert!((after - before - 0.05).abs() < 1e-15);
    }
    assert_eq!(decoupled.history().len(), 1);
    assert_eq!(decoupled.collision_integral(), &[0.5; 8]);

    let err = decoupled.apply_collision_integral(vec![0.0; 3], 0.1).unwrap_err();
    assert!(matches!(err, BbnError::Collision(_)));

    let mut poisoned = vec![0.0; 8];
    poisoned[2] = f64::NAN;
    let err = decoupled.apply_collision_integral(poisoned, 0.1).unwrap_err();
    match err {
        BbnError::Divergence(info) => {
            assert_eq!(info.code, "distribution");
            assert_eq!(info.context.get("species").map(String::as_str), Some("Electron neutrino"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn invalid_species_are_rejected() {
    let state = state();
    let mut spec = neutrino(0.0);
    spec.dof = 0.0;
    let err = Species::new(spec, &GridSpec::default(), &state, InterpolationMode::LogOdds)
        .unwrap_err();
    assert_eq!(err.info().code, "species-dof");

    let mut spec = neutrino(0.0);
    spec.grid = Some(GridSpec::Log {
        min: 0.0,
        max: 1.0,
        samples: 4,
    });
    let err = Species::new(spec, &GridSpec::default(), &state, InterpolationMode::LogOdds)
        .unwrap_err();
    assert_eq!(err.info().code, "grid-bounds");
}

#[test]
fn photon_radiation_energy_density() {
    let state = state();
    let photon = SpeciesSpec {
        name: "Photon".into(),
        symbol: "gamma".into(),
        statistics: Statistics::Boson,
        dof: 2.0,
        mass: 0.0,
        decoupling_temperature: 0.0,
        grid: None,
    };
    let species = Species::new(photon, &GridSpec::default(), &state, InterpolationMode::LogOdds)
        .unwrap();
    let t = state.temperature;
    let expected = std::f64::consts::PI.powi(2) / 15.0 * t.powi(4);
    assert!((species.energy_density(&state) - expected).abs() / expected < 1e-12);
    assert!((species.pressure(&state) - expected / 3.0).abs() / expected < 1e-12);
    assert_eq!(species.numerator(&state), 0.0);
    assert!(species.denominator(&state) > 0.0);
}

fn context<'a>(grid: &'a Grid, values: &'a [f64], mass: f64, statistics: Statistics) -> ThermoContext<'a> {
    ThermoContext {
        statistics,
        dof: 2.0,
        mass,
        temperature: 1.0,
        a_t: 1.0,
        a: 1.0,
        x: 1.0,
        grid,
        distribution: values,
        collision_integral: values,
    }
}

#[test]
fn numeric_regimes_agree_with_analytic_limits() {
    let grid = Grid::new(GridSpec::Linear {
        min: 1e-3,
        max: 30.0,
        samples: 301,
    })
    .unwrap();
    let zeros = vec![0.0; grid.len()];
    for statistics in [Statistics::Fermion, Statistics::Boson] {
        let light = context(&grid, &zeros, 1e-3, statistics);
        let radiation = formulas(Regime::Radiation);
        let intermediate = formulas(Regime::Intermediate);
        for (analytic, numeric) in [
            (radiation.energy_density, intermediate.energy_density),
            (radiation.density, intermediate.density),
            (radiation.pressure, intermediate.pressure),
            (radiation.denominator, intermediate.denominator),
        ] {
            let expected = analytic(&light);
            assert!(((numeric(&light) - expected) / expected).abs() < 1e-4);
        }
    }

    let heavy = context(&grid, &zeros, 100.0, Statistics::Fermion);
    let dust = (formulas(Regime::Dust).density)(&heavy);
    let exact = (formulas(Regime::Intermediate).density)(&heavy);
    assert!(((dust - exact) / exact).abs() < 0.05);
}

#[test]
fn stored_equilibrium_array_matches_radiation_density() {
    let grid = Grid::new(GridSpec::Linear {
        min: 1e-3,
        max: 30.0,
        samples: 301,
    })
    .unwrap();
    let values: Vec<f64> = grid
        .points()
        .iter()
        .map(|&p| equilibrium(Statistics::Fermion, p, 0.0, 1.0, 1.0))
        .collect();
    let ctx = context(&grid, &values, 0.0, Statistics::Fermion);
    let stored = (formulas(Regime::NonEquilibrium).energy_density)(&ctx);
    let analytic = (formulas(Regime::Radiation).energy_density)(&ctx);
    assert!(((stored - analytic) / analytic).abs() < 1e-3);
    assert_eq!((formulas(Regime::NonEquilibrium).denominator)(&ctx), 0.0);
}

#[test]
fn species_survive_json_roundtrip() {
    let state = state();
    let species =
        Species::new(neutrino(20.0), &GridSpec::default(), &state, InterpolationMode::Linear)
            .unwrap();
    let json = serde_json::to_string(&species).unwrap();
    let restored: Species = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.distribution(), species.distribution());
    assert_eq!(restored.grid(), species.grid());
    assert_eq!(restored.regime(), species.regime());
    assert_eq!(restored.interpolation(), InterpolationMode::Linear);
    assert!(restored.integrals().is_empty());
}
