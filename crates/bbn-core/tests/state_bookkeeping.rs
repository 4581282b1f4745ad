use bbn_core::{BbnError, CosmologicalState, UNITS};

#[test]
fn initial_state_follows_temperature_bound() {
    let state = CosmologicalState::new(10.0 * UNITS.mev, 1.0 * UNITS.mev, 0.05, UNITS.mev).unwrap();
    assert!((state.a - 0.1).abs() < 1e-15);
    assert!((state.a_t - 1.0).abs() < 1e-15);
    assert!((state.x - 0.1).abs() < 1e-15);
    assert_eq!(state.time, 0.0);
    assert!(!state.finished());
}

#[test]
fn invalid_bounds_fail_fast() {
    let err = CosmologicalState::new(1.0, 2.0, 0.05, 1.0).unwrap_err();
    assert!(matches!(err, BbnError::Config(_)));
    assert_eq!(err.info().code, "temperature-bounds");

    let err = CosmologicalState::new(-1.0, 0.0, 0.05, 1.0).unwrap_err();
    assert_eq!(err.info().code, "initial-temperature");

    let err = CosmologicalState::new(10.0, 1.0, 0.0, 1.0).unwrap_err();
    assert_eq!(err.info().code, "step-size");
}

#[test]
fn update_derives_scale_factor_temperature_and_time() {
    let mut state = CosmologicalState::new(10.0, 1.0, 0.1, 1.0).unwrap();
    let rho = 1.0;
    state.update(rho).unwrap();
    assert_eq!(state.time, 0.0);

    let dx = state.step_size();
    assert!((dx - state.x * (0.1f64.exp() - 1.0)).abs() < 1e-15);
    let old_a = state.a;
    state.x += dx;
    state.update(rho).unwrap();

    assert!((state.a - state.x / state.mass_normalization).abs() < 1e-15);
    assert!((state.temperature - state.a_t / state.a).abs() < 1e-12);
    let expected_dt = (state.a / old_a - 1.0) / CosmologicalState::hubble_rate(rho);
    assert!((state.time - expected_dt).abs() <= 1e-12 * expected_dt);
}

#[test]
fn negative_energy_density_is_fatal() {
    let mut state = CosmologicalState::new(10.0, 1.0, 0.1, 1.0).unwrap();
    let err = state.update(-1.0).unwrap_err();
    assert!(matches!(err, BbnError::Divergence(_)));
    let err = state.update(f64::NAN).unwrap_err();
    assert_eq!(err.info().code, "energy-density");
    let err = state.update(0.0).unwrap_err();
    assert_eq!(err.info().code, "hubble-rate");
}
