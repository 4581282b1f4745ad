use bbn_core::{BbnError, CosmologicalState};
use bbn_evolve::{
    run, run_with_sink, EvolutionParams, InteractionConfig, MemorySink, MixingConfig, RunConfig,
    SpeciesConfig, StopFlag, Universe,
};
use bbn_kinetics::{Regime, Statistics};

fn config(species: &[&str], t_final: f64) -> RunConfig {
    RunConfig {
        params: EvolutionParams {
            t_initial: 10.0,
            t_final,
            dy: 0.05,
            mass_normalization: 1.0,
        },
        species: species.iter().map(|name| SpeciesConfig::preset(name)).collect(),
        log_every: 1000,
        ..RunConfig::default()
    }
}

fn evolve(config: RunConfig) -> Universe {
    let mut universe = Universe::new(config).expect("universe");
    universe
        .evolve(&mut MemorySink::new(), &StopFlag::new())
        .expect("evolve");
    universe
}

fn comoving_density(universe: &Universe, index: usize) -> f64 {
    let state = universe.state();
    universe.species()[index].density(state) * state.a.powi(3)
}

#[test]
fn photon_bath_keeps_comoving_temperature() {
    let mut sink = MemorySink::new();
    let summary = run_with_sink(&config(&["photon"], 1.0), &mut sink, &StopFlag::new()).expect("run");
    assert!(!summary.interrupted);
    assert!(summary.transitions.is_empty());
    assert!(summary.final_state.temperature <= 1.0);
    assert_eq!(summary.final_state.a_t, 1.0);

    let rows = sink.rows();
    assert_eq!(rows.len(), summary.steps + 1);
    for (index, row) in rows.iter().enumerate() {
        assert_eq!(row.step, index);
        assert_eq!(row.a_t, 1.0);
        assert!((row.a * row.t_phys - 1.0).abs() < 1e-12);
        let hubble = CosmologicalState::hubble_rate(row.rho);
        assert!((row.hubble - hubble).abs() <= 1e-12 * hubble);
    }
    assert!(rows.windows(2).all(|pair| pair[1].time_s > pair[0].time_s));

    let last = rows.last().expect("rows");
    let radiation_age = 2.0 * last.hubble * last.time_s * bbn_core::UNITS.s;
    assert!((radiation_age - 1.0).abs() < 0.15, "2Ht = {radiation_age}");
}

#[test]
fn electron_annihilation_heats_photons() {
    let summary = run(&config(&["photon", "electron"], 0.03)).expect("run");
    let expected = (11.0_f64 / 4.0).cbrt();
    assert!(
        (summary.final_state.a_t - expected).abs() < 0.02,
        "aT = {}",
        summary.final_state.a_t
    );
    let regimes: Vec<(Regime, Regime)> = summary
        .transitions
        .iter()
        .map(|transition| (transition.from, transition.to))
        .collect();
    assert_eq!(
        regimes,
        vec![
            (Regime::Radiation, Regime::Intermediate),
            (Regime::Intermediate, Regime::Dust)
        ]
    );
}

#[test]
fn neutrinos_decouple_and_freeze() {
    let universe = evolve(config(&["photon", "neutrino_e"], 1.0));
    let transitions = universe.transitions();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].species, "Electron neutrino");
    assert_eq!(transitions[0].to, Regime::NonEquilibrium);
    assert!(transitions[0].temperature <= 5.0 && transitions[0].temperature > 4.5);

    let neutrino = &universe.species()[1];
    assert_eq!(neutrino.regime(), Regime::NonEquilibrium);
    assert_eq!(neutrino.temperature(), transitions[0].temperature);
    assert_eq!(neutrino.a_t(), 1.0);
    assert_eq!(universe.state().a_t, 1.0);

    let expected = 2.0 * 0.75 * bbn_core::CONST.zeta_3 / std::f64::consts::PI.powi(2);
    let comoving = comoving_density(&universe, 1);
    assert!((comoving - expected).abs() < 1e-2 * expected, "n a³ = {comoving}");
}

#[test]
fn fully_decoupled_universe_diverges() {
    let mut species = SpeciesConfig::preset("neutrino_e");
    species.decoupling_temperature = Some(20.0);
    let mut config = config(&[], 1.0);
    config.species = vec![species];

    let err = run(&config).expect_err("no equilibrium species");
    match err {
        BbnError::Divergence(info) => {
            assert_eq!(info.code, "temperature-fraction");
            assert_eq!(info.context.get("step").map(String::as_str), Some("1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn relaxation_shares_heat_with_neutrinos() {
    let species = ["photon", "electron", "neutrino_e"];
    let free = evolve(config(&species, 0.05));

    let mut relaxed = config(&species, 0.05);
    relaxed.interactions.push(InteractionConfig::Relaxation {
        species: "Electron neutrino".into(),
        rate: 10.0,
    });
    let relaxed = evolve(relaxed);

    let heated = comoving_density(&relaxed, 2) / comoving_density(&free, 2);
    assert!(heated > 1.5, "density ratio {heated}");
    assert!(relaxed.state().a_t < free.state().a_t - 0.05);
    assert!(relaxed.state().a_t > 1.1);
}

#[test]
fn decay_depletes_massive_species() {
    let sterile = SpeciesConfig {
        name: Some("Sterile".into()),
        symbol: Some("nu_s".into()),
        statistics: Some(Statistics::Fermion),
        dof: Some(2.0),
        mass: Some(100.0),
        decoupling_temperature: Some(20.0),
        ..SpeciesConfig::default()
    };
    let mut config = config(&["photon"], 5.0);
    config.species.push(sterile);
    config.interactions.push(InteractionConfig::Decay {
        species: "Sterile".into(),
        lifetime: 0.02,
    });

    let initial = Universe::new(config.clone()).expect("universe");
    let before = comoving_density(&initial, 1);
    let decayed = evolve(config);
    let after = comoving_density(&decayed, 1);

    assert!(after.is_finite());
    assert!(after < 0.3 * before, "n a³ {before} -> {after}");
    assert!(decayed.state().a_t > 1.0);
}

#[test]
fn mixing_equalises_flavours() {
    let mut config = config(&["photon", "electron", "neutrino_e", "neutrino_mu", "neutrino_tau"], 0.1);
    config.interactions.push(InteractionConfig::Relaxation {
        species: "Electron neutrino".into(),
        rate: 10.0,
    });
    config.mixing = Some(MixingConfig {
        species: vec!["Electron neutrino".into(), "Muon neutrino".into()],
        pattern: vec![vec![0.5, 0.5], vec![0.5, 0.5]],
    });
    let universe = evolve(config);
    let species = universe.species();
    assert_eq!(species[2].distribution(), species[3].distribution());
    assert_ne!(species[2].distribution(), species[4].distribution());
    assert!(comoving_density(&universe, 3) > comoving_density(&universe, 4));
}

#[test]
fn thread_pool_matches_sequential_run() {
    let mut config = config(&["photon", "electron", "neutrino_e"], 1.0);
    config.interactions.push(InteractionConfig::Relaxation {
        species: "Electron neutrino".into(),
        rate: 5.0,
    });
    let sequential = run(&config).expect("sequential");
    config.parallel.threads = 2;
    let parallel = run(&config).expect("parallel");
    assert_eq!(sequential.final_state_hash, parallel.final_state_hash);
    assert_eq!(sequential.final_state, parallel.final_state);
}
