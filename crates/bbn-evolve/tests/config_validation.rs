use bbn_core::BbnError;
use bbn_evolve::catalog::{self, NEUTRINO_DECOUPLING, PRESETS};
use bbn_evolve::{InteractionConfig, RunConfig, SpeciesConfig};
use bbn_kinetics::{GridSpec, IntegrationOrder, InterpolationMode, Statistics};
use tempfile::tempdir;

const FULL: &str = r#"
params:
  t_initial: 20.0
  t_final: 0.5
  dy: 0.02
grid:
  kind: log
  min: 0.001
  max: 25.0
  samples: 40
species:
  - preset: photon
  - preset: electron
  - preset: neutrino_e
    decoupling_temperature: 3.0
  - name: Sterile
    symbol: nu_s
    statistics: fermion
    dof: 2
    mass: 33.9
    decoupling_temperature: 100.0
interactions:
  - type: relaxation
    species: Electron neutrino
    rate: 2.5
  - type: decay
    species: Sterile
    lifetime: 0.3
kinetics:
  interpolation: linear
  integration_order: integral-first
parallel:
  threads: 3
log_every: 25
checkpoint:
  interval: 100
"#;

fn code(err: BbnError) -> String {
    err.info().code.clone()
}

#[test]
fn full_yaml_document_parses() {
    let config = RunConfig::from_yaml_str(FULL).expect("parse");
    config.validate().expect("valid");
    assert_eq!(config.params.t_initial, 20.0);
    assert_eq!(config.params.mass_normalization, 1.0);
    assert_eq!(
        config.grid,
        GridSpec::Log {
            min: 0.001,
            max: 25.0,
            samples: 40
        }
    );
    assert_eq!(config.kinetics.interpolation, InterpolationMode::Linear);
    assert_eq!(config.kinetics.integration_order, IntegrationOrder::IntegralFirst);
    assert_eq!(config.parallel.threads, 3);
    assert_eq!(config.checkpoint.max_to_keep, 4);
    assert!(config.output.run_directory.is_none());
    assert_eq!(
        config.interactions[0],
        InteractionConfig::Relaxation {
            species: "Electron neutrino".into(),
            rate: 2.5
        }
    );

    let specs = config.resolve_species().expect("species");
    assert_eq!(specs.len(), 4);
    assert_eq!(specs[2].decoupling_temperature, 3.0);
    assert_eq!(specs[3].symbol, "nu_s");
    assert_eq!(specs[3].statistics, Statistics::Fermion);
    assert_eq!(specs[3].mass, 33.9);
}

#[test]
fn empty_document_uses_defaults() {
    let config = RunConfig::from_yaml_str("{}").expect("parse");
    assert_eq!(config, RunConfig::default());
    config.validate().expect("defaults are valid");
    let names: Vec<String> = config
        .resolve_species()
        .expect("species")
        .into_iter()
        .map(|spec| spec.name)
        .collect();
    assert_eq!(
        names,
        ["Photon", "Electron", "Electron neutrino", "Muon neutrino", "Tau neutrino"]
    );
}

#[test]
fn config_loads_from_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("run.yaml");
    std::fs::write(&path, FULL).expect("write");
    let config = RunConfig::load(&path).expect("load");
    assert_eq!(config.log_every, 25);

    let err = RunConfig::load(&dir.path().join("missing.yaml")).expect_err("missing");
    assert!(matches!(err, BbnError::Serde(_)));
    assert_eq!(code(err), "config-read");
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = RunConfig::from_yaml_str("params: [1, 2").expect_err("malformed");
    assert_eq!(code(err), "config-parse");
    let err = RunConfig::from_yaml_str("interactions:\n  - type: annihilation\n    species: Photon\n")
        .expect_err("unknown interaction");
    assert_eq!(code(err), "config-parse");
}

#[test]
fn invalid_configurations_are_rejected() {
    let cases: Vec<(&str, &str)> = vec![
        ("params: {t_initial: 1.0, t_final: 2.0}", "temperature-bounds"),
        ("params: {dy: 0.0}", "step-size"),
        ("grid: {kind: linear, min: 0.0}", "grid-bounds"),
        ("species: []", "empty-species"),
        ("species: [{preset: photon}, {preset: photon}]", "duplicate-species"),
        ("species: [{preset: graviton}]", "unknown-preset"),
        ("species: [{name: Axion, dof: 1}]", "species-incomplete"),
        ("species: [{preset: photon, dof: -2}]", "species-dof"),
        (
            "interactions: [{type: relaxation, species: Axion}]",
            "unknown-species",
        ),
        (
            "interactions: [{type: decay, species: Electron, lifetime: 0.0}]",
            "decay-lifetime",
        ),
        (
            "mixing: {species: [Electron neutrino, Muon neutrino], pattern: [[1.0, 0.0]]}",
            "mixing-pattern",
        ),
        ("log_every: 0", "log-every"),
        ("checkpoint: {interval: 5, max_to_keep: 0}", "checkpoint-retention"),
    ];
    for (yaml, expected) in cases {
        let config = RunConfig::from_yaml_str(yaml).expect(yaml);
        let err = config.validate().expect_err(yaml);
        assert!(matches!(err, BbnError::Config(_)), "{yaml}: {err:?}");
        assert_eq!(code(err), expected, "{yaml}");
    }
}

#[test]
fn unknown_preset_lists_the_catalog() {
    let err = SpeciesConfig::preset("graviton").resolve().expect_err("unknown");
    let hint = err.info().hint.clone().expect("hint");
    for name in PRESETS {
        assert!(hint.contains(name), "{name} missing from {hint}");
    }
}

#[test]
fn catalog_presets_match_particle_data() {
    for name in PRESETS {
        let spec = catalog::preset(name).expect(name);
        spec.validate().expect(name);
    }
    assert!(catalog::preset("graviton").is_none());

    let photon = catalog::preset("photon").expect("photon");
    assert_eq!(photon.statistics, Statistics::Boson);
    assert_eq!(photon.dof, 2.0);
    assert_eq!(photon.mass, 0.0);

    let electron = catalog::preset("electron").expect("electron");
    assert_eq!(electron.statistics, Statistics::Fermion);
    assert_eq!(electron.dof, 4.0);
    assert!((electron.mass - 0.511).abs() < 1e-12);

    for name in ["neutrino_e", "neutrino_mu", "neutrino_tau"] {
        let neutrino = catalog::preset(name).expect(name);
        assert_eq!(neutrino.dof, 2.0);
        assert_eq!(neutrino.mass, 0.0);
        assert_eq!(neutrino.decoupling_temperature, NEUTRINO_DECOUPLING);
    }

    let neutron = catalog::preset("neutron").expect("neutron");
    let proton = catalog::preset("proton").expect("proton");
    assert!((neutron.mass - proton.mass - 1.0).abs() < 1e-9);
}

#[test]
fn preset_overrides_apply() {
    let entry = SpeciesConfig {
        name: Some("Heavy electron".into()),
        mass: Some(2.0),
        decoupling_temperature: Some(0.5),
        ..SpeciesConfig::preset("electron")
    };
    let spec = entry.resolve().expect("resolve");
    assert_eq!(spec.name, "Heavy electron");
    assert_eq!(spec.symbol, "e");
    assert_eq!(spec.mass, 2.0);
    assert_eq!(spec.decoupling_temperature, 0.5);
    assert_eq!(spec.dof, 4.0);
}
