//! Standard Model particle templates.

use bbn_core::UNITS;
use bbn_kinetics::{SpeciesSpec, Statistics};

/// Names accepted by [`preset`].
pub const PRESETS: [&str; 9] = [
    "photon",
    "electron",
    "muon",
    "tau",
    "neutrino_e",
    "neutrino_mu",
    "neutrino_tau",
    "neutron",
    "proton",
];

/// Temperature at which active neutrinos leave equilibrium.
pub const NEUTRINO_DECOUPLING: f64 = 5.0;

fn template(name: &str, symbol: &str, statistics: Statistics, dof: f64, mass: f64) -> SpeciesSpec {
    SpeciesSpec {
        name: name.to_string(),
        symbol: symbol.to_string(),
        statistics,
        dof,
        mass,
        decoupling_temperature: 0.0,
        grid: None,
    }
}

fn neutrino(name: &str, symbol: &str) -> SpeciesSpec {
    SpeciesSpec {
        decoupling_temperature: NEUTRINO_DECOUPLING * UNITS.mev,
        ..template(name, symbol, Statistics::Fermion, 2.0, 0.0)
    }
}

/// Looks up a preset by name.
pub fn preset(name: &str) -> Option<SpeciesSpec> {
    let spec = match name {
        "photon" => template("Photon", "gamma", Statistics::Boson, 2.0, 0.0),
        "electron" => template("Electron", "e", Statistics::Fermion, 4.0, 0.511 * UNITS.mev),
        "muon" => template("Muon", "mu", Statistics::Fermion, 4.0, 105.7 * UNITS.mev),
        "tau" => template("Tau", "tau", Statistics::Fermion, 4.0, 1777.0 * UNITS.mev),
        "neutrino_e" => neutrino("Electron neutrino", "nu_e"),
        "neutrino_mu" => neutrino("Muon neutrino", "nu_mu"),
        "neutrino_tau" => neutrino("Tau neutrino", "nu_tau"),
        "neutron" => template("Neutron", "n", Statistics::Fermion, 4.0, 0.939 * UNITS.gev),
        "proton" => template("Proton", "p", Statistics::Fermion, 4.0, 0.938 * UNITS.gev),
        _ => return None,
    };
    Some(spec)
}
