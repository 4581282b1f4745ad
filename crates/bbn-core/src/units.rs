//! Natural units used throughout the engine.
//!
//! Energies, momenta, masses and temperatures are measured in MeV
//! (`ħ = c = k_B = 1`). Time and length carry inverse energy dimension.

/// Unit conversion factors expressed in MeV.
#[derive(Debug, Clone, Copy)]
pub struct Units {
    /// Electronvolt.
    pub ev: f64,
    /// Kiloelectronvolt.
    pub kev: f64,
    /// Megaelectronvolt (base unit).
    pub mev: f64,
    /// Gigaelectronvolt.
    pub gev: f64,
    /// One second in MeV⁻¹.
    pub s: f64,
}

/// Conversion table shared by all crates.
pub const UNITS: Units = Units {
    ev: 1e-6,
    kev: 1e-3,
    mev: 1.0,
    gev: 1e3,
    s: 1.0 / 6.582_119_569e-22,
};

/// Physical constants in natural units.
#[derive(Debug, Clone, Copy)]
pub struct Constants {
    /// Newton's constant, `1 / M_Pl²` in MeV⁻².
    pub g: f64,
    /// Fermi constant in MeV⁻².
    pub g_f: f64,
    /// Weak mixing angle, `sin² θ_W`.
    pub sin_theta_w_2: f64,
    /// Riemann zeta function at 3.
    pub zeta_3: f64,
}

/// Planck mass in MeV.
pub const PLANCK_MASS: f64 = 1.220_91e22;

/// Constants shared by all crates.
pub const CONST: Constants = Constants {
    g: 1.0 / (PLANCK_MASS * PLANCK_MASS),
    g_f: 1.166_378_7e-11,
    sin_theta_w_2: 0.23,
    zeta_3: 1.202_056_903_159_594,
};
