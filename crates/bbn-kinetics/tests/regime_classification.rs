use bbn_kinetics::{Regime, REGIME_FACTOR};
use proptest::prelude::*;

#[test]
fn classification_boundaries() {
    // decoupling wins over every other rule
    assert_eq!(Regime::classify(5.0, 0.0, 5.0), Regime::NonEquilibrium);
    assert_eq!(Regime::classify(4.0, 100.0, 5.0), Regime::NonEquilibrium);
    assert_eq!(Regime::classify(10.0, 0.0, 0.0), Regime::Radiation);
    assert_eq!(Regime::classify(10.0, 0.511, 0.0), Regime::Radiation);
    assert_eq!(Regime::classify(0.5, 0.511, 0.0), Regime::Intermediate);
    assert_eq!(Regime::classify(0.01, 0.511, 0.0), Regime::Dust);
    // exactly at the switching ratio the intermediate treatment applies
    assert_eq!(Regime::classify(REGIME_FACTOR, 1.0, 0.0), Regime::Intermediate);
    assert_eq!(Regime::classify(0.1, 1.0, 0.0), Regime::Intermediate);
}

#[test]
fn equilibrium_flag_and_labels() {
    assert!(Regime::Dust.in_equilibrium());
    assert!(!Regime::NonEquilibrium.in_equilibrium());
    assert_eq!(Regime::NonEquilibrium.as_str(), "non-equilibrium");
    assert_eq!(
        serde_json::to_string(&Regime::NonEquilibrium).unwrap(),
        "\"non-equilibrium\""
    );
}

proptest! {
    #[test]
    fn exactly_one_regime_applies(
        temperature in 0.0f64..1e4,
        mass in 0.0f64..1e4,
        decoupling in 0.0f64..1e4,
    ) {
        let non_eq = temperature <= decoupling;
        let radiation = !non_eq && temperature > mass * REGIME_FACTOR;
        let dust = !non_eq && temperature * REGIME_FACTOR < mass;
        let intermediate = !non_eq && !radiation && !dust;
        let matched = [non_eq, radiation, dust, intermediate]
            .iter()
            .filter(|flag| **flag)
            .count();
        prop_assert_eq!(matched, 1);

        let regime = Regime::classify(temperature, mass, decoupling);
        prop_assert_eq!(regime, Regime::classify(temperature, mass, decoupling));
        let expected = if non_eq {
            Regime::NonEquilibrium
        } else if radiation {
            Regime::Radiation
        } else if dust {
            Regime::Dust
        } else {
            Regime::Intermediate
        };
        prop_assert_eq!(regime, expected);
    }
}
