use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_kinetics::Species;

use crate::config::MixingConfig;

/// Flavour mixing of collision integrals, resolved to species indices.
#[derive(Debug, Clone, PartialEq)]
pub struct FlavourMixing {
    indices: Vec<usize>,
    pattern: Vec<Vec<f64>>,
}

impl FlavourMixing {
    /// Resolves species names and checks that the mixed grids agree.
    pub fn new(config: &MixingConfig, species: &[Species]) -> Result<Self, BbnError> {
        let mut indices = Vec::with_capacity(config.species.len());
        for name in &config.species {
            let index = species
                .iter()
                .position(|candidate| candidate.name() == name)
                .ok_or_else(|| {
                    BbnError::Config(
                        ErrorInfo::new("unknown-species", "mixed species is not configured")
                            .with_context("species", name.clone()),
                    )
                })?;
            indices.push(index);
        }
        if let Some(&first) = indices.first() {
            let grid = species[first].grid();
            if let Some(&other) = indices.iter().find(|&&index| species[index].grid() != grid) {
                return Err(BbnError::Config(
                    ErrorInfo::new("mixing-grid", "mixed species must share one momentum grid")
                        .with_context("species", species[other].name()),
                ));
            }
        }
        Ok(Self {
            indices,
            pattern: config.pattern.clone(),
        })
    }

    /// Replaces each mixed integral with `Σ_B pattern[A][B] · I_B`.
    ///
    /// `integrals` is indexed like the species list.
    pub fn apply(&self, integrals: &mut [Vec<f64>]) {
        let originals: Vec<Vec<f64>> = self
            .indices
            .iter()
            .map(|&index| integrals[index].clone())
            .collect();
        for (row, &target) in self.pattern.iter().zip(&self.indices) {
            for (node, value) in integrals[target].iter_mut().enumerate() {
                *value = row
                    .iter()
                    .zip(&originals)
                    .map(|(weight, source)| weight * source[node])
                    .sum();
            }
        }
    }
}
