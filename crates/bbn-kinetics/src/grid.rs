use bbn_core::errors::{BbnError, ErrorInfo};
use bbn_core::UNITS;
use serde::{Deserialize, Serialize};

fn default_min_momentum() -> f64 {
    UNITS.ev
}

fn default_max_momentum() -> f64 {
    UNITS.ev + 20.0 * UNITS.mev
}

fn default_samples() -> usize {
    50
}

/// Declarative description of a momentum grid.
///
/// The minimum must stay above zero: massless conformal energies vanish at
/// `p = 0` and the Bose-Einstein occupation diverges there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GridSpec {
    /// Equally spaced samples, endpoints included.
    Linear {
        /// Smallest sampled momentum.
        #[serde(default = "default_min_momentum")]
        min: f64,
        /// Largest sampled momentum.
        #[serde(default = "default_max_momentum")]
        max: f64,
        /// Number of samples.
        #[serde(default = "default_samples")]
        samples: usize,
    },
    /// Logarithmically spaced samples, endpoints included.
    Log {
        /// Smallest sampled momentum.
        #[serde(default = "default_min_momentum")]
        min: f64,
        /// Largest sampled momentum.
        #[serde(default = "default_max_momentum")]
        max: f64,
        /// Number of samples.
        #[serde(default = "default_samples")]
        samples: usize,
    },
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec::Linear {
            min: default_min_momentum(),
            max: default_max_momentum(),
            samples: default_samples(),
        }
    }
}

fn grid_error(code: &str, message: &str, min: f64, max: f64, samples: usize) -> BbnError {
    BbnError::Config(
        ErrorInfo::new(code, message)
            .with_context("min", min.to_string())
            .with_context("max", max.to_string())
            .with_context("samples", samples.to_string()),
    )
}

/// Immutable, strictly increasing set of sample momenta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridSpec", into = "GridSpec")]
pub struct Grid {
    spec: GridSpec,
    points: Vec<f64>,
}

impl Grid {
    /// Builds and validates a grid from its specification.
    pub fn new(spec: GridSpec) -> Result<Self, BbnError> {
        let (min, max, samples) = match spec {
            GridSpec::Linear { min, max, samples } | GridSpec::Log { min, max, samples } => {
                (min, max, samples)
            }
        };
        if !min.is_finite() || !max.is_finite() || min <= 0.0 {
            return Err(grid_error(
                "grid-bounds",
                "grid bounds must be finite and the minimum strictly positive",
                min,
                max,
                samples,
            ));
        }
        if max <= min {
            return Err(grid_error(
                "grid-order",
                "grid maximum must exceed the minimum",
                min,
                max,
                samples,
            ));
        }
        if samples < 2 {
            return Err(grid_error(
                "grid-samples",
                "grid needs at least two samples",
                min,
                max,
                samples,
            ));
        }

        let last = (samples - 1) as f64;
        let mut points: Vec<f64> = match spec {
            GridSpec::Linear { .. } => {
                let step = (max - min) / last;
                (0..samples).map(|i| min + step * i as f64).collect()
            }
            GridSpec::Log { .. } => {
                let ratio = (max / min).ln() / last;
                (0..samples).map(|i| min * (ratio * i as f64).exp()).collect()
            }
        };
        // pin the endpoints against rounding
        points[0] = min;
        points[samples - 1] = max;

        if points.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(grid_error(
                "grid-monotonic",
                "grid samples are not strictly increasing",
                min,
                max,
                samples,
            ));
        }
        Ok(Self { spec, points })
    }

    /// Specification the grid was built from.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Sample momenta in increasing order.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; grids hold at least two samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest sampled momentum.
    pub fn min(&self) -> f64 {
        self.points[0]
    }

    /// Largest sampled momentum.
    pub fn max(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Index of a sample exactly equal to `p`, if any.
    pub fn index_of(&self, p: f64) -> Option<usize> {
        self.points.binary_search_by(|probe| probe.total_cmp(&p)).ok()
    }

    /// Indices of the two grid nodes bracketing `p`.
    ///
    /// Momenta below the grid use the first two nodes and momenta above it the
    /// last two, so callers extrapolate from the nearest interval.
    pub fn bracket(&self, p: f64) -> (usize, usize) {
        let n = self.points.len();
        let upper = self.points.partition_point(|&q| q < p);
        if upper == 0 {
            (0, 1)
        } else if upper >= n {
            (n - 2, n - 1)
        } else {
            (upper - 1, upper)
        }
    }
}

impl TryFrom<GridSpec> for Grid {
    type Error = BbnError;

    fn try_from(spec: GridSpec) -> Result<Self, Self::Error> {
        Grid::new(spec)
    }
}

impl From<Grid> for GridSpec {
    fn from(grid: Grid) -> Self {
        grid.spec
    }
}

impl Default for Grid {
    fn default() -> Self {
        let n = default_samples();
        let (min, max) = (default_min_momentum(), default_max_momentum());
        let step = (max - min) / (n - 1) as f64;
        let mut points: Vec<f64> = (0..n).map(|i| min + step * i as f64).collect();
        points[n - 1] = max;
        Self {
            spec: GridSpec::default(),
            points,
        }
    }
}
