//! Mixed-integer Goldstein benchmark
//!
//! A four-dimensional single-objective test function where two continuous
//! variables `x1, x2` in [0, 100] are combined with two integer variables
//! `z1, z2` in {0, 1, 2}. Each integer level selects one of three anchors
//! {20, 50, 80} which replaces the corresponding continuous variable of the
//! base Goldstein polynomial.
//!
//! Reference:
//! Pelamatti J. et al. (2020), Overview and Comparison of Gaussian Process-Based
//! Surrogate Models for Mixed Continuous and Discrete Variables, section 4.1
use crate::errors::{ProblemError, Result};
use crate::problem::{Evaluation, Problem};
use crate::types::XType;
use log::debug;
use ndarray::{Array1, Array2, ArrayView2, Zip};

/// Continuous values substituted for the discrete levels 0, 1, 2
pub const GOLDSTEIN_ANCHORS: [f64; 3] = [20., 50., 80.];

/// Default number of grid points along each axis of [MixedIntGoldstein::grid]
pub const GOLDSTEIN_GRID_SIZE: usize = 50;

/// Mixed-integer Goldstein problem
#[derive(Clone, Debug)]
pub struct MixedIntGoldstein {
    xtypes: Vec<XType>,
}

impl Default for MixedIntGoldstein {
    fn default() -> Self {
        Self::new()
    }
}

impl MixedIntGoldstein {
    /// Two continuous variables in [0, 100] followed by two integer variables in [0, 2]
    pub fn new() -> Self {
        MixedIntGoldstein {
            xtypes: vec![
                XType::Float(0., 100.),
                XType::Float(0., 100.),
                XType::Int(0, 2),
                XType::Int(0, 2),
            ],
        }
    }

    /// Anchor value of the given discrete level of variable `var`.
    ///
    /// Levels outside {0, 1, 2} are rejected, they are never clamped.
    pub fn anchor(var: usize, level: f64) -> Result<f64> {
        if level.fract() != 0. || level < 0. || level >= GOLDSTEIN_ANCHORS.len() as f64 {
            return Err(ProblemError::InvalidLevel {
                var,
                level,
                n_levels: GOLDSTEIN_ANCHORS.len(),
            });
        }
        Ok(GOLDSTEIN_ANCHORS[level as usize])
    }

    /// Function value at continuous values `x1`, `x2` and discrete levels `z1`, `z2`
    pub fn value(x1: f64, x2: f64, z1: usize, z2: usize) -> Result<f64> {
        let x3 = Self::anchor(2, z1 as f64)?;
        let x4 = Self::anchor(3, z2 as f64)?;
        Ok(Self::h(x1, x2, x3, x4))
    }

    /// Goldstein polynomial in four real values
    #[allow(clippy::excessive_precision)]
    pub fn h(x1: f64, x2: f64, x3: f64, x4: f64) -> f64 {
        [
            53.3108,
            0.184901 * x1,
            -5.02914 * x1.powi(3) * 1e-6,
            7.72522 * x1.powi(4) * 1e-8,
            0.0870775 * x2,
            -0.106959 * x3,
            7.98772 * x3.powi(3) * 1e-6,
            0.00242482 * x4,
            1.32851 * x4.powi(3) * 1e-6,
            -0.00146393 * x1 * x2,
            -0.00301588 * x1 * x3,
            -0.00272291 * x1 * x4,
            0.0017004 * x2 * x3,
            0.0038428 * x2 * x4,
            -0.000198969 * x3 * x4,
            1.86025 * x1 * x2 * x3 * 1e-5,
            -1.88719 * x1 * x2 * x4 * 1e-6,
            2.50923 * x1 * x3 * x4 * 1e-5,
            -5.62199 * x2 * x3 * x4 * 1e-5,
        ]
        .iter()
        .sum()
    }

    /// Evaluates the function over a `n x n` grid of (x1, x2) in [0, 100]²
    /// at fixed discrete levels `z1`, `z2`.
    ///
    /// Returns the x1 axis, the x2 axis and the values as a (n, n) matrix
    /// where rows follow x2 and columns follow x1.
    pub fn grid(&self, z1: usize, z2: usize, n: usize) -> Result<(Array1<f64>, Array1<f64>, Array2<f64>)> {
        let x1s = Array1::linspace(0., 100., n);
        let x2s = Array1::linspace(0., 100., n);
        let x3 = Self::anchor(2, z1 as f64)?;
        let x4 = Self::anchor(3, z2 as f64)?;
        let mut values = Array2::zeros((n, n));
        Zip::indexed(&mut values).for_each(|(i, j), v| *v = Self::h(x1s[j], x2s[i], x3, x4));
        debug!("Goldstein grid ({n}x{n}) computed at z1={z1}, z2={z2}");
        Ok((x1s, x2s, values))
    }
}

impl Problem for MixedIntGoldstein {
    fn name(&self) -> &str {
        "MixedIntGoldstein"
    }

    fn xtypes(&self) -> &[XType] {
        &self.xtypes
    }

    fn n_obj(&self) -> usize {
        1
    }

    fn evaluate_corrected(&self, x: &ArrayView2<f64>) -> Result<Evaluation> {
        if x.ncols() != self.xtypes.len() {
            return Err(ProblemError::InvalidDimension {
                expected: self.xtypes.len(),
                got: x.ncols(),
            });
        }
        let f = x
            .rows()
            .into_iter()
            .map(|xi| {
                let x3 = Self::anchor(2, xi[2])?;
                let x4 = Self::anchor(3, xi[3])?;
                Ok(Self::h(xi[0], xi[1], x3, x4))
            })
            .collect::<Result<Vec<f64>>>()?;
        let f = Array2::from_shape_vec((x.nrows(), 1), f)
            .map_err(|e| ProblemError::InvalidValue(e.to_string()))?;
        Ok(Evaluation::unconstrained(f))
    }
}
