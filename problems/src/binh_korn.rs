use crate::errors::{ProblemError, Result};
use crate::problem::{Evaluation, Problem};
use crate::types::XType;
use ndarray::{Array2, ArrayView2, Zip};

/// Binh and Korn constrained bi-objective problem
///
/// * f1(x, y) = 4x² + 4y²
/// * f2(x, y) = (x - 5)² + (y - 5)²
///
/// subject to (x - 5)² + y² <= 25 and (x - 8)² + (y + 3)² >= 7.7
/// with x in [0, 5] and y in [0, 3].
#[derive(Clone, Debug)]
pub struct BinhKorn {
    xtypes: Vec<XType>,
}

impl Default for BinhKorn {
    fn default() -> Self {
        BinhKorn {
            xtypes: vec![XType::Float(0., 5.), XType::Float(0., 3.)],
        }
    }
}

impl BinhKorn {
    fn f(x: f64, y: f64) -> [f64; 2] {
        [
            4. * x * x + 4. * y * y,
            (x - 5.) * (x - 5.) + (y - 5.) * (y - 5.),
        ]
    }
}

impl Problem for BinhKorn {
    fn name(&self) -> &str {
        "BinhKorn"
    }

    fn xtypes(&self) -> &[XType] {
        &self.xtypes
    }

    fn n_obj(&self) -> usize {
        2
    }

    fn n_cstr(&self) -> usize {
        2
    }

    fn evaluate_corrected(&self, x: &ArrayView2<f64>) -> Result<Evaluation> {
        if x.ncols() != 2 {
            return Err(ProblemError::InvalidDimension {
                expected: 2,
                got: x.ncols(),
            });
        }
        let mut f = Array2::zeros((x.nrows(), 2));
        let mut g = Array2::zeros((x.nrows(), 2));
        Zip::from(f.rows_mut())
            .and(g.rows_mut())
            .and(x.rows())
            .for_each(|mut fi, mut gi, xi| {
                let [f1, f2] = Self::f(xi[0], xi[1]);
                fi[0] = f1;
                fi[1] = f2;
                gi[0] = (xi[0] - 5.).powi(2) + xi[1] * xi[1] - 25.;
                gi[1] = 7.7 - (xi[0] - 8.).powi(2) - (xi[1] + 3.).powi(2);
            });
        Ok(Evaluation { f, g })
    }

    /// Front sampled along the optimal set: x = y in [0, 3] then y = 3, x in [3, 5]
    fn pareto_front(&self) -> Option<Array2<f64>> {
        let n = 50;
        let mut pf = Array2::zeros((2 * n, 2));
        for i in 0..n {
            let t = 3. * i as f64 / (n - 1) as f64;
            let [f1, f2] = Self::f(t, t);
            pf[[i, 0]] = f1;
            pf[[i, 1]] = f2;
            let x = 3. + 2. * i as f64 / (n - 1) as f64;
            let [f1, f2] = Self::f(x, 3.);
            pf[[n + i, 0]] = f1;
            pf[[n + i, 1]] = f2;
        }
        Some(pf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_binh_korn() {
        let pb = BinhKorn::default();
        let res = pb.evaluate(&array![[0., 0.], [5., 3.]].view()).unwrap();
        assert_abs_diff_eq!(res.f, array![[0., 50.], [136., 4.]], epsilon = 1e-12);
        // both points are feasible
        assert!(res.g.iter().all(|&g| g <= 0.));
    }

    #[test]
    fn test_binh_korn_infeasible() {
        let pb = BinhKorn::default();
        let res = pb.evaluate_corrected(&array![[7., -1.]].view()).unwrap();
        assert!(res.g[[0, 1]] > 0.);
    }
}
