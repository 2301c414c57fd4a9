use crate::errors::{ProblemError, Result};
use crate::problem::{Evaluation, Problem};
use crate::types::XType;
use ndarray::{s, Array1, Array2, ArrayView2, Axis, Zip};

/// Number of points used to sample the reference Pareto front
pub const N_PARETO_POINTS: usize = 100;

/// ZDT1 bi-objective problem with a convex Pareto front `f2 = 1 - sqrt(f1)`,
/// all variables in [0, 1].
#[derive(Clone, Debug)]
pub struct Zdt1 {
    xtypes: Vec<XType>,
}

impl Default for Zdt1 {
    fn default() -> Self {
        Self::new(30)
    }
}

impl Zdt1 {
    /// Problem with `n_var` continuous variables (at least 2)
    pub fn new(n_var: usize) -> Self {
        let n_var = n_var.max(2);
        Zdt1 {
            xtypes: vec![XType::Float(0., 1.); n_var],
        }
    }
}

impl Problem for Zdt1 {
    fn name(&self) -> &str {
        "ZDT1"
    }

    fn xtypes(&self) -> &[XType] {
        &self.xtypes
    }

    fn n_obj(&self) -> usize {
        2
    }

    fn evaluate_corrected(&self, x: &ArrayView2<f64>) -> Result<Evaluation> {
        let n_var = self.xtypes.len();
        if x.ncols() != n_var {
            return Err(ProblemError::InvalidDimension {
                expected: n_var,
                got: x.ncols(),
            });
        }
        let mut f = Array2::zeros((x.nrows(), 2));
        let g = x.slice(s![.., 1..]).sum_axis(Axis(1)) * (9. / (n_var - 1) as f64) + 1.;
        Zip::from(f.rows_mut())
            .and(x.rows())
            .and(&g)
            .for_each(|mut fi, xi, &gi| {
                fi[0] = xi[0];
                fi[1] = gi * (1. - (xi[0] / gi).sqrt());
            });
        Ok(Evaluation::unconstrained(f))
    }

    fn pareto_front(&self) -> Option<Array2<f64>> {
        let f1 = Array1::<f64>::linspace(0., 1., N_PARETO_POINTS);
        let mut pf = Array2::zeros((N_PARETO_POINTS, 2));
        pf.column_mut(0).assign(&f1);
        pf.column_mut(1).assign(&f1.mapv(|v| 1. - v.sqrt()));
        Some(pf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_zdt1_on_pareto_set() {
        let pb = Zdt1::new(3);
        let res = pb.evaluate(&array![[0.25, 0., 0.], [1., 0., 0.]].view()).unwrap();
        assert_abs_diff_eq!(res.f, array![[0.25, 0.5], [1., 0.]], epsilon = 1e-12);
    }

    #[test]
    fn test_zdt1_dominated() {
        let pb = Zdt1::new(3);
        let res = pb.evaluate(&array![[0.25, 1., 1.]].view()).unwrap();
        // g = 10
        assert_abs_diff_eq!(res.f[[0, 1]], 10. * (1. - (0.025f64).sqrt()), epsilon = 1e-12);
    }

    #[test]
    fn test_zdt1_pareto_front() {
        let pf = Zdt1::default().pareto_front().unwrap();
        assert_eq!(pf.dim(), (N_PARETO_POINTS, 2));
        assert_eq!(pf.row(0).to_vec(), vec![0., 1.]);
        assert_eq!(pf.row(N_PARETO_POINTS - 1).to_vec(), vec![1., 0.]);
    }
}
