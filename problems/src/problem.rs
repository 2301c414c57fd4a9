use crate::errors::{ProblemError, Result};
use crate::types::{as_continuous_limits, is_cat_mask, is_int_mask, XType};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, DataMut, Ix2, Zip};
use ndarray_stats::QuantileExt;

/// Objective and constraint values of a batch of design vectors
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Objective values as a (n, n_obj) matrix
    pub f: Array2<f64>,
    /// Constraint values as a (n, n_cstr) matrix, feasible when `g <= 0`
    pub g: Array2<f64>,
}

impl Evaluation {
    /// Unconstrained evaluation result
    pub fn unconstrained(f: Array2<f64>) -> Self {
        let g = Array2::zeros((f.nrows(), 0));
        Evaluation { f, g }
    }
}

/// An optimization problem: a design space made of typed variables and
/// an evaluation function mapping design vectors to objectives and constraints.
///
/// Variable count and bounds are fixed for the lifetime of the problem and
/// evaluation is a pure function of the corrected design vectors.
pub trait Problem: Send + Sync {
    /// Problem name used in reports
    fn name(&self) -> &str;

    /// Types of the input variables
    fn xtypes(&self) -> &[XType];

    /// Number of objectives
    fn n_obj(&self) -> usize;

    /// Number of inequality constraints
    fn n_cstr(&self) -> usize {
        0
    }

    /// Evaluates a batch of corrected design vectors (n, n_var)
    fn evaluate_corrected(&self, x: &ArrayView2<f64>) -> Result<Evaluation>;

    /// Reference Pareto front as a (n_points, n_obj) matrix if known
    fn pareto_front(&self) -> Option<Array2<f64>> {
        None
    }

    /// Number of variables
    fn n_var(&self) -> usize {
        self.xtypes().len()
    }

    /// Design space bounds as a (n_var, 2) matrix
    fn xlimits(&self) -> Array2<f64> {
        as_continuous_limits(self.xtypes())
    }

    /// Integer valued variables mask
    fn is_int_mask(&self) -> Array1<bool> {
        is_int_mask(self.xtypes())
    }

    /// Categorical variables mask
    fn is_cat_mask(&self) -> Array1<bool> {
        is_cat_mask(self.xtypes())
    }

    /// Clamps values to the variable bounds and projects discrete
    /// variables on their closest representable level.
    fn correct_x(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Array2<f64>>
    where
        Self: Sized,
    {
        correct_x(self.xtypes(), x)
    }

    /// Corrects then evaluates a batch of design vectors
    fn evaluate(&self, x: &ArrayView2<f64>) -> Result<Evaluation> {
        let xc = correct_x(self.xtypes(), x)?;
        self.evaluate_corrected(&xc.view())
    }
}

/// Find closest value to `val` in given slice `v`.
fn take_closest(v: &[f64], val: f64) -> f64 {
    let idx = Array1::from_vec(v.to_vec())
        .mapv(|refval| (val - refval).abs())
        .argmin()
        .unwrap_or(0);
    v[idx]
}

fn correct_x_mut(xtypes: &[XType], x: &mut ArrayBase<impl DataMut<Elem = f64>, Ix2>) {
    Zip::from(x.columns_mut())
        .and(xtypes)
        .for_each(|mut col, xtype| {
            let (lb, ub) = xtype.bounds();
            match xtype {
                XType::Float(_, _) => col.mapv_inplace(|v| v.clamp(lb, ub)),
                XType::Int(_, _) | XType::Enum(_) => {
                    col.mapv_inplace(|v| v.clamp(lb, ub).round().clamp(lb, ub))
                }
                XType::Ord(levels) => col.mapv_inplace(|v| take_closest(levels, v)),
            }
        });
}

/// Corrects a batch of design vectors given the variable types.
///
/// Each value is clamped to its variable bounds, integer and categorical
/// values are rounded and ordered values are snapped to their closest level.
/// The correction is idempotent.
pub fn correct_x(
    xtypes: &[XType],
    x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Result<Array2<f64>> {
    if x.ncols() != xtypes.len() {
        return Err(ProblemError::InvalidDimension {
            expected: xtypes.len(),
            got: x.ncols(),
        });
    }
    if let Some(i) = xtypes
        .iter()
        .position(|xtype| matches!(xtype, XType::Ord(levels) if levels.is_empty()))
    {
        return Err(ProblemError::InvalidValue(format!(
            "Ordinal variable {i} has no level"
        )));
    }
    let mut xc = x.to_owned();
    correct_x_mut(xtypes, &mut xc);
    Ok(xc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn xtypes() -> Vec<XType> {
        vec![
            XType::Float(0., 100.),
            XType::Int(0, 2),
            XType::Ord(vec![1., 3., 5., 8.]),
            XType::Enum(3),
        ]
    }

    #[test]
    fn test_correct_x() {
        let x = array![
            [-5., 0.4, 2.1, 1.6],
            [50.5, 1.5, 7., -3.],
            [120., 2.6, 4.9, 2.4]
        ];
        let xc = correct_x(&xtypes(), &x).unwrap();
        assert_eq!(
            xc,
            array![[0., 0., 3., 2.], [50.5, 2., 8., 0.], [100., 2., 5., 2.]]
        );
    }

    #[test]
    fn test_correct_x_idempotent() {
        let x = array![
            [-5., 0.4, 2.1, 1.6],
            [50.5, 1.5, 7., -3.],
            [33.3, 0.49999, 3.9999, 0.5],
            [120., 2.6, 4.9, 2.4]
        ];
        let once = correct_x(&xtypes(), &x).unwrap();
        let twice = correct_x(&xtypes(), &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_correct_x_invalid_dimension() {
        let x = array![[1., 2., 3.]];
        match correct_x(&xtypes(), &x) {
            Err(ProblemError::InvalidDimension { expected, got }) => {
                assert_eq!(expected, 4);
                assert_eq!(got, 3);
            }
            other => panic!("Expected InvalidDimension, got {other:?}"),
        }
    }

    #[test]
    fn test_correct_x_empty_levels() {
        let xtypes = vec![XType::Float(0., 1.), XType::Ord(vec![])];
        let x = array![[0.5, 2.]];
        assert!(matches!(
            correct_x(&xtypes, &x),
            Err(ProblemError::InvalidValue(_))
        ));
    }
}
