use linfa::Float;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// An enumeration to define the type of an input variable component
/// with its domain definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum XType {
    /// Continuous variable in [lower bound, upper bound]
    Float(f64, f64),
    /// Integer variable in lower bound .. upper bound
    Int(i32, i32),
    /// An Ordered variable in { float_1, float_2, ..., float_n }
    Ord(Vec<f64>),
    /// A categorical variable valued by its level index in 0 .. n
    Enum(usize),
}

impl XType {
    /// Lower and upper bounds of the variable when continuously relaxed
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            XType::Float(lb, ub) => (*lb, *ub),
            XType::Int(lb, ub) => (*lb as f64, *ub as f64),
            XType::Ord(v) => (
                v.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
                v.iter().fold(-f64::INFINITY, |a, &b| a.max(b)),
            ),
            XType::Enum(n) => (0., n.saturating_sub(1) as f64),
        }
    }

    /// Whether the variable only takes integer values
    pub fn is_int(&self) -> bool {
        matches!(self, XType::Int(_, _) | XType::Ord(_))
    }

    /// Whether the variable is categorical
    pub fn is_cat(&self) -> bool {
        matches!(self, XType::Enum(_))
    }
}

/// Design space as a (nx, 2) matrix where the ith row is
/// the [lower_bound, upper_bound] of the ith component of x.
///
/// Discrete variables are relaxed continuously, categorical ones
/// are bounded by their level indices.
pub fn as_continuous_limits<F: Float>(xtypes: &[XType]) -> Array2<F> {
    Array2::from_shape_fn((xtypes.len(), 2), |(i, j)| {
        let (lb, ub) = xtypes[i].bounds();
        F::cast(if j == 0 { lb } else { ub })
    })
}

/// Mask of integer valued variables (integer and ordered)
pub fn is_int_mask(xtypes: &[XType]) -> Array1<bool> {
    xtypes.iter().map(XType::is_int).collect()
}

/// Mask of categorical variables
pub fn is_cat_mask(xtypes: &[XType]) -> Array1<bool> {
    xtypes.iter().map(XType::is_cat).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_continuous_limits() {
        let xtypes = vec![
            XType::Float(-10., 10.),
            XType::Int(0, 2),
            XType::Ord(vec![1., 3., 5., 8.]),
            XType::Enum(3),
        ];
        let xlimits: Array2<f64> = as_continuous_limits(&xtypes);
        assert_eq!(
            xlimits,
            array![[-10., 10.], [0., 2.], [1., 8.], [0., 2.]]
        );
        assert_eq!(is_int_mask(&xtypes), array![false, true, true, false]);
        assert_eq!(is_cat_mask(&xtypes), array![false, false, false, true]);
    }
}
