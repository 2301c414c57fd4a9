//! Numerical helpers shared by the strategies and the metrics.
use libm::erfc;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};

const SQRT_2PI: f64 = 2.5066282746310007;

/// Cumulative distribution function of Standard Normal at x
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Probability density function of Standard Normal at x
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / SQRT_2PI
}

/// Scales `x` rows into the unit hypercube given `xlimits` bounds
pub fn normalize_x(
    x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Array2<f64> {
    let lb = xlimits.column(0);
    let range = (&xlimits.column(1) - &lb).mapv(|v| if v > 0. { v } else { 1. });
    (x - &lb) / &range
}

/// Minimum euclidean distance of each row of `x` to the rows of `xref`,
/// infinity when `xref` is empty
pub fn min_distances(
    x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    xref: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Array1<f64> {
    let mut dists = Array1::from_elem(x.nrows(), f64::INFINITY);
    Zip::from(&mut dists).and(x.rows()).for_each(|d, xi| {
        *d = xref
            .rows()
            .into_iter()
            .map(|xr| (&xi - &xr).mapv(|v| v * v).sum().sqrt())
            .fold(f64::INFINITY, f64::min);
    });
    dists
}

/// Root mean square error between predicted and actual values
pub fn rmse(
    pred: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    actual: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> f64 {
    if pred.is_empty() {
        return f64::NAN;
    }
    ((pred - actual).mapv(|v| v * v).sum() / pred.len() as f64).sqrt()
}

/// Column wise minimum ignoring rows whose mask is false, infinity when none
pub fn masked_column_min(
    y: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    mask: &[bool],
) -> Array1<f64> {
    y.axis_iter(Axis(1))
        .map(|col| {
            col.iter()
                .zip(mask)
                .filter(|(_, m)| **m)
                .map(|(&v, _)| v)
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_norm_cdf_pdf() {
        assert_abs_diff_eq!(norm_cdf(0.), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_cdf(-1.), 0.158655, epsilon = 1e-6);
        assert_abs_diff_eq!(norm_pdf(0.), 1. / SQRT_2PI, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_x() {
        let xlimits = array![[0., 100.], [0., 2.]];
        let x = array![[50., 1.], [100., 0.]];
        assert_eq!(normalize_x(&x, &xlimits), array![[0.5, 0.5], [1., 0.]]);
    }

    #[test]
    fn test_min_distances() {
        let xref = array![[0., 0.], [3., 4.]];
        let x = array![[0., 1.], [3., 0.]];
        assert_abs_diff_eq!(min_distances(&x, &xref), array![1., 3.], epsilon = 1e-12);
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(min_distances(&x, &empty).iter().all(|d| d.is_infinite()));
    }
}
