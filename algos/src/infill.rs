//! Infill strategies scoring candidate points from surrogate predictions.
//!
//! Acquisition values are minimized: each strategy returns one or several
//! acquisition columns per candidate and candidates are then ranked by
//! non-dominated sorting of these columns.
use crate::errors::{AlgoError, Result};
use crate::utils::{min_distances, norm_cdf, norm_pdf};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard deviation under which a prediction is considered certain
const SIGMA_EPS: f64 = 1e-12;

/// Default exploration factor of the lower confidence bound
pub const LCB_DEFAULT_ALPHA: f64 = 2.;

/// Data about the current optimization state used by infill strategies
#[derive(Clone, Debug)]
pub struct InfillContext {
    /// Best observed feasible value of each objective
    pub f_min: Array1<f64>,
    /// Current non-dominated observed objective values (n_front, n_obj)
    pub front: Array2<f64>,
    /// Evaluated design vectors normalized in the unit hypercube
    pub x_train: Array2<f64>,
}

/// Infill criterion used to select next promising points
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InfillStrategy {
    /// Predicted mean
    FunctionEstimate,
    /// Predicted mean plus the distance to evaluated points as additional objective
    FunctionEstimateDistance,
    /// Predicted standard deviation (maximized)
    FunctionVariance,
    /// Lower confidence bound `mean - alpha * sigma`
    LowerConfidenceBound {
        /// exploration factor
        alpha: f64,
    },
    /// Expected improvement (maximized)
    ExpectedImprovement,
    /// Probability of improvement (maximized)
    ProbabilityOfImprovement,
    /// Minimum probability of improvement over the current front (maximized)
    MinimumPoi,
}

impl InfillStrategy {
    /// All the available strategies with their default parameters
    pub const ALL: [InfillStrategy; 7] = [
        InfillStrategy::FunctionEstimate,
        InfillStrategy::FunctionEstimateDistance,
        InfillStrategy::FunctionVariance,
        InfillStrategy::LowerConfidenceBound {
            alpha: LCB_DEFAULT_ALPHA,
        },
        InfillStrategy::ExpectedImprovement,
        InfillStrategy::ProbabilityOfImprovement,
        InfillStrategy::MinimumPoi,
    ];

    /// Short key identifying the strategy
    pub fn key(&self) -> &'static str {
        match self {
            InfillStrategy::FunctionEstimate => "y",
            InfillStrategy::FunctionEstimateDistance => "y-dist",
            InfillStrategy::FunctionVariance => "s",
            InfillStrategy::LowerConfidenceBound { .. } => "lcb",
            InfillStrategy::ExpectedImprovement => "ei",
            InfillStrategy::ProbabilityOfImprovement => "poi",
            InfillStrategy::MinimumPoi => "mpoi",
        }
    }

    /// Number of acquisition columns computed for `n_obj` objectives
    pub fn n_acquisition(&self, n_obj: usize) -> usize {
        match self {
            InfillStrategy::FunctionEstimateDistance => n_obj + 1,
            InfillStrategy::MinimumPoi => 1,
            _ => n_obj,
        }
    }

    /// Computes acquisition values (lower is better) of candidates `x`
    /// (normalized) given predicted `mean` and `variance` (n, n_obj).
    pub fn compute(
        &self,
        x: &ArrayView2<f64>,
        mean: &ArrayView2<f64>,
        variance: &ArrayView2<f64>,
        ctx: &InfillContext,
    ) -> Array2<f64> {
        let sigma = variance.mapv(|v| v.max(0.).sqrt());
        match self {
            InfillStrategy::FunctionEstimate => mean.to_owned(),
            InfillStrategy::FunctionEstimateDistance => {
                let dists = min_distances(x, &ctx.x_train).mapv(|d| if d.is_finite() { -d } else { 0. });
                let mut acq = Array2::zeros((mean.nrows(), mean.ncols() + 1));
                acq.slice_mut(ndarray::s![.., ..mean.ncols()]).assign(mean);
                acq.column_mut(mean.ncols()).assign(&dists);
                acq
            }
            InfillStrategy::FunctionVariance => -sigma,
            InfillStrategy::LowerConfidenceBound { alpha } => mean - &(sigma * *alpha),
            InfillStrategy::ExpectedImprovement => {
                let mut acq = mean.to_owned();
                Zip::from(acq.columns_mut())
                    .and(sigma.columns())
                    .and(&ctx.f_min)
                    .for_each(|mut col, s, &fmin| {
                        Zip::from(&mut col)
                            .and(&s)
                            .for_each(|v, &sk| *v = -expected_improvement(*v, sk, fmin));
                    });
                acq
            }
            InfillStrategy::ProbabilityOfImprovement => {
                let mut acq = mean.to_owned();
                Zip::from(acq.columns_mut())
                    .and(sigma.columns())
                    .and(&ctx.f_min)
                    .for_each(|mut col, s, &fmin| {
                        Zip::from(&mut col)
                            .and(&s)
                            .for_each(|v, &sk| *v = -probability_of_improvement(*v, sk, fmin));
                    });
                acq
            }
            InfillStrategy::MinimumPoi => {
                let mpoi = Zip::from(mean.rows())
                    .and(sigma.rows())
                    .map_collect(|m, s| -minimum_poi(&m, &s, &ctx.front));
                mpoi.insert_axis(Axis(1))
            }
        }
    }
}

impl fmt::Display for InfillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for InfillStrategy {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self> {
        InfillStrategy::ALL
            .iter()
            .find(|infill| infill.key() == s.to_lowercase())
            .copied()
            .ok_or_else(|| AlgoError::InvalidConfigError(format!("Unknown infill strategy '{s}'")))
    }
}

/// Expected improvement over `f_min` of a normal prediction (mean, sigma)
pub fn expected_improvement(mean: f64, sigma: f64, f_min: f64) -> f64 {
    if !f_min.is_finite() {
        return 0.;
    }
    if sigma < SIGMA_EPS {
        return (f_min - mean).max(0.);
    }
    let arg = (f_min - mean) / sigma;
    (f_min - mean) * norm_cdf(arg) + sigma * norm_pdf(arg)
}

/// Probability for a normal prediction (mean, sigma) to be lower than `f_min`
pub fn probability_of_improvement(mean: f64, sigma: f64, f_min: f64) -> f64 {
    if !f_min.is_finite() {
        return 0.;
    }
    if sigma < SIGMA_EPS {
        return if mean < f_min { 1. } else { 0. };
    }
    norm_cdf((f_min - mean) / sigma)
}

/// Minimum over the `front` points of the probability of not being dominated by them
pub fn minimum_poi(mean: &ArrayView1<f64>, sigma: &ArrayView1<f64>, front: &Array2<f64>) -> f64 {
    front
        .rows()
        .into_iter()
        .map(|p| {
            let p_dominated: f64 = Zip::from(mean)
                .and(sigma)
                .and(&p)
                .fold(1., |acc, &m, &s, &pj| {
                    let prob = if s < SIGMA_EPS {
                        if m >= pj {
                            1.
                        } else {
                            0.
                        }
                    } else {
                        norm_cdf((m - pj) / s)
                    };
                    acc * prob
                });
            1. - p_dominated
        })
        .fold(1., f64::min)
}

/// Probability of feasibility of a normal constraint prediction (g <= 0 is feasible)
pub fn pof(mean: f64, sigma: f64) -> f64 {
    if sigma < SIGMA_EPS {
        return if mean <= 0. { 1. } else { 0. };
    }
    norm_cdf(-mean / sigma)
}

/// Constraint criterion used to handle constrained problems
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstraintStrategy {
    /// Use the predicted mean values
    MeanValue,
    /// Use the probability of feasibility, candidates under `min_pof` are infeasible
    ProbabilityOfFeasibility {
        /// minimum probability of feasibility
        min_pof: f64,
    },
}

impl Default for ConstraintStrategy {
    fn default() -> Self {
        ConstraintStrategy::ProbabilityOfFeasibility { min_pof: 0.5 }
    }
}

impl ConstraintStrategy {
    /// Predicted constraint violation of candidates given constraint
    /// predictions `mean` and `variance` (n, n_cstr)
    pub fn violation(&self, mean: &ArrayView2<f64>, variance: &ArrayView2<f64>) -> Array1<f64> {
        match self {
            ConstraintStrategy::MeanValue => mean.map_axis(Axis(1), |g| g.iter().map(|v| v.max(0.)).sum()),
            ConstraintStrategy::ProbabilityOfFeasibility { min_pof } => Zip::from(mean.rows())
                .and(variance.rows())
                .map_collect(|g, v| {
                    let p: f64 = g
                        .iter()
                        .zip(v.iter())
                        .map(|(&gj, &vj)| pof(gj, vj.max(0.).sqrt()))
                        .product();
                    (min_pof - p).max(0.)
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn ctx() -> InfillContext {
        InfillContext {
            f_min: array![1.],
            front: array![[1.]],
            x_train: array![[0.], [1.]],
        }
    }

    #[test]
    fn test_pof() {
        let g = [0., 0., 1., 1., -1., -1.];
        let sigma = [1., 2., 1., 2., 1., 2.];
        let expected = [0.5, 0.5, 0.159, 0.309, 1. - 0.159, 1. - 0.309];
        for i in 0..g.len() {
            assert_abs_diff_eq!(pof(g[i], sigma[i]), expected[i], epsilon = 1e-2);
        }
        assert_eq!(pof(-1., 0.), 1.);
        assert_eq!(pof(1., 0.), 0.);
    }

    #[test]
    fn test_expected_improvement() {
        assert_eq!(expected_improvement(2., 0., 1.), 0.);
        assert_eq!(expected_improvement(0., 0., 1.), 1.);
        // at mean == f_min EI = sigma * pdf(0)
        assert_abs_diff_eq!(expected_improvement(1., 2., 1.), 2. * norm_pdf(0.), epsilon = 1e-12);
        assert!(expected_improvement(5., 1., 1.) >= 0.);
        assert!(expected_improvement(0., 1., 1.) > expected_improvement(0.5, 1., 1.));
    }

    #[test]
    fn test_probability_of_improvement() {
        assert_abs_diff_eq!(probability_of_improvement(1., 1., 1.), 0.5, epsilon = 1e-12);
        assert_eq!(probability_of_improvement(0., 0., 1.), 1.);
    }

    #[test]
    fn test_compute_shapes() {
        let x = array![[0.2], [0.5], [0.9]];
        let mean = array![[1.5], [0.5], [2.]];
        let variance = array![[0.04], [0.01], [1.]];
        for infill in InfillStrategy::ALL {
            let acq = infill.compute(&x.view(), &mean.view(), &variance.view(), &ctx());
            assert_eq!(acq.dim(), (3, infill.n_acquisition(1)), "{infill}");
            assert!(acq.iter().all(|v| v.is_finite()), "{infill}");
        }
    }

    #[test]
    fn test_compute_values() {
        let x = array![[0.2], [0.5]];
        let mean = array![[1.5], [0.5]];
        let variance = array![[4.], [0.]];
        let c = ctx();
        let lcb = InfillStrategy::LowerConfidenceBound { alpha: 2. }.compute(
            &x.view(),
            &mean.view(),
            &variance.view(),
            &c,
        );
        assert_abs_diff_eq!(lcb, array![[-2.5], [0.5]], epsilon = 1e-12);
        let s = InfillStrategy::FunctionVariance.compute(&x.view(), &mean.view(), &variance.view(), &c);
        assert_abs_diff_eq!(s, array![[-2.], [0.]], epsilon = 1e-12);
        let ydist =
            InfillStrategy::FunctionEstimateDistance.compute(&x.view(), &mean.view(), &variance.view(), &c);
        assert_abs_diff_eq!(ydist, array![[1.5, -0.2], [0.5, -0.5]], epsilon = 1e-12);
        let ei = InfillStrategy::ExpectedImprovement.compute(&x.view(), &mean.view(), &variance.view(), &c);
        assert_abs_diff_eq!(ei[[1, 0]], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_minimum_poi() {
        let front = array![[0., 1.], [1., 0.]];
        // a certain point dominating the whole front
        assert_eq!(minimum_poi(&array![-1., -1.].view(), &array![0., 0.].view(), &front), 1.);
        // a certain point dominated by the front
        assert_eq!(minimum_poi(&array![2., 2.].view(), &array![0., 0.].view(), &front), 0.);
    }

    #[test]
    fn test_parse_infill() {
        assert_eq!("EI".parse::<InfillStrategy>().unwrap(), InfillStrategy::ExpectedImprovement);
        assert_eq!(
            "lcb".parse::<InfillStrategy>().unwrap(),
            InfillStrategy::LowerConfidenceBound { alpha: 2. }
        );
        assert!("ehvi".parse::<InfillStrategy>().is_err());
    }

    #[test]
    fn test_constraint_violation() {
        let mean = array![[-1., 0.5], [-1., -1.]];
        let variance = array![[0., 0.], [0., 0.]];
        assert_eq!(
            ConstraintStrategy::MeanValue.violation(&mean.view(), &variance.view()),
            array![0.5, 0.]
        );
        assert_eq!(
            ConstraintStrategy::default().violation(&mean.view(), &variance.view()),
            array![0.5, 0.]
        );
    }
}
