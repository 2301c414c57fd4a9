//! Performance metrics computed after each iteration of a trial.
//!
//! A [Metric] yields a fixed list of named values from the current archive
//! and the statistics of the last iteration. Values which are not defined in
//! a given state (no reference front, no feasible point, no surrogate) are NaN.
mod indicators;

pub use indicators::*;

use archopt_algos::{Archive, IterationInfo};
use archopt_problems::Problem;
use ndarray::{Array2, Axis};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

/// Reference point coordinate of the normalized hypervolume
pub const HV_REFERENCE: f64 = 1.1;

/// A performance metric
pub trait Metric: Send + Sync {
    /// Metric name
    fn name(&self) -> &str;

    /// Names of the computed values
    fn value_names(&self) -> &[&str];

    /// Computes the values, in [Metric::value_names] order
    fn calculate(&self, problem: &dyn Problem, archive: &Archive, info: &IterationInfo) -> Vec<f64>;
}

/// A (metric, value) pair selected for reporting
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSelection {
    /// Metric name
    pub metric: String,
    /// Value name
    pub value: String,
}

impl MetricSelection {
    /// Selects `value` of `metric`
    pub fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        MetricSelection {
            metric: metric.into(),
            value: value.into(),
        }
    }
}

/// Objective values of the feasible non-dominated points of the archive
pub fn feasible_front(archive: &Archive) -> Array2<f64> {
    let feasible = archive.feasible();
    let indices: Vec<usize> = archive
        .optimum_indices()
        .into_iter()
        .filter(|&i| feasible[i])
        .collect();
    archive.f.select(Axis(0), &indices)
}

/// Scales `f` with the ideal and nadir points of `reference_front`
fn normalize_front(f: &Array2<f64>, reference_front: &Array2<f64>) -> Array2<f64> {
    let ideal = reference_front.fold_axis(Axis(0), f64::INFINITY, |a, &b| a.min(b));
    let nadir = reference_front.fold_axis(Axis(0), f64::NEG_INFINITY, |a, &b| a.max(b));
    let range = (&nadir - &ideal).mapv(|v| if v > 0. { v } else { 1. });
    (f - &ideal) / &range
}

/// Relative hypervolume deviation from the reference front
#[derive(Clone, Debug, Default)]
pub struct DeltaHv;

impl Metric for DeltaHv {
    fn name(&self) -> &str {
        "delta_hv"
    }

    fn value_names(&self) -> &[&str] {
        &["delta_hv", "hv", "true_hv"]
    }

    fn calculate(&self, problem: &dyn Problem, archive: &Archive, _info: &IterationInfo) -> Vec<f64> {
        let Some(pf) = problem.pareto_front() else {
            return vec![f64::NAN; 3];
        };
        let reference = vec![HV_REFERENCE; pf.ncols()];
        let true_hv = hypervolume(&normalize_front(&pf, &pf), &reference);
        let hv = hypervolume(&normalize_front(&feasible_front(archive), &pf), &reference);
        let delta_hv = if true_hv > 0. {
            (true_hv - hv) / true_hv
        } else {
            f64::NAN
        };
        vec![delta_hv, hv, true_hv]
    }
}

/// Inverted generational distance to the reference front
#[derive(Clone, Debug, Default)]
pub struct Igd;

impl Metric for Igd {
    fn name(&self) -> &str {
        "IGD"
    }

    fn value_names(&self) -> &[&str] {
        &["indicator"]
    }

    fn calculate(&self, problem: &dyn Problem, archive: &Archive, _info: &IterationInfo) -> Vec<f64> {
        match problem.pareto_front() {
            Some(pf) => vec![igd(&feasible_front(archive), &pf)],
            None => vec![f64::NAN],
        }
    }
}

/// Distribution of the current front
#[derive(Clone, Debug, Default)]
pub struct Spread;

impl Metric for Spread {
    fn name(&self) -> &str {
        "spread"
    }

    fn value_names(&self) -> &[&str] {
        &["delta"]
    }

    fn calculate(&self, problem: &dyn Problem, archive: &Archive, _info: &IterationInfo) -> Vec<f64> {
        vec![spread(&feasible_front(archive), problem.pareto_front().as_ref())]
    }
}

/// Constraint violation of the current optimum and best violation found
#[derive(Clone, Debug, Default)]
pub struct MaxConstraintViolation;

impl Metric for MaxConstraintViolation {
    fn name(&self) -> &str {
        "max_cv"
    }

    fn value_names(&self) -> &[&str] {
        &["max_cv", "min_cv"]
    }

    fn calculate(&self, _problem: &dyn Problem, archive: &Archive, _info: &IterationInfo) -> Vec<f64> {
        if archive.is_empty() {
            return vec![f64::NAN; 2];
        }
        let cv = archive.cv();
        let opt = cv.select(Axis(0), &archive.optimum_indices());
        let max_cv = opt.max_skipnan();
        let min_cv = cv.min_skipnan();
        vec![*max_cv, *min_cv]
    }
}

/// Best feasible value of each objective found so far
#[derive(Clone, Debug, Default)]
pub struct BestObjective;

impl Metric for BestObjective {
    fn name(&self) -> &str {
        "f_best"
    }

    fn value_names(&self) -> &[&str] {
        &["f_min"]
    }

    fn calculate(&self, _problem: &dyn Problem, archive: &Archive, _info: &IterationInfo) -> Vec<f64> {
        let best = archopt_algos::utils::masked_column_min(&archive.f, &archive.feasible());
        let f_min = best.first().copied().unwrap_or(f64::NAN);
        vec![if f_min.is_finite() { f_min } else { f64::NAN }]
    }
}

/// Prediction quality of the surrogate models
#[derive(Clone, Debug, Default)]
pub struct SurrogateQuality;

impl Metric for SurrogateQuality {
    fn name(&self) -> &str {
        "sm_quality"
    }

    fn value_names(&self) -> &[&str] {
        &["rmse", "loo_cv"]
    }

    fn calculate(&self, _problem: &dyn Problem, _archive: &Archive, info: &IterationInfo) -> Vec<f64> {
        match &info.training {
            Some(training) => vec![
                training.rmse.unwrap_or(f64::NAN),
                training.loo_cv.unwrap_or(f64::NAN),
            ],
            None => vec![f64::NAN; 2],
        }
    }
}

/// Surrogate training set size and time
#[derive(Clone, Debug, Default)]
pub struct TrainingMetric;

impl Metric for TrainingMetric {
    fn name(&self) -> &str {
        "training"
    }

    fn value_names(&self) -> &[&str] {
        &["n_train", "n_samples", "time_train"]
    }

    fn calculate(&self, _problem: &dyn Problem, _archive: &Archive, info: &IterationInfo) -> Vec<f64> {
        match &info.training {
            Some(training) => vec![
                training.n_train as f64,
                training.n_samples as f64,
                training.time_train,
            ],
            None => vec![f64::NAN; 3],
        }
    }
}

/// Infill search time
#[derive(Clone, Debug, Default)]
pub struct InfillMetric;

impl Metric for InfillMetric {
    fn name(&self) -> &str {
        "infill"
    }

    fn value_names(&self) -> &[&str] {
        &["time_infill"]
    }

    fn calculate(&self, _problem: &dyn Problem, _archive: &Archive, info: &IterationInfo) -> Vec<f64> {
        vec![info.infill.as_ref().map_or(f64::NAN, |infill| infill.time_infill)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use archopt_algos::{InfillInfo, TrainingInfo};
    use archopt_problems::{BinhKorn, Evaluation, MixedIntGoldstein, Zdt1};
    use ndarray::array;

    fn archive_on_front(pb: &Zdt1) -> Archive {
        let pf = pb.pareto_front().unwrap();
        let mut archive = Archive::for_problem(pb);
        let x = Array2::zeros((pf.nrows(), pb.n_var()));
        archive
            .append(&x, &Evaluation::unconstrained(pf))
            .unwrap();
        archive
    }

    #[test]
    fn test_delta_hv_on_reference_front() {
        let pb = Zdt1::default();
        let archive = archive_on_front(&pb);
        let values = DeltaHv.calculate(&pb, &archive, &IterationInfo::default());
        assert_eq!(values.len(), DeltaHv.value_names().len());
        assert_abs_diff_eq!(values[0], 0., epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], values[2], epsilon = 1e-12);
        assert!(values[2] > 0.8 && values[2] < HV_REFERENCE * HV_REFERENCE);
    }

    #[test]
    fn test_igd_on_reference_front() {
        let pb = Zdt1::default();
        let archive = archive_on_front(&pb);
        let values = Igd.calculate(&pb, &archive, &IterationInfo::default());
        assert_abs_diff_eq!(values[0], 0., epsilon = 1e-12);
    }

    #[test]
    fn test_front_metrics_without_feasible_points() {
        let pb = BinhKorn::default();
        let mut archive = Archive::for_problem(&pb);
        archive.evaluate_and_append(&pb, &array![[0., 0.]]).unwrap();
        archive.g.fill(1.);
        let info = IterationInfo::default();
        let values = DeltaHv.calculate(&pb, &archive, &info);
        assert_eq!(values[0], 1.);
        assert_eq!(values[1], 0.);
        assert!(Igd.calculate(&pb, &archive, &info)[0].is_nan());
        assert_eq!(
            MaxConstraintViolation.calculate(&pb, &archive, &info),
            vec![2., 2.]
        );
    }

    #[test]
    fn test_undefined_front_metrics_for_single_objective() {
        let pb = MixedIntGoldstein::new();
        let mut archive = Archive::for_problem(&pb);
        archive
            .evaluate_and_append(&pb, &array![[0., 0., 0., 0.], [50., 50., 1., 1.]])
            .unwrap();
        let info = IterationInfo::default();
        assert!(DeltaHv.calculate(&pb, &archive, &info).iter().all(|v| v.is_nan()));
        assert!(Spread.calculate(&pb, &archive, &info)[0].is_nan());
        let f_min = BestObjective.calculate(&pb, &archive, &info)[0];
        assert_eq!(f_min, archive.f.iter().fold(f64::INFINITY, |a, &b| a.min(b)));
        assert_eq!(
            MaxConstraintViolation.calculate(&pb, &archive, &info),
            vec![0., 0.]
        );
    }

    #[test]
    fn test_surrogate_metrics() {
        let pb = MixedIntGoldstein::new();
        let archive = Archive::for_problem(&pb);
        let info = IterationInfo {
            n_iter: 1,
            n_new: 1,
            training: Some(TrainingInfo {
                n_train: 10,
                n_samples: 10,
                time_train: 0.5,
                rmse: Some(0.1),
                loo_cv: None,
            }),
            infill: Some(InfillInfo {
                n_infill: 1,
                time_infill: 0.2,
            }),
        };
        let sm = SurrogateQuality.calculate(&pb, &archive, &info);
        assert_eq!(sm[0], 0.1);
        assert!(sm[1].is_nan());
        assert_eq!(TrainingMetric.calculate(&pb, &archive, &info), vec![10., 10., 0.5]);
        assert_eq!(InfillMetric.calculate(&pb, &archive, &info), vec![0.2]);
        assert!(InfillMetric
            .calculate(&pb, &archive, &IterationInfo::default())[0]
            .is_nan());
    }
}
