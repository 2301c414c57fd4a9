//! Trial results and their aggregation over repetitions.
use crate::errors::{Result, RunnerError};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric values keyed by metric name then value name, `None` when undefined
pub type MetricValues = BTreeMap<String, BTreeMap<String, Option<f64>>>;

/// Metric values recorded after an iteration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of function evaluations so far
    pub n_eval: usize,
    /// Recorded metric values
    pub values: MetricValues,
}

impl Snapshot {
    /// Value `value` of metric `metric`, `None` when absent or undefined
    pub fn get(&self, metric: &str, value: &str) -> Option<f64> {
        self.values.get(metric).and_then(|m| m.get(value)).copied().flatten()
    }
}

/// Result of one seeded run of an algorithm
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Algorithm name
    pub algorithm_name: String,
    /// Repetition index
    pub repeat_idx: usize,
    /// Random generator seed
    pub seed: u64,
    /// Snapshots, the first one recorded after initialization
    pub snapshots: Vec<Snapshot>,
}

/// Statistics of one metric value across repetitions, one entry per iteration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    /// Mean over defined values
    pub mean: Vec<Option<f64>>,
    /// Population standard deviation over defined values
    pub std: Vec<Option<f64>>,
    /// Minimum
    pub min: Vec<Option<f64>>,
    /// Maximum
    pub max: Vec<Option<f64>>,
    /// Median
    pub median: Vec<Option<f64>>,
    /// Individual values of each repetition
    pub traces: Vec<Vec<Option<f64>>>,
}

impl ValueStats {
    fn from_traces(traces: Vec<Vec<Option<f64>>>, n_iter: usize) -> Self {
        let mut stats = ValueStats {
            traces,
            ..Default::default()
        };
        for i in 0..n_iter {
            let defined: Array1<f64> = stats
                .traces
                .iter()
                .filter_map(|t| t.get(i).copied().flatten())
                .collect();
            if defined.is_empty() {
                stats.mean.push(None);
                stats.std.push(None);
                stats.min.push(None);
                stats.max.push(None);
                stats.median.push(None);
                continue;
            }
            stats.mean.push(defined.mean());
            stats.std.push(Some(defined.std(0.)));
            stats.min.push(Some(*defined.min_skipnan()));
            stats.max.push(Some(*defined.max_skipnan()));
            stats.median.push(Some(median(defined.to_vec())));
        }
        stats
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Results of all repetitions of an algorithm aggregated per iteration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Algorithm name
    pub algorithm_name: String,
    /// Number of aggregated repetitions
    pub n_repeat: usize,
    /// Mean number of evaluations at each iteration
    pub n_eval: Vec<f64>,
    /// Statistics keyed by metric name then value name
    pub values: BTreeMap<String, BTreeMap<String, ValueStats>>,
}

impl AggregatedResult {
    /// Aggregates trials of the same algorithm, ordered by repetition index
    pub fn from_trials(trials: &[TrialResult]) -> Result<Self> {
        let first = trials
            .first()
            .ok_or_else(|| RunnerError::InvalidValue("No trial to aggregate".to_string()))?;
        if let Some(other) = trials.iter().find(|t| t.algorithm_name != first.algorithm_name) {
            return Err(RunnerError::InvalidValue(format!(
                "Can not aggregate trials of {} with trials of {}",
                first.algorithm_name, other.algorithm_name
            )));
        }
        let n_iter = trials.iter().map(|t| t.snapshots.len()).max().unwrap_or(0);

        let n_eval = (0..n_iter)
            .map(|i| {
                let evals: Array1<f64> = trials
                    .iter()
                    .filter_map(|t| t.snapshots.get(i))
                    .map(|s| s.n_eval as f64)
                    .collect();
                evals.mean().unwrap_or(f64::NAN)
            })
            .collect();

        let mut keys: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for snapshot in trials.iter().flat_map(|t| t.snapshots.iter()) {
            for (metric, values) in &snapshot.values {
                let names = keys.entry(metric.clone()).or_default();
                for value in values.keys() {
                    if !names.contains(value) {
                        names.push(value.clone());
                    }
                }
            }
        }

        let values = keys
            .into_iter()
            .map(|(metric, value_names)| {
                let per_value = value_names
                    .into_iter()
                    .map(|value| {
                        let traces = trials
                            .iter()
                            .map(|t| t.snapshots.iter().map(|s| s.get(&metric, &value)).collect())
                            .collect();
                        let stats = ValueStats::from_traces(traces, n_iter);
                        (value, stats)
                    })
                    .collect();
                (metric, per_value)
            })
            .collect();

        Ok(AggregatedResult {
            algorithm_name: first.algorithm_name.clone(),
            n_repeat: trials.len(),
            n_eval,
            values,
        })
    }

    /// Statistics of value `value` of metric `metric`
    pub fn stats(&self, metric: &str, value: &str) -> Option<&ValueStats> {
        self.values.get(metric).and_then(|m| m.get(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn snapshot(n_eval: usize, v: Option<f64>) -> Snapshot {
        let mut values = MetricValues::new();
        values
            .entry("delta_hv".to_string())
            .or_default()
            .insert("hv".to_string(), v);
        Snapshot { n_eval, values }
    }

    fn trial(repeat_idx: usize, values: &[Option<f64>]) -> TrialResult {
        TrialResult {
            algorithm_name: "DOE".to_string(),
            repeat_idx,
            seed: repeat_idx as u64,
            snapshots: values
                .iter()
                .enumerate()
                .map(|(i, &v)| snapshot(10 * (i + 1), v))
                .collect(),
        }
    }

    #[test]
    fn test_aggregate() {
        let trials = vec![
            trial(0, &[Some(1.), Some(2.)]),
            trial(1, &[Some(3.), None]),
            trial(2, &[Some(5.), Some(4.)]),
        ];
        let agg = AggregatedResult::from_trials(&trials).unwrap();
        assert_eq!(agg.n_repeat, 3);
        assert_eq!(agg.n_eval, vec![10., 20.]);
        let stats = agg.stats("delta_hv", "hv").unwrap();
        assert_eq!(stats.mean, vec![Some(3.), Some(3.)]);
        assert_eq!(stats.min, vec![Some(1.), Some(2.)]);
        assert_eq!(stats.max, vec![Some(5.), Some(4.)]);
        assert_eq!(stats.median, vec![Some(3.), Some(3.)]);
        assert_abs_diff_eq!(stats.std[0].unwrap(), (8f64 / 3.).sqrt(), epsilon = 1e-12);
        assert_eq!(stats.traces.len(), 3);
        assert_eq!(stats.traces[1], vec![Some(3.), None]);
    }

    #[test]
    fn test_aggregate_undefined_values() {
        let trials = vec![trial(0, &[None]), trial(1, &[None])];
        let agg = AggregatedResult::from_trials(&trials).unwrap();
        assert_eq!(agg.stats("delta_hv", "hv").unwrap().mean, vec![None]);
    }

    #[test]
    fn test_aggregate_errors() {
        assert!(AggregatedResult::from_trials(&[]).is_err());
        let mut other = trial(1, &[Some(1.)]);
        other.algorithm_name = "SBO(ei)".to_string();
        assert!(AggregatedResult::from_trials(&[trial(0, &[Some(1.)]), other]).is_err());
    }

    #[test]
    fn test_json_roundtrip_with_undefined_values() {
        let t = trial(0, &[Some(1.5), None]);
        let json = serde_json::to_string(&t).unwrap();
        let back: TrialResult = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
