//! Seeded runs of one algorithm on one problem.
use crate::errors::{Result, RunnerError};
use crate::metrics::Metric;
use crate::results::{MetricValues, Snapshot, TrialResult};
use archopt_algos::{AlgoError, Algorithm, Archive, IterationInfo};
use archopt_problems::Problem;
use log::{debug, info, warn};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// How repeated trials are executed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// One trial after the other
    #[default]
    Sequential,
    /// Trials distributed over a pool of `n_workers` threads
    Parallel {
        /// number of worker threads
        n_workers: usize,
    },
}

/// An experiment: one problem, one algorithm configuration, its name,
/// the metrics to record and the evaluation budget of each trial
#[derive(Clone)]
pub struct Experimenter {
    problem: Arc<dyn Problem>,
    algorithm: Arc<dyn Algorithm>,
    n_eval_max: usize,
    algorithm_name: String,
    metrics: Vec<Arc<dyn Metric>>,
}

impl fmt::Debug for Experimenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experimenter")
            .field("problem", &self.problem.name())
            .field("algorithm_name", &self.algorithm_name)
            .field("n_eval_max", &self.n_eval_max)
            .field(
                "metrics",
                &self.metrics.iter().map(|m| m.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Experimenter {
    /// A new experiment
    pub fn new(
        problem: Arc<dyn Problem>,
        algorithm: Arc<dyn Algorithm>,
        n_eval_max: usize,
        algorithm_name: &str,
        metrics: Vec<Arc<dyn Metric>>,
    ) -> Self {
        Experimenter {
            problem,
            algorithm,
            n_eval_max,
            algorithm_name: algorithm_name.to_string(),
            metrics,
        }
    }

    /// Algorithm name
    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    /// Tested problem
    pub fn problem(&self) -> &dyn Problem {
        self.problem.as_ref()
    }

    /// Maximum number of evaluations of a trial
    pub fn n_eval_max(&self) -> usize {
        self.n_eval_max
    }

    /// Recorded metrics
    pub fn metrics(&self) -> &[Arc<dyn Metric>] {
        &self.metrics
    }

    fn snapshot(&self, archive: &Archive, info: &IterationInfo) -> Snapshot {
        let mut values = MetricValues::new();
        for metric in &self.metrics {
            let computed = metric.calculate(self.problem.as_ref(), archive, info);
            let named = metric
                .value_names()
                .iter()
                .zip(computed)
                .map(|(name, v)| (name.to_string(), if v.is_nan() { None } else { Some(v) }))
                .collect();
            values.insert(metric.name().to_string(), named);
        }
        Snapshot {
            n_eval: archive.len(),
            values,
        }
    }

    /// Runs one trial with a generator seeded by `seed`, recording a snapshot
    /// after initialization and after each iteration
    pub fn run_trial(&self, repeat_idx: usize, seed: u64) -> Result<TrialResult> {
        let failure = |source: AlgoError| RunnerError::TrialFailure {
            algorithm: self.algorithm_name.clone(),
            repeat_idx,
            source,
        };
        let problem = self.problem.as_ref();
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);

        let mut archive = self
            .algorithm
            .initialize(problem, &mut rng, self.n_eval_max)
            .map_err(failure)?;
        let init_info = IterationInfo {
            n_iter: 0,
            n_new: archive.len(),
            ..Default::default()
        };
        let mut snapshots = vec![self.snapshot(&archive, &init_info)];

        let mut n_iter = 1;
        while archive.len() < self.n_eval_max {
            let budget = self.n_eval_max - archive.len();
            let info = self
                .algorithm
                .step(problem, &mut archive, &mut rng, n_iter, budget)
                .map_err(failure)?;
            if info.n_new == 0 {
                warn!(
                    "{} trial {repeat_idx} stopped at {} evaluations: no new point",
                    self.algorithm_name,
                    archive.len()
                );
                break;
            }
            snapshots.push(self.snapshot(&archive, &info));
            n_iter += 1;
        }
        debug!(
            "{} trial {repeat_idx} done: {} evaluations, {} snapshots",
            self.algorithm_name,
            archive.len(),
            snapshots.len()
        );

        Ok(TrialResult {
            algorithm_name: self.algorithm_name.clone(),
            repeat_idx,
            seed,
            snapshots,
        })
    }

    /// Runs `n_repeat` trials, seeded by their repetition index, calling
    /// `on_trial` as soon as each one completes. Results are ordered by
    /// repetition index whatever the execution mode.
    pub fn run_with<F>(&self, n_repeat: usize, parallelism: Parallelism, on_trial: F) -> Result<Vec<TrialResult>>
    where
        F: Fn(&TrialResult) -> Result<()> + Sync,
    {
        let run_one = |i: usize| -> Result<TrialResult> {
            let trial = self.run_trial(i, i as u64)?;
            on_trial(&trial)?;
            Ok(trial)
        };
        info!(
            "Run {n_repeat} trials of {} on {} ({parallelism:?})",
            self.algorithm_name,
            self.problem.name()
        );
        match parallelism {
            Parallelism::Sequential => (0..n_repeat).map(run_one).collect(),
            Parallelism::Parallel { n_workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n_workers.max(1))
                    .build()?;
                pool.install(|| (0..n_repeat).into_par_iter().map(run_one).collect())
            }
        }
    }

    /// Runs `n_repeat` trials one after the other
    pub fn run_repeated(&self, n_repeat: usize) -> Result<Vec<TrialResult>> {
        self.run_with(n_repeat, Parallelism::Sequential, |_| Ok(()))
    }

    /// Runs `n_repeat` trials on at most `n_workers` threads
    pub fn run_parallel(&self, n_repeat: usize, n_workers: usize) -> Result<Vec<TrialResult>> {
        self.run_with(n_repeat, Parallelism::Parallel { n_workers }, |_| Ok(()))
    }
}
