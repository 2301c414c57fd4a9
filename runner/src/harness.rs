//! Repetition harness: configures one experiment per algorithm, runs their
//! trials, persists and aggregates the results, then renders comparison figures
//! from the persisted results only.
use crate::errors::{Result, RunnerError};
use crate::experimenter::{Experimenter, Parallelism};
use crate::metrics::{Metric, MetricSelection};
use crate::report::{metric_comparison_html, save_html};
use crate::results::AggregatedResult;
use crate::storage::{algorithm_slug, ResultsStore};
use archopt_algos::Algorithm;
use archopt_problems::Problem;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Parameters of an experiment run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum number of evaluations per trial
    pub n_eval_max: usize,
    /// Number of repetitions per algorithm
    pub n_repeat: usize,
    /// Number of worker threads, trials run sequentially when 1
    pub n_workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            n_eval_max: 50,
            n_repeat: 8,
            n_workers: 1,
        }
    }
}

impl RunConfig {
    /// Execution mode of the trials
    pub fn parallelism(&self) -> Parallelism {
        if self.n_workers > 1 {
            Parallelism::Parallel {
                n_workers: self.n_workers,
            }
        } else {
            Parallelism::Sequential
        }
    }
}

/// A rendered comparison figure
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    /// Reported metric value
    pub selection: MetricSelection,
    /// HTML document
    pub html: String,
    /// Location of the document when saved
    pub path: Option<PathBuf>,
}

/// Builds one experiment per algorithm configuration.
///
/// Fails with [RunnerError::ConfigurationMismatch] when algorithms and names
/// are not paired, before anything runs.
pub fn configure_run(
    problem: Arc<dyn Problem>,
    algorithms: Vec<Arc<dyn Algorithm>>,
    algorithm_names: &[String],
    metrics: Vec<Arc<dyn Metric>>,
    n_eval_max: usize,
    n_repeat: usize,
) -> Result<Vec<Experimenter>> {
    if algorithms.len() != algorithm_names.len() {
        return Err(RunnerError::ConfigurationMismatch {
            n_algorithms: algorithms.len(),
            n_names: algorithm_names.len(),
        });
    }
    if n_repeat == 0 || n_eval_max == 0 {
        return Err(RunnerError::InvalidValue(format!(
            "Repetitions ({n_repeat}) and evaluation budget ({n_eval_max}) should be positive"
        )));
    }
    for (i, name) in algorithm_names.iter().enumerate() {
        let slug = algorithm_slug(name);
        if algorithm_names[..i].iter().any(|other| algorithm_slug(other) == slug) {
            return Err(RunnerError::InvalidValue(format!(
                "Algorithm name {name} is used more than once"
            )));
        }
    }
    info!(
        "Configure {} experiments on {} ({n_repeat} repetitions, {n_eval_max} evaluations)",
        algorithms.len(),
        problem.name()
    );
    Ok(algorithms
        .into_iter()
        .zip(algorithm_names)
        .map(|(algorithm, name)| {
            Experimenter::new(problem.clone(), algorithm, n_eval_max, name, metrics.clone())
        })
        .collect())
}

/// Runs `n_repeat` trials of every experiment. Each trial is saved in its own
/// file as soon as it completes; trials are then aggregated per experiment
/// and the aggregated results saved. The first trial failure aborts the run.
pub fn run_all(
    store: &ResultsStore,
    experiments: &[Experimenter],
    n_repeat: usize,
    parallelism: Parallelism,
) -> Result<Vec<AggregatedResult>> {
    let mut aggregated = Vec::with_capacity(experiments.len());
    for exp in experiments {
        store.reset(exp.algorithm_name())?;
        let trials = exp.run_with(n_repeat, parallelism, |trial| {
            store.save_trial(trial)?;
            Ok(())
        })?;
        let result = AggregatedResult::from_trials(&trials)?;
        let path = store.save_aggregated(&result)?;
        info!("{} results saved in {path:?}", exp.algorithm_name());
        aggregated.push(result);
    }
    Ok(aggregated)
}

/// Renders one comparison figure per selected metric value from the persisted
/// aggregated results of the experiments, saved in the results folder when
/// `save` is set. Fails with [RunnerError::MissingResults] when an experiment
/// has no persisted results.
pub fn plot_results(
    store: &ResultsStore,
    experiments: &[Experimenter],
    selections: &[MetricSelection],
    save: bool,
) -> Result<Vec<Figure>> {
    let results = experiments
        .iter()
        .map(|exp| store.load_aggregated(exp.algorithm_name()))
        .collect::<Result<Vec<_>>>()?;

    selections
        .iter()
        .map(|selection| {
            let html = metric_comparison_html(selection, &results)?;
            let path = if save {
                let path = store.dir().join(format!(
                    "{}_{}.html",
                    algorithm_slug(&selection.metric),
                    algorithm_slug(&selection.value)
                ));
                save_html(&path, &html)?;
                info!("Figure saved in {path:?}");
                Some(path)
            } else {
                None
            };
            Ok(Figure {
                selection: selection.clone(),
                html,
                path,
            })
        })
        .collect()
}

/// Runs the experiments when `do_run` is set, then reports from the persisted results
pub fn run(
    store: &ResultsStore,
    config: &RunConfig,
    experiments: &[Experimenter],
    selections: &[MetricSelection],
    do_run: bool,
) -> Result<Vec<Figure>> {
    if do_run {
        run_all(store, experiments, config.n_repeat, config.parallelism())?;
    } else {
        info!("Skip run, report {} results from {:?}", store.results_key(), store.dir());
    }
    plot_results(store, experiments, selections, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MaxConstraintViolation;
    use archopt_algos::DoeSearch;
    use archopt_problems::BinhKorn;

    #[test]
    fn test_configure_run_mismatch() {
        let algorithms: Vec<Arc<dyn Algorithm>> = vec![Arc::new(DoeSearch::new(2).unwrap())];
        let names = vec!["A".to_string(), "B".to_string()];
        let res = configure_run(
            Arc::new(BinhKorn::default()),
            algorithms,
            &names,
            vec![Arc::new(MaxConstraintViolation)],
            10,
            2,
        );
        assert!(matches!(
            res,
            Err(RunnerError::ConfigurationMismatch {
                n_algorithms: 1,
                n_names: 2
            })
        ));
    }

    #[test]
    fn test_configure_run_duplicated_names() {
        let algorithms: Vec<Arc<dyn Algorithm>> = vec![
            Arc::new(DoeSearch::new(2).unwrap()),
            Arc::new(DoeSearch::new(3).unwrap()),
        ];
        let names = vec!["SBO(y)".to_string(), "SBO_y".to_string()];
        let res = configure_run(Arc::new(BinhKorn::default()), algorithms, &names, vec![], 10, 2);
        assert!(matches!(res, Err(RunnerError::InvalidValue(_))));
    }

    #[test]
    fn test_run_config_parallelism() {
        assert_eq!(RunConfig::default().parallelism(), Parallelism::Sequential);
        let config = RunConfig {
            n_workers: 4,
            ..Default::default()
        };
        assert_eq!(config.parallelism(), Parallelism::Parallel { n_workers: 4 });
    }
}
