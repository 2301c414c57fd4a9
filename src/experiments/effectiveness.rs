//! Effectiveness experiments: every registered strategy is run repeatedly on a
//! problem and compared on front quality, constraint satisfaction, surrogate
//! quality and cost.
use crate::algos::{AlgorithmRegistry, ConstraintStrategy, StrategyParams, SurrogateKind};
use crate::problems::{BinhKorn, MixedIntGoldstein, Problem, Zdt1};
use crate::runner::{
    configure_run, run, BestObjective, DeltaHv, Figure, Igd, InfillMetric, MaxConstraintViolation,
    Metric, MetricSelection, ResultsStore, Result, RunConfig, RunnerError, Spread,
    SurrogateQuality, TrainingMetric,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Default folder of the experiment results
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Number of leave-one-out folds of the surrogate quality metric
pub const N_LOO_CV: usize = 4;

/// Total number of evaluations targeted by an experiment, initial sample included
const N_EVAL_TARGET: usize = 400;

/// Maximum number of infill evaluations of an experiment
const N_INFILL_EVAL_MAX: usize = 1000;

/// Problems available to the effectiveness experiments
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BenchmarkProblem {
    /// Bi-objective ZDT1 problem
    Zdt1,
    /// Constrained bi-objective Binh and Korn problem
    BinhKorn,
    /// Mixed-integer Goldstein problem
    Goldstein,
}

impl BenchmarkProblem {
    /// Problem instance
    pub fn instance(&self) -> Arc<dyn Problem> {
        match self {
            BenchmarkProblem::Zdt1 => Arc::new(Zdt1::default()),
            BenchmarkProblem::BinhKorn => Arc::new(BinhKorn::default()),
            BenchmarkProblem::Goldstein => Arc::new(MixedIntGoldstein::new()),
        }
    }

    /// Short name used in results keys
    pub fn key(&self) -> &'static str {
        match self {
            BenchmarkProblem::Zdt1 => "zdt1",
            BenchmarkProblem::BinhKorn => "binh_korn",
            BenchmarkProblem::Goldstein => "goldstein",
        }
    }
}

/// Settings shared by the effectiveness experiments
#[derive(Clone, Debug)]
pub struct EffectivenessConfig {
    /// Folder of the results
    pub results_dir: PathBuf,
    /// Number of repetitions per algorithm
    pub n_repeat: usize,
    /// Number of worker threads
    pub n_workers: usize,
    /// Names of the compared algorithms, all the registered ones when empty
    pub algorithms: Vec<String>,
    /// Evaluation budget overriding the default one
    pub n_eval_max: Option<usize>,
    /// Number of candidates scored per infill search
    pub n_candidates: usize,
    /// Surrogate model of the surrogate based algorithms
    pub surrogate: SurrogateKind,
    /// Constraint handling of the surrogate based algorithms
    pub constraint_strategy: ConstraintStrategy,
}

impl Default for EffectivenessConfig {
    fn default() -> Self {
        EffectivenessConfig {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            n_repeat: 8,
            n_workers: 1,
            algorithms: Vec::new(),
            n_eval_max: None,
            n_candidates: StrategyParams::default().n_candidates,
            surrogate: SurrogateKind::default(),
            constraint_strategy: ConstraintStrategy::default(),
        }
    }
}

/// Metrics recorded for `problem` and the (metric, value) pairs to plot
pub fn get_metrics(
    problem: &dyn Problem,
    include_loo_cv: bool,
) -> (Vec<Arc<dyn Metric>>, Vec<MetricSelection>) {
    let mut metrics: Vec<Arc<dyn Metric>> = Vec::new();
    let mut selections = Vec::new();
    if problem.pareto_front().is_some() {
        metrics.push(Arc::new(DeltaHv));
        metrics.push(Arc::new(Igd));
        metrics.push(Arc::new(Spread));
        selections.push(MetricSelection::new("delta_hv", "delta_hv"));
        selections.push(MetricSelection::new("IGD", "indicator"));
        selections.push(MetricSelection::new("spread", "delta"));
    } else {
        metrics.push(Arc::new(BestObjective));
        selections.push(MetricSelection::new("f_best", "f_min"));
    }
    metrics.push(Arc::new(MaxConstraintViolation));
    metrics.push(Arc::new(SurrogateQuality));
    metrics.push(Arc::new(TrainingMetric));
    metrics.push(Arc::new(InfillMetric));
    if problem.n_cstr() > 0 {
        selections.push(MetricSelection::new("max_cv", "max_cv"));
    }
    selections.push(MetricSelection::new("sm_quality", "rmse"));
    if include_loo_cv {
        selections.push(MetricSelection::new("sm_quality", "loo_cv"));
    }
    for value in ["n_train", "n_samples", "time_train"] {
        selections.push(MetricSelection::new("training", value));
    }
    selections.push(MetricSelection::new("infill", "time_infill"));
    (metrics, selections)
}

/// Compares the algorithms on the mixed-integer Goldstein problem, one infill point per iteration
pub fn run_effectiveness_analytical(config: &EffectivenessConfig, do_run: bool) -> Result<Vec<Figure>> {
    let problem: Arc<dyn Problem> = Arc::new(MixedIntGoldstein::new());
    run_effectiveness(problem, "eff_an_1", 1, do_run, config)
}

/// Compares the algorithms on the constrained bi-objective Binh and Korn problem,
/// five infill points per iteration
pub fn run_effectiveness_analytical_mo(config: &EffectivenessConfig, do_run: bool) -> Result<Vec<Figure>> {
    let problem: Arc<dyn Problem> = Arc::new(BinhKorn::default());
    run_effectiveness(problem, "eff_an_5", 5, do_run, config)
}

/// Runs (when `do_run` is set) and reports an effectiveness experiment on `problem`,
/// results being stored under `results_key`.
///
/// The initial sample size is 5 times the number of variables and the budget
/// targets 400 evaluations with at most 1000 infill evaluations.
pub fn run_effectiveness(
    problem: Arc<dyn Problem>,
    results_key: &str,
    n_infill: usize,
    do_run: bool,
    config: &EffectivenessConfig,
) -> Result<Vec<Figure>> {
    if n_infill == 0 {
        return Err(RunnerError::InvalidValue(
            "Number of infill points per iteration should be positive".to_string(),
        ));
    }
    let include_loo_cv = false;
    let (metrics, selections) = get_metrics(problem.as_ref(), include_loo_cv);

    let n_init = 5 * problem.n_var();
    let n_iter = N_EVAL_TARGET.saturating_sub(n_init);
    let n_eval_max = config
        .n_eval_max
        .unwrap_or(n_init + (n_iter * n_infill).min(N_INFILL_EVAL_MAX));

    let params = StrategyParams {
        n_init,
        n_batch: n_infill,
        n_candidates: config.n_candidates,
        n_loo_cv: if include_loo_cv { N_LOO_CV } else { 0 },
        surrogate: config.surrogate,
        constraint_strategy: config.constraint_strategy,
    };
    let registry = AlgorithmRegistry::default();
    let names: Vec<String> = if config.algorithms.is_empty() {
        registry.names().into_iter().map(String::from).collect()
    } else {
        config.algorithms.clone()
    };
    let algorithms = names
        .iter()
        .map(|name| registry.create(name, &params))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    info!(
        "Effectiveness experiment {results_key} on {}: {} algorithms, {n_eval_max} evaluations",
        problem.name(),
        names.len()
    );
    let run_config = RunConfig {
        n_eval_max,
        n_repeat: config.n_repeat,
        n_workers: config.n_workers,
    };
    let experiments = configure_run(
        problem,
        algorithms,
        &names,
        metrics,
        run_config.n_eval_max,
        run_config.n_repeat,
    )?;
    let store = ResultsStore::new(&config.results_dir, results_key);
    run(&store, &run_config, &experiments, &selections, do_run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_metrics() {
        let (metrics, selections) = get_metrics(&BinhKorn::default(), true);
        let names: Vec<&str> = metrics.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec!["delta_hv", "IGD", "spread", "max_cv", "sm_quality", "training", "infill"]
        );
        assert!(selections.contains(&MetricSelection::new("sm_quality", "loo_cv")));
        assert!(selections.contains(&MetricSelection::new("max_cv", "max_cv")));
        // every selection refers to a recorded value
        for selection in &selections {
            let metric = metrics.iter().find(|m| m.name() == selection.metric).unwrap();
            assert!(metric.value_names().contains(&selection.value.as_str()));
        }

        let (metrics, selections) = get_metrics(&MixedIntGoldstein::new(), false);
        assert_eq!(metrics[0].name(), "f_best");
        assert!(!selections.contains(&MetricSelection::new("sm_quality", "loo_cv")));
        assert!(!selections.iter().any(|s| s.metric == "max_cv"));
    }

    #[test]
    fn test_invalid_algorithm_name() {
        let config = EffectivenessConfig {
            algorithms: vec!["NSGA2".to_string()],
            results_dir: PathBuf::from("target/test_effectiveness"),
            ..Default::default()
        };
        let res = run_effectiveness(BenchmarkProblem::Goldstein.instance(), "invalid", 1, true, &config);
        assert!(matches!(res, Err(RunnerError::AlgoError(_))));
    }
}
