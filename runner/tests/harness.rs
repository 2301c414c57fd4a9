use archopt_algos::{Algorithm, AlgorithmRegistry, DoeSearch, StrategyParams};
use archopt_problems::{BinhKorn, MixedIntGoldstein, Problem};
use archopt_runner::*;
use serial_test::serial;
use std::sync::Arc;

const TEST_DIR: &str = "target/test_harness";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn metrics() -> Vec<Arc<dyn Metric>> {
    vec![
        Arc::new(DeltaHv),
        Arc::new(Igd),
        Arc::new(MaxConstraintViolation),
    ]
}

fn selections() -> Vec<MetricSelection> {
    vec![
        MetricSelection::new("delta_hv", "delta_hv"),
        MetricSelection::new("max_cv", "min_cv"),
    ]
}

fn doe_experiments(n_eval_max: usize) -> Vec<Experimenter> {
    let algorithms: Vec<Arc<dyn Algorithm>> = vec![
        Arc::new(DoeSearch::new(4).unwrap()),
        Arc::new(DoeSearch::new(2).unwrap()),
    ];
    let names = vec!["DOE-4".to_string(), "DOE-2".to_string()];
    configure_run(
        Arc::new(BinhKorn::default()),
        algorithms,
        &names,
        metrics(),
        n_eval_max,
        2,
    )
    .unwrap()
}

#[test]
#[serial]
fn test_run_all_repetitions() {
    init_logger();
    let store = ResultsStore::new(TEST_DIR, "repetitions");
    let experiments = doe_experiments(8);
    let results = run_all(&store, &experiments, 2, Parallelism::Sequential).unwrap();
    assert_eq!(results.len(), 2);

    for exp in &experiments {
        let trials = store.load_trials(exp.algorithm_name()).unwrap();
        assert_eq!(trials.len(), 2);
        assert!(!trials[0].snapshots.is_empty());
        assert_eq!(trials[0].snapshots.len(), trials[1].snapshots.len());
        assert_eq!(trials[0].snapshots.last().unwrap().n_eval, 8);
    }
    assert_eq!(results[0].n_repeat, 2);
    assert_eq!(results[0].n_eval, vec![4., 8.]);
    assert_eq!(results[1].n_eval, vec![2., 4., 6., 8.]);
    assert!(store.aggregated_path("DOE-4").exists());
}

#[test]
#[serial]
fn test_seeded_repetitions_are_reproducible() {
    init_logger();
    let store = ResultsStore::new(TEST_DIR, "reproducible");
    let experiments = doe_experiments(8);
    run_all(&store, &experiments[..1], 2, Parallelism::Sequential).unwrap();
    let first = store.load_trials("DOE-4").unwrap();
    run_all(&store, &experiments[..1], 2, Parallelism::Parallel { n_workers: 2 }).unwrap();
    let second = store.load_trials("DOE-4").unwrap();
    assert_eq!(first, second);
    // repetitions use different seeds
    assert_ne!(first[0].snapshots, first[1].snapshots);
}

#[test]
#[serial]
fn test_mismatch_detected_before_any_trial() {
    let store = ResultsStore::new(TEST_DIR, "mismatch");
    let _ = std::fs::remove_dir_all(store.dir());
    let algorithms: Vec<Arc<dyn Algorithm>> = vec![Arc::new(DoeSearch::new(4).unwrap())];
    let res = configure_run(
        Arc::new(BinhKorn::default()),
        algorithms,
        &[],
        metrics(),
        8,
        2,
    );
    assert!(matches!(
        res,
        Err(RunnerError::ConfigurationMismatch { .. })
    ));
    assert!(!store.dir().exists());
}

#[test]
#[serial]
fn test_skip_run_without_results() {
    init_logger();
    let store = ResultsStore::new(TEST_DIR, "never_run");
    let _ = std::fs::remove_dir_all(store.dir());
    let experiments = doe_experiments(8);
    let config = RunConfig {
        n_eval_max: 8,
        n_repeat: 2,
        n_workers: 1,
    };
    let res = run(&store, &config, &experiments, &selections(), false);
    assert!(matches!(res, Err(RunnerError::MissingResults { .. })));
}

#[test]
#[serial]
fn test_run_then_report_from_persisted_results() {
    init_logger();
    let store = ResultsStore::new(TEST_DIR, "report");
    let experiments = doe_experiments(6);
    let config = RunConfig {
        n_eval_max: 6,
        n_repeat: 2,
        n_workers: 2,
    };
    let figures = run(&store, &config, &experiments, &selections(), true).unwrap();
    assert_eq!(figures.len(), 2);
    for figure in &figures {
        let path = figure.path.as_ref().unwrap();
        assert!(path.exists());
        assert!(figure.html.contains("DOE-2"));
    }

    // skip-run mode reports the same persisted results
    let figures_again = run(&store, &config, &experiments, &selections(), false).unwrap();
    assert_eq!(figures, figures_again);
}

#[test]
#[serial]
fn test_surrogate_based_experiments() {
    init_logger();
    let store = ResultsStore::new(TEST_DIR, "goldstein");
    let registry = AlgorithmRegistry::default();
    let params = StrategyParams {
        n_init: 6,
        n_candidates: 50,
        n_loo_cv: 2,
        ..Default::default()
    };
    let names = vec!["DOE".to_string(), "SBO(lcb)".to_string()];
    let algorithms = names
        .iter()
        .map(|name| registry.create(name, &params).unwrap())
        .collect();
    let problem: Arc<dyn Problem> = Arc::new(MixedIntGoldstein::new());
    let metrics: Vec<Arc<dyn Metric>> = vec![
        Arc::new(BestObjective),
        Arc::new(SurrogateQuality),
        Arc::new(TrainingMetric),
        Arc::new(InfillMetric),
    ];
    let experiments = configure_run(problem, algorithms, &names, metrics, 9, 2).unwrap();
    let results = run_all(&store, &experiments, 2, Parallelism::Parallel { n_workers: 2 }).unwrap();

    let sbo = &results[1];
    assert_eq!(sbo.n_eval, vec![6., 7., 8., 9.]);
    let n_train = sbo.stats("training", "n_train").unwrap();
    assert_eq!(n_train.mean, vec![None, Some(6.), Some(7.), Some(8.)]);
    let rmse = sbo.stats("sm_quality", "rmse").unwrap();
    assert!(rmse.mean[1].is_some());
    // best objective never increases
    let f_min = sbo.stats("f_best", "f_min").unwrap();
    for trace in &f_min.traces {
        let values: Vec<f64> = trace.iter().map(|v| v.unwrap()).collect();
        assert!(values.windows(2).all(|w| w[1] <= w[0]));
    }
}
