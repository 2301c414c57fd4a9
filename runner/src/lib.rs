//! This library runs repeated benchmark experiments of optimization strategies
//! and reports their performance.
//!
//! An [Experimenter] binds a problem, an algorithm configuration, its name, a set
//! of [Metric]s and an evaluation budget. Each seeded trial records a [Snapshot]
//! of the metric values after every iteration.
//!
//! The harness functions organize a benchmark run:
//! * [configure_run]: one experiment per algorithm configuration,
//! * [run_all]: repeated trials, sequential or on a bounded thread pool, persisted
//!   then aggregated in a [ResultsStore],
//! * [plot_results]: comparison figures rendered from persisted results only,
//! * [run]: all of the above, with the possibility to skip the execution and
//!   only report previously persisted results.
//!
//! Example:
//! ```no_run
//! use archopt_algos::{AlgorithmRegistry, StrategyParams};
//! use archopt_problems::Zdt1;
//! use archopt_runner::{configure_run, run, DeltaHv, Metric, MetricSelection, ResultsStore, RunConfig};
//! use std::sync::Arc;
//!
//! let registry = AlgorithmRegistry::default();
//! let params = StrategyParams::default();
//! let names = vec!["DOE".to_string(), "SBO(y)".to_string()];
//! let algorithms = names
//!     .iter()
//!     .map(|name| registry.create(name, &params))
//!     .collect::<Result<Vec<_>, _>>()
//!     .expect("known algorithms");
//! let metrics: Vec<Arc<dyn Metric>> = vec![Arc::new(DeltaHv)];
//! let config = RunConfig::default();
//! let experiments = configure_run(
//!     Arc::new(Zdt1::default()),
//!     algorithms,
//!     &names,
//!     metrics,
//!     config.n_eval_max,
//!     config.n_repeat,
//! )
//! .expect("valid configuration");
//! let store = ResultsStore::new("results", "zdt1");
//! run(&store, &config, &experiments, &[MetricSelection::new("delta_hv", "delta_hv")], true)
//!     .expect("experiments run");
//! ```
#![warn(missing_docs)]
mod errors;
mod experimenter;
mod harness;
pub mod metrics;
pub mod report;
mod results;
mod storage;

pub use errors::*;
pub use experimenter::*;
pub use harness::*;
pub use metrics::{
    BestObjective, DeltaHv, Igd, InfillMetric, MaxConstraintViolation, Metric, MetricSelection,
    Spread, SurrogateQuality, TrainingMetric,
};
pub use results::*;
pub use storage::*;
