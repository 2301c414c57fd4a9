//! `archopt` benchmarks surrogate-assisted optimization strategies on analytical problems.
//!
//! The workspace is made of the following crates re-exported here:
//! * [problems]: problem definition, input correction and analytical benchmarks,
//! * [algos]: DoE baseline and surrogate based infill strategies, algorithm registry,
//! * [runner]: metrics, repeated experiments, results storage and reports.
//!
//! The [experiments] module gathers the experiments run by the `archopt` binary.
//!
//! ```no_run
//! use archopt::experiments::{run_effectiveness_analytical, EffectivenessConfig};
//!
//! // run then report repeated effectiveness experiments on the Goldstein problem
//! let figures = run_effectiveness_analytical(&EffectivenessConfig::default(), true)
//!     .expect("experiments run");
//! for figure in figures {
//!     println!("{:?}", figure.path);
//! }
//! ```
pub use archopt_algos as algos;
pub use archopt_problems as problems;
pub use archopt_runner as runner;

pub mod experiments;
