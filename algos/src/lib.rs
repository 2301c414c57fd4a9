//! This library implements the optimization strategies compared in benchmark experiments.
//!
//! Every strategy implements the [Algorithm] trait: an initial sample is evaluated
//! then iterations add new evaluated points to an [Archive] until the evaluation
//! budget is spent.
//!
//! Available strategies:
//! * [DoeSearch]: baseline repeatedly evaluating design of experiments samples,
//! * [SurrogateBasedInfill]: Gaussian process surrogates trained on evaluated points,
//!   an [InfillStrategy] scoring sampled candidates and a [ConstraintStrategy]
//!   handling predicted constraints.
//!
//! Named configurations are made available through an [AlgorithmRegistry].
//!
//! Example:
//! ```no_run
//! use archopt_algos::{Algorithm, InfillStrategy, SurrogateBasedInfill};
//! use archopt_problems::MixedIntGoldstein;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//!
//! let problem = MixedIntGoldstein::new();
//! let algo = SurrogateBasedInfill::new(InfillStrategy::ExpectedImprovement).init_size(10);
//! let mut rng = Xoshiro256Plus::seed_from_u64(42);
//! let mut archive = algo.initialize(&problem, &mut rng, 20).expect("initial doe");
//! for i in 1..=10 {
//!     algo.step(&problem, &mut archive, &mut rng, i, 1).expect("infill iteration");
//! }
//! println!("best f = {}", archive.f.iter().fold(f64::INFINITY, |a, &b| a.min(b)));
//! ```
#![warn(missing_docs)]
mod doe_search;
mod errors;
mod infill;
mod pareto;
mod registry;
mod sbo;
mod surrogate;
mod types;
pub mod utils;

pub use doe_search::*;
pub use errors::*;
pub use infill::*;
pub use pareto::*;
pub use registry::*;
pub use sbo::*;
pub use surrogate::*;
pub use types::*;
