//! This library provides the optimization problems used to benchmark
//! surrogate-assisted optimization strategies.
//!
//! A [Problem] is defined by a list of typed input variables ([XType]): continuous,
//! integer, ordered or categorical. Design vectors are given as rows of a 2D ndarray
//! and are corrected (bounds clamping and projection onto discrete levels)
//! before being evaluated.
//!
//! Example:
//! ```
//! use archopt_problems::{MixedIntGoldstein, Problem};
//! use ndarray::array;
//!
//! let problem = MixedIntGoldstein::new();
//! // x3, x4 values are corrected to the closest integer levels before evaluation
//! let res = problem.evaluate(&array![[0., 0., 0.2, 0.1]].view()).expect("Goldstein evaluation");
//! assert!((res.f[[0, 0]] - 51.21505864).abs() < 1e-8);
//! ```
//!
//! Available problems:
//! * [MixedIntGoldstein]: single objective, two continuous and two integer variables,
//! * [Zdt1]: bi-objective, continuous,
//! * [BinhKorn]: bi-objective, continuous, two inequality constraints.
#![warn(missing_docs)]
mod binh_korn;
mod errors;
mod goldstein;
mod problem;
mod types;
mod zdt;

pub use binh_korn::*;
pub use errors::*;
pub use goldstein::*;
pub use problem::*;
pub use types::*;
pub use zdt::*;
