//! Experiments run by the `archopt` binary.
mod effectiveness;
mod goldstein;

pub use effectiveness::*;
pub use goldstein::*;
