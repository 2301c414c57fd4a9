use thiserror::Error;

/// A result type for problem errors
pub type Result<T> = std::result::Result<T, ProblemError>;

/// An error raised when correcting or evaluating design vectors
#[derive(Error, Debug)]
pub enum ProblemError {
    /// When the design vector length does not match the variable count
    #[error("Invalid dimension: expected {expected} variables, got {got}")]
    InvalidDimension {
        /// number of variables of the problem
        expected: usize,
        /// number of columns of the given design vectors
        got: usize,
    },
    /// When a discrete level does not index an existing level
    #[error("Invalid level {level} for variable {var}: expected an integer in [0, {n_levels})")]
    InvalidLevel {
        /// variable index
        var: usize,
        /// faulty level value
        level: f64,
        /// number of available levels
        n_levels: usize,
    },
    /// When an invalid value is encountered
    #[error("Value error: {0}")]
    InvalidValue(String),
}
