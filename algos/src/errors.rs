use thiserror::Error;

/// A result type for algorithm errors
pub type Result<T> = std::result::Result<T, AlgoError>;

/// An error raised while running an optimization strategy
#[derive(Error, Debug)]
pub enum AlgoError {
    /// When problem correction or evaluation fails
    #[error(transparent)]
    ProblemError(#[from] archopt_problems::ProblemError),
    /// When surrogate fitting or prediction fails
    #[error("GP error")]
    GpError(#[from] egobox_gp::GpError),
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When an invalid value is encountered
    #[error("Value error: {0}")]
    InvalidValue(String),
    /// When array shapes do not match
    #[error(transparent)]
    ShapeError(#[from] ndarray::ShapeError),
}
