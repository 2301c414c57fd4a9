use archopt_algos::AlgoError;
use archopt_problems::ProblemError;
use std::path::PathBuf;
use thiserror::Error;

/// A result type for experiment errors
pub type Result<T> = std::result::Result<T, RunnerError>;

/// An error raised while configuring, running or reporting experiments
#[derive(Error, Debug)]
pub enum RunnerError {
    /// When algorithm configurations and names are not paired
    #[error("Configuration mismatch: {n_algorithms} algorithms given for {n_names} names")]
    ConfigurationMismatch {
        /// number of algorithm configurations
        n_algorithms: usize,
        /// number of algorithm names
        n_names: usize,
    },
    /// When results are requested but were never persisted
    #[error("Missing results for {name}: {} not found", path.display())]
    MissingResults {
        /// algorithm name
        name: String,
        /// expected artifact location
        path: PathBuf,
    },
    /// When a trial fails, aborting the whole run
    #[error("Trial {repeat_idx} of {algorithm} failed")]
    TrialFailure {
        /// algorithm name
        algorithm: String,
        /// repetition index of the failed trial
        repeat_idx: usize,
        /// cause of the failure
        #[source]
        source: AlgoError,
    },
    /// When a problem operation fails
    #[error(transparent)]
    ProblemError(#[from] ProblemError),
    /// When an algorithm operation fails outside a trial
    #[error(transparent)]
    AlgoError(#[from] AlgoError),
    /// When results files can not be read or written
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// When results (de)serialization fails
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    /// When the worker pool can not be created
    #[error(transparent)]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
    /// When an invalid value is encountered
    #[error("Value error: {0}")]
    InvalidValue(String),
}
