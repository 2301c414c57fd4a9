//! Named algorithm configurations available to experiments.
use crate::doe_search::DoeSearch;
use crate::errors::{AlgoError, Result};
use crate::infill::{ConstraintStrategy, InfillStrategy};
use crate::sbo::SurrogateBasedInfill;
use crate::surrogate::SurrogateKind;
use crate::types::Algorithm;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the baseline search in the default registry
pub const DOE_ALGORITHM: &str = "DOE";

/// Parameters shared by the algorithms of an experiment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Size of the initial sample
    pub n_init: usize,
    /// Number of points evaluated per iteration
    pub n_batch: usize,
    /// Number of candidates scored per infill search
    pub n_candidates: usize,
    /// Number of leave-one-out folds computed per iteration
    pub n_loo_cv: usize,
    /// Surrogate model kind
    pub surrogate: SurrogateKind,
    /// Constraint handling of the surrogate based algorithms
    pub constraint_strategy: ConstraintStrategy,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            n_init: 10,
            n_batch: 1,
            n_candidates: 500,
            n_loo_cv: 0,
            surrogate: SurrogateKind::default(),
            constraint_strategy: ConstraintStrategy::default(),
        }
    }
}

/// Constructor of an algorithm given the experiment parameters
pub type AlgorithmBuilder = Arc<dyn Fn(&StrategyParams) -> Result<Arc<dyn Algorithm>> + Send + Sync>;

/// An ordered mapping from algorithm names to their constructors
#[derive(Clone)]
pub struct AlgorithmRegistry {
    entries: Vec<(String, AlgorithmBuilder)>,
}

impl AlgorithmRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        AlgorithmRegistry { entries: Vec::new() }
    }

    /// Registers a constructor under `name`, replacing any previous one
    pub fn register(
        &mut self,
        name: impl Into<String>,
        builder: impl Fn(&StrategyParams) -> Result<Arc<dyn Algorithm>> + Send + Sync + 'static,
    ) -> &mut Self {
        let name = name.into();
        let builder: AlgorithmBuilder = Arc::new(builder);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = builder,
            None => self.entries.push((name, builder)),
        }
        self
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Builds the algorithm registered under `name`
    pub fn create(&self, name: &str, params: &StrategyParams) -> Result<Arc<dyn Algorithm>> {
        let (_, builder) = self
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| {
                AlgoError::InvalidConfigError(format!(
                    "Unknown algorithm '{name}', available: {}",
                    self.names().join(", ")
                ))
            })?;
        builder(params)
    }
}

/// Surrogate based algorithm using `infill` configured from `params`
pub fn sbo_algorithm(infill: InfillStrategy, params: &StrategyParams) -> SurrogateBasedInfill {
    SurrogateBasedInfill::new(infill)
        .surrogate(params.surrogate)
        .constraint_strategy(params.constraint_strategy)
        .init_size(params.n_init)
        .infill_size(params.n_batch)
        .n_candidates(params.n_candidates)
        .n_loo_cv(params.n_loo_cv)
}

impl Default for AlgorithmRegistry {
    /// The baseline search followed by one surrogate based algorithm per infill criterion
    fn default() -> Self {
        let mut registry = AlgorithmRegistry::empty();
        registry.register(DOE_ALGORITHM, |params: &StrategyParams| {
            let algo: Arc<dyn Algorithm> = Arc::new(DoeSearch::new(params.n_init)?);
            Ok(algo)
        });
        for infill in InfillStrategy::ALL {
            let name = SurrogateBasedInfill::new(infill).name();
            registry.register(name, move |params: &StrategyParams| {
                let algo: Arc<dyn Algorithm> = Arc::new(sbo_algorithm(infill, params));
                Ok(algo)
            });
        }
        registry
    }
}
