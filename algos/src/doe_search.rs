//! Baseline search evaluating successive design of experiments samples.
use crate::errors::{AlgoError, Result};
use crate::types::{Algorithm, Archive, IterationInfo};
use archopt_problems::Problem;
use egobox_doe::{Lhs, LhsKind, Random, SamplingMethod};
use log::debug;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};

/// Kind of sampling used to generate designs of experiments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoeKind {
    /// Optimized latin hypercube sampling
    #[default]
    Lhs,
    /// Classic latin hypercube sampling, cheaper for large samples
    ClassicLhs,
    /// Uniform random sampling
    Random,
}

/// Samples `n` points within `xlimits` using a generator derived from `rng`
pub fn sample(
    kind: DoeKind,
    xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    n: usize,
    rng: &mut Xoshiro256Plus,
) -> Array2<f64> {
    if n == 0 {
        return Array2::zeros((0, xlimits.nrows()));
    }
    let doe_rng = Xoshiro256Plus::seed_from_u64(rng.gen::<u64>());
    match kind {
        DoeKind::Lhs => Lhs::new(xlimits).with_rng(doe_rng).sample(n),
        DoeKind::ClassicLhs => Lhs::new(xlimits)
            .kind(LhsKind::Classic)
            .with_rng(doe_rng)
            .sample(n),
        DoeKind::Random => Random::new(xlimits).with_rng(doe_rng).sample(n),
    }
}

/// Population based baseline: evaluates `pop_size` sampled points per iteration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoeSearch {
    pop_size: usize,
    kind: DoeKind,
}

impl Default for DoeSearch {
    fn default() -> Self {
        DoeSearch {
            pop_size: 10,
            kind: DoeKind::Random,
        }
    }
}

impl DoeSearch {
    /// A search evaluating `pop_size` points per iteration
    pub fn new(pop_size: usize) -> Result<Self> {
        if pop_size == 0 {
            return Err(AlgoError::InvalidConfigError(
                "DoE search population size should be positive".to_string(),
            ));
        }
        Ok(DoeSearch {
            pop_size,
            ..Default::default()
        })
    }

    /// Sets the sampling kind
    pub fn kind(mut self, kind: DoeKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Algorithm for DoeSearch {
    fn initialize(&self, problem: &dyn Problem, rng: &mut Xoshiro256Plus, budget: usize) -> Result<Archive> {
        let mut archive = Archive::for_problem(problem);
        let x = sample(self.kind, &problem.xlimits(), self.pop_size.min(budget), rng);
        archive.evaluate_and_append(problem, &x)?;
        debug!("DoE search initialized with {} points", archive.len());
        Ok(archive)
    }

    fn step(
        &self,
        problem: &dyn Problem,
        archive: &mut Archive,
        rng: &mut Xoshiro256Plus,
        n_iter: usize,
        budget: usize,
    ) -> Result<IterationInfo> {
        let x = sample(self.kind, &problem.xlimits(), self.pop_size.min(budget), rng);
        archive.evaluate_and_append(problem, &x)?;
        Ok(IterationInfo {
            n_iter,
            n_new: x.nrows(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archopt_problems::MixedIntGoldstein;

    #[test]
    fn test_doe_search_respects_budget() {
        let pb = MixedIntGoldstein::new();
        let algo = DoeSearch::new(4).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let mut archive = algo.initialize(&pb, &mut rng, 6).unwrap();
        assert_eq!(archive.len(), 4);
        let info = algo.step(&pb, &mut archive, &mut rng, 1, 2).unwrap();
        assert_eq!(info.n_new, 2);
        assert_eq!(archive.len(), 6);
        // discrete variables are corrected
        assert!(archive
            .x
            .columns()
            .into_iter()
            .skip(2)
            .all(|c| c.iter().all(|v| v.fract() == 0.)));
    }

    #[test]
    fn test_doe_search_is_seeded() {
        let pb = MixedIntGoldstein::new();
        let algo = DoeSearch::new(5).unwrap().kind(DoeKind::Lhs);
        let a = algo
            .initialize(&pb, &mut Xoshiro256Plus::seed_from_u64(3), 10)
            .unwrap();
        let b = algo
            .initialize(&pb, &mut Xoshiro256Plus::seed_from_u64(3), 10)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_pop_size() {
        assert!(DoeSearch::new(0).is_err());
    }
}
