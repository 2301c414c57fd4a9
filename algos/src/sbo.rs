//! Surrogate based optimization: surrogates are trained on all evaluated
//! points, an infill criterion scores a pool of sampled candidates and the
//! best candidates are evaluated on the problem.
use crate::doe_search::{sample, DoeKind};
use crate::errors::{AlgoError, Result};
use crate::infill::{ConstraintStrategy, InfillContext, InfillStrategy};
use crate::pareto::select_best;
use crate::surrogate::{loo_cv, SurrogateKind};
use crate::types::{Algorithm, Archive, InfillInfo, IterationInfo, TrainingInfo};
use crate::utils::{masked_column_min, min_distances, normalize_x, rmse};
use archopt_problems::{correct_x, Problem};
use log::{debug, info};
use ndarray::{concatenate, s, Array2, ArrayBase, Axis, Data, Ix2};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Normalized distance under which two design vectors are considered equal
const DUPLICATE_TOL: f64 = 1e-8;

/// Surrogate based infill algorithm configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurrogateBasedInfill {
    surrogate: SurrogateKind,
    infill: InfillStrategy,
    constraint_strategy: ConstraintStrategy,
    init_size: usize,
    infill_size: usize,
    n_candidates: usize,
    n_loo_cv: usize,
}

impl Default for SurrogateBasedInfill {
    fn default() -> Self {
        SurrogateBasedInfill {
            surrogate: SurrogateKind::default(),
            infill: InfillStrategy::FunctionEstimate,
            constraint_strategy: ConstraintStrategy::default(),
            init_size: 10,
            infill_size: 1,
            n_candidates: 500,
            n_loo_cv: 0,
        }
    }
}

impl SurrogateBasedInfill {
    /// A surrogate based algorithm using the given infill criterion
    pub fn new(infill: InfillStrategy) -> Self {
        SurrogateBasedInfill {
            infill,
            ..Default::default()
        }
    }

    /// Sets the surrogate model kind
    pub fn surrogate(mut self, surrogate: SurrogateKind) -> Self {
        self.surrogate = surrogate;
        self
    }

    /// Sets the constraint handling criterion
    pub fn constraint_strategy(mut self, constraint_strategy: ConstraintStrategy) -> Self {
        self.constraint_strategy = constraint_strategy;
        self
    }

    /// Sets the number of points of the initial LHS
    pub fn init_size(mut self, init_size: usize) -> Self {
        self.init_size = init_size;
        self
    }

    /// Sets the number of points evaluated per iteration
    pub fn infill_size(mut self, infill_size: usize) -> Self {
        self.infill_size = infill_size;
        self
    }

    /// Sets the number of candidates scored by the infill criterion
    pub fn n_candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = n_candidates;
        self
    }

    /// Sets the number of leave-one-out folds computed per iteration, 0 disables it
    pub fn n_loo_cv(mut self, n_loo_cv: usize) -> Self {
        self.n_loo_cv = n_loo_cv;
        self
    }

    /// Name of the configuration as `SBO(<infill key>)`
    pub fn name(&self) -> String {
        format!("SBO({})", self.infill.key())
    }

    fn check(&self) -> Result<()> {
        if self.init_size < 2 {
            return Err(AlgoError::InvalidConfigError(format!(
                "At least 2 initial points required to train surrogates, got {}",
                self.init_size
            )));
        }
        if self.infill_size == 0 || self.n_candidates < self.infill_size {
            return Err(AlgoError::InvalidConfigError(format!(
                "Infill size ({}) should be positive and lower than candidates count ({})",
                self.infill_size, self.n_candidates
            )));
        }
        if let ConstraintStrategy::ProbabilityOfFeasibility { min_pof } = self.constraint_strategy {
            if !(0. ..=1.).contains(&min_pof) {
                return Err(AlgoError::InvalidConfigError(format!(
                    "Minimum probability of feasibility should be in [0, 1], got {min_pof}"
                )));
            }
        }
        Ok(())
    }
}

/// Row indices of `x` not duplicating another row of `x` nor a row of `xref`
fn unique_new_rows(x: &Array2<f64>, xref: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Vec<usize> {
    let d_ref = min_distances(x, xref);
    let mut kept: Vec<usize> = Vec::with_capacity(x.nrows());
    for (i, &d) in d_ref.iter().enumerate() {
        if d <= DUPLICATE_TOL {
            continue;
        }
        let is_dup = kept
            .iter()
            .any(|&k| (&x.row(i) - &x.row(k)).mapv(|v| v * v).sum().sqrt() <= DUPLICATE_TOL);
        if !is_dup {
            kept.push(i);
        }
    }
    kept
}

impl Algorithm for SurrogateBasedInfill {
    fn initialize(&self, problem: &dyn Problem, rng: &mut Xoshiro256Plus, budget: usize) -> Result<Archive> {
        self.check()?;
        let n = self.init_size.min(budget);
        info!("Compute initial LHS with {n} points");
        let x = sample(DoeKind::Lhs, &problem.xlimits(), n, rng);
        let mut archive = Archive::for_problem(problem);
        archive.evaluate_and_append(problem, &x)?;
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
        let n_obj = problem.n_obj();
        let xlimits = problem.xlimits();
        let xt = normalize_x(&archive.x, &xlimits);
        let yt = concatenate(Axis(1), &[archive.f.view(), archive.g.view()])?;

        let now = Instant::now();
        let model = self.surrogate.fit(&xt, &yt)?;
        let time_train = now.elapsed().as_secs_f64();
        let loo = if self.n_loo_cv > 0 {
            Some(loo_cv(self.surrogate, &xt, &yt, self.n_loo_cv)?)
        } else {
            None
        };
        debug!("Surrogates trained in {time_train:.3}s on {} points", xt.nrows());

        let now = Instant::now();
        let candidates = correct_x(
            problem.xtypes(),
            &sample(DoeKind::ClassicLhs, &xlimits, self.n_candidates, rng),
        )?;
        let candidates = normalize_x(&candidates, &xlimits);
        let kept = unique_new_rows(&candidates, &xt);
        if kept.is_empty() {
            return Err(AlgoError::InvalidValue(
                "No new candidate point found for infill".to_string(),
            ));
        }
        let candidates = candidates.select(Axis(0), &kept);
        let (mean, variance) = model.predict(&candidates)?;

        let feasible = archive.feasible();
        let mut f_min = masked_column_min(&archive.f, &feasible);
        if f_min.iter().any(|v| v.is_infinite()) {
            f_min = masked_column_min(&archive.f, &vec![true; archive.len()]);
        }
        let ctx = InfillContext {
            f_min,
            front: archive.f.select(Axis(0), &archive.optimum_indices()),
            x_train: xt,
        };
        let acquisition = self.infill.compute(
            &candidates.view(),
            &mean.slice(s![.., ..n_obj]),
            &variance.slice(s![.., ..n_obj]),
            &ctx,
        );
        let cv = if problem.n_cstr() > 0 {
            self.constraint_strategy
                .violation(&mean.slice(s![.., n_obj..]), &variance.slice(s![.., n_obj..]))
                .to_vec()
        } else {
            Vec::new()
        };
        let selected = select_best(&acquisition, &cv, self.infill_size.min(budget));
        let time_infill = now.elapsed().as_secs_f64();

        let x_new = &xlimits.column(0)
            + &(&candidates.select(Axis(0), &selected)
                * &(&xlimits.column(1) - &xlimits.column(0)));
        let eval = archive.evaluate_and_append(problem, &x_new)?;
        let actual = concatenate(Axis(1), &[eval.f.view(), eval.g.view()])?;
        let err = rmse(&mean.select(Axis(0), &selected), &actual);
        info!(
            "{} iteration {n_iter}: {} new points (rmse={err:.4e})",
            self.name(),
            selected.len()
        );

        Ok(IterationInfo {
            n_iter,
            n_new: selected.len(),
            training: Some(TrainingInfo {
                n_train: ctx.x_train.nrows(),
                n_samples: archive.len() - selected.len(),
                time_train,
                rmse: Some(err),
                loo_cv: loo,
            }),
            infill: Some(InfillInfo {
                n_infill: selected.len(),
                time_infill,
            }),
        })
    }
}
