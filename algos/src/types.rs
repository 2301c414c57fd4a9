use crate::errors::Result;
use crate::pareto::{constraint_violation, non_dominated_sort, CV_TOL};
use archopt_problems::{Evaluation, Problem};
use ndarray::{concatenate, Array1, Array2, Axis};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};

/// All the points evaluated during an optimization run
#[derive(Clone, Debug, PartialEq)]
pub struct Archive {
    /// Corrected design vectors (n, n_var)
    pub x: Array2<f64>,
    /// Objective values (n, n_obj)
    pub f: Array2<f64>,
    /// Constraint values (n, n_cstr)
    pub g: Array2<f64>,
}

impl Archive {
    /// An empty archive for the given problem dimensions
    pub fn new(n_var: usize, n_obj: usize, n_cstr: usize) -> Self {
        Archive {
            x: Array2::zeros((0, n_var)),
            f: Array2::zeros((0, n_obj)),
            g: Array2::zeros((0, n_cstr)),
        }
    }

    /// An empty archive shaped after the problem
    pub fn for_problem(problem: &dyn Problem) -> Self {
        Self::new(problem.n_var(), problem.n_obj(), problem.n_cstr())
    }

    /// Number of evaluated points
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    /// Whether nothing was evaluated yet
    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    /// Appends evaluated points
    pub fn append(&mut self, x: &Array2<f64>, eval: &Evaluation) -> Result<()> {
        self.x = concatenate(Axis(0), &[self.x.view(), x.view()])?;
        self.f = concatenate(Axis(0), &[self.f.view(), eval.f.view()])?;
        self.g = concatenate(Axis(0), &[self.g.view(), eval.g.view()])?;
        Ok(())
    }

    /// Corrects and evaluates `x` with `problem` then appends the results
    pub fn evaluate_and_append(&mut self, problem: &dyn Problem, x: &Array2<f64>) -> Result<Evaluation> {
        let xc = archopt_problems::correct_x(problem.xtypes(), x)?;
        let eval = problem.evaluate_corrected(&xc.view())?;
        self.append(&xc, &eval)?;
        Ok(eval)
    }

    /// Constraint violation of each point
    pub fn cv(&self) -> Array1<f64> {
        constraint_violation(&self.g)
    }

    /// Feasibility mask of each point
    pub fn feasible(&self) -> Vec<bool> {
        self.cv().iter().map(|&v| v <= CV_TOL).collect()
    }

    /// Indices of the current optimum: the non-dominated feasible points,
    /// or the least violating points when none is feasible
    pub fn optimum_indices(&self) -> Vec<usize> {
        let cv = self.cv();
        non_dominated_sort(&self.f, cv.as_slice().unwrap_or(&[]))
            .into_iter()
            .next()
            .unwrap_or_default()
    }
}

/// Surrogate training statistics of an iteration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingInfo {
    /// Number of points used to train the surrogates
    pub n_train: usize,
    /// Number of evaluated points available
    pub n_samples: usize,
    /// Training wall time in seconds
    pub time_train: f64,
    /// Root mean square error of the surrogate predictions at the infill points
    pub rmse: Option<f64>,
    /// Leave-one-out cross-validation error
    pub loo_cv: Option<f64>,
}

/// Infill search statistics of an iteration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InfillInfo {
    /// Number of selected infill points
    pub n_infill: usize,
    /// Infill search wall time in seconds
    pub time_infill: f64,
}

/// Information about one algorithm iteration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationInfo {
    /// Iteration number, 0 being the initialization
    pub n_iter: usize,
    /// Number of points evaluated during the iteration
    pub n_new: usize,
    /// Surrogate training statistics if any
    pub training: Option<TrainingInfo>,
    /// Infill statistics if any
    pub infill: Option<InfillInfo>,
}

/// An optimization strategy driven iteration by iteration.
///
/// Implementations are immutable configurations: all run state lives in the
/// [Archive] and the random generator passed by the caller, hence one
/// configuration can be shared by concurrent trials.
pub trait Algorithm: Send + Sync {
    /// Evaluates the initial sample, at most `budget` points
    fn initialize(&self, problem: &dyn Problem, rng: &mut Xoshiro256Plus, budget: usize) -> Result<Archive>;

    /// Evaluates at most `budget` new points added to the `archive`
    fn step(
        &self,
        problem: &dyn Problem,
        archive: &mut Archive,
        rng: &mut Xoshiro256Plus,
        n_iter: usize,
        budget: usize,
    ) -> Result<IterationInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use archopt_problems::BinhKorn;
    use ndarray::array;

    #[test]
    fn test_archive() {
        let pb = BinhKorn::default();
        let mut archive = Archive::for_problem(&pb);
        assert!(archive.is_empty());
        archive
            .evaluate_and_append(&pb, &array![[0., 0.], [5., 3.], [2., 2.], [4., 2.5]])
            .unwrap();
        assert_eq!(archive.len(), 4);
        assert_eq!(archive.g.ncols(), 2);
        assert!(archive.feasible().iter().all(|&f| f));
        let mut opt = archive.optimum_indices();
        opt.sort();
        assert_eq!(opt, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_archive_optimum_without_feasible_point() {
        let mut archive = Archive::new(1, 1, 1);
        let eval = Evaluation {
            f: array![[1.], [2.]],
            g: array![[3.], [0.5]],
        };
        archive.append(&array![[0.], [1.]], &eval).unwrap();
        assert_eq!(archive.optimum_indices(), vec![1]);
    }
}
