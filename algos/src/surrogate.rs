//! Surrogate models used by infill strategies.
//!
//! Models are Gaussian processes from [egobox_gp]; one model is trained per
//! output column (objectives then constraints) on the continuously relaxed
//! design vectors.
use crate::errors::{AlgoError, Result};
use egobox_gp::correlation_models::{Matern52Corr, SquaredExponentialCorr};
use egobox_gp::mean_models::{ConstantMean, QuadraticMean};
use egobox_gp::GaussianProcess;
use linfa::prelude::{Dataset, Fit};
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of multistart used for GP hyperparameters optimization
const SURROGATE_N_START: usize = 5;

/// Kinds of surrogate models
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurrogateKind {
    /// Kriging with constant mean and squared exponential correlation
    #[default]
    Kriging,
    /// Kriging with constant mean and Matern 5/2 correlation
    KrigingMatern52,
    /// Kriging with quadratic mean and squared exponential correlation
    KrigingQuadratic,
}

impl SurrogateKind {
    /// All the available surrogate kinds
    pub const ALL: [SurrogateKind; 3] = [
        SurrogateKind::Kriging,
        SurrogateKind::KrigingMatern52,
        SurrogateKind::KrigingQuadratic,
    ];

    /// Short name used in algorithm names
    pub fn name(&self) -> &'static str {
        match self {
            SurrogateKind::Kriging => "KRG",
            SurrogateKind::KrigingMatern52 => "KRG-M52",
            SurrogateKind::KrigingQuadratic => "KRG-Q",
        }
    }

    fn fit_output(&self, xt: &Array2<f64>, yt: ArrayView1<f64>) -> Result<FittedGp> {
        let dataset = Dataset::new(xt.to_owned(), yt.to_owned());
        let gp = match self {
            SurrogateKind::Kriging => FittedGp::SquaredExponential(
                GaussianProcess::<f64, ConstantMean, SquaredExponentialCorr>::params(
                    ConstantMean::default(),
                    SquaredExponentialCorr::default(),
                )
                .n_start(SURROGATE_N_START)
                .fit(&dataset)?,
            ),
            SurrogateKind::KrigingMatern52 => FittedGp::Matern52(
                GaussianProcess::<f64, ConstantMean, Matern52Corr>::params(
                    ConstantMean::default(),
                    Matern52Corr::default(),
                )
                .n_start(SURROGATE_N_START)
                .fit(&dataset)?,
            ),
            SurrogateKind::KrigingQuadratic => FittedGp::Quadratic(
                GaussianProcess::<f64, QuadraticMean, SquaredExponentialCorr>::params(
                    QuadraticMean::default(),
                    SquaredExponentialCorr::default(),
                )
                .n_start(SURROGATE_N_START)
                .fit(&dataset)?,
            ),
        };
        Ok(gp)
    }

    /// Trains one model per column of `yt` given training inputs `xt`
    pub fn fit(
        &self,
        xt: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        yt: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<Surrogate> {
        if xt.nrows() != yt.nrows() {
            return Err(AlgoError::InvalidValue(format!(
                "Training inputs ({}) and outputs ({}) row counts differ",
                xt.nrows(),
                yt.nrows()
            )));
        }
        let xt = xt.to_owned();
        let yt = yt.to_owned();
        debug!(
            "Train {} {} models on {} points",
            yt.ncols(),
            self.name(),
            xt.nrows()
        );
        let models = (0..yt.ncols())
            .into_par_iter()
            .map(|k| self.fit_output(&xt, yt.column(k)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Surrogate { models })
    }
}

impl FromStr for SurrogateKind {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self> {
        SurrogateKind::ALL
            .iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| AlgoError::InvalidConfigError(format!("Unknown surrogate '{s}'")))
    }
}

enum FittedGp {
    SquaredExponential(GaussianProcess<f64, ConstantMean, SquaredExponentialCorr>),
    Matern52(GaussianProcess<f64, ConstantMean, Matern52Corr>),
    Quadratic(GaussianProcess<f64, QuadraticMean, SquaredExponentialCorr>),
}

impl FittedGp {
    fn predict(&self, x: &Array2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        let res = match self {
            FittedGp::SquaredExponential(gp) => (gp.predict(x)?, gp.predict_var(x)?.column(0).to_owned()),
            FittedGp::Matern52(gp) => (gp.predict(x)?, gp.predict_var(x)?.column(0).to_owned()),
            FittedGp::Quadratic(gp) => (gp.predict(x)?, gp.predict_var(x)?.column(0).to_owned()),
        };
        Ok(res)
    }
}

/// Trained surrogate models, one per output
pub struct Surrogate {
    models: Vec<FittedGp>,
}

impl Surrogate {
    /// Number of modeled outputs
    pub fn n_outputs(&self) -> usize {
        self.models.len()
    }

    /// Predicts means and variances at `x` as two (n, n_outputs) matrices
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<(Array2<f64>, Array2<f64>)> {
        let x = x.to_owned();
        let mut mean = Array2::zeros((x.nrows(), self.models.len()));
        let mut variance = Array2::zeros((x.nrows(), self.models.len()));
        for (k, model) in self.models.iter().enumerate() {
            let (m, v) = model.predict(&x)?;
            mean.column_mut(k).assign(&m);
            variance.column_mut(k).assign(&v.mapv(|v| v.max(0.)));
        }
        Ok((mean, variance))
    }
}

/// Leave-one-out cross-validation error: RMSE of the predictions at `k`
/// training points evenly picked, each predicted by a model trained without it.
pub fn loo_cv(
    kind: SurrogateKind,
    xt: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    yt: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    k: usize,
) -> Result<f64> {
    let n = xt.nrows();
    if n < 3 || k == 0 {
        return Ok(f64::NAN);
    }
    let k = k.min(n);
    let errors = (0..k)
        .map(|i| {
            let left_out = i * n / k;
            let kept: Vec<usize> = (0..n).filter(|&j| j != left_out).collect();
            let model = kind.fit(&xt.select(Axis(0), &kept), &yt.select(Axis(0), &kept))?;
            let xi = xt.select(Axis(0), &[left_out]);
            let (pred, _) = model.predict(&xi)?;
            Ok((&pred.row(0) - &yt.row(left_out)).mapv(|v| v * v).sum())
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok((errors.iter().sum::<f64>() / (k * yt.ncols()) as f64).sqrt())
}
