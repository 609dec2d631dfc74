//! Public API surface for log-likelihood minimization.
//!
//! - [`LogLikelihood`]: trait users implement for their model (the Rust
//!   shape of a callable `f(params, *args) -> float`).
//! - [`LogLikeFn`]: adapter turning a plain closure into a [`LogLikelihood`].
//! - [`Method`] and [`LineSearcher`]: choice of minimizer.
//! - [`MLEOptions`]: configuration for the optimizer.
//! - [`MinimizerOutcome`]: normalized result returned by `minimize`.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)`. If an analytic gradient is provided, it should be the gradient
//! of the log-likelihood (`∇ℓ(θ)`); the adapter flips the sign as needed.
use std::{fmt, marker::PhantomData, str::FromStr};

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
/// If you provide an analytic gradient, return the gradient of the
/// log-likelihood `∇ℓ(θ)` (the adapter flips the sign to match the cost).
///
/// - `type Data`: the fixed extra arguments carried into `value`/`grad`/`check`
///   (per-pixel map values and variances in the separation layer).
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`. Returning
///   `-∞` marks `θ` as outside the support; `NaN` is treated as an error.
///
/// Optional:
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook called once
///   before optimization. Accepts everything by default.
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇ℓ(θ)`.
///   If not implemented, finite differences are used automatically.
///
/// The `Sync` bounds let the sampler and the multi-pixel driver evaluate the
/// likelihood from several threads at once.
pub trait LogLikelihood: Sync {
    type Data: Sync + 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;

    // Optional methods
    fn check(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<()> {
        Ok(())
    }

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Closure-backed log-likelihood.
///
/// Wraps any `Fn(&Theta, &D) -> f64` so plain functions can be handed to
/// `minimize`, `fisher` and `sample` without a dedicated type.
///
/// ```
/// use freckles::optimization::loglik_optimizer::{LogLikeFn, LogLikelihood};
/// use ndarray::array;
///
/// let f = LogLikeFn::new(|theta: &ndarray::Array1<f64>, _: &()| -theta.dot(theta));
/// assert_eq!(f.value(&array![1.0, 2.0], &()).unwrap(), -5.0);
/// ```
pub struct LogLikeFn<F, D = ()> {
    func: F,
    _data: PhantomData<fn(&D)>,
}

impl<F, D> LogLikeFn<F, D>
where
    F: Fn(&Theta, &D) -> f64 + Sync,
    D: Sync + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func, _data: PhantomData }
    }
}

impl<F, D> LogLikelihood for LogLikeFn<F, D>
where
    F: Fn(&Theta, &D) -> f64 + Sync,
    D: Sync + 'static,
{
    type Data = D;

    fn value(&self, theta: &Theta, data: &D) -> OptResult<Cost> {
        Ok((self.func)(theta, data))
    }
}

impl<F, D> fmt::Debug for LogLikeFn<F, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogLikeFn").finish_non_exhaustive()
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Minimizer used to locate the maximum-likelihood point.
///
/// Variants:
/// - `Powell`: Powell's conjugate-direction method; derivative-free. Default.
/// - `NelderMead`: downhill simplex; derivative-free.
/// - `Lbfgs(LineSearcher)`: quasi-Newton with finite-difference gradients
///   when the likelihood does not supply one.
///
/// Parsing (case-insensitive): `"Powell"`, `"Nelder-Mead"` / `"NelderMead"`,
/// `"L-BFGS"` / `"LBFGS"` (More–Thuente), `"L-BFGS-HZ"` / `"LBFGS-HZ"`
/// (Hager–Zhang). Anything else is `OptError::InvalidMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Powell,
    NelderMead,
    Lbfgs(LineSearcher),
}

impl Method {
    /// Whether the method needs gradients of the cost.
    pub fn uses_gradient(&self) -> bool {
        matches!(self, Method::Lbfgs(_))
    }
}

impl FromStr for Method {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "powell" => Ok(Method::Powell),
            "nelder-mead" | "neldermead" => Ok(Method::NelderMead),
            "l-bfgs" | "lbfgs" | "l-bfgs-mt" | "lbfgs-mt" => {
                Ok(Method::Lbfgs(LineSearcher::MoreThuente))
            }
            "l-bfgs-hz" | "lbfgs-hz" => Ok(Method::Lbfgs(LineSearcher::HagerZhang)),
            _ => Err(OptError::InvalidMethod {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'Powell', 'Nelder-Mead', 'L-BFGS' or 'L-BFGS-HZ'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `method: Method` — minimizer to run (default Powell).
/// - `tol: Option<f64>` — termination tolerance. Its meaning follows the
///   method: Powell uses it for both the line-search and the decrease test,
///   Nelder–Mead for the spread of simplex costs, L-BFGS for the gradient
///   norm. `None` picks the method's default.
/// - `max_iter: Option<usize>` — iteration cap; `None` means
///   `1000 · ndim`.
/// - `lbfgs_mem: Option<usize>` — L-BFGS history size (default 7).
/// - `verbose: bool` — log every iteration through `tracing` at debug level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MLEOptions {
    pub method: Method,
    pub tol: Option<f64>,
    pub max_iter: Option<usize>,
    pub lbfgs_mem: Option<usize>,
    pub verbose: bool,
}

impl MLEOptions {
    /// Create a validated set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolerance`] for a non-finite or non-positive `tol`.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        method: Method, tol: Option<f64>, max_iter: Option<usize>, lbfgs_mem: Option<usize>,
        verbose: bool,
    ) -> OptResult<Self> {
        verify_tol(tol)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { method, tol, max_iter, lbfgs_mem, verbose })
    }

    /// Same options with a different method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Iteration cap for a problem with `dim` free parameters.
    pub fn max_iter_for(&self, dim: usize) -> usize {
        self.max_iter
            .unwrap_or(super::types::DEFAULT_MAX_ITER_PER_DIM * dim.max(1))
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found; always `ndim` entries long,
///   including one-parameter problems.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `success`: `true` only if the solver reported its own convergence
///   criterion; hitting `max_iter` gives `false`.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `n_evals`: number of log-likelihood evaluations (`cost_count`).
/// - `fn_evals`: all function-evaluation counters reported by `argmin`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub success: bool,
    pub status: String,
    pub iterations: usize,
    pub n_evals: u64,
    pub fn_evals: FnEvalMap,
}

impl MinimizerOutcome {
    /// Build a validated [`MinimizerOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value`.
    /// - Maps `TerminationStatus` into `(success, status)`.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let success = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let status = match termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            TerminationStatus::Terminated(reason) => format!("{reason:?}"),
        };
        let n_evals = fn_evals.get("cost_count").copied().unwrap_or(0);
        Ok(Self { theta_hat, value, success, status, iterations: iterations as usize, n_evals, fn_evals })
    }
}
