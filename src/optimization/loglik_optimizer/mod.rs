//! loglik_optimizer — argmin-powered maximum-likelihood search.
//!
//! Purpose
//! -------
//! Provide a high-level, argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)` of component-separation models, from Rust or
//! Python. Callers implement a single trait, [`LogLikelihood`] (or wrap a
//! closure in [`LogLikeFn`]), and invoke [`minimize`] to find the
//! maximum-likelihood parameters.
//!
//! Key behaviors
//! -------------
//! - Convert user-supplied log-likelihoods `ℓ(θ)` into argmin-compatible
//!   cost functions `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`]; `ℓ = -∞`
//!   becomes an infinite cost, `NaN` is an error.
//! - Expose a single entrypoint [`minimize`] that:
//!   - validates `theta0`, the uncertainty hints and [`LogLikelihood::check`],
//!   - selects Powell (default), Nelder–Mead, or L-BFGS via [`builders`],
//!   - executes the solver via [`run::run_solver`] with optional callback
//!     and `tracing` observers, and
//!   - normalizes results into a [`MinimizerOutcome`].
//! - Provide Richardson-extrapolated finite differences in [`finite_diff`]
//!   for curvature estimates around an optimum.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`;
//!   user code implements `ℓ(θ)` and optionally `∇ℓ(θ)`, never the cost.
//! - [`LogLikelihood::value`] must report invalid inputs as recoverable
//!   [`OptError`](crate::optimization::errors::OptError) values, not panics.
//! - Reaching the iteration cap is data (`success == false`), not an error.
//!
//! Conventions
//! -----------
//! - Parameters are plain [`Theta`] vectors (`Array1<f64>`); any
//!   constrained → unconstrained mapping lives in the model.
//! - All user-facing values (including [`MinimizerOutcome::value`]) are
//!   log-likelihoods, not costs.
//!
//! Downstream usage
//! ----------------
//! - `inference::fisher` calls [`minimize`] to locate the expansion point
//!   and [`finite_diff`] for derivatives.
//! - `separation` dispatches to [`minimize`] through its `Estimator` trait.
//! - Python bindings expose `run_minimize` on top of [`minimize`].
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions ([`adapter`]), solver
//!   construction ([`builders`]), Powell's line search ([`powell`]),
//!   derivative accuracy ([`finite_diff`]), configuration parsing
//!   ([`traits`]), and end-to-end recovery of known optima ([`api`]).

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod hints;
pub mod powell;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::hints::UncertaintyHints;
pub use self::run::IterCallback;
pub use self::traits::{
    LineSearcher, LogLikeFn, LogLikelihood, MLEOptions, Method, MinimizerOutcome,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use freckles::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::minimize;
    pub use super::hints::UncertaintyHints;
    pub use super::traits::{LogLikeFn, LogLikelihood, MLEOptions, Method, MinimizerOutcome};
    pub use super::types::{Cost, Grad, Theta};
}
