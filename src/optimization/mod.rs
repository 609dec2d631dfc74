//! optimization — maximum-likelihood search and its error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer shared by every estimation strategy: an
//! argmin-backed log-likelihood optimizer and a single error/result surface.
//! Callers implement a log-likelihood, pick a method, and obtain fitted
//! parameters and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose [`loglik_optimizer::minimize`], which **maximizes** `ℓ(θ)` with
//!   Powell, Nelder–Mead, or L-BFGS.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into [`errors::OptError`] with the alias [`errors::OptResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Log-likelihood implementations report domain violations as recoverable
//!   errors or return `-∞`; they never panic on bad parameters.
//! - Optimizer outcomes are always expressed in terms of `ℓ`, never the
//!   internal cost `c(θ) = -ℓ(θ)`.
//!
//! Conventions
//! -----------
//! - Parameters, gradients, and Hessians use the `ndarray` aliases `Theta`,
//!   `Grad`, and `Hessian`.
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw argmin errors.
//! - Progress is reported through `tracing` events only; no subscriber is
//!   installed by the library.
//!
//! Downstream usage
//! ----------------
//! - `inference::fisher` and `sampling::sample` reuse the `LogLikelihood`
//!   contract and its validation helpers.
//! - Front-ends typically import `optimization::prelude::*`.

pub mod errors;
pub mod loglik_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use freckles::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
