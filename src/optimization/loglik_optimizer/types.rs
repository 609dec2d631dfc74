//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! log-likelihood optimizer, the Fisher estimator and the sampler. By
//! defining these in one place, the rest of the code can stay agnostic to
//! `ndarray` and Argmin generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors, gradients,
//!   Hessians, and scalar costs (`Theta`, `Grad`, `Hessian`, `Cost`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Expose pre-wired solver and state aliases for the supported
//!   minimizers (Powell, Nelder–Mead, L-BFGS with two line searches).
//!
//! Invariants & assumptions
//! ------------------------
//! - All vectors and matrices are `ndarray` containers over `f64`.
//! - `Cost` is always the negated log-likelihood `c(θ) = -ℓ(θ)`.
//!
//! Testing notes
//! -------------
//! - This module only defines type aliases and constants; correctness is
//!   exercised by the modules that instantiate them.
use argmin::{
    core::IterState,
    solver::{
        linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
        neldermead::NelderMead,
        quasinewton::LBFGS,
    },
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ`; its length `ndim` is fixed for one estimation run.
pub type Theta = Array1<f64>;

/// Gradient vector `∇ℓ(θ)` or `∇c(θ)`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Dense Hessian matrix; `n × n` for `n = Theta.len()`.
pub type Hessian = Array2<f64>;

/// Scalar objective value `c(θ) = -ℓ(θ)` seen by the minimizers.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Default iteration cap is this many iterations per free parameter.
pub const DEFAULT_MAX_ITER_PER_DIM: usize = 1000;

/// Default Powell line-search (`xtol`) and decrease (`ftol`) tolerances.
pub const DEFAULT_POWELL_TOL: f64 = 1e-4;

/// Default standard-deviation tolerance on the Nelder–Mead simplex costs.
pub const DEFAULT_NELDER_MEAD_SD_TOL: f64 = 1e-8;

/// Default gradient-norm tolerance for L-BFGS.
pub const DEFAULT_LBFGS_TOL_GRAD: f64 = 1e-6;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Nelder–Mead simplex solver over `Theta`.
pub type NelderMeadSolver = NelderMead<Theta, Cost>;

/// Iteration state of derivative-free solvers (no gradient slot).
pub type DerivFreeState = IterState<Theta, (), (), (), (), Cost>;

/// Iteration state of gradient-based solvers.
pub type GradState = IterState<Theta, Grad, (), (), (), Cost>;
