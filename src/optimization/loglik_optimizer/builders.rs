//! loglik_optimizer::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for every minimizer [`minimize`] can run.
//! These helpers hide argmin's generic wiring and apply crate-level options
//! (tolerance, L-BFGS memory, uncertainty hints) so the dispatcher can
//! request a configured solver without touching argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - [`build_powell`]: Powell's method with `xtol = ftol = tol`.
//! - [`build_nelder_mead`]: argmin's Nelder–Mead with an initial simplex
//!   built around `theta0` from the uncertainty hints.
//! - [`build_optimizer_hager_zhang`] / [`build_optimizer_more_thuente`]:
//!   L-BFGS with the chosen line search, configured by [`configure_lbfgs`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `theta0` has already been validated (non-empty, finite) and the hints
//!   have already been checked against its length.
//! - The builders do **not** set the initial parameter vector or
//!   `max_iters`; the runner applies those.
//!
//! Conventions
//! -----------
//! - A `None` tolerance selects the method's default from [`types`].
//! - Invalid tolerances rejected by argmin surface as [`OptError`] via the
//!   crate's `From<argmin::core::Error>` conversion.
//!
//! [`minimize`]: crate::optimization::loglik_optimizer::minimize
//! [`types`]: crate::optimization::loglik_optimizer::types
//! [`OptError`]: crate::optimization::errors::OptError
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        hints::UncertaintyHints,
        powell::Powell,
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, DEFAULT_LBFGS_TOL_GRAD, DEFAULT_NELDER_MEAD_SD_TOL,
            DEFAULT_POWELL_TOL, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, NelderMeadSolver, Theta,
        },
    },
};

/// Relative perturbation of a non-zero coordinate in the default simplex.
const SIMPLEX_NONZERO_DELTA: f64 = 0.05;
/// Absolute perturbation of a zero coordinate in the default simplex.
const SIMPLEX_ZERO_DELTA: f64 = 0.00025;

/// build_powell — construct Powell's method.
///
/// Parameters
/// ----------
/// - `opts`: `&MLEOptions`
///   Only `opts.tol` is consulted; it is used for both the line-search and
///   the function-decrease tolerance (default [`DEFAULT_POWELL_TOL`]).
///
/// Errors
/// ------
/// - `OptError::InvalidTolerance` from [`Powell::new`].
pub fn build_powell(opts: &MLEOptions) -> OptResult<Powell> {
    let tol = opts.tol.unwrap_or(DEFAULT_POWELL_TOL);
    Powell::new(tol, tol)
}

/// build_nelder_mead — construct Nelder–Mead with a hint-aware simplex.
///
/// Purpose
/// -------
/// Build the `ndim + 1` starting vertices: `theta0` itself plus one vertex per
/// coordinate, displaced along that coordinate by the usable hint, or by 5 %
/// of the coordinate (`0.00025` when it is zero) when no hint exists.
///
/// Parameters
/// ----------
/// - `theta0`: `&Theta`
///   Validated starting point.
/// - `dpos`: `Option<&UncertaintyHints>`
///   Optional per-parameter widths.
/// - `opts`: `&MLEOptions`
///   `opts.tol` is the standard-deviation tolerance on the simplex costs
///   (default [`DEFAULT_NELDER_MEAD_SD_TOL`]).
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when argmin rejects the
///   tolerance.
pub fn build_nelder_mead(
    theta0: &Theta, dpos: Option<&UncertaintyHints>, opts: &MLEOptions,
) -> OptResult<NelderMeadSolver> {
    let simplex = initial_simplex(theta0, dpos);
    let tol = opts.tol.unwrap_or(DEFAULT_NELDER_MEAD_SD_TOL);
    Ok(NelderMeadSolver::new(simplex).with_sd_tolerance(tol)?)
}

/// build_optimizer_hager_zhang — construct L-BFGS with Hager–Zhang line search.
///
/// Uses `opts.lbfgs_mem` (default [`DEFAULT_LBFGS_MEM`]) and applies the
/// gradient tolerance through [`configure_lbfgs`].
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when argmin rejects the
///   tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// build_optimizer_more_thuente — construct L-BFGS with More–Thuente line search.
///
/// Same contract as [`build_optimizer_hager_zhang`].
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// configure_lbfgs — apply the gradient-norm tolerance to an L-BFGS solver.
///
/// Generic over the line-search type so both builders share it. `opts.tol`
/// falls back to [`DEFAULT_LBFGS_TOL_GRAD`].
pub fn configure_lbfgs<L>(
    solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    let tol = opts.tol.unwrap_or(DEFAULT_LBFGS_TOL_GRAD);
    Ok(solver.with_tolerance_grad(tol)?)
}

// ---- Helper Methods ----

fn initial_simplex(theta0: &Theta, dpos: Option<&UncertaintyHints>) -> Vec<Theta> {
    let dim = theta0.len();
    let mut vertices = Vec::with_capacity(dim + 1);
    vertices.push(theta0.clone());
    for i in 0..dim {
        let mut vertex = theta0.clone();
        let delta = match dpos.and_then(|h| h.get(i)) {
            Some(hint) => hint,
            None if theta0[i] != 0.0 => SIMPLEX_NONZERO_DELTA * theta0[i],
            None => SIMPLEX_ZERO_DELTA,
        };
        vertex[i] += delta;
        vertices.push(vertex);
    }
    vertices
}
