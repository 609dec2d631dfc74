//! loglik_optimizer::finite_diff — Richardson-extrapolated derivative estimates.
//!
//! Purpose
//! -------
//! Provide accurate gradient and Hessian approximations of a scalar
//! objective at a single point, for curvature-based summaries such as the
//! Fisher matrix. Unlike the `finitediff` gradients used inside the argmin
//! adapter, these helpers take fallible objectives and trade extra
//! evaluations for accuracy.
//!
//! Key behaviors
//! -------------
//! - Central differences with a per-coordinate step scaled to the parameter
//!   magnitude: `h_i = step · max(|θ_i|, 1)` ([`diff_steps`]).
//! - One level of Richardson extrapolation: estimates at `h` and `h/2` are
//!   combined as `(4 D(h/2) − D(h)) / 3`, cancelling the `O(h²)` term.
//! - Hessians are symmetrized in place with [`symmetrize_hess`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective is evaluated at `θ ± h_i e_i` and `θ ± h_i e_i ± h_j e_j`;
//!   it must be defined in that neighbourhood for the estimate to be finite.
//! - Errors raised by the objective propagate unchanged; non-finite values
//!   are **not** rejected and flow into the result.
//!
//! Conventions
//! -----------
//! - Cost of one Richardson Hessian: `2 · (1 + 2n + 2n(n−1)) + 1`
//!   evaluations for `n` parameters; the gradient needs `4n`.
//!
//! Testing notes
//! -------------
//! - Polynomials of degree ≤ 4 are differentiated exactly up to rounding by
//!   the extrapolated scheme, which the unit tests exploit.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::{Grad, Hessian, Theta},
};

/// Per-coordinate steps `h_i = step · max(|θ_i|, 1)`.
///
/// # Errors
/// [`OptError::InvalidDiffStep`] if `step` is non-finite or not positive.
pub fn diff_steps(theta: &Theta, step: f64) -> OptResult<Theta> {
    if !step.is_finite() || step <= 0.0 {
        return Err(OptError::InvalidDiffStep { step });
    }
    Ok(theta.mapv(|t| step * t.abs().max(1.0)))
}

/// richardson_gradient — extrapolated central-difference gradient.
///
/// Parameters
/// ----------
/// - `f`: `&mut E`
///   Fallible objective `θ ↦ f(θ)`.
/// - `theta`: `&Theta`
///   Evaluation point.
/// - `step`: `f64`
///   Relative step; see [`diff_steps`].
///
/// Returns
/// -------
/// `OptResult<Grad>` with `∂f/∂θ_i` estimates.
///
/// Errors
/// ------
/// - `OptError::InvalidDiffStep` for a bad `step`.
/// - Any error returned by `f`.
pub fn richardson_gradient<E>(f: &mut E, theta: &Theta, step: f64) -> OptResult<Grad>
where
    E: FnMut(&Theta) -> OptResult<f64>,
{
    let h = diff_steps(theta, step)?;
    let coarse = central_gradient(f, theta, &h)?;
    let fine = central_gradient(f, theta, &(&h * 0.5))?;
    Ok((fine * 4.0 - coarse) / 3.0)
}

/// richardson_hessian — extrapolated central-difference Hessian.
///
/// Same contract as [`richardson_gradient`]; the result is symmetrized.
pub fn richardson_hessian<E>(f: &mut E, theta: &Theta, step: f64) -> OptResult<Hessian>
where
    E: FnMut(&Theta) -> OptResult<f64>,
{
    let h = diff_steps(theta, step)?;
    let f0 = f(theta)?;
    let coarse = central_hessian(f, theta, &h, f0)?;
    let fine = central_hessian(f, theta, &(&h * 0.5), f0)?;
    let mut hess = (fine * 4.0 - coarse) / 3.0;
    symmetrize_hess(&mut hess);
    Ok(hess)
}

/// Average each off-diagonal pair so that `H[i, j] == H[j, i]`.
pub fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

// ---- Helper Methods ----

fn central_gradient<E>(f: &mut E, theta: &Theta, h: &Theta) -> OptResult<Grad>
where
    E: FnMut(&Theta) -> OptResult<f64>,
{
    let n = theta.len();
    let mut grad = Grad::zeros(n);
    let mut point = theta.clone();
    for i in 0..n {
        point[i] = theta[i] + h[i];
        let f_plus = f(&point)?;
        point[i] = theta[i] - h[i];
        let f_minus = f(&point)?;
        point[i] = theta[i];
        grad[i] = (f_plus - f_minus) / (2.0 * h[i]);
    }
    Ok(grad)
}

fn central_hessian<E>(f: &mut E, theta: &Theta, h: &Theta, f0: f64) -> OptResult<Hessian>
where
    E: FnMut(&Theta) -> OptResult<f64>,
{
    let n = theta.len();
    let mut hess = Hessian::zeros((n, n));
    let mut point = theta.clone();
    for i in 0..n {
        point[i] = theta[i] + h[i];
        let f_plus = f(&point)?;
        point[i] = theta[i] - h[i];
        let f_minus = f(&point)?;
        point[i] = theta[i];
        hess[[i, i]] = (f_plus - 2.0 * f0 + f_minus) / (h[i] * h[i]);

        for j in 0..i {
            let mut corner = |si: f64, sj: f64| -> OptResult<f64> {
                point[i] = theta[i] + si * h[i];
                point[j] = theta[j] + sj * h[j];
                let value = f(&point);
                point[i] = theta[i];
                point[j] = theta[j];
                value
            };
            let f_pp = corner(1.0, 1.0)?;
            let f_pm = corner(1.0, -1.0)?;
            let f_mp = corner(-1.0, 1.0)?;
            let f_mm = corner(-1.0, -1.0)?;
            let mixed = (f_pp - f_pm - f_mp + f_mm) / (4.0 * h[i] * h[j]);
            hess[[i, j]] = mixed;
            hess[[j, i]] = mixed;
        }
    }
    Ok(hess)
}
