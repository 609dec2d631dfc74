//! High-level entry point for maximizing a user-provided `LogLikelihood`.
//!
//! [`minimize`] validates the inputs, wraps the model in an `ArgMinAdapter`
//! (which *minimizes* `-ℓ(θ)`), builds the solver selected by
//! `MLEOptions::method`, and delegates the run to [`run_solver`].
use ndarray::Array1;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        adapter::ArgMinAdapter,
        builders::{
            build_nelder_mead, build_optimizer_hager_zhang, build_optimizer_more_thuente,
            build_powell,
        },
        hints::{UncertaintyHints, check_hints},
        run::{IterCallback, run_solver},
        traits::{LineSearcher, LogLikelihood, MLEOptions, Method, MinimizerOutcome},
        types::{Grad, Theta},
        validation::validate_theta0,
    },
};

/// Find the maximum-likelihood parameters of `f` starting from `theta0`.
///
/// # Behavior
/// - Rejects an empty or non-finite `theta0` and a `dpos` whose length
///   differs from `theta0`.
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Minimizes `c(θ) = -ℓ(θ)` with the method in `opts.method`:
///   Powell (default), Nelder–Mead (simplex seeded from `dpos`), or L-BFGS
///   with the chosen line search.
/// - Runs at most `opts.max_iter_for(ndim)` iterations. Hitting the cap is
///   reported through `MinimizerOutcome::success == false`, never as an
///   error.
/// - Calls `callback` with the current iterate after every iteration.
///
/// # Errors
/// - `OptError::EmptyTheta` / `OptError::InvalidThetaInput` for a bad
///   `theta0`.
/// - `OptError::HintsLengthMismatch` for mismatched hints.
/// - Propagates errors from `f.check`, from the solver builders, and from
///   the run itself (including `NonFiniteCost` when `ℓ` returns `NaN`).
///
/// # Example
/// ```
/// use ndarray::array;
/// use freckles::optimization::loglik_optimizer::{LogLikeFn, MLEOptions, minimize};
///
/// let f = LogLikeFn::new(|theta: &ndarray::Array1<f64>, _: &()| {
///     -0.5 * ((theta[0] - 1.0).powi(2) + (theta[1] + 2.0).powi(2))
/// });
/// let out = minimize(&f, &array![0.0, 0.0], &(), None, &MLEOptions::default(), None)?;
/// assert!(out.success);
/// assert!((out.theta_hat[0] - 1.0).abs() < 1e-3);
/// # Ok::<(), freckles::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: LogLikelihood>(
    f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>, opts: &MLEOptions,
    callback: Option<IterCallback>,
) -> OptResult<MinimizerOutcome> {
    validate_theta0(theta0)?;
    let dim = theta0.len();
    check_hints(dpos, dim)?;
    f.check(theta0, data)?;

    let max_iter = opts.max_iter_for(dim);
    tracing::debug!(
        method = ?opts.method,
        uses_gradient = opts.method.uses_gradient(),
        ndim = dim,
        max_iter,
        "minimize: start"
    );

    let problem = ArgMinAdapter::new(f, data);
    let start = Array1::clone(theta0);
    let outcome = match opts.method {
        Method::Powell => {
            let solver = build_powell(opts)?;
            run_solver::<_, _, ()>(start, max_iter, opts.verbose, problem, solver, callback)?
        }
        Method::NelderMead => {
            let solver = build_nelder_mead(theta0, dpos, opts)?;
            run_solver::<_, _, ()>(start, max_iter, opts.verbose, problem, solver, callback)?
        }
        Method::Lbfgs(LineSearcher::MoreThuente) => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_solver::<_, _, Grad>(start, max_iter, opts.verbose, problem, solver, callback)?
        }
        Method::Lbfgs(LineSearcher::HagerZhang) => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_solver::<_, _, Grad>(start, max_iter, opts.verbose, problem, solver, callback)?
        }
    };

    tracing::debug!(
        success = outcome.success,
        status = %outcome.status,
        iterations = outcome.iterations,
        n_evals = outcome.n_evals,
        value = outcome.value,
        "minimize: done"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{errors::OptError, loglik_optimizer::traits::LogLikeFn};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of a known maximum by every method.
    // - Precondition failures (empty θ, hint mismatch, NaN likelihood).
    // - `max_iter` exhaustion reported as data.
    // - The per-iteration callback.
    // -------------------------------------------------------------------------

    fn shifted_gaussian() -> LogLikeFn<impl Fn(&Theta, &()) -> f64 + Sync> {
        LogLikeFn::new(|theta: &Theta, _: &()| {
            -0.5 * ((theta[0] - 1.0).powi(2) + (theta[1] + 2.0).powi(2))
        })
    }

    #[test]
    // Purpose
    // -------
    // Every method recovers the maximum of a separable 2-D Gaussian.
    //
    // Given
    // -----
    // - `ℓ(x, y) = -½((x − 1)² + (y + 2)²)`, `θ₀ = (0, 0)`.
    //
    // Expect
    // ------
    // - `theta_hat ≈ (1, −2)`, `success == true`, `value ≈ 0`.
    fn every_method_finds_gaussian_peak() {
        // Arrange
        let f = shifted_gaussian();
        let theta0 = array![0.0, 0.0];
        let methods = [
            Method::Powell,
            Method::NelderMead,
            Method::Lbfgs(LineSearcher::MoreThuente),
            Method::Lbfgs(LineSearcher::HagerZhang),
        ];

        for method in methods {
            // Act
            let opts = MLEOptions::default().with_method(method);
            let out = minimize(&f, &theta0, &(), None, &opts, None).unwrap();

            // Assert
            assert!(out.success, "{method:?} did not converge: {}", out.status);
            assert_abs_diff_eq!(out.theta_hat[0], 1.0, epsilon = 1e-3);
            assert_abs_diff_eq!(out.theta_hat[1], -2.0, epsilon = 1e-3);
            assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-6);
            assert!(out.n_evals > 0);
        }
    }

    #[test]
    // Purpose
    // -------
    // One-parameter problems still return a length-1 vector.
    fn one_dimensional_problem_keeps_vector_shape() {
        let f = LogLikeFn::new(|theta: &Theta, _: &()| -(theta[0] - 3.0).powi(2));
        let out = minimize(&f, &array![0.0], &(), None, &MLEOptions::default(), None).unwrap();
        assert_eq!(out.theta_hat.len(), 1);
        assert_abs_diff_eq!(out.theta_hat[0], 3.0, epsilon = 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // Running out of iterations is not an error, only `success == false`.
    //
    // Given
    // -----
    // - Rosenbrock-shaped likelihood, Nelder–Mead capped at 3 iterations.
    //
    // Expect
    // ------
    // - `Ok(outcome)` with `success == false`.
    fn max_iter_exhaustion_is_reported_as_data() {
        // Arrange
        let f = LogLikeFn::new(|t: &Theta, _: &()| {
            -((1.0 - t[0]).powi(2) + 100.0 * (t[1] - t[0] * t[0]).powi(2))
        });
        let opts = MLEOptions::new(Method::NelderMead, None, Some(3), None, false).unwrap();

        // Act
        let out = minimize(&f, &array![-1.2, 1.0], &(), None, &opts, None).unwrap();

        // Assert
        assert!(!out.success);
        assert_eq!(out.iterations, 3);
    }

    #[test]
    // Purpose
    // -------
    // Fatal preconditions fail before any evaluation.
    fn rejects_bad_inputs() {
        let f = shifted_gaussian();
        let opts = MLEOptions::default();

        let err = minimize(&f, &Theta::zeros(0), &(), None, &opts, None).unwrap_err();
        assert_eq!(err, OptError::EmptyTheta);

        let hints = UncertaintyHints::from_values(&[1.0]);
        let err = minimize(&f, &array![0.0, 0.0], &(), Some(&hints), &opts, None).unwrap_err();
        assert_eq!(err, OptError::HintsLengthMismatch { expected: 2, found: 1 });

        let nan = LogLikeFn::new(|_: &Theta, _: &()| f64::NAN);
        let err = minimize(&nan, &array![0.0], &(), None, &opts, None).unwrap_err();
        assert!(matches!(err, OptError::NonFiniteCost { .. }));
    }

    #[test]
    // Purpose
    // -------
    // The callback sees one iterate per minimizer iteration.
    fn callback_is_invoked_every_iteration() {
        // Arrange
        let f = shifted_gaussian();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let callback: IterCallback = Box::new(move |theta: &Theta| {
            assert_eq!(theta.len(), 2);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Act
        let out =
            minimize(&f, &array![0.0, 0.0], &(), None, &MLEOptions::default(), Some(callback))
                .unwrap();

        // Assert
        assert_eq!(seen.load(Ordering::SeqCst), out.iterations);
    }

    #[test]
    // Purpose
    // -------
    // A `-∞` region is avoided rather than treated as an error.
    fn negative_infinity_marks_excluded_region() {
        let f = LogLikeFn::new(|t: &Theta, _: &()| {
            if t[0] < 0.0 { f64::NEG_INFINITY } else { -(t[0] - 2.0).powi(2) }
        });
        let out = minimize(&f, &array![0.5], &(), None, &MLEOptions::default(), None).unwrap();
        assert_abs_diff_eq!(out.theta_hat[0], 2.0, epsilon = 1e-3);
    }
}
