//! inference::fisher — Gaussian (Fisher-matrix) approximation of a likelihood.
//!
//! Purpose
//! -------
//! Approximate the posterior around a central point by the curvature of the
//! log-likelihood there. Optionally locate the maximum first, then report
//! the Hessian of `-ℓ` (the Fisher matrix) and the gradient of `ℓ` (the
//! Fisher bias vector, ≈ 0 at a true maximum).
//!
//! Key behaviors
//! -------------
//! - `find_ml_first = true`: run [`minimize`] with `ml_options` and use its
//!   `theta_hat` as the center; `ml_success` records whether it converged.
//! - `find_ml_first = false`: the center is `theta0` verbatim and
//!   `ml_success` is `None`.
//! - Derivatives come from Richardson-extrapolated central differences
//!   ([`richardson_gradient`], [`richardson_hessian`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - The result is not validated: indefinite or non-finite matrices are
//!   returned as-is. [`FisherOutcome::covariance`] and
//!   [`FisherOutcome::standard_errors`] are the opt-in checked views.
//! - Errors raised by the likelihood itself propagate.
//!
//! Conventions
//! -----------
//! - `fisher_matrix` is `∇²(-ℓ)`; `fisher_gradient` is `∇ℓ` (the negated
//!   gradient of `-ℓ`).
//! - Uncertainty hints are only checked for length; the step size is set by
//!   [`FisherOptions::step`].
use ndarray::Array2;

use crate::inference::covariance::{pseudo_inverse, standard_errors};
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        LogLikelihood, MLEOptions, UncertaintyHints,
        finite_diff::{richardson_gradient, richardson_hessian},
        hints::check_hints,
        minimize,
        types::{Grad, Hessian, Theta},
        validation::validate_theta0,
    },
};

/// Default relative finite-difference step.
pub const DEFAULT_FISHER_STEP: f64 = 1e-3;

/// Configuration for [`fisher`].
///
/// - `find_ml_first`: locate the maximum before differentiating
///   (default `false`).
/// - `ml_options`: minimizer settings used when `find_ml_first` is set
///   (default Powell).
/// - `step`: relative difference step, `h_i = step · max(|θ_i|, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FisherOptions {
    pub find_ml_first: bool,
    pub ml_options: MLEOptions,
    pub step: f64,
}

impl FisherOptions {
    /// Create validated options.
    ///
    /// # Errors
    /// [`OptError::InvalidDiffStep`] if `step` is non-finite or ≤ 0.
    pub fn new(find_ml_first: bool, ml_options: MLEOptions, step: f64) -> OptResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(OptError::InvalidDiffStep { step });
        }
        Ok(Self { find_ml_first, ml_options, step })
    }
}

impl Default for FisherOptions {
    fn default() -> Self {
        Self { find_ml_first: false, ml_options: MLEOptions::default(), step: DEFAULT_FISHER_STEP }
    }
}

/// Result of a Fisher-matrix estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct FisherOutcome {
    /// Point at which derivatives were taken.
    pub center: Theta,
    /// Hessian of `-ℓ` at `center`, shape `(ndim, ndim)`.
    pub fisher_matrix: Hessian,
    /// Gradient of `ℓ` at `center`.
    pub fisher_gradient: Grad,
    /// Convergence of the preliminary ML search; `None` if none was run.
    pub ml_success: Option<bool>,
}

impl FisherOutcome {
    /// Parameter covariance `F⁺` (eigen-truncated pseudoinverse).
    ///
    /// # Errors
    /// `OptError::InvalidHessian` when the matrix has non-finite entries.
    pub fn covariance(&self) -> OptResult<Array2<f64>> {
        pseudo_inverse(&self.fisher_matrix)
    }

    /// Marginal standard errors `sqrt(diag F⁺)`.
    pub fn standard_errors(&self) -> OptResult<Grad> {
        standard_errors(&self.fisher_matrix)
    }
}

/// fisher — curvature of `ℓ` around its maximum (or around `theta0`).
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Log-likelihood.
/// - `theta0`: `&Theta`
///   Central point, or the starting point of the ML search.
/// - `data`: `&F::Data`
///   Extra arguments forwarded to `f`.
/// - `dpos`: `Option<&UncertaintyHints>`
///   Accepted for a uniform estimator signature; only its length is checked.
/// - `opts`: `&FisherOptions`
///
/// Returns
/// -------
/// `OptResult<FisherOutcome>`
///
/// Errors
/// ------
/// - `OptError::EmptyTheta` / `OptError::InvalidThetaInput` for a bad
///   `theta0`; `OptError::HintsLengthMismatch` for mismatched hints.
/// - `OptError::InvalidDiffStep` for a bad `opts.step`.
/// - Any error from the ML search or from `f.value`.
pub fn fisher<F: LogLikelihood>(
    f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>,
    opts: &FisherOptions,
) -> OptResult<FisherOutcome> {
    validate_theta0(theta0)?;
    check_hints(dpos, theta0.len())?;

    let (center, ml_success) = if opts.find_ml_first {
        let ml = minimize(f, theta0, data, dpos, &opts.ml_options, None)?;
        (ml.theta_hat, Some(ml.success))
    } else {
        (theta0.clone(), None)
    };

    let mut neg_loglik = |theta: &Theta| -> OptResult<f64> { Ok(-f.value(theta, data)?) };
    let neg_grad = richardson_gradient(&mut neg_loglik, &center, opts.step)?;
    let fisher_matrix = richardson_hessian(&mut neg_loglik, &center, opts.step)?;
    tracing::debug!(ndim = center.len(), ?ml_success, "fisher: done");

    Ok(FisherOutcome { center, fisher_matrix, fisher_gradient: -neg_grad, ml_success })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::LogLikeFn;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the Fisher matrix with an analytic Hessian.
    // - Centering with and without a preliminary ML search.
    // - Sign of the stored gradient.
    // - Option validation.
    // -------------------------------------------------------------------------

    /// Correlated Gaussian with precision `[[2, 0.5], [0.5, 1]]` centred at (1, −2).
    fn correlated_gaussian() -> LogLikeFn<impl Fn(&Theta, &()) -> f64 + Sync> {
        LogLikeFn::new(|t: &Theta, _: &()| {
            let (dx, dy) = (t[0] - 1.0, t[1] + 2.0);
            -0.5 * (2.0 * dx * dx + dx * dy + dy * dy)
        })
    }

    #[test]
    // Purpose
    // -------
    // After locating the maximum the Fisher matrix equals the precision
    // matrix and the gradient vanishes.
    //
    // Given
    // -----
    // - Correlated Gaussian, `θ₀ = (0, 0)`, `find_ml_first = true`.
    //
    // Expect
    // ------
    // - `center ≈ (1, −2)`, `F ≈ [[2, 0.5], [0.5, 1]]`, `∇ℓ ≈ 0`,
    //   `ml_success == Some(true)`.
    fn ml_first_matches_analytic_precision() {
        // Arrange
        let f = correlated_gaussian();
        let opts = FisherOptions { find_ml_first: true, ..FisherOptions::default() };

        // Act
        let out = fisher(&f, &array![0.0, 0.0], &(), None, &opts).unwrap();

        // Assert
        assert_eq!(out.ml_success, Some(true));
        assert_abs_diff_eq!(out.center[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.center[1], -2.0, epsilon = 1e-3);
        let expected = array![[2.0, 0.5], [0.5, 1.0]];
        for (a, b) in out.fisher_matrix.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
        for g in out.fisher_gradient.iter() {
            assert_abs_diff_eq!(*g, 0.0, epsilon = 1e-2);
        }
    }

    #[test]
    // Purpose
    // -------
    // Without an ML search the center is `theta0` and the gradient is that
    // of `ℓ` (pointing toward the maximum).
    //
    // Given
    // -----
    // - Correlated Gaussian evaluated at `θ₀ = (0, 0)`.
    //
    // Expect
    // ------
    // - `center == θ₀`, `ml_success == None`,
    //   `∇ℓ(0, 0) = −P (θ₀ − μ) = (1, −1.5)`.
    fn center_is_theta0_without_ml_search() {
        let f = correlated_gaussian();
        let theta0 = array![0.0, 0.0];

        let out = fisher(&f, &theta0, &(), None, &FisherOptions::default()).unwrap();

        assert_eq!(out.center, theta0);
        assert_eq!(out.ml_success, None);
        assert_abs_diff_eq!(out.fisher_gradient[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.fisher_gradient[1], -1.5, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // The covariance helper inverts the Fisher matrix.
    fn covariance_inverts_fisher_matrix() {
        let f = correlated_gaussian();
        let out = fisher(&f, &array![1.0, -2.0], &(), None, &FisherOptions::default()).unwrap();

        let cov = out.covariance().unwrap();
        let identity = out.fisher_matrix.dot(&cov);

        assert_abs_diff_eq!(identity[[0, 0]], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(identity[[0, 1]], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(identity[[1, 1]], 1.0, epsilon = 1e-6);
        assert_eq!(out.standard_errors().unwrap().len(), 2);
    }

    #[test]
    // Purpose
    // -------
    // A non-positive step is rejected at construction and at call time.
    fn step_is_validated() {
        assert!(FisherOptions::new(false, MLEOptions::default(), 0.0).is_err());
        let bad = FisherOptions { step: -1.0, ..FisherOptions::default() };
        let err = fisher(&correlated_gaussian(), &array![0.0, 0.0], &(), None, &bad).unwrap_err();
        assert_eq!(err, OptError::InvalidDiffStep { step: -1.0 });
    }
}
