//! inference::covariance — eigen-truncated inverses of Fisher matrices.
//!
//! Purpose
//! -------
//! Turn a Fisher (observed-information) matrix `F` into a parameter
//! covariance `F⁺` and marginal standard errors `sqrt(diag F⁺)`. The inverse
//! is the Moore–Penrose pseudoinverse restricted to the positive spectrum,
//! so flat or badly constrained directions do not blow up the result.
//!
//! Key behaviors
//! -------------
//! - Copy the `ndarray` matrix into `nalgebra` and run a symmetric
//!   eigendecomposition `F = Q Λ Qᵀ`.
//! - Keep eigenpairs with `λ_k > EIGEN_EPS` and form `Σ_k q_k q_kᵀ / λ_k`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is square and (numerically) symmetric; `fisher` symmetrizes its
//!   Hessian before returning it.
//! - Non-positive eigenvalues carry no information and are dropped; a
//!   negative-definite matrix therefore yields an all-zero covariance.
//!
//! Testing notes
//! -------------
//! - Unit tests compare against analytic inverses of small SPD matrices and
//!   check the truncation of a singular direction.
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{types::Hessian, validation::validate_hessian},
};

/// Eigenvalues at or below this threshold are treated as zero.
pub const EIGEN_EPS: f64 = 1e-12;

/// pseudo_inverse — covariance from a Fisher matrix.
///
/// Parameters
/// ----------
/// - `fisher`: `&Hessian`
///   Square Fisher matrix of shape `(n, n)`.
///
/// Returns
/// -------
/// `OptResult<Array2<f64>>`
///   The truncated pseudoinverse `Σ_{λ_k > EIGEN_EPS} q_k q_kᵀ / λ_k`.
///
/// Errors
/// ------
/// - `OptError::HessianDimMismatch` if the matrix is not square.
/// - `OptError::InvalidHessian` if any entry is non-finite.
pub fn pseudo_inverse(fisher: &Hessian) -> OptResult<Array2<f64>> {
    let n = fisher.nrows();
    validate_hessian(fisher, n)?;
    let eigen = to_dmatrix(fisher).symmetric_eigen();
    let q = eigen.eigenvectors;
    let mut cov = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        for i in 0..n {
            for j in 0..n {
                cov[[i, j]] += q[(i, k)] * q[(j, k)] / lambda;
            }
        }
    }
    Ok(cov)
}

/// Marginal standard errors `sqrt(diag F⁺)`.
///
/// # Errors
/// Same as [`pseudo_inverse`].
pub fn standard_errors(fisher: &Hessian) -> OptResult<Array1<f64>> {
    let cov = pseudo_inverse(fisher)?;
    Ok(cov.diag().mapv(f64::sqrt))
}

// ---- Helper methods ----

fn to_dmatrix(matrix: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(matrix.nrows(), matrix.ncols(), |i, j| matrix[[i, j]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement with the analytic inverse of a small SPD matrix.
    // - Truncation of singular and negative directions.
    // - Rejection of malformed input.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The pseudoinverse of an SPD matrix is its ordinary inverse.
    //
    // Given
    // -----
    // - `F = [[4, 1], [1, 3]]`, `det F = 11`.
    //
    // Expect
    // ------
    // - `F⁻¹ = [[3, −1], [−1, 4]] / 11`.
    fn pseudo_inverse_matches_analytic_inverse() {
        // Arrange
        let fisher = array![[4.0, 1.0], [1.0, 3.0]];

        // Act
        let cov = pseudo_inverse(&fisher).unwrap();

        // Assert
        let expected = array![[3.0, -1.0], [-1.0, 4.0]] / 11.0;
        for (a, b) in cov.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // A direction with zero or negative curvature contributes nothing.
    //
    // Given
    // -----
    // - `F = diag(4, 0, −2)`.
    //
    // Expect
    // ------
    // - Standard errors `[0.5, 0, 0]`.
    fn standard_errors_drop_non_positive_directions() {
        let fisher = array![[4.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, -2.0]];
        let se = standard_errors(&fisher).unwrap();
        assert_abs_diff_eq!(se[0], 0.5, epsilon = 1e-12);
        assert_eq!(se[1], 0.0);
        assert_eq!(se[2], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Non-square or non-finite input is an error, not a panic.
    fn rejects_malformed_matrices() {
        let rect = Array2::<f64>::zeros((2, 3));
        assert!(matches!(pseudo_inverse(&rect), Err(OptError::HessianDimMismatch { .. })));
        let nan = array![[f64::NAN]];
        assert!(matches!(standard_errors(&nan), Err(OptError::InvalidHessian { .. })));
    }
}
