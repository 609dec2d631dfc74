//! sampling::errors — error surface for the ensemble sampler.
//!
//! Purpose
//! -------
//! Describe every fatal condition of a sampling run: invalid configuration,
//! an ensemble too small for the problem, invalid log-probabilities, and a
//! run too short to survive burn-in. An under-converged chain is *not* an
//! error; it is reported through `Chain::converged`.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::optimization::errors::OptError;

/// Result alias for sampler operations.
pub type SamplerResult<T> = Result<T, SamplerError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SamplerError {
    // ---- SamplerOptions ----
    /// The ensemble needs at least two walkers.
    InvalidWalkers { n_walkers: usize },
    /// The number of iterations must be positive.
    InvalidSamples { n_samples: usize },
    /// Burn-in must be shorter than the run.
    InvalidBurnIn { n_burn: usize, n_samples: usize },
    /// Convergence factor and tolerance must be finite and positive.
    InvalidConvergence { name: &'static str, value: f64 },
    /// Stretch-move scale must be finite and greater than one.
    InvalidStretchScale { scale: f64 },

    // ---- Run-time preconditions ----
    /// The stretch move needs at least `2 · ndim` walkers.
    TooFewWalkers { n_walkers: usize, ndim: usize },
    /// Walker histories returned by the sampler have an unexpected shape.
    WalkerShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    /// Log-probability evaluated to `NaN` or `+∞`.
    InvalidLogProb { value: f64 },
    /// The run stopped before any post-burn-in iteration existed.
    InsufficientIterations { iterations: usize, n_burn: usize },

    // ---- Upstream ----
    /// Error raised by the log-likelihood or the optimizer layer.
    Optimization(OptError),
}

impl std::error::Error for SamplerError {}

impl std::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplerError::InvalidWalkers { n_walkers } => {
                write!(f, "Invalid number of walkers {n_walkers}: need at least 2")
            }
            SamplerError::InvalidSamples { n_samples } => {
                write!(f, "Invalid number of samples {n_samples}: must be positive")
            }
            SamplerError::InvalidBurnIn { n_burn, n_samples } => {
                write!(f, "Burn-in {n_burn} must be smaller than the number of samples {n_samples}")
            }
            SamplerError::InvalidConvergence { name, value } => {
                write!(f, "Invalid convergence {name} {value}: must be finite and > 0")
            }
            SamplerError::InvalidStretchScale { scale } => {
                write!(f, "Invalid stretch scale {scale}: must be finite and > 1")
            }
            SamplerError::TooFewWalkers { n_walkers, ndim } => {
                write!(
                    f,
                    "Too few walkers: {n_walkers} walkers for {ndim} parameters, need at least {}",
                    2 * ndim
                )
            }
            SamplerError::WalkerShapeMismatch { expected, found } => {
                write!(f, "Walker history shape mismatch: expected {expected:?}, found {found:?}")
            }
            SamplerError::InvalidLogProb { value } => {
                write!(f, "Invalid log-probability {value}: must not be NaN or +inf")
            }
            SamplerError::InsufficientIterations { iterations, n_burn } => {
                write!(
                    f,
                    "Sampler ran {iterations} iterations, not enough to discard a burn-in of {n_burn}"
                )
            }
            SamplerError::Optimization(err) => write!(f, "{err}"),
        }
    }
}

impl From<OptError> for SamplerError {
    fn from(err: OptError) -> Self {
        SamplerError::Optimization(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<SamplerError> for PyErr {
    fn from(err: SamplerError) -> PyErr {
        PyValueError::new_err(format!("SamplerError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The walker message states the required minimum.
    fn too_few_walkers_message_names_minimum() {
        let msg = SamplerError::TooFewWalkers { n_walkers: 3, ndim: 2 }.to_string();
        assert!(msg.contains("need at least 4"), "{msg}");
    }

    #[test]
    // Purpose
    // -------
    // Optimizer errors are wrapped without losing their message.
    fn opt_errors_convert_transparently() {
        let err: SamplerError = OptError::EmptyTheta.into();
        assert_eq!(err, SamplerError::Optimization(OptError::EmptyTheta));
        assert_eq!(err.to_string(), OptError::EmptyTheta.to_string());
    }
}
