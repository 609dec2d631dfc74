//! inference — Fisher-matrix uncertainty for fitted spectral parameters.
//!
//! Purpose
//! -------
//! Provide the cheap alternative to posterior sampling: a local Gaussian
//! approximation of the likelihood built from its curvature at (or near)
//! the maximum.
//!
//! Key behaviors
//! -------------
//! - [`fisher`] optionally runs the ML search, then returns the Hessian of
//!   `-ℓ` and the gradient of `ℓ` at the center as a [`FisherOutcome`].
//! - [`covariance`] inverts Fisher matrices with eigenvalue truncation
//!   (nalgebra symmetric eigendecomposition), exposed through
//!   [`FisherOutcome::covariance`] and [`FisherOutcome::standard_errors`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters live in the same space as the log-likelihood's `θ`; no
//!   reparameterization happens here.
//! - Failures are reported as `OptError`; this layer shares the optimizer's
//!   error surface.
//!
//! Downstream usage
//! ----------------
//! - `separation` dispatches to [`fisher`] for the `FisherApprox` strategy.
//! - Python bindings expose it as `run_fisher`.

pub mod covariance;
pub mod fisher;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::covariance::{EIGEN_EPS, pseudo_inverse, standard_errors};
pub use self::fisher::{DEFAULT_FISHER_STEP, FisherOptions, FisherOutcome, fisher};

// ---- Optional convenience prelude for downstream crates ------------------
//
// Downstream crates can `use freckles::inference::prelude::*;` to import the
// primary inference surface in a single line.

pub mod prelude {
    pub use super::fisher::{FisherOptions, FisherOutcome, fisher};
}
