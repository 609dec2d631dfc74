//! sampling — ensemble MCMC over spectral-parameter likelihoods.
//!
//! Purpose
//! -------
//! Draw posterior samples of the spectral parameters of one pixel with an
//! affine-invariant ensemble sampler, stopping early once the chain is long
//! compared with its integrated autocorrelation time.
//!
//! Key behaviors
//! -------------
//! - [`sample`] builds the initial ensemble from `theta0` and the
//!   uncertainty hints, runs ganesh's AIES (stretch move) for up to
//!   `n_samples` iterations, and flattens the post-burn-in positions into a
//!   [`Chain`].
//! - [`density::PosteriorDensity`] presents a [`LogLikelihood`] to ganesh as
//!   a log-density.
//! - Every [`options::CHECK_INTERVAL`] iterations the
//!   [`convergence::ConvergenceTerminator`] estimates τ with ganesh's
//!   `integrated_autocorrelation_times`, records it in the chain's trace,
//!   logs it at `info` level through `tracing`, and stops the run once the
//!   chain has converged.
//!
//! Invariants & assumptions
//! ------------------------
//! - The caller's RNG draws the initial ensemble and seeds the sampler's
//!   generator, so a seeded RNG reproduces a run exactly.
//! - A chain that never converges is a successful result with
//!   `converged == false`.
//!
//! Conventions
//! -----------
//! - Sample matrices are `(n_rows, ndim)` with rows ordered by iteration,
//!   then walker.
//! - Errors are [`SamplerError`]; optimizer-layer errors (bad `theta0`,
//!   hint mismatches, likelihood failures) are wrapped, not flattened.
//!
//! Downstream usage
//! ----------------
//! - `separation` dispatches to [`sample`] for the `PosteriorSample`
//!   strategy, seeding a fresh RNG per pixel.
//! - Python bindings expose it as `run_emcee`.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood

pub mod api;
pub mod chain;
pub mod convergence;
pub mod density;
pub mod errors;
pub mod options;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::api::sample;
pub use self::chain::{AutocorrCheck, Chain};
pub use self::convergence::{ConvergenceMonitor, ConvergenceTerminator};
pub use self::density::PosteriorDensity;
pub use self::errors::{SamplerError, SamplerResult};
pub use self::options::{MoveOptions, SamplerOptions};

pub mod prelude {
    pub use super::api::sample;
    pub use super::chain::Chain;
    pub use super::errors::{SamplerError, SamplerResult};
    pub use super::options::{MoveOptions, SamplerOptions};
}
