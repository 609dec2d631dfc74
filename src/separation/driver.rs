//! separation::driver — run an estimator on one pixel or on many.
//!
//! Purpose
//! -------
//! Connect a [`MapLike`] to an [`Estimator`]: the likelihood's prior mean is
//! the starting point, the uncertainty hints are forwarded untouched, and the
//! estimator's record is returned as-is.
//!
//! Key behaviors
//! -------------
//! - [`clean_pixel`] estimates a single pixel.
//! - [`clean_pixels`] estimates a batch of pixels independently, in parallel
//!   with rayon when the `parallel` feature is enabled, and returns one
//!   result per pixel in input order.
//!
//! Invariants & assumptions
//! ------------------------
//! - A failing pixel yields an `Err` in its slot; the other pixels still run.
//! - No state is shared between pixels beyond `&` borrows of the likelihood,
//!   the estimator and the hints.
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    optimization::loglik_optimizer::{Theta, UncertaintyHints},
    separation::{errors::SeparationResult, maplike::MapLike, strategy::Estimator},
};

/// Estimate the spectral parameters of one pixel.
///
/// Parameters
/// ----------
/// - `maplike`: `&M`
///   Likelihood of the pixel; `var_prior_mean()` is the initial guess.
/// - `data`: `&M::Data`
///   Pixel payload forwarded to every likelihood evaluation.
/// - `estimator`: `&E`
///   Strategy to run (`MLEOptions`, `FisherOptions`, `SamplerOptions` or
///   `Strategy`).
/// - `dpos`: `Option<&UncertaintyHints>`
///   Per-parameter width hints, forwarded unchanged.
///
/// Returns
/// -------
/// `SeparationResult<E::Output>`
///   Exactly the estimator's record.
///
/// Errors
/// ------
/// Whatever the estimator reports, wrapped as `SeparationError`.
pub fn clean_pixel<M: MapLike, E: Estimator>(
    maplike: &M, data: &M::Data, estimator: &E, dpos: Option<&UncertaintyHints>,
) -> SeparationResult<E::Output> {
    let theta0 = maplike.var_prior_mean();
    estimator.estimate(maplike, &theta0, data, dpos, 0)
}

/// Estimate every pixel in `pixels` independently.
///
/// Pixel `i` is passed to the estimator with index `i` (seeded samplers use
/// it to derive the pixel's RNG). The returned vector has one entry per
/// pixel, in the same order.
pub fn clean_pixels<M: MapLike, E: Estimator>(
    maplike: &M, pixels: &[M::Data], estimator: &E, dpos: Option<&UncertaintyHints>,
) -> Vec<SeparationResult<E::Output>> {
    let theta0 = maplike.var_prior_mean();
    tracing::debug!(n_pixels = pixels.len(), ndim = theta0.len(), "clean_pixels: start");

    #[cfg(feature = "parallel")]
    let results: Vec<SeparationResult<E::Output>> = pixels
        .par_iter()
        .enumerate()
        .map(|(pixel, data)| run_pixel(maplike, &theta0, data, estimator, dpos, pixel))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<SeparationResult<E::Output>> = pixels
        .iter()
        .enumerate()
        .map(|(pixel, data)| run_pixel(maplike, &theta0, data, estimator, dpos, pixel))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::debug!(n_pixels = pixels.len(), failed, "clean_pixels: done");
    results
}

fn run_pixel<M: MapLike, E: Estimator>(
    maplike: &M, theta0: &Theta, data: &M::Data, estimator: &E,
    dpos: Option<&UncertaintyHints>, pixel: usize,
) -> SeparationResult<E::Output> {
    tracing::debug!(pixel, "clean_pixels: estimating pixel");
    let result = estimator.estimate(maplike, theta0, data, dpos, pixel);
    if let Err(err) = &result {
        tracing::debug!(pixel, error = %err, "clean_pixels: pixel failed");
    }
    result
}
