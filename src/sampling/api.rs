//! High-level entry point for posterior sampling of a `LogLikelihood`.
//!
//! [`sample`] disperses an ensemble around `theta0`, hands it to ganesh's
//! affine-invariant ensemble sampler (AIES) with the stretch move, stops it
//! through a [`ConvergenceTerminator`] that checks the integrated
//! autocorrelation time every 100 iterations, and returns the post-burn-in
//! samples as a [`Chain`].
use ganesh::{
    algorithms::mcmc::{AIES, AIESConfig, AIESMove},
    core::Callbacks,
    traits::Algorithm,
};
use nalgebra::DVector;
use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::{
    optimization::loglik_optimizer::{
        LogLikelihood, Theta,
        hints::{UncertaintyHints, check_hints, widths_or_default},
        validation::validate_theta0,
    },
    sampling::{
        chain::Chain,
        convergence::ConvergenceTerminator,
        density::PosteriorDensity,
        errors::{SamplerError, SamplerResult},
        options::SamplerOptions,
    },
};

/// Walker dispersion per unit of uncertainty hint.
pub const HINT_DISPERSION_SCALE: f64 = 0.1;
/// Walker dispersion for parameters without a usable hint.
pub const DEFAULT_DISPERSION: f64 = 0.01;

/// sample — draw posterior samples with an affine-invariant ensemble.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Log-probability (used as-is, no prior added).
/// - `theta0`: `&Theta`
///   Centre of the initial ensemble.
/// - `data`: `&F::Data`
///   Extra arguments forwarded to `f`.
/// - `dpos`: `Option<&UncertaintyHints>`
///   Walker `i` starts at `theta0 + dp ⊙ N(0, I)` with `dp_j = 0.1 · hint_j`,
///   or `0.01` where no usable hint exists.
/// - `opts`: `&SamplerOptions`
/// - `rng`: `&mut R`
///   Draws the initial ensemble and the seed of the sampler's own
///   generator; a seeded RNG makes the run reproducible.
///
/// Returns
/// -------
/// `SamplerResult<Chain>` whose `samples` have shape
/// `(n_walkers · (iterations − n_burn), ndim)`.
///
/// Errors
/// ------
/// - Invalid options (see [`SamplerOptions::validate`]).
/// - `OptError` preconditions on `theta0` and `dpos`, wrapped in
///   [`SamplerError::Optimization`].
/// - [`SamplerError::TooFewWalkers`] if `n_walkers < 2 · ndim`.
/// - [`SamplerError::InvalidLogProb`] or any likelihood error during the run.
/// - [`SamplerError::InsufficientIterations`] if the run converged before
///   completing more than `n_burn` iterations.
///
/// Notes
/// -----
/// - The convergence test is described in
///   [`convergence`](crate::sampling::convergence).
/// - Failure to converge is reported through `Chain::converged`.
pub fn sample<F, R>(
    f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>,
    opts: &SamplerOptions, rng: &mut R,
) -> SamplerResult<Chain>
where
    F: LogLikelihood,
    R: Rng + ?Sized,
{
    opts.validate()?;
    validate_theta0(theta0)?;
    let ndim = theta0.len();
    check_hints(dpos, ndim)?;
    if opts.n_walkers < 2 * ndim {
        return Err(SamplerError::TooFewWalkers { n_walkers: opts.n_walkers, ndim });
    }

    let dp = widths_or_default(dpos, ndim, HINT_DISPERSION_SCALE, DEFAULT_DISPERSION);
    let initial = initial_ensemble(theta0, &dp, opts.n_walkers, rng);
    let density = PosteriorDensity::new(f, data);
    tracing::debug!(n_walkers = opts.n_walkers, ndim, n_samples = opts.n_samples, "sample: start");

    let config = AIESConfig::new(initial)
        .with_moves(vec![(AIESMove::Stretch { a: opts.moves.stretch_scale }, 1.0)]);
    let terminator = ConvergenceTerminator::new(opts);
    let callbacks = Callbacks::empty().with_terminator(terminator.clone());
    let sampler_seed = rng.gen::<u64>();
    let summary = AIES::new(Some(sampler_seed)).process(&density, &(), config, callbacks)?;

    let (iterations, converged, autocorr) = {
        let monitor = terminator.lock();
        (monitor.iterations, monitor.converged, monitor.trace.clone())
    };
    if iterations <= opts.n_burn {
        return Err(SamplerError::InsufficientIterations { iterations, n_burn: opts.n_burn });
    }
    let walkers = summary.get_chain(None, None);
    let (samples, acceptance_fraction) = flatten_chain(&walkers, iterations, opts.n_burn, ndim)?;
    tracing::debug!(iterations, converged, n_retained = samples.nrows(), "sample: done");

    Ok(Chain { samples, autocorr, iterations, converged, acceptance_fraction })
}

/// Flatten the last `iterations − n_burn` steps of every walker into
/// iteration-major, walker-minor rows, and measure the fraction of steps in
/// which each walker moved.
///
/// `walkers[w]` holds walker `w`'s history; a leading initial position, if
/// present, is skipped by taking steps from the end.
fn flatten_chain(
    walkers: &[Vec<DVector<f64>>], iterations: usize, n_burn: usize, ndim: usize,
) -> SamplerResult<(Array2<f64>, Array1<f64>)> {
    let n_walkers = walkers.len();
    let n_steps = walkers.iter().map(Vec::len).min().unwrap_or(0);
    if n_steps < iterations {
        return Err(SamplerError::WalkerShapeMismatch {
            expected: (n_walkers, iterations),
            found: (n_walkers, n_steps),
        });
    }
    let kept = iterations - n_burn;
    let first = n_steps - kept;

    let mut samples = Array2::<f64>::zeros((kept * n_walkers, ndim));
    for (t, step) in (first..n_steps).enumerate() {
        for (w, history) in walkers.iter().enumerate() {
            let point = &history[step];
            if point.len() != ndim {
                return Err(SamplerError::WalkerShapeMismatch {
                    expected: (n_walkers, ndim),
                    found: (n_walkers, point.len()),
                });
            }
            for (j, &x) in point.iter().enumerate() {
                samples[[t * n_walkers + w, j]] = x;
            }
        }
    }

    let acceptance_fraction = walkers
        .iter()
        .map(|history| {
            let moves = history.windows(2).filter(|pair| pair[0] != pair[1]).count();
            moves as f64 / (history.len().saturating_sub(1)).max(1) as f64
        })
        .collect();
    Ok((samples, acceptance_fraction))
}

/// Initial positions `theta0 + dp ⊙ N(0, I)`, one vector per walker.
fn initial_ensemble<R: Rng + ?Sized>(
    theta0: &Theta, dp: &Theta, n_walkers: usize, rng: &mut R,
) -> Vec<DVector<f64>> {
    (0..n_walkers)
        .map(|_| {
            DVector::from_iterator(
                theta0.len(),
                theta0.iter().zip(dp.iter()).map(|(&t, &d)| {
                    let eps: f64 = StandardNormal.sample(rng);
                    t + d * eps
                }),
            )
        })
        .collect()
}
