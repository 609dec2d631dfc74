//! separation::strategy — estimation strategies the pixel driver can run.
//!
//! Purpose
//! -------
//! Put `minimize`, `fisher` and `sample` behind one interface so the driver
//! can treat "how to estimate a pixel" as a value.
//!
//! Key behaviors
//! -------------
//! - [`Estimator`] is implemented by each option struct directly:
//!   [`MLEOptions`] runs `minimize`, [`FisherOptions`] runs `fisher`,
//!   [`SamplerOptions`] runs `sample`.
//! - [`Strategy`] is the closed set of the three, for callers that choose at
//!   runtime; its output is the matching [`PixelOutcome`] variant.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sampling draws from a fresh `StdRng` per pixel, seeded with
//!   `seed + pixel` when a seed is configured, so results do not depend on
//!   the order in which pixels are processed.
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    inference::fisher::{FisherOptions, FisherOutcome, fisher},
    optimization::loglik_optimizer::{
        LogLikelihood, MLEOptions, MinimizerOutcome, Theta, UncertaintyHints, minimize,
    },
    sampling::{Chain, SamplerOptions, sample},
    separation::errors::SeparationResult,
};

/// One way of estimating the spectral parameters of a pixel.
///
/// `pixel` is the position of the pixel in the current batch. Only
/// randomized estimators use it.
pub trait Estimator: Sync {
    type Output: Send;

    fn estimate<F: LogLikelihood>(
        &self, f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>,
        pixel: usize,
    ) -> SeparationResult<Self::Output>;
}

impl Estimator for MLEOptions {
    type Output = MinimizerOutcome;

    fn estimate<F: LogLikelihood>(
        &self, f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>,
        _pixel: usize,
    ) -> SeparationResult<MinimizerOutcome> {
        Ok(minimize(f, theta0, data, dpos, self, None)?)
    }
}

impl Estimator for FisherOptions {
    type Output = FisherOutcome;

    fn estimate<F: LogLikelihood>(
        &self, f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>,
        _pixel: usize,
    ) -> SeparationResult<FisherOutcome> {
        Ok(fisher(f, theta0, data, dpos, self)?)
    }
}

impl Estimator for SamplerOptions {
    type Output = Chain;

    fn estimate<F: LogLikelihood>(
        &self, f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>,
        pixel: usize,
    ) -> SeparationResult<Chain> {
        let mut rng = pixel_rng(self.seed, pixel);
        Ok(sample(f, theta0, data, dpos, self, &mut rng)?)
    }
}

/// Runtime choice of estimator.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    PointEstimate(MLEOptions),
    FisherApprox(FisherOptions),
    PosteriorSample(SamplerOptions),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::PointEstimate(MLEOptions::default())
    }
}

/// Result of a [`Strategy`] on one pixel.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelOutcome {
    PointEstimate(MinimizerOutcome),
    FisherApprox(FisherOutcome),
    PosteriorSample(Chain),
}

impl PixelOutcome {
    /// Best single parameter vector the strategy produced: the optimum, the
    /// Fisher expansion point, or the posterior mean.
    pub fn point(&self) -> Theta {
        match self {
            PixelOutcome::PointEstimate(out) => out.theta_hat.clone(),
            PixelOutcome::FisherApprox(out) => out.center.clone(),
            PixelOutcome::PosteriorSample(chain) => chain.mean(),
        }
    }
}

impl Estimator for Strategy {
    type Output = PixelOutcome;

    fn estimate<F: LogLikelihood>(
        &self, f: &F, theta0: &Theta, data: &F::Data, dpos: Option<&UncertaintyHints>,
        pixel: usize,
    ) -> SeparationResult<PixelOutcome> {
        let outcome = match self {
            Strategy::PointEstimate(opts) => {
                PixelOutcome::PointEstimate(opts.estimate(f, theta0, data, dpos, pixel)?)
            }
            Strategy::FisherApprox(opts) => {
                PixelOutcome::FisherApprox(opts.estimate(f, theta0, data, dpos, pixel)?)
            }
            Strategy::PosteriorSample(opts) => {
                PixelOutcome::PosteriorSample(opts.estimate(f, theta0, data, dpos, pixel)?)
            }
        };
        Ok(outcome)
    }
}

fn pixel_rng(seed: Option<u64>, pixel: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(pixel as u64)),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{optimization::loglik_optimizer::LogLikeFn, separation::errors::SeparationError};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Dispatch of each `Strategy` variant to the matching estimator.
    // - Per-pixel seeding of the sampler.
    // - Error wrapping into `SeparationError`.
    // -------------------------------------------------------------------------

    fn gaussian() -> LogLikeFn<impl Fn(&Theta, &()) -> f64 + Sync, ()> {
        LogLikeFn::new(|theta: &Theta, _: &()| {
            -0.5 * ((theta[0] - 0.5).powi(2) + (theta[1] - 1.5).powi(2) / 4.0)
        })
    }

    fn small_sampler(seed: u64) -> SamplerOptions {
        SamplerOptions::new(8, 60, 20, 50.0, 0.01, Default::default(), Some(seed)).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Each strategy returns its own outcome variant and a sensible point.
    fn strategy_dispatches_by_variant() {
        // Arrange
        let f = gaussian();
        let theta0 = array![0.0, 0.0];

        // Act
        let ml = Strategy::PointEstimate(MLEOptions::default())
            .estimate(&f, &theta0, &(), None, 0)
            .unwrap();
        let fi = Strategy::FisherApprox(FisherOptions::default())
            .estimate(&f, &theta0, &(), None, 0)
            .unwrap();
        let mc = Strategy::PosteriorSample(small_sampler(3))
            .estimate(&f, &theta0, &(), None, 0)
            .unwrap();

        // Assert
        assert!(matches!(ml, PixelOutcome::PointEstimate(_)));
        assert!((ml.point()[0] - 0.5).abs() < 1e-3);
        assert!(matches!(fi, PixelOutcome::FisherApprox(_)));
        assert_eq!(fi.point(), theta0);
        assert!(matches!(mc, PixelOutcome::PosteriorSample(_)));
        assert_eq!(mc.point().len(), 2);
    }

    #[test]
    // Purpose
    // -------
    // The same seed and pixel reproduce a chain; another pixel differs.
    fn sampler_seed_depends_on_pixel() {
        let f = gaussian();
        let opts = small_sampler(11);
        let theta0 = array![0.0, 0.0];

        let a = opts.estimate(&f, &theta0, &(), None, 2).unwrap();
        let b = opts.estimate(&f, &theta0, &(), None, 2).unwrap();
        let c = opts.estimate(&f, &theta0, &(), None, 3).unwrap();

        assert_eq!(a.samples, b.samples);
        assert_ne!(a.samples, c.samples);
    }

    #[test]
    // Purpose
    // -------
    // Layer errors come back wrapped, not flattened.
    fn errors_are_wrapped_by_layer() {
        let f = gaussian();
        let empty = Theta::zeros(0);

        let ml = MLEOptions::default().estimate(&f, &empty, &(), None, 0);
        let mc = small_sampler(0).estimate(&f, &empty, &(), None, 0);

        assert!(matches!(ml, Err(SeparationError::Optimization(_))));
        assert!(matches!(mc, Err(SeparationError::Sampling(_))));
    }
}
