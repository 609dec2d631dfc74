//! Integration tests for the per-pixel separation pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path: synthetic multi-frequency maps stored in
//!   `SkyMaps`, masked into pixel payloads, and estimated pixel by pixel with
//!   each strategy through `clean_pixel` / `clean_pixels`.
//! - Use a realistic two-parameter power-law foreground (amplitude and
//!   spectral index) rather than a quadratic toy.
//!
//! Coverage
//! --------
//! - `separation::maps`: channel insertion, masking, pixel payloads.
//! - `separation::driver`: ordering and prior-mean starting point.
//! - `optimization::loglik_optimizer::minimize` with Powell and Nelder–Mead.
//! - `inference::fisher` around the ML point, plus covariance helpers.
//! - `sampling::sample` started at the ML point.
//!
//! Exclusions
//! ----------
//! - Python bindings.
//! - Low-level solver, autocorrelation and finite-difference details; those
//!   are covered by unit tests.
use ndarray::{Array1, Array2, array};
use rand::{SeedableRng, rngs::StdRng};

use freckles::{
    inference::FisherOptions,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{LogLikelihood, MLEOptions, Method, Theta, UncertaintyHints},
    },
    sampling::{SamplerOptions, sample},
    separation::{
        MapLike, PixelData, PixelOutcome, SkyMaps, Strategy, clean_pixel, clean_pixels,
        nside_to_npix,
    },
};

const FREQS: [f64; 4] = [30.0, 44.0, 70.0, 100.0];
const NU0: f64 = 70.0;
const NOISE_VAR: f64 = 0.01;

/// Single power-law foreground: `d_ν = A · (ν / ν0)^β` in every
/// polarization, with Gaussian noise of known variance.
struct PowerLaw {
    ratios: Array1<f64>,
}

impl PowerLaw {
    fn new() -> Self {
        Self { ratios: FREQS.iter().map(|nu| nu / NU0).collect() }
    }

    fn sed(&self, beta: f64) -> Array1<f64> {
        self.ratios.mapv(|r| r.powf(beta))
    }
}

impl LogLikelihood for PowerLaw {
    type Data = PixelData;

    fn value(&self, theta: &Theta, data: &PixelData) -> OptResult<f64> {
        if data.data.ncols() != self.ratios.len() {
            return Err(OptError::LikelihoodFailed { text: "frequency count mismatch".into() });
        }
        let model = self.sed(theta[1]) * theta[0];
        let mut chi2 = 0.0;
        for (row, var) in data.data.rows().into_iter().zip(data.variance.rows()) {
            let resid = &row - &model;
            chi2 += (&resid * &resid / &var).sum();
        }
        Ok(-0.5 * chi2)
    }
}

impl MapLike for PowerLaw {
    fn var_prior_mean(&self) -> Theta {
        array![1.0, -2.5]
    }
}

/// Truth per pixel of an nside=1 map: amplitude grows with the pixel index,
/// spectral index alternates between two values.
fn truth(ipix: usize) -> (f64, f64) {
    (1.5 + 0.25 * ipix as f64, if ipix % 2 == 0 { -3.0 } else { -2.7 })
}

/// Noise-free nside=1 maps (one polarization) for `FREQS`.
fn synthetic_maps(model: &PowerLaw) -> SkyMaps {
    let npix = nside_to_npix(1);
    let mut maps = SkyMaps::new(1, 1, FREQS.len(), None).unwrap();
    for ifreq in 0..FREQS.len() {
        let mut channel = Array2::<f64>::zeros((1, npix));
        for ipix in 0..npix {
            let (amp, beta) = truth(ipix);
            channel[[0, ipix]] = amp * model.sed(beta)[ifreq];
        }
        maps.set_frequency_maps(ifreq, channel.view()).unwrap();
        maps.set_frequency_variance(ifreq, Array2::from_elem((1, npix), NOISE_VAR).view())
            .unwrap();
    }
    maps
}

/// Route `tracing` output to the test harness; `RUST_LOG=freckles=debug`
/// shows per-pixel and autocorrelation events.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn mask(keep: &[usize]) -> Array1<f64> {
    let mut m = Array1::<f64>::zeros(nside_to_npix(1));
    for &i in keep {
        m[i] = 1.0;
    }
    m
}

#[test]
// Purpose
// -------
// Masked pixels are estimated in mask order and recover the true SED
// parameters with the default (Powell) optimizer.
//
// Given
// -----
// - Noise-free maps, mask keeping pixels 1, 4, 7 and 10.
//
// Expect
// ------
// - Four results, pixel k matching `truth(mask index k)` to 1e-2.
fn clean_pixels_recovers_power_law_parameters() {
    // Arrange
    init_logging();
    let model = PowerLaw::new();
    let maps = synthetic_maps(&model);
    let keep = [1, 4, 7, 10];
    let masked = maps.extract_with_mask(mask(&keep).view()).unwrap();
    let pixels = masked.pixels();

    // Act
    let results = clean_pixels(&model, &pixels, &MLEOptions::default(), None);

    // Assert
    assert_eq!(masked.indices, keep.to_vec());
    assert_eq!(results.len(), keep.len());
    for (res, &ipix) in results.iter().zip(keep.iter()) {
        let out = res.as_ref().unwrap();
        let (amp, beta) = truth(ipix);
        assert!(out.success, "pixel {ipix}: {}", out.status);
        assert!((out.theta_hat[0] - amp).abs() < 1e-2, "pixel {ipix}: {:?}", out.theta_hat);
        assert!((out.theta_hat[1] - beta).abs() < 1e-2, "pixel {ipix}: {:?}", out.theta_hat);
        assert!(out.n_evals > 0);
    }
}

#[test]
// Purpose
// -------
// Nelder–Mead with usable hints reaches the same optimum as Powell.
fn nelder_mead_with_hints_matches_powell() {
    let model = PowerLaw::new();
    let maps = synthetic_maps(&model);
    let masked = maps.extract_with_mask(mask(&[3]).view()).unwrap();
    let data = masked.pixel(0).unwrap();
    let hints = UncertaintyHints::new(vec![Some(0.5), None]);

    let powell = clean_pixel(&model, &data, &MLEOptions::default(), Some(&hints)).unwrap();
    let nm_opts = MLEOptions::default().with_method(Method::NelderMead);
    let nm = clean_pixel(&model, &data, &nm_opts, Some(&hints)).unwrap();

    assert!((powell.theta_hat[0] - nm.theta_hat[0]).abs() < 1e-2);
    assert!((powell.theta_hat[1] - nm.theta_hat[1]).abs() < 1e-2);
}

#[test]
// Purpose
// -------
// Fisher analysis around the ML point is consistent with a maximum.
//
// Given
// -----
// - One noise-free pixel, `find_ml_first = true`.
//
// Expect
// ------
// - The center is the truth, the gradient is ≈ 0, the Fisher matrix is
//   symmetric positive definite, and standard errors are finite and small.
fn fisher_at_ml_point_is_a_maximum() {
    // Arrange
    let model = PowerLaw::new();
    let maps = synthetic_maps(&model);
    let data = maps.extract_with_mask(mask(&[6]).view()).unwrap().pixel(0).unwrap();
    let opts = FisherOptions::new(true, MLEOptions::default(), 1e-3).unwrap();

    // Act
    let out = clean_pixel(&model, &data, &opts, None).unwrap();

    // Assert
    let (amp, beta) = truth(6);
    assert_eq!(out.ml_success, Some(true));
    assert!((out.center[0] - amp).abs() < 1e-2);
    assert!((out.center[1] - beta).abs() < 1e-2);
    let f = &out.fisher_matrix;
    assert!((f[[0, 1]] - f[[1, 0]]).abs() < 1e-9 * f[[0, 0]].abs().max(1.0));
    assert!(f[[0, 0]] > 0.0 && f[[1, 1]] > 0.0);
    assert!(f[[0, 0]] * f[[1, 1]] - f[[0, 1]] * f[[1, 0]] > 0.0);
    for i in 0..2 {
        assert!(out.fisher_gradient[i].abs() < 1e-2 * f[[i, i]], "{:?}", out.fisher_gradient);
    }
    let se = out.standard_errors().unwrap();
    assert!(se.iter().all(|s| s.is_finite() && *s > 0.0 && *s < 1.0));
}

#[test]
// Purpose
// -------
// Posterior samples started at the ML point concentrate around the truth.
//
// Given
// -----
// - One pixel, 16 walkers, 300 iterations, 100 burn-in, fixed seed.
//
// Expect
// ------
// - `(iterations − 100) · 16` rows; an early stop can only happen at the
//   200-iteration check, which still leaves 100 retained iterations.
// - Posterior mean within 3 Fisher standard errors of the truth.
// - Trace has one entry per completed check.
fn posterior_sampling_concentrates_on_truth() {
    // Arrange
    init_logging();
    let model = PowerLaw::new();
    let maps = synthetic_maps(&model);
    let data = maps.extract_with_mask(mask(&[2]).view()).unwrap().pixel(0).unwrap();
    let ml = clean_pixel(&model, &data, &MLEOptions::default(), None).unwrap();
    let fisher_out = freckles::inference::fisher(
        &model,
        &ml.theta_hat,
        &data,
        None,
        &FisherOptions::default(),
    )
    .unwrap();
    let se = fisher_out.standard_errors().unwrap();
    let hints = UncertaintyHints::from_values(&se.to_vec());
    let opts = SamplerOptions::new(16, 300, 100, 50.0, 0.01, Default::default(), None).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    // Act
    let chain = sample(&model, &ml.theta_hat, &data, Some(&hints), &opts, &mut rng).unwrap();

    // Assert
    assert_eq!(chain.ndim(), 2);
    assert_eq!(chain.n_retained(), (chain.iterations - 100) * 16);
    assert_eq!(chain.autocorr.len(), chain.iterations / 100);
    let (amp, beta) = truth(2);
    let mean = chain.mean();
    assert!((mean[0] - amp).abs() < 3.0 * se[0], "mean {mean:?}, se {se:?}");
    assert!((mean[1] - beta).abs() < 3.0 * se[1], "mean {mean:?}, se {se:?}");
    assert!(chain.acceptance_fraction.iter().all(|&a| a > 0.0 && a < 1.0));
}

#[test]
// Purpose
// -------
// A seeded `Strategy::PosteriorSample` batch is reproducible and keeps one
// result per pixel.
fn seeded_strategy_batch_is_reproducible() {
    let model = PowerLaw::new();
    let maps = synthetic_maps(&model);
    let pixels = maps.extract_with_mask(mask(&[0, 5]).view()).unwrap().pixels();
    let opts = SamplerOptions::new(8, 40, 10, 50.0, 0.01, Default::default(), Some(9)).unwrap();
    let strategy = Strategy::PosteriorSample(opts);

    let first = clean_pixels(&model, &pixels, &strategy, None);
    let second = clean_pixels(&model, &pixels, &strategy, None);

    assert_eq!(first.len(), 2);
    for (a, b) in first.iter().zip(second.iter()) {
        match (a.as_ref().unwrap(), b.as_ref().unwrap()) {
            (PixelOutcome::PosteriorSample(ca), PixelOutcome::PosteriorSample(cb)) => {
                assert_eq!(ca.samples, cb.samples);
                assert!(ca.autocorr.is_empty());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
