//! freckles — per-pixel component separation for multi-frequency sky maps.
//!
//! Purpose
//! -------
//! Estimate the spectral parameters of foreground components pixel by pixel,
//! given a user-supplied spectral log-likelihood. Three estimation strategies
//! are available: a maximum-likelihood point estimate, a Fisher-matrix
//! Gaussian approximation, and ensemble MCMC with autocorrelation-based early
//! stopping. The crate also serves as the PyO3 bridge behind the `_freckles`
//! extension module.
//!
//! Key behaviors
//! -------------
//! - [`optimization`]: `minimize` over a [`LogLikelihood`] with Powell,
//!   Nelder–Mead or L-BFGS (argmin backends).
//! - [`inference`]: `fisher` (Richardson-extrapolated derivatives of `-ℓ`)
//!   and covariance helpers.
//! - [`sampling`]: `sample`, an affine-invariant ensemble sampler with
//!   convergence checks every 100 iterations.
//! - [`separation`]: `clean_pixel` / `clean_pixels` drivers and in-memory
//!   `SkyMaps`.
//! - With `python-bindings`, `run_minimize`, `run_fisher` and `run_emcee`
//!   accept a Python callable `f(params, *args)` and return dictionaries.
//!
//! Invariants & assumptions
//! ------------------------
//! - Users always supply the log-likelihood `ℓ`, never the cost; `-∞` marks a
//!   point outside the support.
//! - Non-convergence is reported as data (`success`, `ml_success`,
//!   `converged`), not as an error.
//!
//! Conventions
//! -----------
//! - Parameter vectors are `ndarray::Array1<f64>`; matrices are `Array2<f64>`.
//! - Errors are layer-specific enums (`OptError`, `SamplerError`,
//!   `SeparationError`) converted to `ValueError` at the Python boundary.
//! - Diagnostics go through `tracing`; the library never installs a
//!   subscriber.
//!
//! Downstream usage
//! ----------------
//! - Rust callers implement [`LogLikelihood`] (or [`separation::MapLike`])
//!   and call the estimators directly.
//! - The Python package imports `_freckles` and calls the `run_*` functions
//!   with its own likelihood callables.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds an end-to-end
//!   separation pipeline over synthetic maps.
//!
//! [`LogLikelihood`]: optimization::loglik_optimizer::LogLikelihood

pub mod inference;
pub mod optimization;
pub mod sampling;
pub mod separation;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::str::FromStr;

#[cfg(feature = "python-bindings")]
use numpy::IntoPyArray;

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict, PyTuple},
};

#[cfg(feature = "python-bindings")]
use crate::{
    inference::fisher::{FisherOptions, fisher},
    optimization::loglik_optimizer::{MLEOptions, Method, minimize},
    sampling::{MoveOptions, SamplerOptions, sample},
    utils::{PyLogLike, extract_hints, extract_theta, py_iter_callback},
};

#[cfg(feature = "python-bindings")]
fn build_loglike<'py>(
    py: Python<'py>, func: &Bound<'py, PyAny>, args: Option<&Bound<'py, PyTuple>>,
) -> PyLogLike {
    let args = match args {
        Some(tuple) => tuple.clone().unbind(),
        None => PyTuple::empty(py).unbind(),
    };
    PyLogLike::new(func.clone().unbind(), args)
}

#[cfg(feature = "python-bindings")]
fn build_mle_options(
    method: &str, tol: Option<f64>, max_iter: Option<usize>, verbose: bool,
) -> PyResult<MLEOptions> {
    let method = Method::from_str(method)?;
    Ok(MLEOptions::new(method, tol, max_iter, None, verbose)?)
}

/// run_minimize — maximum-likelihood parameters of a Python log-likelihood.
///
/// Parameters
/// ----------
/// - `func`: callable `func(params, *args) -> float` returning `ℓ`.
/// - `pos0`: initial guess (1-D float sequence).
/// - `args`: extra positional arguments for `func`.
/// - `dpos`: optional width hints; entries may be `None`.
/// - `method`: `"Powell"` (default), `"Nelder-Mead"`, `"L-BFGS"` or
///   `"L-BFGS-HZ"`.
/// - `tol`, `max_iter`, `verbose`: forwarded to `MLEOptions`.
/// - `callback`: optional `callback(params)` called after every iteration
///   with the current parameters; its return value is ignored and an
///   exception it raises is logged, not propagated.
///
/// Returns
/// -------
/// `dict` with `params_ML` (always 1-D), `ML_success` and `ML_nev`.
///
/// Errors
/// ------
/// `ValueError` for invalid inputs, a failing likelihood, or backend errors.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (func, pos0, args = None, dpos = None, method = "Powell", tol = None, max_iter = None, verbose = false, callback = None),
    text_signature = "(func, pos0, /, args=None, dpos=None, method='Powell', tol=None, max_iter=None, verbose=False, callback=None)"
)]
#[allow(clippy::too_many_arguments)]
fn run_minimize<'py>(
    py: Python<'py>, func: &Bound<'py, PyAny>, pos0: &Bound<'py, PyAny>,
    args: Option<&Bound<'py, PyTuple>>, dpos: Option<&Bound<'py, PyAny>>, method: &str,
    tol: Option<f64>, max_iter: Option<usize>, verbose: bool, callback: Option<&Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyDict>> {
    let f = build_loglike(py, func, args);
    let theta0 = extract_theta(py, pos0)?;
    let hints = extract_hints(dpos)?;
    let opts = build_mle_options(method, tol, max_iter, verbose)?;
    let callback = callback
        .filter(|cb| !cb.is_none())
        .map(|cb| py_iter_callback(cb.clone().unbind()));

    let outcome =
        py.allow_threads(|| minimize(&f, &theta0, &(), hints.as_ref(), &opts, callback))?;

    let out = PyDict::new(py);
    out.set_item("params_ML", outcome.theta_hat.into_pyarray(py))?;
    out.set_item("ML_success", outcome.success)?;
    out.set_item("ML_nev", outcome.n_evals)?;
    Ok(out)
}

/// run_fisher — Fisher matrix of a Python log-likelihood.
///
/// Parameters
/// ----------
/// - `func`, `pos0`, `args`, `dpos`: as for `run_minimize`.
/// - `ml_first`: find the maximum first and expand around it.
/// - `ml_method`, `ml_max_iter`: optimizer settings for that search.
/// - `step`: relative finite-difference step.
///
/// Returns
/// -------
/// `dict` with `params_cent`, `fisher_m` (Hessian of `-ℓ`), `fisher_v`
/// (gradient of `ℓ`) and `ML_success` (`None` when `ml_first` is false).
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (func, pos0, args = None, dpos = None, ml_first = false, ml_method = "Powell", ml_max_iter = None, step = 1e-3, verbose = false),
    text_signature = "(func, pos0, /, args=None, dpos=None, ml_first=False, ml_method='Powell', ml_max_iter=None, step=0.001, verbose=False)"
)]
#[allow(clippy::too_many_arguments)]
fn run_fisher<'py>(
    py: Python<'py>, func: &Bound<'py, PyAny>, pos0: &Bound<'py, PyAny>,
    args: Option<&Bound<'py, PyTuple>>, dpos: Option<&Bound<'py, PyAny>>, ml_first: bool,
    ml_method: &str, ml_max_iter: Option<usize>, step: f64, verbose: bool,
) -> PyResult<Bound<'py, PyDict>> {
    let f = build_loglike(py, func, args);
    let theta0 = extract_theta(py, pos0)?;
    let hints = extract_hints(dpos)?;
    let ml_options = build_mle_options(ml_method, None, ml_max_iter, verbose)?;
    let opts = FisherOptions::new(ml_first, ml_options, step)?;

    let outcome = py.allow_threads(|| fisher(&f, &theta0, &(), hints.as_ref(), &opts))?;

    let out = PyDict::new(py);
    out.set_item("params_cent", outcome.center.into_pyarray(py))?;
    out.set_item("fisher_m", outcome.fisher_matrix.into_pyarray(py))?;
    out.set_item("fisher_v", outcome.fisher_gradient.into_pyarray(py))?;
    out.set_item("ML_success", outcome.ml_success)?;
    Ok(out)
}

/// run_emcee — ensemble MCMC over a Python log-likelihood.
///
/// Parameters
/// ----------
/// - `func`, `pos0`, `args`, `dpos`: as for `run_minimize`; hints scale the
///   initial walker dispersion.
/// - `nwalkers`, `nsamps`, `nburn`: ensemble size, iteration cap and
///   discarded prefix.
/// - `conv_F`, `conv_perc`: autocorrelation convergence factor and relative
///   tolerance.
/// - `a`: stretch-move scale.
/// - `seed`: RNG seed; `None` draws from OS entropy.
///
/// Returns
/// -------
/// `dict` with `chains` (`(n_retained, ndim)`), `autocorr` (`(k, 2)` rows of
/// iteration and mean τ), `converged` and `acceptance_fraction`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (func, pos0, args = None, dpos = None, nwalkers = 200, nsamps = 200, nburn = 50, conv_F = 50.0, conv_perc = 0.01, a = 2.0, seed = None),
    text_signature = "(func, pos0, /, args=None, dpos=None, nwalkers=200, nsamps=200, nburn=50, conv_F=50.0, conv_perc=0.01, a=2.0, seed=None)"
)]
#[allow(clippy::too_many_arguments, non_snake_case)]
fn run_emcee<'py>(
    py: Python<'py>, func: &Bound<'py, PyAny>, pos0: &Bound<'py, PyAny>,
    args: Option<&Bound<'py, PyTuple>>, dpos: Option<&Bound<'py, PyAny>>, nwalkers: usize,
    nsamps: usize, nburn: usize, conv_F: f64, conv_perc: f64, a: f64, seed: Option<u64>,
) -> PyResult<Bound<'py, PyDict>> {
    use rand::{SeedableRng, rngs::StdRng};

    let f = build_loglike(py, func, args);
    let theta0 = extract_theta(py, pos0)?;
    let hints = extract_hints(dpos)?;
    let moves = MoveOptions::new(a)?;
    let opts = SamplerOptions::new(nwalkers, nsamps, nburn, conv_F, conv_perc, moves, seed)?;

    let chain = py.allow_threads(|| {
        let mut rng = match opts.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        sample(&f, &theta0, &(), hints.as_ref(), &opts, &mut rng)
    })?;

    let out = PyDict::new(py);
    out.set_item("autocorr", chain.autocorr_array().into_pyarray(py))?;
    out.set_item("converged", chain.converged)?;
    out.set_item("acceptance_fraction", chain.acceptance_fraction.into_pyarray(py))?;
    out.set_item("chains", chain.samples.into_pyarray(py))?;
    Ok(out)
}

/// _freckles — PyO3 module initializer for the Python extension.
///
/// Registers `run_minimize`, `run_fisher` and `run_emcee`. Invoked by Python
/// when importing the compiled extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _freckles<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(run_minimize, m)?)?;
    m.add_function(wrap_pyfunction!(run_fisher, m)?)?;
    m.add_function(wrap_pyfunction!(run_emcee, m)?)?;
    Ok(())
}
