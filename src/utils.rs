//! utils — PyO3 glue shared by the Python-facing functions in `lib.rs`.
//!
//! - [`PyLogLike`] wraps a Python callable `f(params, *args) -> float` as a
//!   [`LogLikelihood`], acquiring the GIL for every evaluation.
//! - [`extract_f64_array`] accepts numpy arrays, pandas Series or plain
//!   sequences of floats.
//! - [`extract_hints`] turns a Python `dpos` (sequence of floats or `None`)
//!   into [`UncertaintyHints`].
//! - [`py_iter_callback`] wraps a Python callable as the optimizer's
//!   per-iteration callback.
#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyTuple},
};

#[cfg(feature = "python-bindings")]
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Cost, IterCallback, LogLikelihood, Theta, UncertaintyHints},
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D float input into an owned parameter vector.
#[cfg(feature = "python-bindings")]
pub fn extract_theta<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Theta> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        pyo3::exceptions::PyValueError::new_err("pos0 must be a 1-D contiguous float64 array")
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// `dpos` from Python: `None`, or a sequence whose entries are floats or
/// `None`. Non-positive entries are kept and treated as "no guess" later.
#[cfg(feature = "python-bindings")]
pub fn extract_hints(dpos: Option<&Bound<'_, PyAny>>) -> PyResult<Option<UncertaintyHints>> {
    match dpos {
        None => Ok(None),
        Some(obj) if obj.is_none() => Ok(None),
        Some(obj) => {
            let entries: Vec<Option<f64>> = obj.extract()?;
            Ok(Some(UncertaintyHints::new(entries)))
        }
    }
}

/// Per-iteration callback calling `func(params)` under the GIL.
///
/// The return value is ignored and the callback cannot stop the optimizer;
/// a Python exception is logged at `warn` level and the run continues.
#[cfg(feature = "python-bindings")]
pub fn py_iter_callback(func: Py<PyAny>) -> IterCallback {
    Box::new(move |theta: &Theta| {
        Python::with_gil(|py| {
            let params = theta.to_vec().into_pyarray(py);
            if let Err(err) = func.bind(py).call1((params,)) {
                tracing::warn!(error = %err, "run_minimize: callback raised, ignoring");
            }
        })
    })
}

/// Python callable used as a log-likelihood.
///
/// Every evaluation acquires the GIL, builds `(params, *args)` with `params`
/// as a fresh numpy array, and extracts a float from the result. Python
/// exceptions become [`OptError::LikelihoodFailed`] and are re-raised as
/// `ValueError` at the binding boundary.
#[cfg(feature = "python-bindings")]
pub struct PyLogLike {
    func: Py<PyAny>,
    args: Py<PyTuple>,
}

#[cfg(feature = "python-bindings")]
impl PyLogLike {
    pub fn new(func: Py<PyAny>, args: Py<PyTuple>) -> Self {
        Self { func, args }
    }

    fn call(&self, py: Python<'_>, theta: &Theta) -> PyResult<f64> {
        let params = theta.to_vec().into_pyarray(py);
        let mut call_args: Vec<Bound<'_, PyAny>> = Vec::with_capacity(1 + self.args.bind(py).len());
        call_args.push(params.into_any());
        call_args.extend(self.args.bind(py).iter());
        let tuple = PyTuple::new(py, call_args)?;
        self.func.bind(py).call1(tuple)?.extract::<f64>()
    }
}

#[cfg(feature = "python-bindings")]
impl LogLikelihood for PyLogLike {
    type Data = ();

    fn value(&self, theta: &Theta, _data: &()) -> OptResult<Cost> {
        Python::with_gil(|py| self.call(py, theta))
            .map_err(|err| OptError::LikelihoodFailed { text: err.to_string() })
    }
}
