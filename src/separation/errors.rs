//! separation::errors — error surface of the pixel driver and map storage.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{optimization::errors::OptError, sampling::errors::SamplerError};

/// Result alias for driver and map operations.
pub type SeparationResult<T> = Result<T, SeparationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SeparationError {
    // ---- Map geometry ----
    /// HEALPix resolution must be a positive power of two.
    InvalidNside { nside: usize },
    /// Number of polarization components or frequencies must be positive.
    InvalidDimension { name: &'static str, value: usize },
    /// Pixel index outside the map (or outside the stored subset).
    PixelOutOfRange { index: usize, npix: usize },
    /// Frequency channel outside `0..nfreqs`.
    FrequencyOutOfRange { ifreq: usize, nfreqs: usize },
    /// An input array does not have the expected shape.
    ShapeMismatch { name: &'static str, expected: Vec<usize>, found: Vec<usize> },

    // ---- Estimation ----
    /// Error raised by the optimizer or Fisher layer.
    Optimization(OptError),
    /// Error raised by the sampler.
    Sampling(SamplerError),
}

impl std::error::Error for SeparationError {}

impl std::fmt::Display for SeparationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeparationError::InvalidNside { nside } => {
                write!(f, "Invalid nside {nside}: must be a positive power of two")
            }
            SeparationError::InvalidDimension { name, value } => {
                write!(f, "Invalid {name} {value}: must be positive")
            }
            SeparationError::PixelOutOfRange { index, npix } => {
                write!(f, "Pixel index {index} out of range for {npix} pixels")
            }
            SeparationError::FrequencyOutOfRange { ifreq, nfreqs } => {
                write!(f, "Frequency index {ifreq} out of range for {nfreqs} channels")
            }
            SeparationError::ShapeMismatch { name, expected, found } => {
                write!(f, "Shape mismatch for {name}: expected {expected:?}, found {found:?}")
            }
            SeparationError::Optimization(err) => write!(f, "{err}"),
            SeparationError::Sampling(err) => write!(f, "{err}"),
        }
    }
}

impl From<OptError> for SeparationError {
    fn from(err: OptError) -> Self {
        SeparationError::Optimization(err)
    }
}

impl From<SamplerError> for SeparationError {
    fn from(err: SamplerError) -> Self {
        SeparationError::Sampling(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<SeparationError> for PyErr {
    fn from(err: SeparationError) -> PyErr {
        PyValueError::new_err(format!("SeparationError: {err}"))
    }
}
