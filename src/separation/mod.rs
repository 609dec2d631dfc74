//! separation — per-pixel component separation on multi-frequency maps.
//!
//! Purpose
//! -------
//! Drive the estimators of `optimization`, `inference` and `sampling` over
//! the pixels of a sky map: each pixel is an independent estimation problem
//! whose data is the vector of map values and noise variances across
//! frequencies.
//!
//! Key behaviors
//! -------------
//! - [`MapLike`] is the likelihood contract: a [`LogLikelihood`] plus the
//!   prior mean used as the starting point.
//! - [`Estimator`] abstracts "how to estimate a pixel"; [`Strategy`] selects
//!   one at runtime and returns a [`PixelOutcome`].
//! - [`clean_pixel`] / [`clean_pixels`] run an estimator on one pixel or on
//!   a batch.
//! - [`SkyMaps`] stores the maps in memory and slices masked pixels into
//!   [`PixelData`] payloads.
//!
//! Conventions
//! -----------
//! - Maps are `(npol, npix, nfreqs)`; a pixel payload is `(npol, nfreqs)`.
//! - Errors are [`SeparationError`], wrapping optimizer and sampler errors.
//!
//! [`LogLikelihood`]: crate::optimization::loglik_optimizer::LogLikelihood

pub mod driver;
pub mod errors;
pub mod maplike;
pub mod maps;
pub mod strategy;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::driver::{clean_pixel, clean_pixels};
pub use self::errors::{SeparationError, SeparationResult};
pub use self::maplike::MapLike;
pub use self::maps::{MaskedMaps, PixelData, SkyMaps, nside_to_npix};
pub use self::strategy::{Estimator, PixelOutcome, Strategy};

pub mod prelude {
    pub use super::driver::{clean_pixel, clean_pixels};
    pub use super::errors::{SeparationError, SeparationResult};
    pub use super::maplike::MapLike;
    pub use super::maps::{PixelData, SkyMaps};
    pub use super::strategy::{Estimator, PixelOutcome, Strategy};
}
