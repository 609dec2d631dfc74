//! separation::maplike — likelihood objects the pixel driver works with.
use crate::optimization::loglik_optimizer::{LogLikelihood, Theta};

/// A per-pixel spectral likelihood with a prior-mean starting point.
///
/// `Data` (from [`LogLikelihood`]) is the payload of one pixel, typically a
/// [`PixelData`](crate::separation::maps::PixelData). The driver never
/// inspects it; it only forwards it to `value`.
pub trait MapLike: LogLikelihood {
    /// Prior mean of the spectral parameters, used as the initial guess for
    /// every pixel.
    fn var_prior_mean(&self) -> Theta;
}
