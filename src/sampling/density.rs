//! sampling::density — a `LogLikelihood` seen by ganesh as a log-density.
//!
//! The AIES sampler evaluates `nalgebra::DVector` points; [`PosteriorDensity`]
//! copies each point into a [`Theta`], calls the likelihood with the pixel
//! payload, and checks the value before handing it back. `-∞` passes through
//! so proposals outside the support are rejected; `NaN` and `+∞` abort the
//! run with [`SamplerError::InvalidLogProb`].
use ganesh::traits::LogDensity;
use nalgebra::DVector;
use ndarray::Array1;

use crate::{
    optimization::loglik_optimizer::{LogLikelihood, Theta},
    sampling::errors::SamplerError,
};

pub struct PosteriorDensity<'a, F: LogLikelihood> {
    f: &'a F,
    data: &'a F::Data,
}

impl<'a, F: LogLikelihood> PosteriorDensity<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    /// Log-probability of one point, rejecting `NaN` and `+∞`.
    pub fn evaluate(&self, theta: &Theta) -> Result<f64, SamplerError> {
        let value = self.f.value(theta, self.data)?;
        if value.is_nan() || value == f64::INFINITY {
            return Err(SamplerError::InvalidLogProb { value });
        }
        Ok(value)
    }
}

impl<F: LogLikelihood> LogDensity<(), SamplerError> for PosteriorDensity<'_, F> {
    fn log_density(&self, parameters: &DVector<f64>, _args: &()) -> Result<f64, SamplerError> {
        let theta: Theta = Array1::from_iter(parameters.iter().copied());
        self.evaluate(&theta)
    }
}
