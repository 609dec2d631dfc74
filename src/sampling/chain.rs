//! sampling::chain — output of a sampling run.
use ndarray::{Array1, Array2, Axis};

/// One autocorrelation check of a running sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutocorrCheck {
    /// Iteration at which τ was estimated (a multiple of the check interval).
    pub iteration: usize,
    /// Mean of the per-parameter τ estimates.
    pub mean_tau: f64,
}

/// Flattened posterior samples plus convergence diagnostics.
///
/// - `samples`: shape `(n_walkers · (iterations − n_burn), ndim)`; rows are
///   ordered iteration-major, walker-minor.
/// - `autocorr`: every check performed, in order. Empty if the run stopped
///   before the first check.
/// - `iterations`: iterations actually run (≤ `n_samples`).
/// - `converged`: whether the autocorrelation test passed.
/// - `acceptance_fraction`: per walker, the fraction of recorded steps in
///   which it moved (a rejected stretch proposal leaves it in place).
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub samples: Array2<f64>,
    pub autocorr: Vec<AutocorrCheck>,
    pub iterations: usize,
    pub converged: bool,
    pub acceptance_fraction: Array1<f64>,
}

impl Chain {
    pub fn n_retained(&self) -> usize {
        self.samples.nrows()
    }

    pub fn ndim(&self) -> usize {
        self.samples.ncols()
    }

    /// Autocorrelation trace as a `(k, 2)` array of `(iteration, mean τ)`.
    pub fn autocorr_array(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.autocorr.len(), 2));
        for (row, check) in self.autocorr.iter().enumerate() {
            out[[row, 0]] = check.iteration as f64;
            out[[row, 1]] = check.mean_tau;
        }
        out
    }

    /// Posterior mean of every parameter.
    pub fn mean(&self) -> Array1<f64> {
        self.samples.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(self.ndim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The trace array keeps check order and values.
    fn autocorr_array_has_one_row_per_check() {
        let chain = Chain {
            samples: array![[1.0, 2.0], [3.0, 4.0]],
            autocorr: vec![
                AutocorrCheck { iteration: 100, mean_tau: 7.5 },
                AutocorrCheck { iteration: 200, mean_tau: 7.0 },
            ],
            iterations: 200,
            converged: false,
            acceptance_fraction: array![0.4],
        };

        assert_eq!(chain.autocorr_array(), array![[100.0, 7.5], [200.0, 7.0]]);
        assert_eq!(chain.mean(), array![2.0, 3.0]);
        assert_eq!(chain.n_retained(), 2);
    }
}
