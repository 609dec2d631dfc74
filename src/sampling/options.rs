//! sampling::options — configuration of an ensemble sampling run.
//!
//! Defaults follow common practice for spectral-parameter posteriors:
//! 200 walkers, 200 iterations of which 50 are burn-in, and a convergence
//! test requiring the chain to be 50 autocorrelation times long with τ
//! stable to 1 %.
use crate::sampling::errors::{SamplerError, SamplerResult};

pub const DEFAULT_N_WALKERS: usize = 200;
pub const DEFAULT_N_SAMPLES: usize = 200;
pub const DEFAULT_N_BURN: usize = 50;
pub const DEFAULT_CONVERGENCE_FACTOR: f64 = 50.0;
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 0.01;
pub const DEFAULT_STRETCH_SCALE: f64 = 2.0;

/// Iterations between two autocorrelation checks.
pub const CHECK_INTERVAL: usize = 100;

/// Proposal settings for the stretch move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOptions {
    /// Scale `a` of the stretch distribution `g(z) ∝ 1/√z` on `[1/a, a]`.
    pub stretch_scale: f64,
}

impl MoveOptions {
    /// # Errors
    /// [`SamplerError::InvalidStretchScale`] unless `stretch_scale` is finite
    /// and greater than one.
    pub fn new(stretch_scale: f64) -> SamplerResult<Self> {
        if !stretch_scale.is_finite() || stretch_scale <= 1.0 {
            return Err(SamplerError::InvalidStretchScale { scale: stretch_scale });
        }
        Ok(Self { stretch_scale })
    }
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self { stretch_scale: DEFAULT_STRETCH_SCALE }
    }
}

/// Configuration for [`sample`](crate::sampling::sample).
///
/// - `n_walkers`: ensemble size; must also be at least `2 · ndim` when the
///   run starts.
/// - `n_samples`: maximum number of iterations.
/// - `n_burn`: leading iterations discarded from every walker.
/// - `convergence_factor`: converged only if `τ · factor < iteration` for
///   every parameter.
/// - `convergence_tolerance`: converged only if τ changed by less than this
///   relative amount since the previous check.
/// - `moves`: stretch-move settings.
/// - `seed`: RNG seed used when the sampler creates its own generator
///   (pixel drivers and bindings); `None` draws from OS entropy.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerOptions {
    pub n_walkers: usize,
    pub n_samples: usize,
    pub n_burn: usize,
    pub convergence_factor: f64,
    pub convergence_tolerance: f64,
    pub moves: MoveOptions,
    pub seed: Option<u64>,
}

impl SamplerOptions {
    /// Create validated sampler options.
    ///
    /// # Errors
    /// - [`SamplerError::InvalidWalkers`] if `n_walkers < 2`.
    /// - [`SamplerError::InvalidSamples`] if `n_samples == 0`.
    /// - [`SamplerError::InvalidBurnIn`] if `n_burn >= n_samples`.
    /// - [`SamplerError::InvalidConvergence`] for a non-finite or
    ///   non-positive factor or tolerance.
    pub fn new(
        n_walkers: usize, n_samples: usize, n_burn: usize, convergence_factor: f64,
        convergence_tolerance: f64, moves: MoveOptions, seed: Option<u64>,
    ) -> SamplerResult<Self> {
        let opts = Self {
            n_walkers,
            n_samples,
            n_burn,
            convergence_factor,
            convergence_tolerance,
            moves,
            seed,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check every constraint enforced by [`SamplerOptions::new`].
    ///
    /// Fields are public, so `sample` calls this again before running.
    pub fn validate(&self) -> SamplerResult<()> {
        if self.n_walkers < 2 {
            return Err(SamplerError::InvalidWalkers { n_walkers: self.n_walkers });
        }
        if self.n_samples == 0 {
            return Err(SamplerError::InvalidSamples { n_samples: self.n_samples });
        }
        if self.n_burn >= self.n_samples {
            return Err(SamplerError::InvalidBurnIn {
                n_burn: self.n_burn,
                n_samples: self.n_samples,
            });
        }
        for (name, value) in [
            ("factor", self.convergence_factor),
            ("tolerance", self.convergence_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SamplerError::InvalidConvergence { name, value });
            }
        }
        MoveOptions::new(self.moves.stretch_scale)?;
        Ok(())
    }

    /// Same options with a different seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            n_walkers: DEFAULT_N_WALKERS,
            n_samples: DEFAULT_N_SAMPLES,
            n_burn: DEFAULT_N_BURN,
            convergence_factor: DEFAULT_CONVERGENCE_FACTOR,
            convergence_tolerance: DEFAULT_CONVERGENCE_TOLERANCE,
            moves: MoveOptions::default(),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Defaults.
    // - Each validation rule in `SamplerOptions::new` and `MoveOptions::new`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Defaults are valid and match the documented values.
    fn defaults_are_valid() {
        let opts = SamplerOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!((opts.n_walkers, opts.n_samples, opts.n_burn), (200, 200, 50));
        assert_eq!(opts.moves.stretch_scale, 2.0);
    }

    #[test]
    // Purpose
    // -------
    // Every invalid field is rejected with its own variant.
    //
    // Given
    // -----
    // - One invalid field at a time.
    //
    // Expect
    // ------
    // - The matching `SamplerError` variant.
    fn new_rejects_each_invalid_field() {
        let mv = MoveOptions::default();
        assert_eq!(
            SamplerOptions::new(1, 10, 0, 50.0, 0.01, mv, None),
            Err(SamplerError::InvalidWalkers { n_walkers: 1 })
        );
        assert_eq!(
            SamplerOptions::new(10, 0, 0, 50.0, 0.01, mv, None),
            Err(SamplerError::InvalidSamples { n_samples: 0 })
        );
        assert_eq!(
            SamplerOptions::new(10, 50, 50, 50.0, 0.01, mv, None),
            Err(SamplerError::InvalidBurnIn { n_burn: 50, n_samples: 50 })
        );
        assert!(matches!(
            SamplerOptions::new(10, 50, 0, f64::NAN, 0.01, mv, None),
            Err(SamplerError::InvalidConvergence { name: "factor", .. })
        ));
        assert!(matches!(
            SamplerOptions::new(10, 50, 0, 50.0, 0.0, mv, None),
            Err(SamplerError::InvalidConvergence { name: "tolerance", .. })
        ));
        assert_eq!(MoveOptions::new(1.0), Err(SamplerError::InvalidStretchScale { scale: 1.0 }));
    }
}
