//! sampling::convergence — autocorrelation-based stopping rule for AIES.
//!
//! Purpose
//! -------
//! Decide, while ganesh advances the ensemble, whether the chain is long
//! enough compared with its integrated autocorrelation time, and cap the run
//! at `n_samples` iterations.
//!
//! Key behaviors
//! -------------
//! - [`ConvergenceMonitor`] counts iterations. At every multiple of
//!   [`CHECK_INTERVAL`] it estimates τ per parameter with ganesh's
//!   `integrated_autocorrelation_times`, records `(iteration, mean τ)`, logs
//!   the check at `info` level, and applies the convergence test.
//! - [`ConvergenceTerminator`] is the ganesh [`Terminator`] that feeds the
//!   monitor and returns `ControlFlow::Break` once it converged or reached
//!   the iteration cap.
//!
//! Invariants & assumptions
//! ------------------------
//! - Convergence at iteration `it` requires `τ_d · factor < it` and
//!   `|τ_old,d − τ_d| / τ_d < tolerance` for every parameter `d`. `τ_old`
//!   starts at `+∞`, so at least two checks are needed.
//! - A `NaN` τ (constant chain) fails both comparisons and never converges.
//! - The monitor is shared through `Arc<Mutex<_>>` so the caller can read the
//!   trace after ganesh consumed the terminator.
use std::{
    ops::ControlFlow,
    sync::{Arc, Mutex, MutexGuard},
};

use ganesh::{
    algorithms::mcmc::{EnsembleStatus, integrated_autocorrelation_times},
    traits::{Algorithm, Terminator},
};
use nalgebra::DVector;

use crate::sampling::{
    chain::AutocorrCheck,
    errors::SamplerError,
    options::{CHECK_INTERVAL, SamplerOptions},
};

/// Sokal window constant for the automated τ window.
pub const AUTOCORR_WINDOW: f64 = 5.0;

/// Iteration count, autocorrelation trace and convergence flag of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceMonitor {
    n_samples: usize,
    factor: f64,
    tolerance: f64,
    tau_old: Option<Vec<f64>>,
    pub iterations: usize,
    pub converged: bool,
    pub trace: Vec<AutocorrCheck>,
}

impl ConvergenceMonitor {
    pub fn new(opts: &SamplerOptions) -> Self {
        Self {
            n_samples: opts.n_samples,
            factor: opts.convergence_factor,
            tolerance: opts.convergence_tolerance,
            tau_old: None,
            iterations: 0,
            converged: false,
            trace: Vec::new(),
        }
    }

    /// Record one completed iteration; `chain` is called only on check
    /// iterations and returns the walker histories `(walkers, steps)`.
    ///
    /// Returns `ControlFlow::Break` once the run must stop.
    pub fn record<C>(&mut self, chain: C) -> ControlFlow<()>
    where
        C: FnOnce() -> Vec<Vec<DVector<f64>>>,
    {
        self.iterations += 1;
        let iteration = self.iterations;
        if iteration % CHECK_INTERVAL == 0 {
            let tau = integrated_autocorrelation_times(chain(), Some(AUTOCORR_WINDOW));
            let tau: Vec<f64> = tau.iter().copied().collect();
            if self.check(iteration, tau) {
                self.converged = true;
                return ControlFlow::Break(());
            }
        }
        if iteration >= self.n_samples {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    /// Apply the convergence test to the τ estimated at `iteration`.
    pub fn check(&mut self, iteration: usize, tau: Vec<f64>) -> bool {
        let mean_tau = tau.iter().sum::<f64>() / tau.len() as f64;
        self.trace.push(AutocorrCheck { iteration, mean_tau });
        tracing::info!(iteration, mean_tau, "sample: autocorrelation check");

        let long_enough = tau.iter().all(|&t| t * self.factor < iteration as f64);
        let stable = match &self.tau_old {
            Some(old) => {
                tau.iter().zip(old.iter()).all(|(&t, &t_old)| (t_old - t).abs() / t < self.tolerance)
            }
            None => false,
        };
        self.tau_old = Some(tau);
        long_enough && stable
    }
}

/// Handle passed to ganesh; the caller keeps a clone of the same monitor.
#[derive(Debug, Clone)]
pub struct ConvergenceTerminator(pub Arc<Mutex<ConvergenceMonitor>>);

impl ConvergenceTerminator {
    pub fn new(opts: &SamplerOptions) -> Self {
        Self(Arc::new(Mutex::new(ConvergenceMonitor::new(opts))))
    }

    pub fn lock(&self) -> MutexGuard<'_, ConvergenceMonitor> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<A, P, C> Terminator<A, P, EnsembleStatus, (), SamplerError, C> for ConvergenceTerminator
where
    A: Algorithm<P, EnsembleStatus, (), SamplerError, Config = C>,
{
    fn check_for_termination(
        &mut self,
        _current_step: usize,
        _algorithm: &mut A,
        _problem: &P,
        status: &mut EnsembleStatus,
        _args: &(),
        _config: &C,
    ) -> ControlFlow<()> {
        self.lock().record(|| status.get_chain(None, None))
    }
}
