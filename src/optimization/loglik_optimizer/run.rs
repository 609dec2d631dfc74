//! Execution helper that runs an `argmin` solver on a log-likelihood problem and
//! returns a crate-friendly [`MinimizerOutcome`].
//!
//! Two observers can be attached to the executor:
//! - [`CallbackObserver`] forwards the current parameter vector to a user
//!   callback after every iteration. It cannot stop the run.
//! - [`TracingObserver`] emits one `tracing` debug event per iteration when
//!   `MLEOptions::verbose` is set.
use argmin::core::{
    Error, Executor, IterState, KV, Solver, State,
    observers::{Observe, ObserverMode},
};

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        adapter::ArgMinAdapter,
        traits::{LogLikelihood, MinimizerOutcome},
        types::{Cost, Theta},
    },
};

/// Per-iteration callback receiving the current parameter vector.
pub type IterCallback = Box<dyn FnMut(&Theta) + Send>;

/// Observer that hands every iterate to a user callback.
pub struct CallbackObserver {
    callback: IterCallback,
}

impl CallbackObserver {
    pub fn new(callback: IterCallback) -> Self {
        Self { callback }
    }
}

impl<I> Observe<I> for CallbackObserver
where
    I: State<Param = Theta>,
{
    fn observe_iter(&mut self, state: &I, _kv: &KV) -> Result<(), Error> {
        if let Some(param) = state.get_param() {
            (self.callback)(param);
        }
        Ok(())
    }
}

/// Observer that logs solver progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<I> Observe<I> for TracingObserver
where
    I: State<Param = Theta, Float = Cost>,
{
    fn observe_init(&mut self, name: &str, _state: &I, _kv: &KV) -> Result<(), Error> {
        tracing::debug!(solver = name, "minimizer started");
        Ok(())
    }

    fn observe_iter(&mut self, state: &I, _kv: &KV) -> Result<(), Error> {
        tracing::debug!(
            iter = state.get_iter(),
            cost = state.get_cost(),
            best_cost = state.get_best_cost(),
            "minimizer iteration"
        );
        Ok(())
    }
}

/// Run an `argmin` solver for a log-likelihood problem.
///
/// This is the shared runner used by every method. It wires up:
/// - the user model via [`ArgMinAdapter`],
/// - the chosen `Solver` (Powell, Nelder–Mead, or L-BFGS),
/// - the initial parameter `theta0` and the iteration cap,
/// - the optional user callback and `tracing` observers,
///   then executes the solver and converts the final state into a
///   [`MinimizerOutcome`].
///
/// # Type Parameters
/// - `F`: log-likelihood type implementing [`LogLikelihood`].
/// - `S`: any `argmin` solver over `ArgMinAdapter<'a, F>`.
/// - `G`: gradient slot of the solver state: `()` for derivative-free
///   methods, `Grad` for L-BFGS.
///
/// # Errors
/// - Propagates any `argmin` runtime error (objective failures, line-search
///   failures, observer errors) via `From<argmin::core::Error>`.
/// - Propagates validation errors raised while building the outcome.
pub fn run_solver<'a, F, S, G>(
    theta0: Theta, max_iter: usize, verbose: bool, problem: ArgMinAdapter<'a, F>, solver: S,
    callback: Option<IterCallback>,
) -> OptResult<MinimizerOutcome>
where
    F: LogLikelihood,
    G: Clone,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, G, (), (), (), Cost>>,
    IterState<Theta, G, (), (), (), Cost>: State<Param = Theta, Float = Cost>,
{
    let mut optimizer = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).max_iters(max_iter as u64));
    if let Some(callback) = callback {
        optimizer = optimizer.add_observer(CallbackObserver::new(callback), ObserverMode::Always);
    }
    if verbose {
        optimizer = optimizer.add_observer(TracingObserver, ObserverMode::Always);
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    MinimizerOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
    )
}
