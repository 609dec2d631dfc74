//! loglik_optimizer::powell — Powell's conjugate-direction method for argmin.
//!
//! Purpose
//! -------
//! Provide a derivative-free minimizer that plugs into the same `argmin`
//! executor as the other solvers, so spectral likelihoods that are noisy,
//! expensive, or simply not differentiable can still be maximized.
//!
//! Key behaviors
//! -------------
//! - Start from the identity direction set and, every iteration, line-minimize
//!   the cost along each direction in turn with a bracketed Brent search.
//! - After the sweep, try the extrapolated point `2x − x₀`; if Powell's test
//!   allows it, line-minimize along the net displacement and swap it in for
//!   the direction that produced the largest decrease.
//! - Declare convergence when the sweep's relative decrease falls below
//!   `ftol`: `2 (f₀ − f) ≤ ftol (|f₀| + |f|) + 1e-20`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The initial parameter vector is supplied through the executor state.
//! - Costs may be `+∞` (outside the support); comparisons stay well defined
//!   and such points are simply never accepted.
//!
//! Conventions
//! -----------
//! - The Brent line search uses a relative tolerance of `100 · xtol`.
//! - Iteration caps are applied by the executor, not by the solver.
use argmin::core::{
    ArgminError, CostFunction, Error, KV, Problem, Solver, TerminationReason, TerminationStatus,
};
use serde::{Deserialize, Serialize};

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::{Cost, DerivFreeState, Theta},
};

const GOLDEN_RATIO: f64 = 1.618034;
const BRENT_CGOLD: f64 = 0.381_966_0;
const BRENT_MINTOL: f64 = 1.0e-11;
const BRENT_MAX_ITER: usize = 500;
const BRACKET_GROW_LIMIT: f64 = 110.0;
const BRACKET_MAX_ITER: usize = 1000;
const TINY: f64 = 1.0e-21;

/// Powell's direction-set minimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Powell {
    xtol: f64,
    ftol: f64,
    directions: Vec<Theta>,
    converged: bool,
}

impl Powell {
    /// Build a solver with line-search tolerance `xtol` and decrease
    /// tolerance `ftol`.
    ///
    /// # Errors
    /// [`OptError::InvalidTolerance`] if either tolerance is non-finite or
    /// not strictly positive.
    pub fn new(xtol: f64, ftol: f64) -> OptResult<Self> {
        for tol in [xtol, ftol] {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(OptError::InvalidTolerance {
                    tol,
                    reason: "Powell tolerances must be finite and positive.",
                });
            }
        }
        Ok(Self { xtol, ftol, directions: Vec::new(), converged: false })
    }

    pub fn xtol(&self) -> f64 {
        self.xtol
    }

    pub fn ftol(&self) -> f64 {
        self.ftol
    }
}

impl<O> Solver<O, DerivFreeState> for Powell
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    const NAME: &'static str = "Powell";

    fn init(
        &mut self, problem: &mut Problem<O>, mut state: DerivFreeState,
    ) -> Result<(DerivFreeState, Option<KV>), Error> {
        let param = state.take_param().ok_or_else(|| {
            Error::from(ArgminError::NotInitialized {
                text: "Powell requires an initial parameter vector".to_string(),
            })
        })?;
        let n = param.len();
        self.directions = (0..n)
            .map(|i| {
                let mut d = Theta::zeros(n);
                d[i] = 1.0;
                d
            })
            .collect();
        self.converged = false;
        let cost = problem.cost(&param)?;
        Ok((state.param(param).cost(cost), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, mut state: DerivFreeState,
    ) -> Result<(DerivFreeState, Option<KV>), Error> {
        let mut x = state.take_param().ok_or_else(|| {
            Error::from(ArgminError::NotInitialized { text: "Powell lost its iterate".to_string() })
        })?;
        let mut fx = state.get_cost();
        let line_tol = 100.0 * self.xtol;

        let x_start = x.clone();
        let f_start = fx;
        let mut biggest_drop = 0.0;
        let mut biggest_idx = 0;

        for i in 0..self.directions.len() {
            let f_before = fx;
            let (x_new, f_new, _) = line_minimize(problem, &x, &self.directions[i], fx, line_tol)?;
            x = x_new;
            fx = f_new;
            if f_before - fx > biggest_drop {
                biggest_drop = f_before - fx;
                biggest_idx = i;
            }
        }

        self.converged = 2.0 * (f_start - fx) <= self.ftol * (f_start.abs() + fx.abs()) + 1e-20;
        if !self.converged {
            let displacement = &x - &x_start;
            let x_extra = &x + &displacement;
            let f_extra = problem.cost(&x_extra)?;
            if f_start > f_extra {
                let mut t = 2.0 * (f_start + f_extra - 2.0 * fx);
                let tmp = f_start - fx - biggest_drop;
                t *= tmp * tmp;
                let tmp = f_start - f_extra;
                t -= biggest_drop * tmp * tmp;
                if t < 0.0 {
                    let (x_new, f_new, step) =
                        line_minimize(problem, &x, &displacement, fx, line_tol)?;
                    x = x_new;
                    fx = f_new;
                    if step.iter().any(|&s| s != 0.0) {
                        let last = self.directions.len() - 1;
                        self.directions[biggest_idx] = self.directions[last].clone();
                        self.directions[last] = step;
                    }
                }
            }
        }

        Ok((state.param(x).cost(fx), None))
    }

    fn terminate(&mut self, _state: &DerivFreeState) -> TerminationStatus {
        if self.converged {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        } else {
            TerminationStatus::NotTerminated
        }
    }
}

// ---- Line search ----

/// Minimize the cost along `direction` starting from `x` (whose cost is `fx`).
///
/// Returns the new point, its cost, and the step actually taken.
fn line_minimize<O>(
    problem: &mut Problem<O>, x: &Theta, direction: &Theta, fx: Cost, tol: f64,
) -> Result<(Theta, Cost, Theta), Error>
where
    O: CostFunction<Param = Theta, Output = Cost>,
{
    if direction.iter().all(|&d| d == 0.0) {
        return Ok((x.clone(), fx, Theta::zeros(x.len())));
    }
    let mut along = |alpha: f64| -> Result<f64, Error> {
        let point = x + &(direction * alpha);
        problem.cost(&point)
    };
    let bracket = bracket(&mut along, 0.0, 1.0, fx)?;
    let (alpha, f_alpha) = brent(&mut along, &bracket, tol)?;
    if f_alpha > fx {
        // Brent never returns a worse point than the bracket middle, but the
        // middle can be worse than the start when the cost is flat or infinite.
        return Ok((x.clone(), fx, Theta::zeros(x.len())));
    }
    let step = direction * alpha;
    Ok((x + &step, f_alpha, step))
}

/// Three abscissae with `f(b) <= f(a)` and `f(b) <= f(c)` (when the search
/// succeeds), plus their values.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    a: f64,
    b: f64,
    c: f64,
    fb: f64,
}

/// Expand `(xa, xb)` downhill with golden-section steps and parabolic
/// extrapolation until the minimum is bracketed.
fn bracket<G>(g: &mut G, xa: f64, xb: f64, fa: f64) -> Result<Bracket, Error>
where
    G: FnMut(f64) -> Result<f64, Error>,
{
    // (abscissa, value) for a, b, c; shifted left as the bracket expands.
    let mut a = (xa, fa);
    let mut b = (xb, g(xb)?);
    if a.1 < b.1 {
        std::mem::swap(&mut a, &mut b);
    }
    let xc = b.0 + GOLDEN_RATIO * (b.0 - a.0);
    let mut c = (xc, g(xc)?);
    let mut iter = 0;
    while c.1 < b.1 {
        let tmp1 = (b.0 - a.0) * (b.1 - c.1);
        let tmp2 = (b.0 - c.0) * (b.1 - a.1);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < TINY { 2.0 * TINY } else { 2.0 * val };
        let w = b.0 - ((b.0 - c.0) * tmp2 - (b.0 - a.0) * tmp1) / denom;
        let wlim = b.0 + BRACKET_GROW_LIMIT * (c.0 - b.0);
        if iter > BRACKET_MAX_ITER {
            // Unbounded descent along this line; settle for the best triple.
            break;
        }
        iter += 1;
        let next = if (w - c.0) * (b.0 - w) > 0.0 {
            let fw = g(w)?;
            if fw < c.1 {
                return Ok(Bracket { a: b.0, b: w, c: c.0, fb: fw });
            } else if fw > b.1 {
                return Ok(Bracket { a: a.0, b: b.0, c: w, fb: b.1 });
            }
            let u = c.0 + GOLDEN_RATIO * (c.0 - b.0);
            (u, g(u)?)
        } else if (w - wlim) * (wlim - c.0) >= 0.0 {
            (wlim, g(wlim)?)
        } else if (w - wlim) * (c.0 - w) > 0.0 {
            let fw = g(w)?;
            if fw < c.1 {
                b = c;
                c = (w, fw);
                let u = c.0 + GOLDEN_RATIO * (c.0 - b.0);
                (u, g(u)?)
            } else {
                (w, fw)
            }
        } else {
            let u = c.0 + GOLDEN_RATIO * (c.0 - b.0);
            (u, g(u)?)
        };
        a = b;
        b = c;
        c = next;
    }
    Ok(Bracket { a: a.0, b: b.0, c: c.0, fb: b.1 })
}

/// Brent's parabolic-interpolation / golden-section minimizer on a bracket.
fn brent<G>(g: &mut G, bracket: &Bracket, tol: f64) -> Result<(f64, f64), Error>
where
    G: FnMut(f64) -> Result<f64, Error>,
{
    let (mut a, mut b) =
        if bracket.a < bracket.c { (bracket.a, bracket.c) } else { (bracket.c, bracket.a) };
    let (mut x, mut w, mut v) = (bracket.b, bracket.b, bracket.b);
    let (mut fx, mut fw, mut fv) = (bracket.fb, bracket.fb, bracket.fb);
    let mut deltax: f64 = 0.0;
    let mut rat: f64 = 0.0;

    for _ in 0..BRENT_MAX_ITER {
        let tol1 = tol * x.abs() + BRENT_MINTOL;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);
        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            break;
        }
        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = BRENT_CGOLD * deltax;
        } else {
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let dx_temp = deltax;
            deltax = rat;
            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * dx_temp).abs() {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = BRENT_CGOLD * deltax;
            }
        }
        let u = if rat.abs() < tol1 {
            if rat >= 0.0 { x + tol1 } else { x - tol1 }
        } else {
            x + rat
        };
        let fu = g(u)?;
        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
    }
    Ok((x, fx))
}
