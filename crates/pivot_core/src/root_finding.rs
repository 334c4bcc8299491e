//! Iterative root finders for `f(x) = 0` over `f64`.
//!
//! Every method validates its settings, records one [`IterationStep`] per
//! iteration and either converges or fails with the iterations performed so
//! far. Running out of iterations is a failure, never a best-effort answer.

pub mod bisection;
pub mod false_position;
pub mod newton;
pub mod secant;

pub use bisection::bisection;
pub use false_position::false_position;
pub use newton::newton_raphson;
pub use secant::secant;

use crate::config::{RootFindSettings, RootMethod, ScanSettings};
use crate::error::RootFindError;
use crate::scan::{find_bracket, suggest_secant_seeds, ROOT_EPSILON};
use crate::traits::ScalarFunction;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// One iteration of a root finder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IterationStep {
    /// Bisection and false position. `c` is the new estimate inside `[a, b]`.
    /// Bisection reports the half-width of `[a, b]` as `error`; false position
    /// reports `|c - c_prev|`, which is unknown on the first iteration. It is
    /// informational only: false position stops on `|f(c)|` or the bracket width.
    Bracket {
        iteration: usize,
        a: f64,
        b: f64,
        c: f64,
        fa: f64,
        fb: f64,
        fc: f64,
        error: Option<f64>,
    },
    Newton {
        iteration: usize,
        x: f64,
        fx: f64,
        dfx: f64,
        next: f64,
        error: f64,
    },
    Secant {
        iteration: usize,
        x_prev: f64,
        x: f64,
        f_prev: f64,
        fx: f64,
        next: f64,
        error: f64,
    },
}

impl IterationStep {
    pub fn iteration(&self) -> usize {
        match self {
            IterationStep::Bracket { iteration, .. }
            | IterationStep::Newton { iteration, .. }
            | IterationStep::Secant { iteration, .. } => *iteration,
        }
    }

    /// The estimate produced by this iteration.
    pub fn estimate(&self) -> f64 {
        match self {
            IterationStep::Bracket { c, .. } => *c,
            IterationStep::Newton { next, .. } | IterationStep::Secant { next, .. } => *next,
        }
    }

    pub fn error(&self) -> Option<f64> {
        match self {
            IterationStep::Bracket { error, .. } => *error,
            IterationStep::Newton { error, .. } | IterationStep::Secant { error, .. } => {
                Some(*error)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Convergence {
    pub method: RootMethod,
    pub root: f64,
    /// `|f(root)|`.
    pub residual: f64,
    pub iterations: Vec<IterationStep>,
}

impl Convergence {
    pub fn iteration_count(&self) -> usize {
        self.iterations.len()
    }
}

/// Starting values, shaped by method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Seeds {
    /// Bisection and false position.
    Bracket { a: f64, b: f64 },
    /// Newton-Raphson.
    Single { x0: f64 },
    /// Secant.
    Pair { x0: f64, x1: f64 },
}

/// Seeds chosen by [`auto_find_root`] together with the run they started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoRoot {
    pub seeds: Seeds,
    pub convergence: Convergence,
}

pub fn find_root<F: ScalarFunction + ?Sized>(
    f: &F,
    method: RootMethod,
    seeds: Seeds,
    settings: &RootFindSettings,
) -> Result<Convergence, RootFindError> {
    match (method, seeds) {
        (RootMethod::Bisection, Seeds::Bracket { a, b }) => bisection(f, a, b, settings),
        (RootMethod::FalsePosition, Seeds::Bracket { a, b }) => false_position(f, a, b, settings),
        (RootMethod::NewtonRaphson, Seeds::Single { x0 }) => newton_raphson(f, x0, settings),
        (RootMethod::Secant, Seeds::Pair { x0, x1 }) => secant(f, x0, x1, settings),
        (method, seeds) => Err(RootFindError::InvalidSeeds(format!(
            "{method:?} cannot start from {seeds:?}"
        ))),
    }
}

/// Scans for seeds and runs `method` from them.
///
/// Bracketing methods start from the first sign change (or a pair touching a
/// sampled root). Newton starts from that bracket's midpoint, or from the
/// sampled root itself. Secant starts from [`suggest_secant_seeds`].
pub fn auto_find_root<F: ScalarFunction + ?Sized>(
    f: &F,
    method: RootMethod,
    scan: &ScanSettings,
    settings: &RootFindSettings,
) -> Result<AutoRoot, RootFindError> {
    settings.validate()?;
    let seeds = match method {
        RootMethod::Bisection | RootMethod::FalsePosition => {
            let (a, b) = find_bracket(f, scan)?.ok_or(RootFindError::NoBracketFound)?;
            Seeds::Bracket { a, b }
        }
        RootMethod::NewtonRaphson => {
            let (a, b) = find_bracket(f, scan)?.ok_or(RootFindError::NoBracketFound)?;
            let x0 = if f.evaluate(a).abs() < ROOT_EPSILON {
                a
            } else if f.evaluate(b).abs() < ROOT_EPSILON {
                b
            } else {
                a + (b - a) / 2.0
            };
            Seeds::Single { x0 }
        }
        RootMethod::Secant => {
            let (x0, x1) = suggest_secant_seeds(f, scan)?.ok_or(RootFindError::NoBracketFound)?;
            Seeds::Pair { x0, x1 }
        }
    };
    debug!("auto seeds for {method:?}: {seeds:?}");
    let convergence = find_root(f, method, seeds, settings)?;
    Ok(AutoRoot { seeds, convergence })
}

pub(crate) fn evaluate<F: ScalarFunction + ?Sized>(f: &F, x: f64) -> Result<f64, RootFindError> {
    let fx = f.evaluate(x);
    if fx.is_finite() {
        Ok(fx)
    } else {
        Err(RootFindError::NonFiniteValue { x })
    }
}

/// How a bracketing method places its next estimate inside `[a, b]`.
#[derive(Clone, Copy)]
pub(crate) enum BracketRule {
    Midpoint,
    RegulaFalsi,
}

impl BracketRule {
    fn method(self) -> RootMethod {
        match self {
            BracketRule::Midpoint => RootMethod::Bisection,
            BracketRule::RegulaFalsi => RootMethod::FalsePosition,
        }
    }

    fn next(self, a: f64, b: f64, fa: f64, fb: f64) -> f64 {
        match self {
            BracketRule::Midpoint => a + (b - a) / 2.0,
            BracketRule::RegulaFalsi => (a * fb - b * fa) / (fb - fa),
        }
    }
}

/// Shared loop of bisection and false position.
pub(crate) fn solve_bracketed<F: ScalarFunction + ?Sized>(
    f: &F,
    a: f64,
    b: f64,
    settings: &RootFindSettings,
    rule: BracketRule,
) -> Result<Convergence, RootFindError> {
    settings.validate()?;
    let method = rule.method();
    if !(a.is_finite() && b.is_finite()) || a == b {
        return Err(RootFindError::InvalidSeeds(format!(
            "a bracket needs two distinct finite endpoints, got [{a}, {b}]"
        )));
    }
    let (mut a, mut b) = if a < b { (a, b) } else { (b, a) };
    let mut fa = evaluate(f, a)?;
    let mut fb = evaluate(f, b)?;
    debug!("{method:?} on [{a}, {b}] with f(a) = {fa}, f(b) = {fb}");

    for (x, fx) in [(a, fa), (b, fb)] {
        if fx.abs() < settings.tolerance {
            debug!("{method:?}: endpoint {x} is already a root");
            return Ok(Convergence {
                method,
                root: x,
                residual: fx.abs(),
                iterations: Vec::new(),
            });
        }
    }
    if (fa < 0.0) == (fb < 0.0) {
        return Err(RootFindError::NoSignChange { a, b, fa, fb });
    }

    let mut iterations = Vec::new();
    let mut previous: Option<f64> = None;
    for iteration in 1..=settings.max_iterations {
        let c = rule.next(a, b, fa, fb);
        let fc = evaluate(f, c)?;
        let error = match rule {
            BracketRule::Midpoint => Some((b - a) / 2.0),
            BracketRule::RegulaFalsi => previous.map(|p| (c - p).abs()),
        };
        trace!("{method:?} #{iteration}: [{a}, {b}] -> c = {c}, f(c) = {fc}");
        iterations.push(IterationStep::Bracket {
            iteration,
            a,
            b,
            c,
            fa,
            fb,
            fc,
            error,
        });

        // Regula falsi steps shrink while one endpoint stays fixed; they do not bound the error.
        let narrow = match rule {
            BracketRule::Midpoint => error.is_some_and(|e| e < settings.tolerance),
            BracketRule::RegulaFalsi => b - a < settings.tolerance,
        };
        if fc.abs() < settings.tolerance || narrow {
            debug!("{method:?} converged to {c} after {iteration} iterations");
            return Ok(Convergence {
                method,
                root: c,
                residual: fc.abs(),
                iterations,
            });
        }

        if (fa < 0.0) == (fc < 0.0) {
            a = c;
            fa = fc;
        } else {
            b = c;
            fb = fc;
        }
        previous = Some(c);
    }

    debug!("{method:?} did not converge in {} iterations", settings.max_iterations);
    Err(RootFindError::NoConvergence {
        max_iterations: settings.max_iterations,
        last: previous,
        iterations,
    })
}
