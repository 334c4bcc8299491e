use super::{evaluate, Convergence, IterationStep};
use crate::config::{RootFindSettings, RootMethod};
use crate::error::RootFindError;
use crate::traits::ScalarFunction;
use log::{debug, trace};

/// Below this magnitude `f(x_prev) - f(x)` is treated as zero.
pub const DENOMINATOR_EPSILON: f64 = 1e-14;

/// Secant method from two distinct seeds. No bracket is required.
pub fn secant<F: ScalarFunction + ?Sized>(
    f: &F,
    x0: f64,
    x1: f64,
    settings: &RootFindSettings,
) -> Result<Convergence, RootFindError> {
    settings.validate()?;
    if !(x0.is_finite() && x1.is_finite()) || x0 == x1 {
        return Err(RootFindError::InvalidSeeds(format!(
            "the secant method needs two distinct finite seeds, got {x0} and {x1}"
        )));
    }

    let (mut x_prev, mut x) = (x0, x1);
    let mut f_prev = evaluate(f, x_prev)?;
    let mut fx = evaluate(f, x)?;
    debug!("Secant from x0 = {x0}, x1 = {x1}");
    for (seed, value) in [(x, fx), (x_prev, f_prev)] {
        if value.abs() < settings.tolerance {
            return Ok(Convergence {
                method: RootMethod::Secant,
                root: seed,
                residual: value.abs(),
                iterations: Vec::new(),
            });
        }
    }

    let mut iterations = Vec::new();
    for iteration in 1..=settings.max_iterations {
        let denominator = f_prev - fx;
        if denominator.abs() < DENOMINATOR_EPSILON {
            debug!("Secant: f({x_prev}) - f({x}) = {denominator} is too close to zero");
            return Err(RootFindError::ZeroDenominator {
                x_prev,
                x,
                iterations,
            });
        }

        let next = x - fx * (x_prev - x) / denominator;
        let f_next = evaluate(f, next)?;
        let error = (next - x).abs();
        trace!("Secant #{iteration}: x_prev = {x_prev}, x = {x} -> {next}");
        iterations.push(IterationStep::Secant {
            iteration,
            x_prev,
            x,
            f_prev,
            fx,
            next,
            error,
        });

        if f_next.abs() < settings.tolerance || error < settings.tolerance {
            debug!("Secant converged to {next} after {iteration} iterations");
            return Ok(Convergence {
                method: RootMethod::Secant,
                root: next,
                residual: f_next.abs(),
                iterations,
            });
        }
        x_prev = x;
        f_prev = fx;
        x = next;
        fx = f_next;
    }

    Err(RootFindError::NoConvergence {
        max_iterations: settings.max_iterations,
        last: Some(x),
        iterations,
    })
}
