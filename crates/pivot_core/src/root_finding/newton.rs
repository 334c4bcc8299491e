use super::{evaluate, Convergence, IterationStep};
use crate::config::{RootFindSettings, RootMethod};
use crate::error::RootFindError;
use crate::traits::ScalarFunction;
use log::{debug, trace};

/// Below this magnitude the derivative is treated as zero.
pub const DERIVATIVE_EPSILON: f64 = 1e-12;

/// `(f(x + h) - f(x - h)) / 2h`.
pub fn central_difference<F: ScalarFunction + ?Sized>(
    f: &F,
    x: f64,
    h: f64,
) -> Result<f64, RootFindError> {
    let forward = evaluate(f, x + h)?;
    let backward = evaluate(f, x - h)?;
    Ok((forward - backward) / (2.0 * h))
}

/// Newton-Raphson with a numerical derivative of step `settings.derivative_step`.
pub fn newton_raphson<F: ScalarFunction + ?Sized>(
    f: &F,
    x0: f64,
    settings: &RootFindSettings,
) -> Result<Convergence, RootFindError> {
    settings.validate()?;
    if !x0.is_finite() {
        return Err(RootFindError::InvalidSeeds(format!(
            "the initial guess must be finite, got {x0}"
        )));
    }

    let mut x = x0;
    let mut fx = evaluate(f, x)?;
    debug!("NewtonRaphson from x0 = {x0}, f(x0) = {fx}");
    if fx.abs() < settings.tolerance {
        return Ok(Convergence {
            method: RootMethod::NewtonRaphson,
            root: x,
            residual: fx.abs(),
            iterations: Vec::new(),
        });
    }

    let mut iterations = Vec::new();
    for iteration in 1..=settings.max_iterations {
        let dfx = central_difference(f, x, settings.derivative_step)?;
        if dfx.abs() < DERIVATIVE_EPSILON {
            debug!("NewtonRaphson: f'({x}) = {dfx} is too close to zero");
            return Err(RootFindError::DerivativeNearZero {
                x,
                derivative: dfx,
                iterations,
            });
        }

        let next = x - fx / dfx;
        let f_next = evaluate(f, next)?;
        let error = (next - x).abs();
        trace!("NewtonRaphson #{iteration}: x = {x}, f(x) = {fx}, f'(x) = {dfx} -> {next}");
        iterations.push(IterationStep::Newton {
            iteration,
            x,
            fx,
            dfx,
            next,
            error,
        });

        if f_next.abs() < settings.tolerance || error < settings.tolerance {
            debug!("NewtonRaphson converged to {next} after {iteration} iterations");
            return Ok(Convergence {
                method: RootMethod::NewtonRaphson,
                root: next,
                residual: f_next.abs(),
                iterations,
            });
        }
        x = next;
        fx = f_next;
    }

    Err(RootFindError::NoConvergence {
        max_iterations: settings.max_iterations,
        last: Some(x),
        iterations,
    })
}
