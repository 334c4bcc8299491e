use super::{solve_bracketed, BracketRule, Convergence};
use crate::config::RootFindSettings;
use crate::error::RootFindError;
use crate::traits::ScalarFunction;

/// Regula falsi: the next estimate is where the chord through `(a, f(a))` and
/// `(b, f(b))` crosses zero.
pub fn false_position<F: ScalarFunction + ?Sized>(
    f: &F,
    a: f64,
    b: f64,
    settings: &RootFindSettings,
) -> Result<Convergence, RootFindError> {
    solve_bracketed(f, a, b, settings, BracketRule::RegulaFalsi)
}
