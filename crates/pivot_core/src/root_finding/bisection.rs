use super::{solve_bracketed, BracketRule, Convergence};
use crate::config::RootFindSettings;
use crate::error::RootFindError;
use crate::traits::ScalarFunction;

/// Halves `[a, b]` until `|f(c)|` or the half-width drops below the tolerance.
/// Requires `f(a)` and `f(b)` to have opposite signs.
pub fn bisection<F: ScalarFunction + ?Sized>(
    f: &F,
    a: f64,
    b: f64,
    settings: &RootFindSettings,
) -> Result<Convergence, RootFindError> {
    solve_bracketed(f, a, b, settings, BracketRule::Midpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RootMethod;
    use crate::root_finding::IterationStep;

    #[test]
    fn square_root_of_two() {
        let f = |x: f64| x * x - 2.0;
        let result = bisection(&f, 1.0, 2.0, &RootFindSettings::default()).unwrap();
        assert_eq!(result.method, RootMethod::Bisection);
        assert!((result.root - 1.41421).abs() < 1e-5);
        assert!(result.residual < 1e-5);

        let IterationStep::Bracket { c, error, .. } = result.iterations[0] else {
            panic!("expected bracket steps");
        };
        assert_eq!(c, 1.5);
        assert_eq!(error, Some(0.5));
    }

    #[test]
    fn halves_the_bracket_every_iteration() {
        let f = |x: f64| x * x - 2.0;
        let result = bisection(&f, 1.0, 2.0, &RootFindSettings::default()).unwrap();
        let widths: Vec<f64> = result
            .iterations
            .iter()
            .filter_map(IterationStep::error)
            .collect();
        for pair in widths.windows(2) {
            assert_eq!(pair[1], pair[0] / 2.0);
        }
    }

    #[test]
    fn reversed_endpoints_are_ordered() {
        let f = |x: f64| x - 0.25;
        let result = bisection(&f, 1.0, 0.0, &RootFindSettings::default()).unwrap();
        assert!((result.root - 0.25).abs() < 1e-6);
    }

    #[test]
    fn same_sign_endpoints_are_rejected() {
        let f = |x: f64| x * x + 1.0;
        let err = bisection(&f, -1.0, 1.0, &RootFindSettings::default()).unwrap_err();
        assert_eq!(
            err,
            RootFindError::NoSignChange {
                a: -1.0,
                b: 1.0,
                fa: 2.0,
                fb: 2.0
            }
        );
    }

    #[test]
    fn endpoint_root_converges_without_iterating() {
        let f = |x: f64| x - 1.0;
        let result = bisection(&f, 1.0, 3.0, &RootFindSettings::default()).unwrap();
        assert_eq!(result.root, 1.0);
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn exhausted_budget_is_a_failure() {
        let f = |x: f64| x * x - 2.0;
        let settings = RootFindSettings {
            max_iterations: 3,
            ..RootFindSettings::default()
        };
        let err = bisection(&f, 1.0, 2.0, &settings).unwrap_err();
        let RootFindError::NoConvergence {
            max_iterations,
            last,
            iterations,
        } = err
        else {
            panic!("expected NoConvergence");
        };
        assert_eq!(max_iterations, 3);
        assert_eq!(iterations.len(), 3);
        assert_eq!(last, Some(1.375));
    }
}
