//! Property-based tests for the root finders
//!
//! Every method is run on `t + t^3 / 4` with `t = x - r`, which is strictly
//! increasing with its only root at `r`. Bracketing methods must agree with
//! each other and with Newton and secant within twice the tolerance.

use pivot_core::config::{RootFindSettings, RootMethod, ScanSettings};
use pivot_core::root_finding::{
    auto_find_root, bisection, false_position, newton_raphson, secant,
};
use pivot_core::scan::scan;
use proptest::prelude::*;

fn shifted_cubic(r: f64) -> impl Fn(f64) -> f64 {
    move |x| {
        let t = x - r;
        t + t * t * t / 4.0
    }
}

proptest! {
    /// Test that all four methods land on the same root
    #[test]
    fn methods_agree_within_twice_the_tolerance(
        r in -5.0f64..5.0,
        left in 0.1f64..1.5,
        right in 0.1f64..1.5,
    ) {
        let f = shifted_cubic(r);
        let settings = RootFindSettings::default();
        let (a, b) = (r - left, r + right);

        let by_bisection = bisection(&f, a, b, &settings).unwrap().root;
        let by_false_position = false_position(&f, a, b, &settings).unwrap().root;
        let by_newton = newton_raphson(&f, a + (b - a) / 2.0, &settings).unwrap().root;
        let by_secant = secant(&f, a, b, &settings).unwrap().root;

        let limit = 2.0 * settings.tolerance;
        for other in [by_false_position, by_newton, by_secant] {
            prop_assert!(
                (other - by_bisection).abs() <= limit,
                "bisection {} vs {}",
                by_bisection,
                other
            );
        }
    }

    /// Test that every bracket reported by the scanner holds a sign change
    #[test]
    fn scanned_brackets_change_sign(r in -9.0f64..9.0, step in 0.05f64..1.0) {
        let f = shifted_cubic(r);
        let settings = ScanSettings { start: -10.0, end: 10.0, step };
        let brackets = scan(&f, &settings).unwrap();
        prop_assert!(brackets.len() <= 1);
        for (a, b) in brackets {
            prop_assert!(a < b);
            prop_assert!(f(a) * f(b) < 0.0);
            prop_assert!(a <= r && r <= b);
        }
    }

    /// Test that auto mode finds the root for every method
    #[test]
    fn auto_mode_finds_the_root(r in -9.0f64..9.0) {
        let f = shifted_cubic(r);
        let settings = RootFindSettings::default();
        for method in [
            RootMethod::Bisection,
            RootMethod::FalsePosition,
            RootMethod::NewtonRaphson,
            RootMethod::Secant,
        ] {
            let auto = auto_find_root(&f, method, &ScanSettings::default(), &settings).unwrap();
            prop_assert!((auto.convergence.root - r).abs() <= 2.0 * settings.tolerance);
        }
    }
}
