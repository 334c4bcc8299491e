//! Property-based tests for the exact linear-algebra layer
//!
//! - Determinants of triangular matrices, under row and column swaps, and
//!   under transposition
//! - Inversion by Gauss-Jordan and by the adjugate
//! - Cramer's rule against Gauss-Jordan elimination
//! - Stability of the solution classifier on reduced matrices

use num_rational::BigRational;
use num_traits::{One, Zero};
use pivot_core::classify::{classify, solve_system, SolutionReport};
use pivot_core::cramer::{self, CramerOutcome};
use pivot_core::determinant::determinant_value;
use pivot_core::gauss_jordan::{is_rref, reduce};
use pivot_core::inverse::{invert_adjugate, invert_gauss_jordan};
use pivot_core::matrix::Matrix;
use pivot_core::rational::int;
use proptest::collection::vec;
use proptest::prelude::*;

/// Square integer grids of order 1..=max_order with small entries
fn square_grid(min_order: usize, max_order: usize) -> impl Strategy<Value = Vec<Vec<i64>>> {
    (min_order..=max_order).prop_flat_map(|n| vec(vec(-5i64..=5, n), n))
}

/// A square grid together with a right-hand side of matching length
fn square_system() -> impl Strategy<Value = (Vec<Vec<i64>>, Vec<i64>)> {
    (1usize..=3).prop_flat_map(|n| (vec(vec(-5i64..=5, n), n), vec(-9i64..=9, n)))
}

/// Augmented systems with 1..=3 rows and 1..=3 unknowns
fn augmented_grid() -> impl Strategy<Value = Vec<Vec<i64>>> {
    (1usize..=3, 2usize..=4).prop_flat_map(|(rows, cols)| vec(vec(-4i64..=4, cols), rows))
}

fn matrix(rows: &[Vec<i64>]) -> Matrix {
    Matrix::from_integers(rows).expect("generated grids are rectangular")
}

proptest! {
    // =====================================
    // Determinant Properties
    // =====================================

    /// Test that a triangular determinant is the product of the diagonal
    #[test]
    fn triangular_determinant_is_diagonal_product(mut rows in square_grid(1, 4)) {
        let n = rows.len();
        for (i, row) in rows.iter_mut().enumerate().take(n) {
            for cell in row.iter_mut().take(i) {
                *cell = 0;
            }
        }
        let m = matrix(&rows);
        let product = m
            .diagonal()
            .iter()
            .fold(BigRational::one(), |acc, d| acc * d);
        prop_assert_eq!(determinant_value(&m).unwrap(), product);
    }

    /// Test that swapping two rows negates the determinant
    #[test]
    fn row_swap_negates_determinant(rows in square_grid(2, 4)) {
        let m = matrix(&rows);
        let mut swapped = m.clone();
        swapped.swap_rows(0, m.rows() - 1);
        prop_assert_eq!(
            determinant_value(&swapped).unwrap(),
            -determinant_value(&m).unwrap()
        );
    }

    /// Test that swapping two columns negates the determinant
    #[test]
    fn column_swap_negates_determinant(rows in square_grid(2, 4), pick in 0usize..4) {
        let n = rows.len();
        let (first, second) = (pick % n, (pick + 1) % n);
        let swapped: Vec<Vec<i64>> = rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.swap(first, second);
                row
            })
            .collect();
        prop_assert_eq!(
            determinant_value(&matrix(&swapped)).unwrap(),
            -determinant_value(&matrix(&rows)).unwrap()
        );
    }

    /// Test that the determinant is unchanged by transposition
    #[test]
    fn transpose_preserves_determinant(rows in square_grid(1, 4)) {
        let m = matrix(&rows);
        prop_assert_eq!(
            determinant_value(&m.transpose()).unwrap(),
            determinant_value(&m).unwrap()
        );
    }

    /// Test that the determinant of a product is the product of determinants
    #[test]
    fn determinant_is_multiplicative(a in square_grid(3, 3), b in square_grid(3, 3)) {
        let (a, b) = (matrix(&a), matrix(&b));
        let ab = a.product(&b).unwrap();
        prop_assert_eq!(
            determinant_value(&ab).unwrap(),
            determinant_value(&a).unwrap() * determinant_value(&b).unwrap()
        );
    }

    // =====================================
    // Inverse Properties
    // =====================================

    /// Test that A * invert(A) is the identity whenever det(A) != 0
    #[test]
    fn inverse_times_matrix_is_identity(rows in square_grid(1, 4)) {
        let a = matrix(&rows);
        let det = determinant_value(&a).unwrap();
        match invert_gauss_jordan(&a) {
            Ok((inverse, _)) => {
                prop_assert!(!det.is_zero());
                prop_assert!(a.product(&inverse).unwrap().is_identity());
                prop_assert!(inverse.product(&a).unwrap().is_identity());
            }
            Err(err) => {
                prop_assert!(det.is_zero(), "invertible matrix rejected: {}", err);
            }
        }
    }

    /// Test that the adjugate and Gauss-Jordan inverses agree
    #[test]
    fn adjugate_and_gauss_jordan_inverses_agree(rows in square_grid(1, 3)) {
        let a = matrix(&rows);
        prop_assume!(!determinant_value(&a).unwrap().is_zero());
        let (by_gj, _) = invert_gauss_jordan(&a).unwrap();
        let (by_adj, _) = invert_adjugate(&a).unwrap();
        prop_assert_eq!(by_gj, by_adj);
    }

    /// Test that the null-space witness of a singular matrix is annihilated
    #[test]
    fn singular_witness_is_in_the_null_space(rows in square_grid(2, 3)) {
        let mut rows = rows;
        let copy = rows[0].clone();
        let last = rows.len() - 1;
        rows[last] = copy;
        let a = matrix(&rows);
        let Err(pivot_core::error::AlgebraError::NotInvertible { witness }) = invert_gauss_jordan(&a) else {
            return Err(TestCaseError::fail("duplicate rows must be singular"));
        };
        prop_assert!(witness.iter().any(|v| !v.is_zero()));
        prop_assert!(a.mul_vector(&witness).unwrap().iter().all(Zero::is_zero));
    }

    // =====================================
    // Linear System Properties
    // =====================================

    /// Test that Cramer's rule agrees with Gauss-Jordan when det != 0
    #[test]
    fn cramer_agrees_with_gauss_jordan((rows, rhs) in square_system()) {
        let a = matrix(&rows);
        let b: Vec<BigRational> = rhs.iter().map(|&v| int(v)).collect();
        let by_cramer = cramer::solve(&a, &b).unwrap();
        let (report, _) = solve_system(&a, &b).unwrap();
        match by_cramer.outcome {
            CramerOutcome::Solved { solution, .. } => {
                prop_assert_eq!(report, SolutionReport::Unique { values: solution });
            }
            CramerOutcome::NotApplicable { determinant } => {
                prop_assert!(determinant.is_zero());
                prop_assert!(!report.is_unique());
            }
            CramerOutcome::GaussJordanFallback { .. } => {
                return Err(TestCaseError::fail("square systems never fall back"));
            }
        }
    }

    /// Test that reduction is idempotent and classification is stable on an RREF
    #[test]
    fn classify_is_stable_on_reduced_matrices(rows in augmented_grid()) {
        let system = matrix(&rows);
        let variables = system.cols() - 1;
        let reduction = reduce(&system);
        prop_assert!(is_rref(&reduction.rref, variables));

        let again = reduce(&reduction.rref);
        prop_assert_eq!(&again.rref, &reduction.rref);
        prop_assert_eq!(
            classify(&again.rref, &again.pivot_columns, false),
            classify(&reduction.rref, &reduction.pivot_columns, false)
        );
    }

    /// Test that every reported solution satisfies the system
    #[test]
    fn reported_solutions_satisfy_the_system(rows in augmented_grid()) {
        let system = matrix(&rows);
        let variables = system.cols() - 1;
        let (a, b) = system.split_columns(variables).unwrap();
        let b = b.column(0);
        let (report, _) = solve_system(&a, &b).unwrap();
        match report {
            SolutionReport::Unique { values } => {
                prop_assert_eq!(a.mul_vector(&values).unwrap(), b);
            }
            SolutionReport::Infinite(family) => {
                let params: Vec<BigRational> = (0..family.directions.len())
                    .map(|k| int(k as i64 + 2))
                    .collect();
                prop_assert_eq!(a.mul_vector(&family.point(&params)).unwrap(), b);
            }
            SolutionReport::Inconsistent { .. } => {}
        }
    }
}
