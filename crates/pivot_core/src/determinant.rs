//! Determinants by recursive cofactor expansion.
//!
//! The expansion always runs along the first row. Orders 1 and 2 use their
//! direct formulas, and a triangular matrix of order 3 or more is reduced to
//! the product of its diagonal. Every other case recurses on minors, and the
//! sub-traces are nested into the caller's trace.

use crate::error::AlgebraError;
use crate::matrix::Matrix;
use crate::rational::{format_operand, format_rational};
use crate::trace::{Step, StepTrace};
use log::{debug, trace};
use num_rational::BigRational;
use num_traits::{One, Zero};

pub fn determinant(matrix: &Matrix) -> Result<(BigRational, StepTrace), AlgebraError> {
    ensure_square(matrix)?;
    debug!("determinant of a {}x{} matrix", matrix.rows(), matrix.cols());
    let mut steps = StepTrace::new();
    let value = expand(matrix, 0, &mut steps);
    debug!("determinant = {}", format_rational(&value));
    Ok((value, steps))
}

/// The determinant without its trace.
pub fn determinant_value(matrix: &Matrix) -> Result<BigRational, AlgebraError> {
    determinant(matrix).map(|(value, _)| value)
}

/// Determinant of the submatrix with `row` and `col` removed. A 1×1 matrix has
/// an empty minor whose determinant is 1.
pub fn minor_determinant(
    matrix: &Matrix,
    row: usize,
    col: usize,
) -> Result<BigRational, AlgebraError> {
    ensure_square(matrix)?;
    if row >= matrix.rows() || col >= matrix.cols() {
        return Err(AlgebraError::Shape(format!(
            "minor ({}, {}) is outside a {}x{} matrix",
            row + 1,
            col + 1,
            matrix.rows(),
            matrix.cols()
        )));
    }
    if matrix.rows() == 1 {
        return Ok(BigRational::one());
    }
    determinant_value(&matrix.minor(row, col))
}

/// `(-1)^(row + col) * minor_determinant(row, col)`.
pub fn cofactor(matrix: &Matrix, row: usize, col: usize) -> Result<BigRational, AlgebraError> {
    let minor = minor_determinant(matrix, row, col)?;
    Ok(if (row + col) % 2 == 0 { minor } else { -minor })
}

fn ensure_square(matrix: &Matrix) -> Result<(), AlgebraError> {
    if matrix.is_square() {
        Ok(())
    } else {
        Err(AlgebraError::Shape(format!(
            "determinant requires a square matrix, got {}x{}",
            matrix.rows(),
            matrix.cols()
        )))
    }
}

fn expand(matrix: &Matrix, depth: usize, steps: &mut StepTrace) -> BigRational {
    match matrix.rows() {
        1 => {
            let value = matrix[(0, 0)].clone();
            steps.push(
                Step::scalar("1x1 determinant: the single entry", value.clone()).at_depth(depth),
            );
            value
        }
        2 => two_by_two(matrix, depth, steps),
        _ if matrix.is_upper_triangular() || matrix.is_lower_triangular() => {
            triangular(matrix, depth, steps)
        }
        _ => first_row_expansion(matrix, depth, steps),
    }
}

fn two_by_two(matrix: &Matrix, depth: usize, steps: &mut StepTrace) -> BigRational {
    let (a, b) = (&matrix[(0, 0)], &matrix[(0, 1)]);
    let (c, d) = (&matrix[(1, 0)], &matrix[(1, 1)]);
    let ad = a * d;
    let bc = b * c;
    let value = &ad - &bc;
    let arithmetic = format!(
        "({})({}) - ({})({}) = {} - {} = {}",
        format_rational(a),
        format_rational(d),
        format_rational(b),
        format_rational(c),
        format_rational(&ad),
        format_operand(&bc),
        format_rational(&value)
    );
    trace!("2x2 determinant: {arithmetic}");
    steps.push(
        Step::scalar("2x2 determinant: ad - bc", value.clone())
            .with_rationale(arithmetic)
            .at_depth(depth),
    );
    value
}

fn triangular(matrix: &Matrix, depth: usize, steps: &mut StepTrace) -> BigRational {
    let diagonal = matrix.diagonal();
    let value = diagonal
        .iter()
        .fold(BigRational::one(), |acc, entry| acc * entry);
    let factors: String = diagonal
        .iter()
        .map(|entry| format!("({})", format_rational(entry)))
        .collect();
    let kind = if matrix.is_upper_triangular() {
        "Upper"
    } else {
        "Lower"
    };
    steps.push(
        Step::scalar(
            format!("{kind} triangular matrix: determinant is the product of the diagonal"),
            value.clone(),
        )
        .with_rationale(format!("{factors} = {}", format_rational(&value)))
        .at_depth(depth),
    );
    value
}

fn first_row_expansion(matrix: &Matrix, depth: usize, steps: &mut StepTrace) -> BigRational {
    let n = matrix.cols();
    steps.push(
        Step::matrix(
            format!("Cofactor expansion of a {n}x{n} matrix along row 1"),
            matrix.clone(),
        )
        .at_depth(depth),
    );

    let mut terms = Vec::with_capacity(n);
    for col in 0..n {
        let entry = &matrix[(0, col)];
        let sign = if col % 2 == 0 { "+" } else { "-" };
        if entry.is_zero() {
            steps.push(
                Step::note(format!("Term {}: a1{} = 0, term omitted", col + 1, col + 1))
                    .at_depth(depth),
            );
            terms.push(BigRational::zero());
            continue;
        }

        let minor = matrix.minor(0, col);
        steps.push(
            Step::matrix(
                format!("Minor M1{} (row 1 and column {} removed)", col + 1, col + 1),
                minor.clone(),
            )
            .at_depth(depth),
        );
        let minor_det = expand(&minor, depth + 1, steps);
        let magnitude = entry * &minor_det;
        let term = if col % 2 == 0 { magnitude } else { -magnitude };
        steps.push(
            Step::scalar(format!("Term {}", col + 1), term.clone())
                .with_rationale(format!(
                    "({sign}1)({})({}) = {}",
                    format_rational(entry),
                    format_rational(&minor_det),
                    format_rational(&term)
                ))
                .at_depth(depth),
        );
        terms.push(term);
    }

    let value = terms
        .iter()
        .fold(BigRational::zero(), |acc, term| acc + term);
    let sum = terms
        .iter()
        .map(format_operand)
        .collect::<Vec<_>>()
        .join(" + ");
    steps.push(
        Step::scalar(format!("det = sum of the {n} terms"), value.clone())
            .with_rationale(format!("{sum} = {}", format_rational(&value)))
            .at_depth(depth),
    );
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::int;
    use crate::trace::Snapshot;

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_integers(rows).expect("valid matrix")
    }

    #[test]
    fn rejects_non_square_input() {
        let err = determinant(&m(&[&[1, 2, 3], &[4, 5, 6]])).expect_err("non-square");
        assert!(matches!(err, AlgebraError::Shape(_)));
    }

    #[test]
    fn one_by_one_is_the_entry() {
        let (value, steps) = determinant(&m(&[&[-7]])).unwrap();
        assert_eq!(value, int(-7));
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn two_by_two_traces_the_formula() {
        let (value, steps) = determinant(&m(&[&[2, 1], &[1, -1]])).unwrap();
        assert_eq!(value, int(-3));
        assert_eq!(steps.len(), 1);
        let step = &steps.steps()[0];
        assert_eq!(
            step.rationale.as_deref(),
            Some("(2)(-1) - (1)(1) = -2 - 1 = -3")
        );
        assert_eq!(step.snapshot, Snapshot::Scalar(int(-3)));
    }

    #[test]
    fn two_by_two_parenthesises_negative_products() {
        let (value, steps) = determinant(&m(&[&[3, 1], &[-1, 2]])).unwrap();
        assert_eq!(value, int(7));
        assert_eq!(
            steps.steps()[0].rationale.as_deref(),
            Some("(3)(2) - (1)(-1) = 6 - (-1) = 7")
        );
    }

    #[test]
    fn triangular_shortcut_uses_the_diagonal() {
        let (value, steps) = determinant(&m(&[&[2, 5, 1], &[0, 3, 7], &[0, 0, 4]])).unwrap();
        assert_eq!(value, int(24));
        assert_eq!(steps.len(), 1);
        assert!(steps.steps()[0].label.starts_with("Upper triangular"));

        let (value, _) = determinant(&m(&[&[1, 0, 0], &[9, 2, 0], &[4, 4, -1]])).unwrap();
        assert_eq!(value, int(-2));
    }

    #[test]
    fn cofactor_expansion_along_first_row() {
        let a = m(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 10]]);
        let (value, steps) = determinant(&a).unwrap();
        assert_eq!(value, int(-3));
        let last = steps.last().expect("final step");
        assert_eq!(last.snapshot, Snapshot::Scalar(int(-3)));
        assert_eq!(last.rationale.as_deref(), Some("2 + 4 + (-9) = -3"));
        assert!(steps.iter().any(|s| s.depth == 1));
    }

    #[test]
    fn zero_leading_entry_skips_its_minor() {
        let a = m(&[&[0, 2, 1], &[3, 1, 4], &[5, 6, 2]]);
        let (value, steps) = determinant(&a).unwrap();
        // -2*(3*2 - 4*5) + 1*(3*6 - 1*5) = 28 + 13
        assert_eq!(value, int(41));
        assert!(steps.iter().any(|s| s.label == "Term 1: a11 = 0, term omitted"));
        assert!(!steps.iter().any(|s| s.label.starts_with("Minor M11")));
    }

    #[test]
    fn four_by_four_recurses() {
        let a = m(&[&[1, 0, 2, -1], &[3, 0, 0, 5], &[2, 1, 4, -3], &[1, 0, 5, 0]]);
        assert_eq!(determinant_value(&a).unwrap(), int(30));
    }

    #[test]
    fn cofactors_carry_the_checkerboard_sign() {
        let a = m(&[&[1, 2], &[3, 4]]);
        assert_eq!(cofactor(&a, 0, 0).unwrap(), int(4));
        assert_eq!(cofactor(&a, 0, 1).unwrap(), int(-3));
        assert_eq!(cofactor(&a, 1, 0).unwrap(), int(-2));
        assert_eq!(cofactor(&a, 1, 1).unwrap(), int(1));
        assert_eq!(minor_determinant(&m(&[&[5]]), 0, 0).unwrap(), int(1));
    }

    #[test]
    fn out_of_range_minors_are_shape_errors() {
        let a = m(&[&[1, 2], &[3, 4]]);
        assert!(matches!(
            minor_determinant(&a, 5, 0),
            Err(AlgebraError::Shape(_))
        ));
        assert!(matches!(cofactor(&a, 0, 2), Err(AlgebraError::Shape(_))));
    }
}
