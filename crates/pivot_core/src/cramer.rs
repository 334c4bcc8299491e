//! Cramer's rule: `x_i = det(A_i) / det(A)`, where `A_i` is `A` with column `i`
//! replaced by `b`.
//!
//! A non-square coefficient matrix is solved by Gauss-Jordan elimination
//! instead and the outcome says so. A zero determinant makes the rule
//! inapplicable. That outcome does not mean the system is inconsistent.

use crate::classify::{solve_system, SolutionReport};
use crate::determinant::determinant;
use crate::error::AlgebraError;
use crate::matrix::{Matrix, Vector};
use crate::rational::format_rational;
use crate::trace::{Step, StepTrace};
use log::{debug, warn};
use num_rational::BigRational;
use num_traits::Zero;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CramerOutcome {
    Solved {
        solution: Vector,
        determinant: BigRational,
        /// `det(A_i)` for each variable.
        numerators: Vector,
    },
    /// `det(A) == 0`: no unique solution exists, and Cramer's rule cannot tell
    /// an inconsistent system from an underdetermined one.
    NotApplicable { determinant: BigRational },
    /// The coefficient matrix was not square.
    GaussJordanFallback { report: SolutionReport },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CramerSolution {
    pub outcome: CramerOutcome,
    pub trace: StepTrace,
}

pub fn solve(a: &Matrix, b: &[BigRational]) -> Result<CramerSolution, AlgebraError> {
    if b.len() != a.rows() {
        return Err(AlgebraError::Shape(format!(
            "right-hand side has {} entries but the matrix has {} rows",
            b.len(),
            a.rows()
        )));
    }

    if !a.is_square() {
        warn!(
            "Cramer's rule needs a square matrix, got {}x{}; using Gauss-Jordan",
            a.rows(),
            a.cols()
        );
        let mut steps = StepTrace::new();
        steps.push(Step::note(format!(
            "Cramer's rule needs a square matrix; this one is {}x{}, so it is solved by Gauss-Jordan elimination",
            a.rows(),
            a.cols()
        )));
        let (report, reduction_steps) = solve_system(a, b)?;
        steps.extend_nested(reduction_steps, 0);
        return Ok(CramerSolution {
            outcome: CramerOutcome::GaussJordanFallback { report },
            trace: steps,
        });
    }

    let n = a.cols();
    debug!("Cramer's rule on a {n}x{n} system");
    let mut steps = StepTrace::new();
    steps.push(Step::matrix("Coefficient matrix A", a.clone()));
    let (det_a, det_steps) = determinant(a)?;
    steps.extend_nested(det_steps, 1);
    steps.push(Step::scalar("det(A)", det_a.clone()));

    if det_a.is_zero() {
        steps.push(
            Step::note("det(A) = 0: Cramer's rule does not apply").with_rationale(
                "The system has no unique solution; use Gauss-Jordan elimination to tell whether it has none or infinitely many",
            ),
        );
        return Ok(CramerSolution {
            outcome: CramerOutcome::NotApplicable { determinant: det_a },
            trace: steps,
        });
    }

    let mut numerators = Vec::with_capacity(n);
    let mut solution = Vec::with_capacity(n);
    for i in 0..n {
        let replaced = a.with_column(i, b)?;
        steps.push(Step::matrix(
            format!("A{} (column {} replaced by b)", i + 1, i + 1),
            replaced.clone(),
        ));
        let (det_i, det_i_steps) = determinant(&replaced)?;
        steps.extend_nested(det_i_steps, 1);
        let value = &det_i / &det_a;
        steps.push(
            Step::scalar(format!("x{}", i + 1), value.clone()).with_rationale(format!(
                "x{} = det(A{}) / det(A) = {} / {} = {}",
                i + 1,
                i + 1,
                format_rational(&det_i),
                format_rational(&det_a),
                format_rational(&value)
            )),
        );
        numerators.push(det_i);
        solution.push(value);
    }

    Ok(CramerSolution {
        outcome: CramerOutcome::Solved {
            solution,
            determinant: det_a,
            numerators,
        },
        trace: steps,
    })
}
