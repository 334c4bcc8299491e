//! Gauss-Jordan elimination to reduced row-echelon form.
//!
//! Columns are scanned left to right. For each column the first non-zero entry
//! at or below the current pivot row becomes the pivot: its row is swapped up,
//! scaled so the pivot is 1, and used to clear the column in every other row.
//! Each operation appends a fresh snapshot to the trace.

use crate::matrix::Matrix;
use crate::rational::{format_operand, format_rational, format_vector};
use crate::trace::{Step, StepTrace};
use log::{debug, trace};
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reduction {
    pub rref: Matrix,
    /// Pivot columns in increasing order; entry `i` is the pivot of row `i`.
    pub pivot_columns: Vec<usize>,
    pub trace: StepTrace,
}

impl Reduction {
    pub fn rank(&self) -> usize {
        self.pivot_columns.len()
    }

    /// Columns among the first `columns` that received no pivot.
    pub fn free_columns(&self, columns: usize) -> Vec<usize> {
        (0..columns)
            .filter(|c| !self.pivot_columns.contains(c))
            .collect()
    }
}

/// Reduces an augmented system `[A | b]`, pivoting on the coefficient columns only.
/// Every matrix reduces; one with no coefficient columns is returned unchanged.
pub fn reduce(system: &Matrix) -> Reduction {
    reduce_columns(system, system.cols().saturating_sub(1))
}

/// Reduces `matrix`, choosing pivots only among its first `pivot_limit` columns.
/// The remaining columns are carried along by the row operations, which is how
/// `[A | I]` becomes `[I | A^-1]`.
pub fn reduce_columns(matrix: &Matrix, pivot_limit: usize) -> Reduction {
    let rows = matrix.rows();
    let limit = pivot_limit.min(matrix.cols());
    debug!(
        "Gauss-Jordan on a {}x{} matrix, pivoting in {} columns",
        rows,
        matrix.cols(),
        limit
    );

    let mut current = matrix.clone();
    let mut steps = StepTrace::new();
    steps.push(Step::matrix("Initial matrix", current.clone()));

    let mut pivot_columns = Vec::new();
    let mut pivot_row = 0;
    for col in 0..limit {
        if pivot_row == rows {
            break;
        }

        let Some(found) = (pivot_row..rows).find(|&r| !current[(r, col)].is_zero()) else {
            trace!("column {} has no pivot", col + 1);
            steps.push(
                Step::note(format!("Column {} has no pivot", col + 1))
                    .with_rationale(format!(
                        "Every entry of column {} from row {} down is 0, so x{} is free",
                        col + 1,
                        pivot_row + 1,
                        col + 1
                    )),
            );
            continue;
        };

        if found != pivot_row {
            current.swap_rows(found, pivot_row);
            steps.push(
                Step::matrix(format!("R{} <-> R{}", pivot_row + 1, found + 1), current.clone())
                    .with_rationale(format!(
                        "Row {} holds the first non-zero entry of column {}",
                        found + 1,
                        col + 1
                    )),
            );
        }

        let pivot = current[(pivot_row, col)].clone();
        if !pivot.is_one() {
            current.scale_row(pivot_row, &pivot.recip());
            steps.push(
                Step::matrix(
                    format!(
                        "R{} -> R{} / {}",
                        pivot_row + 1,
                        pivot_row + 1,
                        format_operand(&pivot)
                    ),
                    current.clone(),
                )
                .with_rationale(format!("Make the pivot in column {} equal to 1", col + 1)),
            );
        }

        for row in (0..rows).filter(|&r| r != pivot_row) {
            let factor = current[(row, col)].clone();
            if factor.is_zero() {
                continue;
            }
            let original = current.row(row).to_vec();
            let scaled: Vec<BigRational> =
                current.row(pivot_row).iter().map(|v| v * &factor).collect();
            current.subtract_scaled_row(row, pivot_row, &factor);
            let label = format!(
                "R{} -> R{} - {}R{}",
                row + 1,
                row + 1,
                format_operand(&factor),
                pivot_row + 1
            );
            trace!("{label}");
            steps.push(
                Step::matrix(label, current.clone()).with_rationale(format!(
                    "scaled pivot row: {}R{} = {}\noriginal row:     R{} = {}\nresult row:       R{} = {}",
                    format_operand(&factor),
                    pivot_row + 1,
                    format_vector(&scaled),
                    row + 1,
                    format_vector(&original),
                    row + 1,
                    format_vector(current.row(row))
                )),
            );
        }

        pivot_columns.push(col);
        pivot_row += 1;
    }

    debug!(
        "reduction finished with rank {} (pivots in columns {:?})",
        pivot_columns.len(),
        pivot_columns
    );
    steps.push(
        Step::matrix("Reduced row-echelon form", current.clone()).with_rationale(format!(
            "{} pivot(s){}",
            pivot_columns.len(),
            if pivot_columns.is_empty() {
                String::new()
            } else {
                let cols: Vec<String> = pivot_columns.iter().map(|c| (c + 1).to_string()).collect();
                format!(" in column(s) {}", cols.join(", "))
            }
        )),
    );

    Reduction {
        rref: current,
        pivot_columns,
        trace: steps,
    }
}

/// Recovers the pivot columns of a matrix already in RREF: the leading 1 of
/// each non-zero row, searched among the first `columns` columns.
pub fn pivot_columns_of(rref: &Matrix, columns: usize) -> Vec<usize> {
    let limit = columns.min(rref.cols());
    (0..rref.rows())
        .filter_map(|row| {
            (0..limit)
                .find(|&col| !rref[(row, col)].is_zero())
                .filter(|&col| rref[(row, col)].is_one())
        })
        .collect()
}

/// Whether `matrix` is in reduced row-echelon form over its first `columns` columns.
pub fn is_rref(matrix: &Matrix, columns: usize) -> bool {
    let limit = columns.min(matrix.cols());
    let mut last_pivot: Option<usize> = None;
    let mut seen_zero_row = false;
    for row in 0..matrix.rows() {
        match (0..limit).find(|&col| !matrix[(row, col)].is_zero()) {
            None => seen_zero_row = true,
            Some(col) => {
                if seen_zero_row || last_pivot.is_some_and(|p| col <= p) {
                    return false;
                }
                if !matrix[(row, col)].is_one() {
                    return false;
                }
                if (0..matrix.rows()).any(|r| r != row && !matrix[(r, col)].is_zero()) {
                    return false;
                }
                last_pivot = Some(col);
            }
        }
    }
    true
}

/// Formats a row for display, e.g. `[1, 0, 3/2]`.
pub fn describe_row(matrix: &Matrix, row: usize) -> String {
    let cells: Vec<String> = matrix.row(row).iter().map(format_rational).collect();
    format!("R{}: [{}]", row + 1, cells.join(", "))
}
