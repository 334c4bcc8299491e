//! Interpretation of a reduced augmented system.
//!
//! A reduced `[A | b]` is inconsistent when some row reads `0 = c` with `c != 0`,
//! has a unique solution when every variable has a pivot, and otherwise has
//! infinitely many solutions `x = p + sum(t_k * d_k)`, one direction `d_k` per
//! free variable.

use crate::error::AlgebraError;
use crate::gauss_jordan::{describe_row, reduce};
use crate::matrix::{Matrix, Vector};
use crate::rational::{format_rational, format_vector};
use crate::trace::{Step, StepTrace};
use log::debug;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::Serialize;

/// Direction vector attached to one free variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeDirection {
    /// Zero-based index of the free variable.
    pub variable: usize,
    pub direction: Vector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParametricSolution {
    /// The solution with every free variable set to 0.
    pub particular: Vector,
    pub directions: Vec<FreeDirection>,
    /// Every original right-hand side entry was 0.
    pub homogeneous: bool,
}

impl ParametricSolution {
    /// Evaluates `p + sum(t_k * d_k)` for the given parameter values, one per direction.
    pub fn point(&self, parameters: &[BigRational]) -> Vector {
        let mut point = self.particular.clone();
        for (dir, t) in self.directions.iter().zip(parameters) {
            for (entry, d) in point.iter_mut().zip(&dir.direction) {
                *entry += d * t;
            }
        }
        point
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolutionReport {
    Unique { values: Vector },
    Infinite(ParametricSolution),
    /// `row` is the zero-based index of a row reading `0 = c`, `c != 0`.
    Inconsistent { row: usize },
}

impl SolutionReport {
    pub fn is_unique(&self) -> bool {
        matches!(self, SolutionReport::Unique { .. })
    }

    /// Plain-text rendering with variables named `x1..xn`.
    pub fn render(&self) -> String {
        match self {
            SolutionReport::Unique { values } => values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("x{} = {}", i + 1, format_rational(v)))
                .collect::<Vec<_>>()
                .join("\n"),
            SolutionReport::Inconsistent { row } => format!(
                "Row {} reads 0 = c with c != 0: the system has no solution",
                row + 1
            ),
            SolutionReport::Infinite(solution) => {
                let mut parts = Vec::new();
                let particular_is_zero = solution.particular.iter().all(Zero::is_zero);
                if !(solution.homogeneous && particular_is_zero) {
                    parts.push(format_vector(&solution.particular));
                }
                for dir in &solution.directions {
                    parts.push(format!(
                        "x{}*{}",
                        dir.variable + 1,
                        format_vector(&dir.direction)
                    ));
                }
                let free: Vec<String> = solution
                    .directions
                    .iter()
                    .map(|d| format!("x{}", d.variable + 1))
                    .collect();
                format!(
                    "x = {}  ({} free)",
                    parts.join(" + "),
                    free.join(", ")
                )
            }
        }
    }
}

/// Classifies a reduced augmented matrix. `pivot_columns` lists the pivot
/// columns of `rref` in row order; entries past the last row or in the
/// right-hand-side column are ignored. `homogeneous` records whether the
/// original right-hand side was entirely zero.
pub fn classify(rref: &Matrix, pivot_columns: &[usize], homogeneous: bool) -> SolutionReport {
    let variables = rref.cols().saturating_sub(1);

    if let Some(row) = (0..rref.rows()).find(|&r| {
        (0..variables).all(|c| rref[(r, c)].is_zero()) && !rref[(r, variables)].is_zero()
    }) {
        debug!("inconsistent: {}", describe_row(rref, row));
        return SolutionReport::Inconsistent { row };
    }

    let pivots: Vec<(usize, usize)> = pivot_columns
        .iter()
        .copied()
        .enumerate()
        .filter(|&(row, col)| row < rref.rows() && col < variables)
        .collect();

    let mut particular = vec![BigRational::zero(); variables];
    for &(row, col) in &pivots {
        particular[col] = rref[(row, variables)].clone();
    }

    if pivots.len() == variables {
        debug!("unique solution {}", format_vector(&particular));
        return SolutionReport::Unique { values: particular };
    }

    let directions: Vec<FreeDirection> = (0..variables)
        .filter(|c| !pivots.iter().any(|&(_, col)| col == *c))
        .map(|free| {
            let mut direction = vec![BigRational::zero(); variables];
            direction[free] = BigRational::one();
            for &(row, col) in &pivots {
                direction[col] = -rref[(row, free)].clone();
            }
            FreeDirection {
                variable: free,
                direction,
            }
        })
        .collect();

    debug!(
        "infinitely many solutions with {} free variable(s)",
        directions.len()
    );
    SolutionReport::Infinite(ParametricSolution {
        particular,
        directions,
        homogeneous,
    })
}

/// Solves `A x = b`: augments, reduces, and classifies.
pub fn solve_system(
    a: &Matrix,
    b: &[BigRational],
) -> Result<(SolutionReport, StepTrace), AlgebraError> {
    let system = a.augment_column(b)?;
    let reduction = reduce(&system);
    let homogeneous = b.iter().all(Zero::is_zero);
    let report = classify(&reduction.rref, &reduction.pivot_columns, homogeneous);

    let mut steps = reduction.trace;
    let summary = match &report {
        SolutionReport::Unique { .. } => "Unique solution",
        SolutionReport::Infinite(_) => "Infinitely many solutions",
        SolutionReport::Inconsistent { .. } => "No solution",
    };
    steps.push(Step::note(summary).with_rationale(report.render()));
    Ok((report, steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauss_jordan::pivot_columns_of;
    use crate::rational::{int, ratio};

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_integers(rows).expect("valid matrix")
    }

    fn ints(values: &[i64]) -> Vector {
        values.iter().map(|&v| int(v)).collect()
    }

    #[test]
    fn dependent_system_has_a_parametric_solution() {
        let reduction = reduce(&m(&[&[1, 1, 3], &[2, 2, 6]]));
        let report = classify(&reduction.rref, &reduction.pivot_columns, false);
        let SolutionReport::Infinite(solution) = report else {
            panic!("expected infinite");
        };
        assert_eq!(solution.particular, ints(&[3, 0]));
        assert_eq!(solution.directions.len(), 1);
        assert_eq!(solution.directions[0].variable, 1);
        assert_eq!(solution.directions[0].direction, ints(&[-1, 1]));
        assert!(!solution.homogeneous);
    }

    #[test]
    fn identity_system_is_unique() {
        let rref = m(&[&[1, 0, 2], &[0, 1, 5]]);
        let report = classify(&rref, &[0, 1], false);
        assert_eq!(report, SolutionReport::Unique { values: ints(&[2, 5]) });
        assert_eq!(report.render(), "x1 = 2\nx2 = 5");
    }

    #[test]
    fn surplus_pivots_are_ignored() {
        let rref = m(&[&[1, 0, 2]]);
        let report = classify(&rref, &[0, 1], false);
        assert_eq!(report, classify(&rref, &[0], false));
        assert!(matches!(report, SolutionReport::Infinite(_)));
    }

    #[test]
    fn zero_row_with_nonzero_rhs_is_inconsistent() {
        let report = classify(&m(&[&[0, 0, 7]]), &[], false);
        assert_eq!(report, SolutionReport::Inconsistent { row: 0 });
    }

    #[test]
    fn classify_is_idempotent_on_an_rref() {
        let system = m(&[&[1, 2, -1, 3], &[2, 4, 1, 3], &[0, 0, 3, -3]]);
        let reduction = reduce(&system);
        let first = classify(&reduction.rref, &reduction.pivot_columns, false);

        let again = reduce(&reduction.rref);
        assert_eq!(again.rref, reduction.rref);
        let second = classify(&again.rref, &again.pivot_columns, false);
        assert_eq!(first, second);

        let recovered = pivot_columns_of(&reduction.rref, 3);
        assert_eq!(classify(&reduction.rref, &recovered, false), first);
    }

    #[test]
    fn every_point_of_the_family_solves_the_system() {
        let a = m(&[&[1, 2, -1], &[2, 4, 1]]);
        let b = ints(&[3, 3]);
        let (report, _) = solve_system(&a, &b).unwrap();
        let SolutionReport::Infinite(solution) = report else {
            panic!("expected infinite");
        };
        for t in [int(0), int(1), ratio(-7, 3)] {
            let x = solution.point(&[t]);
            assert_eq!(a.mul_vector(&x).unwrap(), b);
        }
        for dir in &solution.directions {
            assert!(a.mul_vector(&dir.direction).unwrap().iter().all(Zero::is_zero));
        }
    }

    #[test]
    fn homogeneous_flag_follows_the_right_hand_side() {
        let a = m(&[&[1, 1], &[2, 2]]);
        let (report, _) = solve_system(&a, &ints(&[0, 0])).unwrap();
        let SolutionReport::Infinite(solution) = &report else {
            panic!("expected infinite");
        };
        assert!(solution.homogeneous);
        assert_eq!(report.render(), "x = x2*[-1, 1]  (x2 free)");
    }

    #[test]
    fn render_shows_particular_and_directions() {
        let (report, steps) = solve_system(&m(&[&[1, 1], &[2, 2]]), &ints(&[3, 6])).unwrap();
        assert_eq!(report.render(), "x = [3, 0] + x2*[-1, 1]  (x2 free)");
        let last = steps.last().unwrap();
        assert_eq!(last.label, "Infinitely many solutions");
    }

    #[test]
    fn solve_system_checks_rhs_length() {
        assert!(matches!(
            solve_system(&m(&[&[1, 2]]), &ints(&[1, 2])),
            Err(AlgebraError::Shape(_))
        ));
    }

    #[test]
    fn overdetermined_consistent_system_is_unique() {
        let (report, _) =
            solve_system(&m(&[&[1, 0], &[0, 1], &[1, 1]]), &ints(&[1, 2, 3])).unwrap();
        assert_eq!(report, SolutionReport::Unique { values: ints(&[1, 2]) });
    }
}
