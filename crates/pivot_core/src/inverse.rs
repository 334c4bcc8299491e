//! Matrix inversion, by augmented Gauss-Jordan elimination or by the adjugate.

use crate::config::InverseMethod;
use crate::determinant::{cofactor, determinant};
use crate::error::AlgebraError;
use crate::gauss_jordan::reduce_columns;
use crate::matrix::{Matrix, Vector};
use crate::rational::format_rational;
use crate::trace::{Step, StepTrace};
use log::debug;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Largest order accepted by the adjugate method.
pub const ADJUGATE_MAX_ORDER: usize = 3;

pub fn invert(a: &Matrix, method: InverseMethod) -> Result<(Matrix, StepTrace), AlgebraError> {
    match method {
        InverseMethod::GaussJordan => invert_gauss_jordan(a),
        InverseMethod::Adjugate => invert_adjugate(a),
    }
}

/// Reduces `[A | I]`. When the left half becomes the identity the right half is
/// `A^-1`; otherwise the error carries a null-space vector of `A`.
pub fn invert_gauss_jordan(a: &Matrix) -> Result<(Matrix, StepTrace), AlgebraError> {
    ensure_square(a)?;
    let n = a.rows();
    debug!("inverting a {n}x{n} matrix by Gauss-Jordan");

    let augmented = a.augment(&Matrix::identity(n))?;
    let reduction = reduce_columns(&augmented, n);
    if reduction.rank() < n {
        let witness = null_space_witness(&reduction.rref, &reduction.pivot_columns, n);
        debug!("matrix has rank {} < {n}; not invertible", reduction.rank());
        return Err(AlgebraError::NotInvertible { witness });
    }

    let (_, inverse) = reduction.rref.split_columns(n)?;
    let mut steps = reduction.trace;
    steps.push(
        Step::matrix("A^-1 (right half)", inverse.clone())
            .with_rationale("The left half reached the identity, so the right half is the inverse"),
    );
    Ok((inverse, steps))
}

/// `A^-1 = adj(A) / det(A)`, for orders up to [`ADJUGATE_MAX_ORDER`].
pub fn invert_adjugate(a: &Matrix) -> Result<(Matrix, StepTrace), AlgebraError> {
    ensure_square(a)?;
    let n = a.rows();
    if n > ADJUGATE_MAX_ORDER {
        return Err(AlgebraError::Shape(format!(
            "the adjugate method supports orders up to {ADJUGATE_MAX_ORDER}, got {n}; use Gauss-Jordan"
        )));
    }
    debug!("inverting a {n}x{n} matrix by the adjugate");

    let mut steps = StepTrace::new();
    let (det, det_steps) = determinant(a)?;
    steps.extend_nested(det_steps, 1);
    steps.push(Step::scalar("det(A)", det.clone()));
    if det.is_zero() {
        return Err(AlgebraError::SingularMatrix);
    }

    let cofactors = cofactor_matrix(a)?;
    steps.push(
        Step::matrix("Cofactor matrix C", cofactors.clone())
            .with_rationale("C_ij = (-1)^(i+j) * det(M_ij)"),
    );
    let adj = cofactors.transpose();
    steps.push(Step::matrix("adj(A) = C^T", adj.clone()));
    let inverse = adj.scale(&det.recip());
    steps.push(
        Step::matrix("A^-1 = adj(A) / det(A)", inverse.clone())
            .with_rationale(format!("Each entry of adj(A) divided by {}", format_rational(&det))),
    );
    Ok((inverse, steps))
}

pub fn cofactor_matrix(a: &Matrix) -> Result<Matrix, AlgebraError> {
    ensure_square(a)?;
    let n = a.rows();
    let mut out = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            out[(i, j)] = cofactor(a, i, j)?;
        }
    }
    Ok(out)
}

/// Transpose of the cofactor matrix.
pub fn adjugate(a: &Matrix) -> Result<Matrix, AlgebraError> {
    Ok(cofactor_matrix(a)?.transpose())
}

/// Builds `v` with `A v = 0` from the first free column of a reduced matrix.
fn null_space_witness(rref: &Matrix, pivot_columns: &[usize], n: usize) -> Vector {
    let Some(free) = (0..n).find(|c| !pivot_columns.contains(c)) else {
        return vec![BigRational::zero(); n];
    };
    let mut witness = vec![BigRational::zero(); n];
    witness[free] = BigRational::one();
    for (row, &col) in pivot_columns.iter().enumerate() {
        witness[col] = -rref[(row, free)].clone();
    }
    witness
}

fn ensure_square(a: &Matrix) -> Result<(), AlgebraError> {
    if a.is_square() {
        Ok(())
    } else {
        Err(AlgebraError::Shape(format!(
            "only square matrices can be inverted, got {}x{}",
            a.rows(),
            a.cols()
        )))
    }
}
