//! Error kinds reported by the engine.
//!
//! Every failure is returned to the immediate caller; the engine never retries
//! or substitutes a default value.

use crate::matrix::Vector;
use crate::rational::format_vector;
use crate::root_finding::IterationStep;
use thiserror::Error;

/// Failures of the exact linear-algebra layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    /// Non-square where squareness is required, or incompatible dimensions.
    #[error("shape error: {0}")]
    Shape(String),
    /// Malformed numeric text.
    #[error("cannot parse \"{input}\" as a number: {reason}")]
    Parse { input: String, reason: String },
    /// Zero determinant where a non-zero one is required.
    #[error("matrix is singular: its determinant is 0")]
    SingularMatrix,
    /// Fewer than n pivots. `witness` is a non-trivial vector v with A·v = 0.
    #[error("matrix is not invertible: A·v = 0 for v = {}", format_vector(.witness))]
    NotInvertible { witness: Vector },
}

/// Failures of function text compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("parse error at position {position}: {message}")]
    Parse { position: usize, message: String },
}

impl ExpressionError {
    pub(crate) fn at(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Failures of the iterative root finders and the interval scanner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RootFindError {
    #[error("f(a) and f(b) must have opposite signs: f({a}) = {fa}, f({b}) = {fb}")]
    NoSignChange { a: f64, b: f64, fa: f64, fb: f64 },
    #[error("derivative is too close to zero at x = {x} (f'(x) = {derivative})")]
    DerivativeNearZero {
        x: f64,
        derivative: f64,
        iterations: Vec<IterationStep>,
    },
    #[error("f(x_prev) - f(x) is too close to zero at x_prev = {x_prev}, x = {x}")]
    ZeroDenominator {
        x_prev: f64,
        x: f64,
        iterations: Vec<IterationStep>,
    },
    #[error("no convergence after {max_iterations} iterations")]
    NoConvergence {
        max_iterations: usize,
        last: Option<f64>,
        iterations: Vec<IterationStep>,
    },
    #[error("f is not finite at x = {x}")]
    NonFiniteValue { x: f64 },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),
    #[error("no sign change found in the scanned range")]
    NoBracketFound,
}

impl RootFindError {
    /// Iterations performed before the failure, if the method got that far.
    pub fn iterations(&self) -> &[IterationStep] {
        match self {
            RootFindError::DerivativeNearZero { iterations, .. }
            | RootFindError::ZeroDenominator { iterations, .. }
            | RootFindError::NoConvergence { iterations, .. } => iterations,
            _ => &[],
        }
    }
}
