pub mod classify;
pub mod config;
pub mod cramer;
pub mod determinant;
pub mod equation_engine;
pub mod error;
pub mod gauss_jordan;
pub mod inverse;
pub mod matrix;
pub mod rational;
pub mod root_finding;
pub mod scan;
pub mod trace;
/// The `pivot_core` crate is the computational engine behind the Pivot calculator.
/// Linear algebra is exact: every matrix entry is a `BigRational`, so elimination and
/// cofactor expansion never lose precision. Root finding works on `f64`.
///
/// Key components:
/// - **Matrix model**: `Matrix` (row-major grid of rationals) and `StepTrace` (replayable snapshots).
/// - **Linear algebra**: determinant by cofactor expansion, Gauss-Jordan reduction to RREF,
///   solution classification, Cramer's rule and two inversion strategies.
/// - **Equation Engine**: tokenizer, parser and bytecode VM for user-typed functions of one variable.
/// - **Root finding**: bisection, false position, Newton-Raphson and secant, plus an interval scanner
///   that proposes seeds.
pub mod traits;
