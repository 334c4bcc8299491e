//! Settings and method selectors, plus a small façade that dispatches on them.

use crate::classify::{solve_system, SolutionReport};
use crate::cramer::{self, CramerOutcome};
use crate::error::{AlgebraError, RootFindError};
use crate::inverse::invert;
use crate::matrix::Matrix;
use crate::root_finding::{auto_find_root, find_root, AutoRoot, Convergence, Seeds};
use crate::trace::StepTrace;
use crate::traits::ScalarFunction;
use num_rational::BigRational;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootFindSettings {
    /// Stopping threshold on the residual |f(x)| and on the step size.
    pub tolerance: f64,
    /// Hard cap; exceeding it is a `NoConvergence` failure.
    pub max_iterations: usize,
    /// Step h of the central difference used by Newton-Raphson.
    pub derivative_step: f64,
}

impl Default for RootFindSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
            derivative_step: 1e-6,
        }
    }
}

impl RootFindSettings {
    pub fn validate(&self) -> Result<(), RootFindError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RootFindError::InvalidSettings(
                "tolerance must be positive and finite".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(RootFindError::InvalidSettings(
                "max_iterations must be greater than zero".to_string(),
            ));
        }
        if !(self.derivative_step.is_finite() && self.derivative_step > 0.0) {
            return Err(RootFindError::InvalidSettings(
                "derivative_step must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sampling range of the interval scanner. `end` is always sampled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            start: -10.0,
            end: 10.0,
            step: 0.5,
        }
    }
}

/// Upper bound on the number of samples one scan may take.
pub const MAX_SCAN_SAMPLES: usize = 1_000_000;

impl ScanSettings {
    pub fn validate(&self) -> Result<(), RootFindError> {
        if !(self.start.is_finite() && self.end.is_finite() && self.step.is_finite()) {
            return Err(RootFindError::InvalidSettings(
                "scan range and step must be finite".to_string(),
            ));
        }
        if self.end <= self.start {
            return Err(RootFindError::InvalidSettings(
                "scan end must be greater than start".to_string(),
            ));
        }
        if self.step <= 0.0 {
            return Err(RootFindError::InvalidSettings(
                "scan step must be positive".to_string(),
            ));
        }
        if (self.end - self.start) / self.step > MAX_SCAN_SAMPLES as f64 {
            return Err(RootFindError::InvalidSettings(format!(
                "scan would take more than {MAX_SCAN_SAMPLES} samples"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InverseMethod {
    Adjugate,
    #[default]
    GaussJordan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearMethod {
    #[default]
    GaussJordan,
    Cramer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootMethod {
    Bisection,
    FalsePosition,
    NewtonRaphson,
    Secant,
}

impl RootMethod {
    /// Whether the method needs a sign-changing bracket.
    pub fn is_bracketing(self) -> bool {
        matches!(self, RootMethod::Bisection | RootMethod::FalsePosition)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub root: RootFindSettings,
    pub scan: ScanSettings,
    pub inverse_method: InverseMethod,
    pub linear_method: LinearMethod,
}

/// Result of [`SolverConfig::solve_linear`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinearSolution {
    pub report: SolutionReport,
    pub trace: StepTrace,
    /// The method that produced `report`; Cramer falls back to Gauss-Jordan on
    /// non-square systems.
    pub method_used: LinearMethod,
}

impl SolverConfig {
    /// Solves `A x = b` with the configured method. Under Cramer's rule a zero
    /// determinant is reported as `SingularMatrix`.
    pub fn solve_linear(
        &self,
        a: &Matrix,
        b: &[BigRational],
    ) -> Result<LinearSolution, AlgebraError> {
        match self.linear_method {
            LinearMethod::GaussJordan => {
                let (report, trace) = solve_system(a, b)?;
                Ok(LinearSolution {
                    report,
                    trace,
                    method_used: LinearMethod::GaussJordan,
                })
            }
            LinearMethod::Cramer => {
                let solution = cramer::solve(a, b)?;
                match solution.outcome {
                    CramerOutcome::Solved {
                        solution: values, ..
                    } => Ok(LinearSolution {
                        report: SolutionReport::Unique { values },
                        trace: solution.trace,
                        method_used: LinearMethod::Cramer,
                    }),
                    CramerOutcome::GaussJordanFallback { report } => Ok(LinearSolution {
                        report,
                        trace: solution.trace,
                        method_used: LinearMethod::GaussJordan,
                    }),
                    CramerOutcome::NotApplicable { .. } => Err(AlgebraError::SingularMatrix),
                }
            }
        }
    }

    pub fn invert(&self, a: &Matrix) -> Result<(Matrix, StepTrace), AlgebraError> {
        invert(a, self.inverse_method)
    }

    pub fn find_root<F: ScalarFunction + ?Sized>(
        &self,
        f: &F,
        method: RootMethod,
        seeds: Seeds,
    ) -> Result<Convergence, RootFindError> {
        find_root(f, method, seeds, &self.root)
    }

    pub fn auto_find_root<F: ScalarFunction + ?Sized>(
        &self,
        f: &F,
        method: RootMethod,
    ) -> Result<AutoRoot, RootFindError> {
        auto_find_root(f, method, &self.scan, &self.root)
    }
}
