//! Linear-algebra entry points: determinant, linear systems and inverses.
//!
//! Matrices cross the boundary as grids of strings so that fractions such as
//! `3/4` or `0,5` survive unchanged in both directions.

use crate::{from_js, to_js};
use anyhow::{bail, Context, Result};
use pivot_core::classify::SolutionReport;
use pivot_core::config::{InverseMethod, LinearMethod, SolverConfig};
use pivot_core::determinant::determinant as core_determinant;
use pivot_core::error::AlgebraError;
use pivot_core::matrix::{Matrix, Vector};
use pivot_core::rational::{format_decimal, format_rational, parse_matrix, parse_vector};
use pivot_core::trace::{Snapshot, StepTrace};
use serde::Serialize;
use wasm_bindgen::prelude::*;

const DECIMAL_DIGITS: usize = 6;

#[derive(Debug, Serialize, PartialEq)]
pub struct StepView {
    pub label: String,
    pub rationale: Option<String>,
    pub depth: usize,
    pub matrix: Option<Vec<Vec<String>>>,
    pub value: Option<String>,
}

fn trace_view(trace: &StepTrace) -> Vec<StepView> {
    trace
        .iter()
        .map(|step| {
            let (matrix, value) = match &step.snapshot {
                Snapshot::Matrix(m) => (Some(m.to_strings()), None),
                Snapshot::Scalar(v) => (None, Some(format_rational(v))),
                Snapshot::None => (None, None),
            };
            StepView {
                label: step.label.clone(),
                rationale: step.rationale.clone(),
                depth: step.depth,
                matrix,
                value,
            }
        })
        .collect()
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DeterminantView {
    pub value: String,
    pub decimal: String,
    pub steps: Vec<StepView>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DirectionView {
    pub variable: usize,
    pub direction: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SystemView {
    /// `unique`, `infinite` or `inconsistent`.
    pub kind: &'static str,
    pub values: Vec<String>,
    pub directions: Vec<DirectionView>,
    pub inconsistent_row: Option<usize>,
    pub summary: String,
    pub method: LinearMethod,
    pub steps: Vec<StepView>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct InverseView {
    pub inverse: Vec<Vec<String>>,
    pub steps: Vec<StepView>,
}

fn strings(values: &Vector) -> Vec<String> {
    values.iter().map(format_rational).collect()
}

fn parse_grid(cells: &[Vec<String>]) -> Result<Matrix> {
    parse_matrix(cells).context("Invalid matrix")
}

pub fn determinant_view(cells: &[Vec<String>]) -> Result<DeterminantView> {
    let matrix = parse_grid(cells)?;
    let (value, trace) = core_determinant(&matrix).context("Determinant failed")?;
    Ok(DeterminantView {
        decimal: format_decimal(&value, DECIMAL_DIGITS),
        value: format_rational(&value),
        steps: trace_view(&trace),
    })
}

pub fn parse_linear_method(name: &str) -> Result<LinearMethod> {
    match name {
        "" | "gauss_jordan" | "gauss-jordan" => Ok(LinearMethod::GaussJordan),
        "cramer" => Ok(LinearMethod::Cramer),
        other => bail!("Unknown linear method '{other}'"),
    }
}

pub fn parse_inverse_method(name: &str) -> Result<InverseMethod> {
    match name {
        "" | "gauss_jordan" | "gauss-jordan" => Ok(InverseMethod::GaussJordan),
        "adjugate" => Ok(InverseMethod::Adjugate),
        other => bail!("Unknown inverse method '{other}'"),
    }
}

pub fn system_view(
    coefficients: &[Vec<String>],
    rhs: &[String],
    method: LinearMethod,
) -> Result<SystemView> {
    let a = parse_grid(coefficients)?;
    let b = parse_vector(rhs).context("Invalid right-hand side")?;
    let config = SolverConfig {
        linear_method: method,
        ..SolverConfig::default()
    };
    let solution = config
        .solve_linear(&a, &b)
        .context("Linear system solve failed")?;

    let summary = solution.report.render();
    let (kind, values, directions, inconsistent_row) = match solution.report {
        SolutionReport::Unique { values } => ("unique", strings(&values), Vec::new(), None),
        SolutionReport::Infinite(family) => (
            "infinite",
            strings(&family.particular),
            family
                .directions
                .iter()
                .map(|d| DirectionView {
                    variable: d.variable,
                    direction: strings(&d.direction),
                })
                .collect(),
            None,
        ),
        SolutionReport::Inconsistent { row } => ("inconsistent", Vec::new(), Vec::new(), Some(row)),
    };
    Ok(SystemView {
        kind,
        values,
        directions,
        inconsistent_row,
        summary,
        method: solution.method_used,
        steps: trace_view(&solution.trace),
    })
}

pub fn inverse_view(cells: &[Vec<String>], method: InverseMethod) -> Result<InverseView> {
    let a = parse_grid(cells)?;
    let config = SolverConfig {
        inverse_method: method,
        ..SolverConfig::default()
    };
    match config.invert(&a) {
        Ok((inverse, trace)) => Ok(InverseView {
            inverse: inverse.to_strings(),
            steps: trace_view(&trace),
        }),
        Err(err @ AlgebraError::NotInvertible { .. }) => Err(err.into()),
        Err(err) => Err(anyhow::Error::new(err).context("Inversion failed")),
    }
}

#[wasm_bindgen]
pub fn determinant(cells: JsValue) -> Result<JsValue, JsValue> {
    crate::init_panic_hook();
    let cells: Vec<Vec<String>> = from_js(cells, "matrix")?;
    let view = determinant_view(&cells).map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
    to_js(&view)
}

#[wasm_bindgen]
pub fn solve_linear_system(
    coefficients: JsValue,
    rhs: JsValue,
    method: &str,
) -> Result<JsValue, JsValue> {
    crate::init_panic_hook();
    let coefficients: Vec<Vec<String>> = from_js(coefficients, "coefficients")?;
    let rhs: Vec<String> = from_js(rhs, "right-hand side")?;
    let view = parse_linear_method(method)
        .and_then(|method| system_view(&coefficients, &rhs, method))
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
    to_js(&view)
}

#[wasm_bindgen]
pub fn invert_matrix(cells: JsValue, method: &str) -> Result<JsValue, JsValue> {
    crate::init_panic_hook();
    let cells: Vec<Vec<String>> = from_js(cells, "matrix")?;
    let view = parse_inverse_method(method)
        .and_then(|method| inverse_view(&cells, method))
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
    to_js(&view)
}
