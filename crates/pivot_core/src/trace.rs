//! Step traces: the ordered, already-materialised record of a computation.
//!
//! Every step owns its snapshot, so earlier steps are never affected by later
//! ones and a trace can be replayed any number of times.

use crate::matrix::Matrix;
use crate::rational::format_rational;
use num_rational::BigRational;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Snapshot {
    Matrix(Matrix),
    Scalar(BigRational),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// The operation performed, e.g. `R2 -> R2 - (3)R1`.
    pub label: String,
    pub rationale: Option<String>,
    pub snapshot: Snapshot,
    /// Nesting level; recursive sub-computations sit one level deeper.
    pub depth: usize,
}

impl Step {
    pub fn matrix(label: impl Into<String>, matrix: Matrix) -> Self {
        Self::with_snapshot(label, Snapshot::Matrix(matrix))
    }

    pub fn scalar(label: impl Into<String>, value: BigRational) -> Self {
        Self::with_snapshot(label, Snapshot::Scalar(value))
    }

    pub fn note(label: impl Into<String>) -> Self {
        Self::with_snapshot(label, Snapshot::None)
    }

    fn with_snapshot(label: impl Into<String>, snapshot: Snapshot) -> Self {
        Self {
            label: label.into(),
            rationale: None,
            snapshot,
            depth: 0,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepTrace {
    steps: Vec<Step>,
}

impl StepTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Appends `other`, shifting each of its steps `depth` levels deeper.
    pub fn extend_nested(&mut self, other: StepTrace, depth: usize) {
        self.steps.extend(other.steps.into_iter().map(|mut step| {
            step.depth += depth;
            step
        }));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Multi-line listing for plain-text display.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for (idx, step) in self.steps.iter().enumerate() {
            let indent = "  ".repeat(step.depth);
            lines.push(format!("{indent}{}. {}", idx + 1, step.label));
            let detail = |line: &str| format!("{indent}   {line}");
            if let Some(rationale) = &step.rationale {
                lines.extend(rationale.lines().map(detail));
            }
            match &step.snapshot {
                Snapshot::Matrix(matrix) => lines.extend(matrix.to_string().lines().map(detail)),
                Snapshot::Scalar(value) => {
                    lines.push(detail(&format!("= {}", format_rational(value))));
                }
                Snapshot::None => {}
            }
        }
        lines.iter().map(|line| format!("{line}\n")).collect()
    }
}

impl IntoIterator for StepTrace {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a StepTrace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
