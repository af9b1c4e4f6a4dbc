//! Pipeline specification validation.
//!
//! Checks a spec against the columns of an input frame before fitting,
//! collecting every problem instead of stopping at the first. Stages never
//! call this themselves; it is an opt-in pre-flight check.

use super::spec::{PipelineSpec, SPEC_VERSION, StageSpec};
use std::collections::HashSet;

/// Validation error with helpful context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub step_index: Option<usize>,
    pub message: String,
}

impl ValidationError {
    fn new(step_index: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            step_index,
            message: message.into(),
        }
    }

    fn step(step_index: usize, message: impl Into<String>) -> Self {
        Self::new(Some(step_index), message)
    }

    fn schema(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(idx) = self.step_index {
            write!(f, "Step {}: {}", idx + 1, self.message)
        } else {
            write!(f, "Schema: {}", self.message)
        }
    }
}

/// Validate a pipeline spec against the column names of its input
pub fn validate_pipeline<I, S>(spec: &PipelineSpec, input_columns: I) -> Vec<ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut errors = Vec::new();

    if spec.version != SPEC_VERSION {
        errors.push(ValidationError::schema(format!(
            "Unsupported spec version '{}', expected '{SPEC_VERSION}'",
            spec.version
        )));
    }

    // Track the columns alive at each step
    let mut columns: HashSet<String> = input_columns
        .into_iter()
        .map(|c| c.as_ref().to_owned())
        .collect();

    for (idx, step) in spec.steps.iter().enumerate() {
        validate_step(step, idx, &mut columns, &mut errors);
    }

    errors
}

/// Validate a single step and update column tracking
fn validate_step(
    step: &StageSpec,
    idx: usize,
    columns: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    let action = match step {
        StageSpec::CategoricalImputer { .. } | StageSpec::NumericalImputer { .. } => "impute",
        StageSpec::TemporalVariable { .. } => "derive elapsed time for",
        StageSpec::RareLabelEncoder { .. } => "collapse rare labels in",
        StageSpec::CategoricalEncoder { .. } => "encode",
        StageSpec::LogTransformer { .. } => "log-transform",
        StageSpec::DropFeatures { .. } => "drop",
    };
    validate_columns_exist(step.columns(), columns, idx, action, errors);

    match step {
        StageSpec::TemporalVariable {
            reference_variable,
            ..
        } => {
            if !columns.contains(reference_variable) {
                errors.push(ValidationError::step(
                    idx,
                    format!("Reference column '{reference_variable}' not found"),
                ));
            }
        }

        StageSpec::RareLabelEncoder { tol, .. } => {
            if !(0.0..=1.0).contains(tol) {
                errors.push(ValidationError::step(
                    idx,
                    format!("Tolerance {tol} must lie between 0 and 1"),
                ));
            }
        }

        StageSpec::DropFeatures { variables_to_drop } => {
            for col in variables_to_drop {
                columns.remove(col);
            }
        }

        StageSpec::CategoricalImputer { .. }
        | StageSpec::NumericalImputer { .. }
        | StageSpec::CategoricalEncoder { .. }
        | StageSpec::LogTransformer { .. } => {}
    }
}

fn validate_columns_exist(
    required: &[String],
    available: &HashSet<String>,
    idx: usize,
    action: &str,
    errors: &mut Vec<ValidationError>,
) {
    for col in required {
        if !available.contains(col) {
            errors.push(ValidationError::step(
                idx,
                format!("Cannot {action} non-existent column '{col}'"),
            ));
        }
    }
}
