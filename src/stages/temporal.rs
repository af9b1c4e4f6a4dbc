//! Elapsed-time features relative to a reference column.

use super::{Stage, to_columns};
use crate::error::Result;
use crate::pipeline::spec::StageSpec;
use polars::prelude::*;

/// Replaces each configured column with `reference - column`.
///
/// For a house-price frame, `YearRemodAdd` relative to `YrSold` becomes
/// "years since remodelling". Stateless: fit does nothing and the result may
/// be negative.
#[derive(Debug, Clone)]
pub struct TemporalVariableEstimator {
    variables: Vec<String>,
    reference_variable: String,
}

impl TemporalVariableEstimator {
    pub fn new<I, S>(variables: I, reference_variable: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: to_columns(variables),
            reference_variable: reference_variable.into(),
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn reference_variable(&self) -> &str {
        &self.reference_variable
    }
}

impl Stage for TemporalVariableEstimator {
    fn name(&self) -> &'static str {
        "temporal_variable"
    }

    fn fit(&mut self, _df: &DataFrame, _target: Option<&Series>) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        // Columns are rewritten one after another, so a reference column that
        // is itself configured is seen already rewritten by later columns.
        let mut lf = df.clone().lazy();
        for name in &self.variables {
            lf = lf.with_column(
                (col(self.reference_variable.as_str()) - col(name.as_str())).alias(name.as_str()),
            );
        }
        Ok(lf.collect()?)
    }

    fn description(&self) -> String {
        format!(
            "Replace {} columns with their distance to '{}'",
            self.variables.len(),
            self.reference_variable
        )
    }

    fn spec(&self) -> StageSpec {
        StageSpec::TemporalVariable {
            variables: self.variables.clone(),
            reference_variable: self.reference_variable.clone(),
        }
    }
}
