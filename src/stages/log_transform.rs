//! Natural-logarithm transform with a positivity guard.

use super::{Stage, to_columns};
use crate::error::{ModelError, Result};
use crate::pipeline::spec::StageSpec;
use polars::prelude::*;

/// Replaces configured columns with `ln(x)`.
///
/// Every configured column is checked before anything is transformed: a
/// single value that is not strictly positive (zero, negative, NaN or null)
/// rejects the whole frame, so the stage never returns a partial result.
#[derive(Debug, Clone)]
pub struct LogTransformer {
    variables: Vec<String>,
}

impl LogTransformer {
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: to_columns(variables),
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Configured columns holding a value that is not strictly positive.
    fn non_positive_columns(&self, df: &DataFrame) -> Result<Vec<String>> {
        let mut offending = Vec::new();
        for name in &self.variables {
            let values = df
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let has_non_positive = values
                .f64()?
                .into_iter()
                .any(|v| !v.is_some_and(|x| x > 0.0));
            if has_non_positive {
                offending.push(name.clone());
            }
        }
        Ok(offending)
    }
}

impl Stage for LogTransformer {
    fn name(&self) -> &'static str {
        "log_transformer"
    }

    fn fit(&mut self, _df: &DataFrame, _target: Option<&Series>) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let offending = self.non_positive_columns(df)?;
        if !offending.is_empty() {
            log::warn!("{}: non-positive values in {offending:?}", self.name());
            return Err(ModelError::InvalidModelInput(format!(
                "Variables contain zero or negative values, can't apply log for vars: {offending:?}"
            )));
        }

        let mut out = df.clone();
        for name in &self.variables {
            let values = out
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let logged: Float64Chunked = values
                .f64()?
                .into_iter()
                .map(|v| v.map(f64::ln))
                .collect();
            out.with_column(logged.with_name(name.as_str().into()).into_series())?;
        }
        Ok(out)
    }

    fn description(&self) -> String {
        format!("Natural log of {} numerical columns", self.variables.len())
    }

    fn spec(&self) -> StageSpec {
        StageSpec::LogTransformer {
            variables: self.variables.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, clippy::indexing_slicing)]
    use super::*;
    use approx::assert_relative_eq;

    fn floats(df: &DataFrame, name: &str) -> anyhow::Result<Vec<f64>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .f64()?
            .into_no_null_iter()
            .collect())
    }

    #[test]
    fn test_natural_log() -> anyhow::Result<()> {
        let df = df! { "Price" => [1.0, 10.0, 100.0] }?;
        let mut stage = LogTransformer::new(["Price"]);

        let out = stage.fit_transform(&df, None)?;
        let logged = floats(&out, "Price")?;

        assert_relative_eq!(logged[0], 0.0);
        assert_relative_eq!(logged[1], 2.3026, epsilon = 1e-4);
        assert_relative_eq!(logged[2], 4.6052, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn test_integer_column_is_logged() -> anyhow::Result<()> {
        let df = df! { "GrLivArea" => [1710i64, 1262, 1786] }?;
        let out = LogTransformer::new(["GrLivArea"]).transform(&df)?;
        assert_relative_eq!(floats(&out, "GrLivArea")?[0], 1710f64.ln());
        Ok(())
    }

    #[test]
    fn test_negative_value_rejected() -> anyhow::Result<()> {
        let df = df! { "Price" => [1.0, -5.0, 100.0] }?;
        let err = LogTransformer::new(["Price"]).transform(&df).unwrap_err();

        assert!(matches!(err, ModelError::InvalidModelInput(_)));
        assert!(err.to_string().contains("Price"));
        Ok(())
    }

    #[test]
    fn test_rejection_names_every_offending_column() -> anyhow::Result<()> {
        let df = df! {
            "LotArea" => [8450.0, 9600.0],
            "1stFlrSF" => [0.0, 1262.0],
            "GrLivArea" => [Some(1710.0), None],
        }?;
        let stage = LogTransformer::new(["LotArea", "1stFlrSF", "GrLivArea"]);
        let message = stage.transform(&df).unwrap_err().to_string();

        assert!(message.contains("1stFlrSF"));
        assert!(message.contains("GrLivArea"));
        assert!(!message.contains("LotArea"));
        Ok(())
    }

    #[test]
    fn test_rejection_leaves_input_untouched() -> anyhow::Result<()> {
        let df = df! {
            "LotArea" => [8450.0, 9600.0],
            "Price" => [0.0, 10.0],
        }?;
        let before = df.clone();
        assert!(LogTransformer::new(["LotArea", "Price"]).transform(&df).is_err());
        assert!(df.equals(&before));
        Ok(())
    }
}
