//! Rare-label collapsing.
//!
//! Fit keeps, per column, the labels whose relative frequency reaches the
//! tolerance. Frequencies divide by the full row count, so null rows lower
//! every label's share without ever being kept themselves. Transform maps
//! anything outside the kept set (nulls included) to [`RARE_LABEL`].

use super::{Stage, replace_columns, to_columns};
use crate::error::{ModelError, Result};
use crate::pipeline::spec::StageSpec;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Replacement for infrequent labels.
pub const RARE_LABEL: &str = "Rare";

/// Minimum relative frequency for a label to be kept.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

const COUNT_COLUMN: &str = "__count__";

/// Learned state of [`RareLabelCategoricalEncoder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RareLabelState {
    /// Kept labels per column, sorted
    pub frequent_labels: BTreeMap<String, Vec<String>>,
}

/// Collapses infrequent categories into [`RARE_LABEL`].
#[derive(Debug, Clone)]
pub struct RareLabelCategoricalEncoder {
    tol: f64,
    variables: Vec<String>,
    state: Option<RareLabelState>,
}

impl RareLabelCategoricalEncoder {
    /// Encoder with the [`DEFAULT_TOLERANCE`].
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tol: DEFAULT_TOLERANCE,
            variables: to_columns(variables),
            state: None,
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tol
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn state(&self) -> Option<&RareLabelState> {
        self.state.as_ref()
    }

    /// Kept labels for `column`, or `None` before fit.
    pub fn frequent_labels(&self, column: &str) -> Option<&[String]> {
        self.state
            .as_ref()
            .and_then(|s| s.frequent_labels.get(column))
            .map(Vec::as_slice)
    }
}

/// Labels of `name` whose share of all `df` rows is at least `tol`.
fn frequent_labels(df: &DataFrame, name: &str, tol: f64) -> Result<Vec<String>> {
    let total = df.height() as f64;

    let counts = df
        .clone()
        .lazy()
        .select([col(name).cast(DataType::String).alias(name)])
        .filter(col(name).is_not_null())
        .group_by([col(name)])
        .agg([len().alias(COUNT_COLUMN)])
        .sort_by_exprs(vec![col(name)], SortMultipleOptions::default())
        .collect()?;

    let labels = counts.column(name)?.as_materialized_series().str()?;
    let label_counts = counts
        .column(COUNT_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let frequent = labels
        .into_iter()
        .zip(label_counts.f64()?)
        .filter_map(|(label, count)| match (label, count) {
            (Some(label), Some(count)) if count / total >= tol => Some(label.to_owned()),
            _ => None,
        })
        .collect();

    Ok(frequent)
}

impl Stage for RareLabelCategoricalEncoder {
    fn name(&self) -> &'static str {
        "rare_label_encoder"
    }

    fn fit(&mut self, df: &DataFrame, _target: Option<&Series>) -> Result<()> {
        let mut frequent = BTreeMap::new();
        for name in &self.variables {
            let labels = frequent_labels(df, name, self.tol)?;
            log::debug!(
                "{}: column '{name}' keeps {} labels at tol {}",
                self.name(),
                labels.len(),
                self.tol
            );
            frequent.insert(name.clone(), labels);
        }

        self.state = Some(RareLabelState {
            frequent_labels: frequent,
        });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ModelError::NotFitted("RareLabelCategoricalEncoder".to_owned()))?;

        let mut exprs = Vec::with_capacity(self.variables.len());
        for name in &self.variables {
            let labels = state.frequent_labels.get(name).ok_or_else(|| {
                ModelError::Other(format!("No frequent labels learned for column '{name}'"))
            })?;
            let frequent = Series::new("frequent".into(), labels.as_slice());
            let values = col(name.as_str()).cast(DataType::String);

            exprs.push(
                when(values.clone().is_in(lit(frequent)).fill_null(lit(false)))
                    .then(values)
                    .otherwise(lit(RARE_LABEL))
                    .alias(name.as_str()),
            );
        }

        replace_columns(df, exprs)
    }

    fn description(&self) -> String {
        format!(
            "Collapse labels below {:.1}% frequency to '{RARE_LABEL}' in {} columns",
            self.tol * 100.0,
            self.variables.len()
        )
    }

    fn spec(&self) -> StageSpec {
        StageSpec::RareLabelEncoder {
            variables: self.variables.clone(),
            tol: self.tol,
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;

    fn labels(df: &DataFrame, name: &str) -> anyhow::Result<Vec<Option<String>>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_owned))
            .collect())
    }

    fn neighbourhoods() -> PolarsResult<DataFrame> {
        let mut values = vec!["NAmes"; 10];
        values.extend(vec!["CollgCr"; 9]);
        values.push("Blueste");
        df! { "Neighborhood" => values }
    }

    #[test]
    fn test_label_at_tolerance_is_kept() -> anyhow::Result<()> {
        let df = neighbourhoods()?;
        let mut encoder = RareLabelCategoricalEncoder::new(["Neighborhood"]);
        encoder.fit(&df, None)?;

        // Blueste is exactly 1/20 = 0.05
        assert_eq!(
            encoder.frequent_labels("Neighborhood").unwrap(),
            ["Blueste".to_owned(), "CollgCr".to_owned(), "NAmes".to_owned()]
        );
        Ok(())
    }

    #[test]
    fn test_infrequent_labels_collapse() -> anyhow::Result<()> {
        let df = neighbourhoods()?;
        let mut encoder = RareLabelCategoricalEncoder::new(["Neighborhood"]).with_tolerance(0.1);
        encoder.fit(&df, None)?;

        let test = df! { "Neighborhood" => ["NAmes", "Blueste", "Veenker", "CollgCr"] }?;
        let out = encoder.transform(&test)?;

        assert_eq!(
            labels(&out, "Neighborhood")?,
            vec![
                Some("NAmes".to_owned()),
                Some(RARE_LABEL.to_owned()),
                Some(RARE_LABEL.to_owned()),
                Some("CollgCr".to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_nulls_count_towards_total_and_collapse() -> anyhow::Result<()> {
        let df = df! { "MSZoning" => [Some("RL"), Some("RL"), Some("RM"), None] }?;
        let mut encoder = RareLabelCategoricalEncoder::new(["MSZoning"]).with_tolerance(0.3);

        let out = encoder.fit_transform(&df, None)?;

        assert_eq!(encoder.frequent_labels("MSZoning").unwrap(), ["RL".to_owned()]);
        assert_eq!(
            labels(&out, "MSZoning")?,
            vec![
                Some("RL".to_owned()),
                Some("RL".to_owned()),
                Some(RARE_LABEL.to_owned()),
                Some(RARE_LABEL.to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_empty_frequent_set_collapses_column() -> anyhow::Result<()> {
        let df = df! { "Exterior1st" => ["VinylSd", "HdBoard", "MetalSd", "Plywood"] }?;
        let mut encoder = RareLabelCategoricalEncoder::new(["Exterior1st"]).with_tolerance(0.5);

        let out = encoder.fit_transform(&df, None)?;

        assert!(encoder.frequent_labels("Exterior1st").unwrap().is_empty());
        assert!(
            labels(&out, "Exterior1st")?
                .iter()
                .all(|v| v.as_deref() == Some(RARE_LABEL))
        );
        Ok(())
    }

    #[test]
    fn test_numeric_categories_become_strings() -> anyhow::Result<()> {
        let df = df! { "MSSubClass" => [20i64, 20, 60, 190] }?;
        let mut encoder = RareLabelCategoricalEncoder::new(["MSSubClass"]).with_tolerance(0.4);

        let out = encoder.fit_transform(&df, None)?;

        assert_eq!(
            labels(&out, "MSSubClass")?,
            vec![
                Some("20".to_owned()),
                Some("20".to_owned()),
                Some(RARE_LABEL.to_owned()),
                Some(RARE_LABEL.to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_not_fitted() -> anyhow::Result<()> {
        let df = neighbourhoods()?;
        let encoder = RareLabelCategoricalEncoder::new(["Neighborhood"]);
        assert!(matches!(
            encoder.transform(&df).unwrap_err(),
            ModelError::NotFitted(_)
        ));
        Ok(())
    }
}
