//! Supervised ordinal encoding of categorical columns.
//!
//! During fit each category is ranked by the mean of the target over its
//! rows: the lowest mean gets rank 0, the next rank 1, and so on. Categories
//! with equal means are ordered by their value, and a category whose target
//! is entirely missing has no mean and ranks last. Transform replaces values
//! with ranks and refuses to return a frame in which any configured column
//! ended up with missing ranks.

use super::{Stage, to_columns};
use crate::error::{ModelError, Result};
use crate::pipeline::spec::StageSpec;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const TARGET_COLUMN: &str = "__target__";
const MEAN_COLUMN: &str = "__target_mean__";

/// Learned state of [`CategoricalEncoder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoderState {
    /// Category value to rank, per column
    pub ranks: BTreeMap<String, HashMap<String, u32>>,
}

/// Encodes categories as ranks of their mean target value.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    variables: Vec<String>,
    state: Option<CategoricalEncoderState>,
}

impl CategoricalEncoder {
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: to_columns(variables),
            state: None,
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn state(&self) -> Option<&CategoricalEncoderState> {
        self.state.as_ref()
    }

    /// Learned rank of `category` in `column`.
    pub fn rank(&self, column: &str, category: &str) -> Option<u32> {
        self.state
            .as_ref()
            .and_then(|s| s.ranks.get(column))
            .and_then(|ranks| ranks.get(category).copied())
    }
}

/// Ranks the categories of `name` by ascending mean of `target`.
fn rank_categories(df: &DataFrame, name: &str, target: &Series) -> Result<HashMap<String, u32>> {
    let frame = DataFrame::new(vec![
        df.column(name)?.clone(),
        Column::from(target.clone().with_name(TARGET_COLUMN.into())),
    ])?;

    let means = frame
        .lazy()
        .filter(col(name).is_not_null())
        .group_by([col(name)])
        .agg([col(TARGET_COLUMN)
            .cast(DataType::Float64)
            .mean()
            .alias(MEAN_COLUMN)])
        .sort_by_exprs(
            vec![col(MEAN_COLUMN), col(name)],
            SortMultipleOptions::default().with_nulls_last(true),
        )
        .collect()?;

    let categories = means
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let mut ranks = HashMap::new();
    for (rank, category) in (0u32..).zip(categories.str()?.into_iter().flatten()) {
        ranks.insert(category.to_owned(), rank);
    }
    Ok(ranks)
}

/// Replaces `name` in `df` with the ranks of its values.
fn encode_column(df: &mut DataFrame, name: &str, ranks: &HashMap<String, u32>) -> Result<()> {
    let values = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let encoded: UInt32Chunked = values
        .str()?
        .into_iter()
        .map(|value| value.and_then(|v| ranks.get(v).copied()))
        .collect();

    df.with_column(encoded.with_name(name.into()).into_series())?;
    Ok(())
}

impl Stage for CategoricalEncoder {
    fn name(&self) -> &'static str {
        "categorical_encoder"
    }

    fn fit(&mut self, df: &DataFrame, target: Option<&Series>) -> Result<()> {
        let target =
            target.ok_or_else(|| ModelError::MissingTarget("CategoricalEncoder".to_owned()))?;

        let mut ranks = BTreeMap::new();
        for name in &self.variables {
            let column_ranks = rank_categories(df, name, target)?;
            log::debug!(
                "{}: column '{name}' has {} ranked categories",
                self.name(),
                column_ranks.len()
            );
            ranks.insert(name.clone(), column_ranks);
        }

        self.state = Some(CategoricalEncoderState { ranks });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ModelError::NotFitted("CategoricalEncoder".to_owned()))?;

        let mut out = df.clone();
        for name in &self.variables {
            let ranks = state.ranks.get(name).ok_or_else(|| {
                ModelError::Other(format!("No ranks learned for column '{name}'"))
            })?;
            encode_column(&mut out, name, ranks)?;
        }

        // Only the configured columns are checked; nulls elsewhere pass through.
        let mut unmapped = Vec::new();
        for name in &self.variables {
            if out.column(name)?.null_count() > 0 {
                unmapped.push(name.clone());
            }
        }

        if !unmapped.is_empty() {
            log::warn!("{}: unmapped categories in {unmapped:?}", self.name());
            return Err(ModelError::InvalidModelInput(format!(
                "Categorical encoder has introduced NaN when transforming categorical variables: {unmapped:?}"
            )));
        }

        Ok(out)
    }

    fn description(&self) -> String {
        format!(
            "Encode {} categorical columns by ascending target mean",
            self.variables.len()
        )
    }

    fn spec(&self) -> StageSpec {
        StageSpec::CategoricalEncoder {
            variables: self.variables.clone(),
        }
    }
}
