//! Missing-value imputers.
//!
//! Both imputers register, at fit time, the configured columns whose null
//! count is strictly greater than [`MISSING_COUNT_THRESHOLD`]. Only those
//! columns are filled at transform time. A column that had zero or one null
//! during fit keeps any nulls it carries later; downstream stages must
//! tolerate them.

use super::{MISSING_COUNT_THRESHOLD, Stage, columns_with_missing, replace_columns, to_columns};
use crate::error::{ModelError, Result};
use crate::pipeline::spec::StageSpec;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fill value for missing categorical entries.
pub const MISSING_LABEL: &str = "Not Av";

/// Learned state of [`CategoricalImputer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalImputerState {
    /// Configured columns that had more than one null at fit time
    pub columns_with_na: Vec<String>,
}

/// Replaces nulls in categorical columns with [`MISSING_LABEL`].
#[derive(Debug, Clone)]
pub struct CategoricalImputer {
    variables: Vec<String>,
    state: Option<CategoricalImputerState>,
}

impl CategoricalImputer {
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

    pub fn state(&self) -> Option<&CategoricalImputerState> {
        self.state.as_ref()
    }

    /// Columns that will be imputed, or `None` before fit.
    pub fn columns_with_na(&self) -> Option<&[String]> {
        self.state.as_ref().map(|s| s.columns_with_na.as_slice())
    }
}

impl Stage for CategoricalImputer {
    fn name(&self) -> &'static str {
        "categorical_imputer"
    }

    fn fit(&mut self, df: &DataFrame, _target: Option<&Series>) -> Result<()> {
        let columns_with_na = columns_with_missing(df, &self.variables)?;
        log::debug!(
            "{}: {} of {} columns need imputation: {columns_with_na:?}",
            self.name(),
            columns_with_na.len(),
            self.variables.len()
        );
        self.state = Some(CategoricalImputerState { columns_with_na });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ModelError::NotFitted("CategoricalImputer".to_owned()))?;

        let exprs = state
            .columns_with_na
            .iter()
            .map(|name| {
                col(name.as_str())
                    .fill_null(lit(MISSING_LABEL))
                    .alias(name.as_str())
            })
            .collect();

        replace_columns(df, exprs)
    }

    fn description(&self) -> String {
        format!(
            "Fill missing values with '{MISSING_LABEL}' in {} categorical columns",
            self.variables.len()
        )
    }

    fn spec(&self) -> StageSpec {
        StageSpec::CategoricalImputer {
            variables: self.variables.clone(),
        }
    }
}

/// Learned state of [`NumericalImputer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericalImputerState {
    /// Mode of every configured column
    pub fill_values: BTreeMap<String, f64>,
    /// Configured columns that had more than one null at fit time
    pub columns_with_na: Vec<String>,
}

/// Replaces nulls in numerical columns with the training mode.
#[derive(Debug, Clone)]
pub struct NumericalImputer {
    variables: Vec<String>,
    state: Option<NumericalImputerState>,
}

impl NumericalImputer {
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

    pub fn state(&self) -> Option<&NumericalImputerState> {
        self.state.as_ref()
    }

    /// Learned fill value for `column`, if fit and configured.
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.state
            .as_ref()
            .and_then(|s| s.fill_values.get(column).copied())
    }

    pub fn columns_with_na(&self) -> Option<&[String]> {
        self.state.as_ref().map(|s| s.columns_with_na.as_slice())
    }
}

/// Most frequent value of `name`, ignoring nulls and NaN; ties resolve to the
/// smallest.
fn most_frequent(df: &DataFrame, name: &str) -> Result<f64> {
    let modes = df
        .clone()
        .lazy()
        .select([col(name)
            .cast(DataType::Float64)
            .drop_nulls()
            .drop_nans()
            .mode()
            .sort(SortOptions::default())
            .first()
            .alias(name)])
        .collect()?;

    let values = modes.column(name)?.as_materialized_series();
    values.f64()?.get(0).ok_or_else(|| {
        ModelError::DataProcessing(format!(
            "Cannot compute mode of column '{name}': no observed values"
        ))
    })
}

impl Stage for NumericalImputer {
    fn name(&self) -> &'static str {
        "numerical_imputer"
    }

    fn fit(&mut self, df: &DataFrame, _target: Option<&Series>) -> Result<()> {
        let mut fill_values = BTreeMap::new();
        for name in &self.variables {
            let mode = most_frequent(df, name)?;
            fill_values.insert(name.clone(), mode);
        }

        let columns_with_na = columns_with_missing(df, &self.variables)?;
        log::debug!(
            "{}: modes {fill_values:?}, imputing columns with more than {MISSING_COUNT_THRESHOLD} null: {columns_with_na:?}",
            self.name()
        );

        self.state = Some(NumericalImputerState {
            fill_values,
            columns_with_na,
        });
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ModelError::NotFitted("NumericalImputer".to_owned()))?;

        let mut exprs = Vec::with_capacity(state.columns_with_na.len());
        for name in &state.columns_with_na {
            let value = state.fill_values.get(name).copied().ok_or_else(|| {
                ModelError::Other(format!("No fill value learned for column '{name}'"))
            })?;
            exprs.push(
                col(name.as_str())
                    .fill_null(lit(value))
                    .alias(name.as_str()),
            );
        }

        replace_columns(df, exprs)
    }

    fn description(&self) -> String {
        format!(
            "Fill missing values with the training mode in {} numerical columns",
            self.variables.len()
        )
    }

    fn spec(&self) -> StageSpec {
        StageSpec::NumericalImputer {
            variables: self.variables.clone(),
        }
    }
}
