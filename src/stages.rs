//! Fit/transform stages of the preprocessing pipeline.
//!
//! Every stage implements [`Stage`]: `fit` learns parameters from a training
//! frame (optionally with labels), `transform` reapplies them to any frame
//! with the same schema. Transform never mutates its input or the learned
//! state; it always returns a new [`DataFrame`].
//!
//! | Stage | Learns | Validates |
//! |-------|--------|-----------|
//! | [`CategoricalImputer`] | columns with missing values | no |
//! | [`NumericalImputer`] | mode per column | no |
//! | [`TemporalVariableEstimator`] | nothing | no |
//! | [`RareLabelCategoricalEncoder`] | frequent labels | no |
//! | [`CategoricalEncoder`] | target-ordered ranks | yes |
//! | [`LogTransformer`] | nothing | yes |
//! | [`DropUnnecessaryFeatures`] | nothing | no |

use crate::error::Result;
use crate::pipeline::spec::StageSpec;
use polars::prelude::*;

pub mod drop;
pub mod imputation;
pub mod log_transform;
pub mod rare_label;
pub mod target_encoding;
pub mod temporal;

pub use drop::DropUnnecessaryFeatures;
pub use imputation::{CategoricalImputer, MISSING_LABEL, NumericalImputer};
pub use log_transform::LogTransformer;
pub use rare_label::{DEFAULT_TOLERANCE, RARE_LABEL, RareLabelCategoricalEncoder};
pub use target_encoding::CategoricalEncoder;
pub use temporal::TemporalVariableEstimator;

/// A column is registered for imputation only when its null count is
/// strictly greater than this value.
pub const MISSING_COUNT_THRESHOLD: usize = 1;

/// Two-phase contract shared by all pipeline stages.
pub trait Stage: Send + Sync {
    /// Stable identifier of the stage kind
    fn name(&self) -> &'static str;

    /// Learn parameters from `df`. Re-running fit replaces previous state.
    ///
    /// # Errors
    ///
    /// Returns an error when the statistics cannot be computed, e.g. a
    /// configured column is missing or labels are required but absent.
    fn fit(&mut self, df: &DataFrame, target: Option<&Series>) -> Result<()>;

    /// Apply the learned parameters to a copy of `df`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFitted`](crate::error::ModelError::NotFitted)
    /// for a stateful stage that was never fit, the validating stages'
    /// [`ModelError::InvalidModelInput`](crate::error::ModelError::InvalidModelInput),
    /// or native polars errors for malformed input.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    /// Fit on `df`, then transform it.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Stage::fit`] and [`Stage::transform`].
    fn fit_transform(&mut self, df: &DataFrame, target: Option<&Series>) -> Result<DataFrame> {
        self.fit(df, target)?;
        self.transform(df)
    }

    /// Short human-readable summary
    fn description(&self) -> String;

    /// Configuration of this stage as a serializable step
    fn spec(&self) -> StageSpec;
}

/// Normalizes a column argument into an owned list.
pub(crate) fn to_columns<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}

/// Configured columns whose null count exceeds [`MISSING_COUNT_THRESHOLD`].
pub(crate) fn columns_with_missing(df: &DataFrame, columns: &[String]) -> Result<Vec<String>> {
    let mut with_missing = Vec::new();
    for name in columns {
        let nulls = df.column(name)?.null_count();
        if nulls > MISSING_COUNT_THRESHOLD {
            with_missing.push(name.clone());
        }
    }
    Ok(with_missing)
}

/// Rewrites columns in place (same position, same name) on a copy of `df`.
pub(crate) fn replace_columns(df: &DataFrame, exprs: Vec<Expr>) -> Result<DataFrame> {
    if exprs.is_empty() {
        return Ok(df.clone());
    }
    Ok(df.clone().lazy().with_columns(exprs).collect()?)
}
