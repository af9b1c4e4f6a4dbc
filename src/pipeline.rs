//! Pipeline specification and execution for feature-engineering workflows.
//!
//! A pipeline is an ordered list of [`Stage`](crate::stages::Stage)s fitted
//! once on training data and replayed on any later frame. Its configuration
//! round-trips through a versioned JSON [`PipelineSpec`].
//!
//! # Example: Loading a Pipeline from JSON
//!
//! ```no_run
//! use regression_features::pipeline::{PipelineSpec, validate_pipeline};
//! use polars::prelude::*;
//!
//! let spec = PipelineSpec::from_file("house_prices_pipeline.json")?;
//! let train = df! {
//!     "MSZoning" => ["RL", "RM", "RL"],
//!     "SalePrice" => [208_500.0, 181_500.0, 223_500.0],
//! }?;
//!
//! let names: Vec<&str> = train.get_column_names().iter().map(|n| n.as_str()).collect();
//! for err in validate_pipeline(&spec, names) {
//!     eprintln!("{err}");
//! }
//!
//! let mut pipeline = spec.build();
//! let target = train.column("SalePrice")?.as_materialized_series().clone();
//! let features = pipeline.fit_transform(&train.drop("SalePrice")?, Some(&target))?;
//! println!("{} columns after fit", features.width());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Stage Ops
//!
//! - **Missing values**: `categorical_imputer`, `numerical_imputer`
//! - **Derived features**: `temporal_variable`, `log_transformer`
//! - **Categorical encoding**: `rare_label_encoder`, `categorical_encoder`
//! - **Column management**: `drop_features`

pub mod executor;
pub mod spec;
pub mod validation;

pub use executor::{Pipeline, RunReport};
pub use spec::{PipelineSpec, SPEC_VERSION, StageSpec};
pub use validation::{ValidationError, validate_pipeline};
