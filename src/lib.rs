//! # Regression Features - Feature Engineering for House-Price Regression
//!
//! A small library of fit/transform stages that prepare tabular housing data
//! for a regression model: imputing missing values, deriving elapsed-time
//! features, collapsing rare labels, ranking categories by target mean,
//! log-transforming skewed columns and dropping unused ones.
//!
//! ## Quick Start
//!
//! ```no_run
//! use regression_features::pipeline::Pipeline;
//! use regression_features::stages::{CategoricalImputer, DropUnnecessaryFeatures, LogTransformer};
//! use polars::prelude::*;
//!
//! let train = df! {
//!     "Id" => [1, 2, 3],
//!     "BsmtQual" => [Some("Gd"), None, Some("TA")],
//!     "LotArea" => [8450.0, 9600.0, 11250.0],
//! }?;
//!
//! let mut pipeline = Pipeline::new("house_prices")
//!     .with_stage(CategoricalImputer::new(["BsmtQual"]))
//!     .with_stage(LogTransformer::new(["LotArea"]))
//!     .with_stage(DropUnnecessaryFeatures::new(["Id"]));
//!
//! pipeline.fit(&train, None)?;
//! let (features, report) = pipeline.run(&train)?;
//! println!("{}", report.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`stages`]: The individual fit/transform stages and the [`stages::Stage`] trait
//! - [`pipeline`]: Ordered stage composition, JSON specs and spec validation
//! - [`error`]: Error types and handling utilities
//! - [`logging`]: `env_logger` setup for binaries and tests
//!
//! ## Key Concepts
//!
//! ### Fit Once, Transform Many
//!
//! Every stage learns its state from training data in `fit` and reuses it
//! unchanged in `transform`. Transforming never mutates the input frame and
//! never refits, so validation and test data are encoded with exactly the
//! training statistics.
//!
//! ### Type-Safe Error Handling
//!
//! All fallible operations return [`error::Result`]. Polars, I/O and JSON
//! errors convert into [`error::ModelError`] so the `?` operator works across
//! the whole API.

#![warn(clippy::all, rust_2018_idioms)]
// Uncomment to see which items need documentation:
// #![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod pipeline;
pub mod stages;
