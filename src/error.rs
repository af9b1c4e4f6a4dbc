//! Error handling for the preprocessing stages.
//!
//! Every fallible operation in this crate returns [`Result`], whose error
//! type is [`ModelError`]. Only one variant is meant for callers feeding bad
//! data into a fitted pipeline:
//!
//! - [`ModelError::InvalidModelInput`] is raised by the stages that validate
//!   their input (the target-mean encoder and the log transformer).
//!
//! The remaining variants wrap native failures (polars, I/O, JSON) or
//! contract violations such as transforming before fitting.
//!
//! ```
//! use regression_features::error::ModelError;
//!
//! fn describe(err: &ModelError) -> &'static str {
//!     match err {
//!         ModelError::InvalidModelInput(_) => "bad input",
//!         ModelError::NotFitted(_) => "fit first",
//!         _ => "other",
//!     }
//! }
//! ```

use std::fmt;

/// Main error type for preprocessing operations.
#[derive(Debug)]
pub enum ModelError {
    /// Input rejected by a validating stage; the message names the columns.
    InvalidModelInput(String),

    /// A stateful stage (or pipeline) was asked to transform before fit.
    NotFitted(String),

    /// A supervised stage was fit without labels.
    MissingTarget(String),

    /// Data processing errors raised by polars (missing column, length
    /// mismatch, failed cast, ...)
    DataProcessing(String),

    /// Pipeline spec errors
    Config(String),

    /// I/O errors while reading or writing a pipeline spec
    Io(std::io::Error),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidModelInput(msg) => write!(f, "Invalid model input: {msg}"),
            Self::NotFitted(stage) => {
                write!(f, "{stage} must be fit before calling transform")
            }
            Self::MissingTarget(stage) => write!(f, "{stage} requires a target to fit"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for ModelError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ModelError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: ModelError = e.into();
            ModelError::Other(format!("{}: {}", f(), err))
        })
    }
}
