//! Pipeline specification data structures.
//!
//! A spec lists the stages of a pipeline and their hyperparameters as JSON:
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "name": "house_prices",
//!   "steps": [
//!     { "op": "categorical_imputer", "variables": ["MasVnrType", "BsmtQual"] },
//!     { "op": "temporal_variable", "variables": "YearRemodAdd", "reference_variable": "YrSold" },
//!     { "op": "rare_label_encoder", "variables": ["MSZoning"], "tol": 0.01 },
//!     { "op": "drop_features", "variables_to_drop": "YrSold" }
//!   ]
//! }
//! ```
//!
//! Column arguments accept either one name or a list; both load as a list.

use super::executor::Pipeline;
use crate::error::{Result, ResultExt as _};
use crate::stages::{
    CategoricalEncoder, CategoricalImputer, DEFAULT_TOLERANCE, DropUnnecessaryFeatures,
    LogTransformer, NumericalImputer, RareLabelCategoricalEncoder, Stage,
    TemporalVariableEstimator,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Current pipeline spec version
pub const SPEC_VERSION: &str = "0.1";

/// Root pipeline specification structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Specification version for future migrations
    pub version: String,

    /// Human-readable pipeline name
    pub name: String,

    /// Ordered sequence of stages
    #[serde(default)]
    pub steps: Vec<StageSpec>,
}

impl PipelineSpec {
    /// Create an empty pipeline spec
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SPEC_VERSION.to_owned(),
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Load a pipeline spec from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read pipeline spec file '{}'", path.display())
        })?;
        Self::from_json(&content)
    }

    /// Parse a pipeline spec from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save pipeline spec to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        let path = path.as_ref();
        std::fs::write(path, json).with_context(|| {
            format!("Failed to write pipeline spec file '{}'", path.display())
        })
    }

    /// Serialize pipeline spec to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Instantiate an unfitted pipeline with one stage per step
    pub fn build(&self) -> Pipeline {
        let mut pipeline = Pipeline::new(self.name.clone());
        for step in &self.steps {
            pipeline.push(step.build());
        }
        pipeline
    }
}

/// One pipeline stage and its hyperparameters (tagged by `op`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StageSpec {
    /// Fill missing categorical values with a sentinel label
    CategoricalImputer {
        #[serde(deserialize_with = "one_or_many")]
        variables: Vec<String>,
    },

    /// Fill missing numerical values with the training mode
    NumericalImputer {
        #[serde(deserialize_with = "one_or_many")]
        variables: Vec<String>,
    },

    /// Replace columns with their distance to a reference column
    TemporalVariable {
        #[serde(deserialize_with = "one_or_many")]
        variables: Vec<String>,
        reference_variable: String,
    },

    /// Collapse infrequent labels
    RareLabelEncoder {
        #[serde(deserialize_with = "one_or_many")]
        variables: Vec<String>,
        #[serde(default = "default_tolerance")]
        tol: f64,
    },

    /// Rank categories by mean target
    CategoricalEncoder {
        #[serde(deserialize_with = "one_or_many")]
        variables: Vec<String>,
    },

    /// Natural log of strictly positive columns
    LogTransformer {
        #[serde(deserialize_with = "one_or_many")]
        variables: Vec<String>,
    },

    /// Remove columns
    DropFeatures {
        #[serde(deserialize_with = "one_or_many")]
        variables_to_drop: Vec<String>,
    },
}

impl StageSpec {
    /// The `op` tag of this step
    pub fn op(&self) -> &'static str {
        match self {
            Self::CategoricalImputer { .. } => "categorical_imputer",
            Self::NumericalImputer { .. } => "numerical_imputer",
            Self::TemporalVariable { .. } => "temporal_variable",
            Self::RareLabelEncoder { .. } => "rare_label_encoder",
            Self::CategoricalEncoder { .. } => "categorical_encoder",
            Self::LogTransformer { .. } => "log_transformer",
            Self::DropFeatures { .. } => "drop_features",
        }
    }

    /// Columns the step reads or rewrites (excluding a temporal reference)
    pub fn columns(&self) -> &[String] {
        match self {
            Self::CategoricalImputer { variables }
            | Self::NumericalImputer { variables }
            | Self::TemporalVariable { variables, .. }
            | Self::RareLabelEncoder { variables, .. }
            | Self::CategoricalEncoder { variables }
            | Self::LogTransformer { variables } => variables,
            Self::DropFeatures { variables_to_drop } => variables_to_drop,
        }
    }

    /// Instantiate the unfitted stage
    pub fn build(&self) -> Box<dyn Stage> {
        match self {
            Self::CategoricalImputer { variables } => {
                Box::new(CategoricalImputer::new(variables.iter().cloned()))
            }
            Self::NumericalImputer { variables } => {
                Box::new(NumericalImputer::new(variables.iter().cloned()))
            }
            Self::TemporalVariable {
                variables,
                reference_variable,
            } => Box::new(TemporalVariableEstimator::new(
                variables.iter().cloned(),
                reference_variable.clone(),
            )),
            Self::RareLabelEncoder { variables, tol } => Box::new(
                RareLabelCategoricalEncoder::new(variables.iter().cloned()).with_tolerance(*tol),
            ),
            Self::CategoricalEncoder { variables } => {
                Box::new(CategoricalEncoder::new(variables.iter().cloned()))
            }
            Self::LogTransformer { variables } => {
                Box::new(LogTransformer::new(variables.iter().cloned()))
            }
            Self::DropFeatures { variables_to_drop } => {
                Box::new(DropUnnecessaryFeatures::new(variables_to_drop.iter().cloned()))
            }
        }
    }
}

/// A single column name or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
