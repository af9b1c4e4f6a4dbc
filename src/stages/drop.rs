use super::{Stage, to_columns};
use crate::error::Result;
use crate::pipeline::spec::StageSpec;
use polars::prelude::*;

/// Removes columns that the model does not use.
#[derive(Debug, Clone)]
pub struct DropUnnecessaryFeatures {
    variables_to_drop: Vec<String>,
}

impl DropUnnecessaryFeatures {
    pub fn new<I, S>(variables_to_drop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables_to_drop: to_columns(variables_to_drop),
        }
    }

    pub fn variables_to_drop(&self) -> &[String] {
        &self.variables_to_drop
    }
}

impl Stage for DropUnnecessaryFeatures {
    fn name(&self) -> &'static str {
        "drop_features"
    }

    fn fit(&mut self, _df: &DataFrame, _target: Option<&Series>) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        for name in &self.variables_to_drop {
            out = out.drop(name)?;
        }
        Ok(out)
    }

    fn description(&self) -> String {
        format!("Drop {} columns", self.variables_to_drop.len())
    }

    fn spec(&self) -> StageSpec {
        StageSpec::DropFeatures {
            variables_to_drop: self.variables_to_drop.clone(),
        }
    }
}
