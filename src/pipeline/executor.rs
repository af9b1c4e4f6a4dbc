//! Pipeline execution engine.
//!
//! Fits stages in order, each on the output of the previous one, and
//! replays the fitted stages on new data.

use super::spec::{PipelineSpec, SPEC_VERSION};
use crate::error::{ModelError, Result};
use crate::stages::Stage;
use polars::prelude::*;
use std::fmt;
use std::time::{Duration, Instant};

/// Report generated after a pipeline transform
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of rows processed
    pub rows: usize,

    /// Number of columns before processing
    pub columns_before: usize,

    /// Number of columns after processing
    pub columns_after: usize,

    /// Number of stages applied
    pub stages_applied: usize,

    /// Time taken for execution
    pub duration: Duration,
}

impl RunReport {
    /// Create a summary message
    pub fn summary(&self) -> String {
        format!(
            "Pipeline completed: {} rows, columns {} ({} → {}), {} stages, {:.3}s",
            self.rows,
            if self.columns_after < self.columns_before {
                "removed"
            } else {
                "unchanged"
            },
            self.columns_before,
            self.columns_after,
            self.stages_applied,
            self.duration.as_secs_f64()
        )
    }
}

/// Ordered sequence of stages sharing one fit/transform lifecycle
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
    fitted: bool,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            fitted: false,
        }
    }

    /// Append a stage. Adding a stage invalidates a previous fit.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
        self.fitted = false;
    }

    #[must_use]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.push(Box::new(stage));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Fit every stage in order.
    ///
    /// # Errors
    ///
    /// Returns the first stage error unchanged; the pipeline is then left
    /// unfitted.
    pub fn fit(&mut self, df: &DataFrame, target: Option<&Series>) -> Result<()> {
        self.fit_transform(df, target).map(|_| ())
    }

    /// Fit every stage in order and return the fully transformed frame.
    ///
    /// # Errors
    ///
    /// Returns the first stage error unchanged.
    pub fn fit_transform(&mut self, df: &DataFrame, target: Option<&Series>) -> Result<DataFrame> {
        let start = Instant::now();
        self.fitted = false;
        log::info!(
            "Fitting pipeline '{}' ({} stages) on {} rows x {} columns",
            self.name,
            self.stages.len(),
            df.height(),
            df.width()
        );

        let mut current = df.clone();
        for (idx, stage) in self.stages.iter_mut().enumerate() {
            log::debug!("Stage {}: {}", idx + 1, stage.description());
            current = stage.fit_transform(&current, target).inspect_err(|e| {
                log::warn!("Stage {} ({}) failed during fit: {e}", idx + 1, stage.name());
            })?;
        }

        self.fitted = true;
        log::info!(
            "Pipeline '{}' fitted in {:.3}s",
            self.name,
            start.elapsed().as_secs_f64()
        );
        Ok(current)
    }

    /// Apply every fitted stage in order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFitted`] before a successful fit, otherwise
    /// the first stage error unchanged.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.fitted {
            return Err(ModelError::NotFitted(format!("Pipeline '{}'", self.name)));
        }

        let mut current = df.clone();
        for (idx, stage) in self.stages.iter().enumerate() {
            current = stage.transform(&current).inspect_err(|e| {
                log::warn!("Stage {} ({}) failed during transform: {e}", idx + 1, stage.name());
            })?;
        }
        Ok(current)
    }

    /// Transform `df` and report what changed.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::transform`].
    pub fn run(&self, df: &DataFrame) -> Result<(DataFrame, RunReport)> {
        let start = Instant::now();
        let out = self.transform(df)?;

        let report = RunReport {
            rows: out.height(),
            columns_before: df.width(),
            columns_after: out.width(),
            stages_applied: self.stages.len(),
            duration: start.elapsed(),
        };
        log::info!("{}", report.summary());

        Ok((out, report))
    }

    /// Configuration of all stages as a serializable spec
    pub fn to_spec(&self) -> PipelineSpec {
        PipelineSpec {
            version: SPEC_VERSION.to_owned(),
            name: self.name.clone(),
            steps: self.stages.iter().map(|s| s.spec()).collect(),
        }
    }
}
