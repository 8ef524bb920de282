//! Column-pruning pipeline
//!
//! Each stage is fit on a training matrix and yields an immutable fitted
//! value that can transform the training data and any later batch with the
//! same column layout. The standard stage order is missing-value filter,
//! constant filter, median imputation, correlation filter.

pub mod constant;
pub mod correlation;
pub mod error;
pub mod impute;
pub mod loader;
pub mod matrix;
pub mod missing;

use std::path::Path;
use std::time::{Duration, Instant};

use faer::Mat;
use serde::{Deserialize, Serialize};

pub use constant::{ConstantFilter, FittedConstantFilter};
pub use correlation::{
    CorrelationFilter, CorrelationStrategy, DropDecision, FittedCorrelationFilter,
    DEFAULT_CORRELATION_THRESHOLD,
};
pub use error::PipelineError;
pub use impute::{FittedMedianImputer, MedianImputer};
pub use missing::{FittedMissingFilter, MissingFilter, DEFAULT_MISSING_THRESHOLD};

/// Format marker written into saved pipeline files.
pub const PIPELINE_FORMAT_VERSION: u32 = 1;

/// A pipeline stage before fitting. Fitting never mutates the stage; it
/// produces a [`FittedStage`] holding everything `transform` needs.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn fit(&self, x: &Mat<f64>) -> Result<FittedStage, PipelineError>;
}

/// Fitted state of any stage, serializable as a tagged JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", content = "state", rename_all = "snake_case")]
pub enum FittedStage {
    Missing(FittedMissingFilter),
    Constant(FittedConstantFilter),
    Impute(FittedMedianImputer),
    Correlation(FittedCorrelationFilter),
}

impl FittedStage {
    pub fn name(&self) -> &'static str {
        match self {
            FittedStage::Missing(_) => "missing",
            FittedStage::Constant(_) => "constant",
            FittedStage::Impute(_) => "impute",
            FittedStage::Correlation(_) => "correlation",
        }
    }

    pub fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        match self {
            FittedStage::Missing(fitted) => fitted.transform(x),
            FittedStage::Constant(fitted) => fitted.transform(x),
            FittedStage::Impute(fitted) => fitted.transform(x),
            FittedStage::Correlation(fitted) => fitted.transform(x),
        }
    }

    /// Column count this stage was fitted on.
    pub fn n_input_columns(&self) -> usize {
        match self {
            FittedStage::Missing(fitted) => fitted.n_input_columns(),
            FittedStage::Constant(fitted) => fitted.n_input_columns(),
            FittedStage::Impute(fitted) => fitted.n_input_columns(),
            FittedStage::Correlation(fitted) => fitted.n_input_columns(),
        }
    }

    /// Keep mask over the stage's input columns, or `None` for stages that
    /// keep every column.
    pub fn keep_mask(&self) -> Option<&[bool]> {
        match self {
            FittedStage::Missing(fitted) => Some(fitted.keep_mask()),
            FittedStage::Constant(fitted) => Some(fitted.keep_mask()),
            FittedStage::Impute(_) => None,
            FittedStage::Correlation(fitted) => Some(fitted.keep_mask()),
        }
    }
}

/// Check a matrix against the column count a stage was fitted on.
pub(crate) fn ensure_column_count(expected: usize, x: &Mat<f64>) -> Result<(), PipelineError> {
    if x.ncols() != expected {
        return Err(PipelineError::ColumnCountMismatch {
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}

/// Thresholds for the standard pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ReduceConfig {
    pub missing_threshold: f64,
    pub correlation_threshold: f64,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
        }
    }
}

/// An ordered list of stages, fitted front to back. Each stage is fitted
/// on the output of the previous stage's transform.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

/// What happened in one stage during [`Pipeline::fit_transform`].
pub struct StageRun {
    pub name: &'static str,
    pub duration: Duration,
    pub columns_in: usize,
    pub columns_out: usize,
    pub cells_filled: usize,
}

/// Fitted pipeline plus the reduced training matrix and per-stage notes.
pub struct PipelineRun {
    pub fitted: FittedPipeline,
    pub output: Mat<f64>,
    pub stages: Vec<StageRun>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The standard stage order: missing filter, constant filter, median
    /// imputation, correlation filter.
    pub fn standard(config: &ReduceConfig) -> Self {
        Self::new(vec![
            Box::new(MissingFilter::new(config.missing_threshold)),
            Box::new(ConstantFilter::new()),
            Box::new(MedianImputer::new()),
            Box::new(CorrelationFilter::new(config.correlation_threshold)),
        ])
    }

    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Fit every stage in order and carry the transformed matrix through.
    pub fn fit_transform(&self, x: &Mat<f64>) -> Result<PipelineRun, PipelineError> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyTrainingData);
        }

        let mut current = x.clone();
        let mut fitted_stages = Vec::with_capacity(self.stages.len());
        let mut runs = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let started = Instant::now();
            let columns_in = current.ncols();

            let fitted = stage.fit(&current)?;
            let cells_filled = match &fitted {
                FittedStage::Impute(imputer) => imputer.count_fills(&current),
                _ => 0,
            };
            current = fitted.transform(&current)?;

            runs.push(StageRun {
                name: stage.name(),
                duration: started.elapsed(),
                columns_in,
                columns_out: current.ncols(),
                cells_filled,
            });
            fitted_stages.push(fitted);
        }

        Ok(PipelineRun {
            fitted: FittedPipeline {
                stages: fitted_stages,
            },
            output: current,
            stages: runs,
        })
    }

    pub fn fit(&self, x: &Mat<f64>) -> Result<FittedPipeline, PipelineError> {
        Ok(self.fit_transform(x)?.fitted)
    }
}

/// A fully fitted pipeline. Applying it replays each stage's transform in
/// fit order; the input must match the first stage's column count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    stages: Vec<FittedStage>,
}

impl FittedPipeline {
    /// Assemble a fitted pipeline from stages fitted one at a time, in the
    /// order they were fitted.
    pub fn new(stages: Vec<FittedStage>) -> Self {
        Self { stages }
    }

    pub fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        let mut current = x.clone();
        for stage in &self.stages {
            current = stage.transform(&current)?;
        }
        Ok(current)
    }

    pub fn stages(&self) -> &[FittedStage] {
        &self.stages
    }

    /// Column count the pipeline was fitted on, 0 when there are no stages.
    pub fn n_input_columns(&self) -> usize {
        self.stages.first().map_or(0, FittedStage::n_input_columns)
    }

    /// Indices into the original column order that survive every stage.
    pub fn surviving_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.n_input_columns()).collect();
        for stage in &self.stages {
            if let Some(mask) = stage.keep_mask() {
                indices = indices
                    .iter()
                    .zip(mask.iter())
                    .filter(|(_, keep)| **keep)
                    .map(|(index, _)| *index)
                    .collect();
            }
        }
        indices
    }

    pub fn n_output_columns(&self) -> usize {
        self.surviving_indices().len()
    }
}

/// On-disk wrapper around a fitted pipeline.
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedPipeline {
    pub version: u32,
    pub created_at: String,
    pub pipeline: FittedPipeline,
}

/// Write a fitted pipeline to pretty-printed JSON.
pub fn save_pipeline(fitted: &FittedPipeline, path: &Path) -> Result<(), PipelineError> {
    let saved = SavedPipeline {
        version: PIPELINE_FORMAT_VERSION,
        created_at: chrono::Local::now().to_rfc3339(),
        pipeline: fitted.clone(),
    };
    let json = serde_json::to_string_pretty(&saved)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a fitted pipeline back from JSON.
pub fn load_pipeline(path: &Path) -> Result<FittedPipeline, PipelineError> {
    let raw = std::fs::read_to_string(path)?;
    let saved: SavedPipeline = serde_json::from_str(&raw)?;
    Ok(saved.pipeline)
}
