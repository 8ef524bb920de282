//! Missing-value analysis: drop columns with too many missing observations

use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::{ensure_column_count, matrix, FittedStage, Stage};

/// Default missing-fraction threshold above which a column is dropped.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.5;

/// Drops columns whose fraction of missing values exceeds a threshold.
///
/// A column sitting exactly at the threshold is kept; only columns strictly
/// above it are dropped.
#[derive(Debug, Clone)]
pub struct MissingFilter {
    /// Maximum tolerated missing fraction, in `[0, 1]`
    pub threshold: f64,
}

impl MissingFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Inspect training data and record which columns survive.
    ///
    /// Fails on a zero-row matrix; a missing fraction over zero rows is
    /// undefined.
    pub fn fit(&self, x: &Mat<f64>) -> Result<FittedMissingFilter, PipelineError> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyTrainingData);
        }

        let ratios: Vec<f64> = (0..x.ncols())
            .into_par_iter()
            .map(|col| matrix::missing_fraction(x, col))
            .collect();

        let keep: Vec<bool> = ratios.iter().map(|&r| r <= self.threshold).collect();

        Ok(FittedMissingFilter {
            threshold: self.threshold,
            ratios,
            keep,
        })
    }
}

impl Default for MissingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_THRESHOLD)
    }
}

impl Stage for MissingFilter {
    fn name(&self) -> &'static str {
        "missing"
    }

    fn fit(&self, x: &Mat<f64>) -> Result<FittedStage, PipelineError> {
        Ok(FittedStage::Missing(MissingFilter::fit(self, x)?))
    }
}

/// Fitted state of [`MissingFilter`]: the keep mask plus the per-column
/// missing fractions observed at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedMissingFilter {
    threshold: f64,
    ratios: Vec<f64>,
    keep: Vec<bool>,
}

impl FittedMissingFilter {
    /// Apply the keep mask, preserving row order and the relative order of
    /// kept columns. Input must have the fit-time column count.
    pub fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        ensure_column_count(self.keep.len(), x)?;
        Ok(matrix::select_columns(x, &self.keep))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Keep mask, one entry per fit-time column.
    pub fn keep_mask(&self) -> &[bool] {
        &self.keep
    }

    /// Missing fraction per fit-time column.
    pub fn missing_ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn n_input_columns(&self) -> usize {
        self.keep.len()
    }

    /// Indices of the columns the mask removes.
    pub fn dropped_indices(&self) -> Vec<usize> {
        self.keep
            .iter()
            .enumerate()
            .filter_map(|(j, flag)| (!flag).then_some(j))
            .collect()
    }
}
