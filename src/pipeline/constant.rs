//! Constant-column analysis: drop columns carrying no information

use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::{ensure_column_count, matrix, FittedStage, Stage};

/// Drops columns with at most one distinct non-missing value.
///
/// All-missing columns have zero distinct values and are dropped too.
/// Distinctness is bit-exact (no tolerance): `0.0` and `-0.0` are two
/// distinct values, and any rounding noise keeps a column alive.
#[derive(Debug, Clone, Default)]
pub struct ConstantFilter;

impl ConstantFilter {
    pub fn new() -> Self {
        Self
    }

    /// Count distinct non-missing values per column and keep those with more
    /// than one.
    pub fn fit(&self, x: &Mat<f64>) -> Result<FittedConstantFilter, PipelineError> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyTrainingData);
        }

        let distinct_counts: Vec<usize> = (0..x.ncols())
            .into_par_iter()
            .map(|col| matrix::distinct_non_missing(x, col))
            .collect();

        let keep: Vec<bool> = distinct_counts.iter().map(|&count| count > 1).collect();

        Ok(FittedConstantFilter {
            distinct_counts,
            keep,
        })
    }
}

impl Stage for ConstantFilter {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn fit(&self, x: &Mat<f64>) -> Result<FittedStage, PipelineError> {
        Ok(FittedStage::Constant(ConstantFilter::fit(self, x)?))
    }
}

/// Fitted state of [`ConstantFilter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedConstantFilter {
    distinct_counts: Vec<usize>,
    keep: Vec<bool>,
}

impl FittedConstantFilter {
    /// Apply the keep mask. Input must have the fit-time column count.
    pub fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        ensure_column_count(self.keep.len(), x)?;
        Ok(matrix::select_columns(x, &self.keep))
    }

    /// Keep mask, one entry per fit-time column.
    pub fn keep_mask(&self) -> &[bool] {
        &self.keep
    }

    /// Distinct non-missing value count per fit-time column.
    pub fn distinct_counts(&self) -> &[usize] {
        &self.distinct_counts
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
