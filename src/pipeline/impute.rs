//! Median imputation: fill missing observations before correlation analysis

use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::{ensure_column_count, matrix, FittedStage, Stage};

/// Replaces missing values with the per-column median of the training data.
///
/// Keeps every column and every row; this is the stage that establishes the
/// no-missing-values precondition the correlation filter relies on.
#[derive(Debug, Clone, Default)]
pub struct MedianImputer;

impl MedianImputer {
    pub fn new() -> Self {
        Self
    }

    /// Compute per-column medians, ignoring missing values.
    ///
    /// A column with no non-missing values has no median to offer and fails
    /// the fit. In the standard stage order the constant filter has already
    /// removed such columns.
    pub fn fit(&self, x: &Mat<f64>) -> Result<FittedMedianImputer, PipelineError> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyTrainingData);
        }

        let medians: Vec<f64> = (0..x.ncols())
            .into_par_iter()
            .map(|col| matrix::nan_median(x, col).ok_or(PipelineError::AllMissingColumn { index: col }))
            .collect::<Result<_, _>>()?;

        Ok(FittedMedianImputer { medians })
    }
}

impl Stage for MedianImputer {
    fn name(&self) -> &'static str {
        "impute"
    }

    fn fit(&self, x: &Mat<f64>) -> Result<FittedStage, PipelineError> {
        Ok(FittedStage::Impute(MedianImputer::fit(self, x)?))
    }
}

/// Fitted state of [`MedianImputer`]: one median per fit-time column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedMedianImputer {
    medians: Vec<f64>,
}

impl FittedMedianImputer {
    /// Return a copy of the input with every NaN cell replaced by its
    /// column's fitted median. Input must have the fit-time column count.
    pub fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        ensure_column_count(self.medians.len(), x)?;

        let mut out = Mat::<f64>::zeros(x.nrows(), x.ncols());
        for col in 0..x.ncols() {
            let median = self.medians[col];
            for row in 0..x.nrows() {
                let value = x[(row, col)];
                out[(row, col)] = if value.is_nan() { median } else { value };
            }
        }
        Ok(out)
    }

    /// Fitted median per fit-time column.
    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    pub fn n_input_columns(&self) -> usize {
        self.medians.len()
    }

    /// Number of cells `transform` would fill in the given matrix.
    pub fn count_fills(&self, x: &Mat<f64>) -> usize {
        let mut filled = 0;
        for col in 0..x.ncols().min(self.medians.len()) {
            for row in 0..x.nrows() {
                if x[(row, col)].is_nan() {
                    filled += 1;
                }
            }
        }
        filled
    }
}
