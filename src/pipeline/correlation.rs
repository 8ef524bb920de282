//! Correlation-based redundancy pruning
//!
//! Scans all column pairs for absolute Pearson correlation at or above a
//! threshold and greedily drops one member of each violating pair, keeping
//! the column with the higher variance.

use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::{ensure_column_count, matrix, FittedStage, Stage};

pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.9;

/// Column count at which the dense standardized-matrix product becomes
/// cheaper than per-pair streaming passes.
const MATRIX_STRATEGY_MIN_COLUMNS: usize = 16;

/// How the pairwise correlations are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationStrategy {
    /// Pick based on column count.
    #[default]
    Auto,
    /// One streaming co-moment pass per column pair.
    Pairwise,
    /// Standardize once, then a single `Z^T * Z` product via faer.
    Matrix,
}

/// Drops one column out of every pair whose absolute correlation reaches
/// the threshold. Expects a matrix with no missing values; pairs whose
/// correlation is undefined are left alone.
#[derive(Debug, Clone)]
pub struct CorrelationFilter {
    pub threshold: f64,
    pub strategy: CorrelationStrategy,
}

impl CorrelationFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            strategy: CorrelationStrategy::Auto,
        }
    }

    pub fn with_strategy(mut self, strategy: CorrelationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Scan pairs in ascending `(i, j)` order and resolve each violation
    /// greedily. A pair is skipped when either member was already dropped
    /// by an earlier decision. On a variance tie the lower index loses.
    pub fn fit(&self, x: &Mat<f64>) -> Result<FittedCorrelationFilter, PipelineError> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyTrainingData);
        }

        let n_cols = x.ncols();
        let variances: Vec<f64> = (0..n_cols)
            .into_par_iter()
            .map(|col| matrix::nan_variance(x, col))
            .collect();

        let use_matrix = match self.strategy {
            CorrelationStrategy::Pairwise => false,
            CorrelationStrategy::Matrix => true,
            CorrelationStrategy::Auto => n_cols >= MATRIX_STRATEGY_MIN_COLUMNS,
        };

        let violating = if use_matrix {
            violating_pairs_matrix(x, self.threshold)
        } else {
            violating_pairs_pairwise(x, self.threshold)
        };

        let mut keep = vec![true; n_cols];
        let mut decisions = Vec::new();
        for (i, j, correlation) in violating {
            if !keep[i] || !keep[j] {
                continue;
            }
            let (dropped, kept) = if variances[i] <= variances[j] {
                (i, j)
            } else {
                (j, i)
            };
            keep[dropped] = false;
            decisions.push(DropDecision {
                dropped,
                kept,
                correlation,
            });
        }

        Ok(FittedCorrelationFilter {
            threshold: self.threshold,
            keep,
            decisions,
        })
    }
}

impl Default for CorrelationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CORRELATION_THRESHOLD)
    }
}

impl Stage for CorrelationFilter {
    fn name(&self) -> &'static str {
        "correlation"
    }

    fn fit(&self, x: &Mat<f64>) -> Result<FittedStage, PipelineError> {
        Ok(FittedStage::Correlation(CorrelationFilter::fit(self, x)?))
    }
}

/// One resolved violation: which column was dropped in favor of which,
/// and the correlation that triggered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropDecision {
    pub dropped: usize,
    pub kept: usize,
    pub correlation: f64,
}

/// Fitted state of [`CorrelationFilter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedCorrelationFilter {
    threshold: f64,
    keep: Vec<bool>,
    decisions: Vec<DropDecision>,
}

impl FittedCorrelationFilter {
    /// Select the surviving columns. Input must have the fit-time column
    /// count; row count is free to differ.
    pub fn transform(&self, x: &Mat<f64>) -> Result<Mat<f64>, PipelineError> {
        ensure_column_count(self.keep.len(), x)?;
        Ok(matrix::select_columns(x, &self.keep))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn keep_mask(&self) -> &[bool] {
        &self.keep
    }

    /// The drop decisions in the order they were made.
    pub fn decisions(&self) -> &[DropDecision] {
        &self.decisions
    }

    pub fn n_input_columns(&self) -> usize {
        self.keep.len()
    }

    pub fn dropped_indices(&self) -> Vec<usize> {
        self.keep
            .iter()
            .enumerate()
            .filter(|(_, kept)| !**kept)
            .map(|(col, _)| col)
            .collect()
    }
}

/// All pairs at or above the threshold, ascending by `(i, j)`.
///
/// Streams each pair once with Welford co-moments, pairing up only rows
/// where both values are present. Undefined correlations are skipped.
fn violating_pairs_pairwise(x: &Mat<f64>, threshold: f64) -> Vec<(usize, usize, f64)> {
    let n_cols = x.ncols();
    let pairs: Vec<(usize, usize)> = (0..n_cols)
        .flat_map(|i| ((i + 1)..n_cols).map(move |j| (i, j)))
        .collect();

    let mut violating: Vec<(usize, usize, f64)> = pairs
        .into_par_iter()
        .filter_map(|(i, j)| {
            let r = pairwise_correlation(x, i, j);
            if !r.is_nan() && r.abs() >= threshold {
                Some((i, j, r))
            } else {
                None
            }
        })
        .collect();

    violating.sort_by_key(|&(i, j, _)| (i, j));
    violating
}

/// Pearson correlation of two columns over rows where both are present.
/// Returns NaN when fewer than two such rows exist or a column is flat.
fn pairwise_correlation(x: &Mat<f64>, i: usize, j: usize) -> f64 {
    let mut count = 0usize;
    let mut mean_i = 0.0;
    let mut mean_j = 0.0;
    let mut m2_i = 0.0;
    let mut m2_j = 0.0;
    let mut co_moment = 0.0;

    for row in 0..x.nrows() {
        let a = x[(row, i)];
        let b = x[(row, j)];
        if a.is_nan() || b.is_nan() {
            continue;
        }
        count += 1;
        let n = count as f64;
        let delta_a = a - mean_i;
        mean_i += delta_a / n;
        let delta_b = b - mean_j;
        mean_j += delta_b / n;
        m2_i += delta_a * (a - mean_i);
        m2_j += delta_b * (b - mean_j);
        co_moment += delta_a * (b - mean_j);
    }

    if count < 2 {
        return f64::NAN;
    }
    let denom = (m2_i * m2_j).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    co_moment / denom
}

/// All pairs at or above the threshold via one dense matrix product.
///
/// Standardizes every column with its population statistics, then reads
/// correlations off `Z^T * Z / n`. Flat columns standardize to NaN and
/// drop out of the violation list on their own.
fn violating_pairs_matrix(x: &Mat<f64>, threshold: f64) -> Vec<(usize, usize, f64)> {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let stats: Vec<(f64, f64)> = (0..n_cols)
        .into_par_iter()
        .map(|col| {
            let mut mean = 0.0;
            for row in 0..n_rows {
                mean += x[(row, col)];
            }
            mean /= n_rows as f64;
            let mut sum_sq = 0.0;
            for row in 0..n_rows {
                let delta = x[(row, col)] - mean;
                sum_sq += delta * delta;
            }
            (mean, (sum_sq / n_rows as f64).sqrt())
        })
        .collect();

    let mut z = Mat::<f64>::zeros(n_rows, n_cols);
    for col in 0..n_cols {
        let (mean, std_dev) = stats[col];
        for row in 0..n_rows {
            z[(row, col)] = (x[(row, col)] - mean) / std_dev;
        }
    }

    let product = z.transpose() * &z;

    let mut violating = Vec::new();
    for i in 0..n_cols {
        for j in (i + 1)..n_cols {
            let r = product[(i, j)] / n_rows as f64;
            if !r.is_nan() && r.abs() >= threshold {
                violating.push((i, j, r));
            }
        }
    }
    violating
}
