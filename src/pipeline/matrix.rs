//! Positional feature-matrix model and NaN-aware column statistics
//!
//! Every stage of the pipeline operates on a `faer::Mat<f64>` where rows are
//! observations and columns are features. Missing observations are carried as
//! the NaN sentinel; column identity is the column index, not a name.

use anyhow::{Context, Result};
use faer::Mat;
use polars::prelude::*;
use std::collections::HashSet;

/// Convert a DataFrame into the positional matrix model.
///
/// Every column is cast to Float64 in place, preserving column order: nulls
/// and values that cannot be represented as a float become the NaN sentinel.
pub fn from_dataframe(df: &DataFrame) -> Result<Mat<f64>> {
    let n_rows = df.height();
    let n_cols = df.width();

    let mut x = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let float_col = column
            .cast(&DataType::Float64)
            .with_context(|| format!("Failed to cast column {} to Float64", col_idx))?;
        let ca = float_col
            .f64()
            .with_context(|| format!("Failed to read column {} as Float64", col_idx))?;
        for (row_idx, value) in ca.iter().enumerate() {
            x[(row_idx, col_idx)] = value.unwrap_or(f64::NAN);
        }
    }

    Ok(x)
}

/// Convert a matrix back into a DataFrame with the given column names.
///
/// `names` must have one entry per matrix column.
pub fn to_dataframe(x: &Mat<f64>, names: &[String]) -> Result<DataFrame> {
    anyhow::ensure!(
        names.len() == x.ncols(),
        "Column name count {} does not match matrix column count {}",
        names.len(),
        x.ncols()
    );

    let columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(col_idx, name)| {
            let values: Vec<f64> = (0..x.nrows()).map(|row| x[(row, col_idx)]).collect();
            Column::new(name.as_str().into(), values)
        })
        .collect();

    DataFrame::new(columns).context("Failed to assemble DataFrame from matrix")
}

/// Copy the columns flagged `true` in `keep` into a new matrix, preserving
/// row order and the relative order of the kept columns.
pub fn select_columns(x: &Mat<f64>, keep: &[bool]) -> Mat<f64> {
    let kept: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(j, flag)| flag.then_some(j))
        .collect();

    let mut out = Mat::<f64>::zeros(x.nrows(), kept.len());
    for (out_col, &src_col) in kept.iter().enumerate() {
        for row in 0..x.nrows() {
            out[(row, out_col)] = x[(row, src_col)];
        }
    }
    out
}

/// Fraction of rows in `col` holding the NaN sentinel.
///
/// The matrix must have at least one row; callers guard against empty fit
/// data before computing fractions.
pub fn missing_fraction(x: &Mat<f64>, col: usize) -> f64 {
    let missing = (0..x.nrows()).filter(|&row| x[(row, col)].is_nan()).count();
    missing as f64 / x.nrows() as f64
}

/// Number of distinct non-missing values in `col`.
///
/// Distinctness is exact: two values count as the same value only when their
/// bit patterns are identical, so `0.0` and `-0.0` are two distinct values.
pub fn distinct_non_missing(x: &Mat<f64>, col: usize) -> usize {
    let mut seen: HashSet<u64> = HashSet::new();
    for row in 0..x.nrows() {
        let value = x[(row, col)];
        if !value.is_nan() {
            seen.insert(value.to_bits());
        }
    }
    seen.len()
}

/// Population variance of `col`, ignoring missing values.
///
/// Single-pass Welford update for numerical stability. NaN when the column
/// has no non-missing values, 0.0 for a single observation.
pub fn nan_variance(x: &Mat<f64>, col: usize) -> f64 {
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut m2 = 0.0;

    for row in 0..x.nrows() {
        let value = x[(row, col)];
        if value.is_nan() {
            continue;
        }
        count += 1;
        let delta = value - mean;
        mean += delta / count as f64;
        m2 += delta * (value - mean);
    }

    if count == 0 {
        f64::NAN
    } else {
        m2 / count as f64
    }
}

/// Median of the non-missing values in `col`, or `None` when every value is
/// missing. Even-length columns average the two middle values.
pub fn nan_median(x: &Mat<f64>, col: usize) -> Option<f64> {
    let mut values: Vec<f64> = (0..x.nrows())
        .map(|row| x[(row, col)])
        .filter(|v| !v.is_nan())
        .collect();

    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Estimated in-memory size of the matrix in megabytes.
pub fn estimated_size_mb(x: &Mat<f64>) -> f64 {
    (x.nrows() * x.ncols() * std::mem::size_of::<f64>()) as f64 / (1024.0 * 1024.0)
}
