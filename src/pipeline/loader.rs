//! Sensor dataset I/O
//!
//! Reads the space-separated, headerless SECOM-style data files into a
//! feature matrix, reads label files, and writes reduced datasets back out
//! as CSV or Parquet.

use std::path::Path;

use anyhow::{Context, Result};
use faer::Mat;
use polars::prelude::*;

use super::matrix;

/// Load a space-separated, headerless numeric file as a feature matrix.
/// The literal `NaN` marks a missing observation.
///
/// `infer_schema_length` is the number of rows polars scans to infer column
/// types; 0 means scan the whole file.
pub fn load_features(path: &Path, infer_schema_length: usize) -> Result<Mat<f64>> {
    let df = read_raw(path, infer_schema_length)?;
    matrix::from_dataframe(&df)
        .with_context(|| format!("Failed to build feature matrix from {}", path.display()))
}

/// Load the first column of a labels file as raw integer classes.
pub fn load_labels(path: &Path) -> Result<Vec<i32>> {
    let df = read_raw(path, 100)?;
    let column = df
        .get_columns()
        .first()
        .with_context(|| format!("Labels file has no columns: {}", path.display()))?;
    let casted = column
        .cast(&DataType::Int32)
        .with_context(|| format!("Labels column is not numeric in {}", path.display()))?;
    let ca = casted
        .i32()
        .with_context(|| format!("Labels column is not numeric in {}", path.display()))?;
    Ok(ca.iter().map(|value| value.unwrap_or(0)).collect())
}

/// Collapse raw classes to pass/fail: 1 stays 1, everything else becomes 0.
pub fn binarize_labels(labels: &[i32]) -> Vec<u8> {
    labels.iter().map(|&label| u8::from(label == 1)).collect()
}

fn read_raw(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    LazyCsvReader::new(path)
        .with_separator(b' ')
        .with_has_header(false)
        .with_infer_schema_length(schema_length)
        .with_null_values(Some(NullValues::AllColumnsSingle("NaN".into())))
        .finish()
        .with_context(|| format!("Failed to open data file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to load data file: {}", path.display()))
}

/// Positional column name for a headerless dataset, `f0000` style.
pub fn index_column_name(index: usize) -> String {
    format!("f{:04}", index)
}

/// Positional names for the first `count` columns.
pub fn column_names(count: usize) -> Vec<String> {
    (0..count).map(index_column_name).collect()
}

/// Fail loudly when features and labels disagree on row count.
pub fn ensure_row_alignment(x: &Mat<f64>, labels: &[i32]) -> Result<()> {
    anyhow::ensure!(
        x.nrows() == labels.len(),
        "Row count mismatch: {} feature rows but {} labels",
        x.nrows(),
        labels.len()
    );
    Ok(())
}

/// Write a reduced dataset to CSV or Parquet based on the file extension.
/// Binarized labels, when given, land in a trailing `label` column.
pub fn save_dataset(
    x: &Mat<f64>,
    names: &[String],
    labels: Option<&[u8]>,
    path: &Path,
) -> Result<()> {
    let mut df = matrix::to_dataframe(x, names)?;

    if let Some(labels) = labels {
        anyhow::ensure!(
            labels.len() == x.nrows(),
            "Row count mismatch: {} feature rows but {} labels",
            x.nrows(),
            labels.len()
        );
        let values: Vec<i32> = labels.iter().map(|&label| i32::from(label)).collect();
        df.with_column(Column::new("label".into(), values))
            .context("Failed to attach label column")?;
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}
