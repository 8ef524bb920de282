//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::data::DEFAULT_DATASET_URL;

/// colsieve - prune wide sensor datasets by missing values, constant columns, and correlation
#[derive(Parser, Debug)]
#[command(name = "colsieve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input feature file path (space-separated, headerless, NaN for missing)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Labels file path. The first column holds the raw class and is
    /// binarized (1 becomes 1, everything else 0) into a trailing 'label'
    /// column of the output.
    #[arg(short, long)]
    pub labels: Option<PathBuf>,

    /// Output file path (CSV or Parquet, determined by extension).
    /// Defaults to the input directory with a '_reduced.csv' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Missing value threshold - drop columns whose missing ratio exceeds this value
    #[arg(long, default_value = "0.5", value_parser = validate_unit_interval)]
    pub missing_threshold: f64,

    /// Correlation threshold - drop one column from every pair whose absolute
    /// correlation is at or above this value
    #[arg(long, default_value = "0.9", value_parser = validate_unit_interval)]
    pub correlation_threshold: f64,

    /// Where to write the fitted pipeline JSON.
    /// Defaults to the input directory with a '_pipeline.json' suffix.
    #[arg(long)]
    pub pipeline_out: Option<PathBuf>,

    /// Where to write the reduction report JSON.
    /// Defaults to the input directory with a '_report.json' suffix.
    #[arg(long)]
    pub report_out: Option<PathBuf>,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference.
    /// Use 0 for a full table scan (slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and extract the SECOM dataset from the UCI repository
    Fetch {
        /// Archive URL to download
        #[arg(long, default_value = DEFAULT_DATASET_URL)]
        url: String,

        /// Directory to extract the dataset into
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Apply a previously fitted pipeline to a new feature file
    Apply {
        /// Fitted pipeline JSON produced by a reduce run
        pipeline: PathBuf,

        /// Input feature file path
        input: PathBuf,

        /// Output file path (optional, defaults to input with '_reduced.csv' suffix)
        output: Option<PathBuf>,

        /// Number of rows to use for schema inference
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

impl Cli {
    /// Get the input path, if one was provided.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Get the output path, deriving `<stem>_reduced.csv` next to the input
    /// when not explicitly provided.
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| derived_sibling(input, "_reduced.csv")),
        )
    }

    /// Get the fitted pipeline path, derived from the input file.
    pub fn pipeline_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(
            self.pipeline_out
                .clone()
                .unwrap_or_else(|| derived_sibling(input, "_pipeline.json")),
        )
    }

    /// Get the reduction report path, derived from the input file.
    pub fn report_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(
            self.report_out
                .clone()
                .unwrap_or_else(|| derived_sibling(input, "_report.json")),
        )
    }
}

/// Build a sibling path from the input's stem, e.g. `secom.data` with
/// suffix `_reduced.csv` becomes `secom_reduced.csv`.
pub fn derived_sibling(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}{}", stem, suffix))
}

/// Validator for threshold parameters
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "threshold must be between 0.0 and 1.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}
