//! Error types for the reduction pipeline contract.
//!
//! These cover the failure modes of fitting and applying stages: anything
//! that reaches one of them is a usage error and is surfaced immediately
//! rather than masked or recovered from.

use thiserror::Error;

/// Errors raised by pipeline stages and the pipeline runner.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A matrix was passed to `transform` with a column count different from
    /// the one seen at fit time. Input is never truncated or padded to fit.
    #[error("column count mismatch: fitted on {expected} columns, input has {actual}")]
    ColumnCountMismatch {
        /// Column count recorded when the stage was fitted
        expected: usize,
        /// Column count of the matrix passed to transform
        actual: usize,
    },

    /// Fit was attempted on a matrix with zero rows. Missing fractions would
    /// divide by zero, so this fails loudly instead of storing NaN masks.
    #[error("cannot fit on a matrix with zero rows")]
    EmptyTrainingData,

    /// The imputer found a column with no non-missing values, so no median
    /// exists to fill with. In the standard stage order such columns are
    /// removed by the constant filter before imputation.
    #[error("column {index} has no non-missing values to impute from")]
    AllMissingColumn {
        /// Zero-based index of the offending column
        index: usize,
    },

    /// A saved pipeline file could not be read.
    #[error("failed to read pipeline file: {0}")]
    PipelineFileRead(#[from] std::io::Error),

    /// A saved pipeline file could not be parsed.
    #[error("failed to parse pipeline file: {0}")]
    PipelineFileParse(#[from] serde_json::Error),
}
