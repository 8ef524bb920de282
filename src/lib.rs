//! colsieve: Column Pruning Library
//!
//! A library for pruning columns in wide sensor datasets using missing
//! value analysis, constant detection, median imputation, and
//! correlation-based reduction.

pub mod cli;
pub mod data;
pub mod pipeline;
pub mod report;
pub mod utils;
