//! Report module - summarizing reduction results

pub mod reduction_report;
pub mod summary;

pub use reduction_report::*;
pub use summary::*;
