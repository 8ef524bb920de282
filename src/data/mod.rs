//! Dataset acquisition

pub mod fetch;

pub use fetch::{dataset_paths, extract_archive, fetch_dataset, DatasetPaths, DEFAULT_DATASET_URL};
