//! Shared test utilities and fixture matrices

use faer::Mat;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a matrix from row slices. `f64::NAN` marks a missing cell.
pub fn mat_from_rows(rows: &[&[f64]]) -> Mat<f64> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, |row| row.len());
    let mut x = Mat::<f64>::zeros(n_rows, n_cols);
    for (r, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), n_cols, "All fixture rows must have equal width");
        for (c, value) in row.iter().enumerate() {
            x[(r, c)] = *value;
        }
    }
    x
}

/// 5x5 matrix with one candidate for every drop stage:
/// - col 0: clean ascending values
/// - col 1: exactly 2*col0 (perfectly correlated, higher variance)
/// - col 2: 80% missing
/// - col 3: constant
/// - col 4: independent noise
pub fn reduction_fixture() -> Mat<f64> {
    let nan = f64::NAN;
    mat_from_rows(&[
        &[1.0, 2.0, nan, 5.0, 9.0],
        &[2.0, 4.0, nan, 5.0, 3.0],
        &[3.0, 6.0, nan, 5.0, 7.0],
        &[4.0, 8.0, nan, 5.0, 1.0],
        &[5.0, 10.0, 1.0, 5.0, 6.0],
    ])
}

/// 4x5 matrix used by the report tests: col 0 is mostly missing, col 1 is
/// constant, cols 2 and 3 are identical, col 4 varies freely.
pub fn report_fixture() -> Mat<f64> {
    let nan = f64::NAN;
    mat_from_rows(&[
        &[nan, 7.0, 1.0, 1.0, 5.0],
        &[nan, 7.0, 2.0, 2.0, 3.0],
        &[nan, 7.0, 3.0, 3.0, 8.0],
        &[1.0, 7.0, 4.0, 4.0, 1.0],
    ])
}

/// Random dense matrix for stress and equivalence tests. Seeded so the
/// fixture is stable across runs.
pub fn random_matrix(rows: usize, cols: usize, seed: u64) -> Mat<f64> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let mut x = Mat::<f64>::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            x[(r, c)] = rng.gen_range(-10.0..10.0);
        }
    }
    x
}

/// Write a matrix as a space-separated, headerless feature file the way
/// the SECOM distribution ships it. NaN cells become the literal `NaN`.
pub fn create_temp_features(x: &Mat<f64>) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("features.data");

    let mut file = std::fs::File::create(&path).unwrap();
    for r in 0..x.nrows() {
        let fields: Vec<String> = (0..x.ncols())
            .map(|c| {
                let value = x[(r, c)];
                if value.is_nan() {
                    "NaN".to_string()
                } else {
                    format!("{}", value)
                }
            })
            .collect();
        writeln!(file, "{}", fields.join(" ")).unwrap();
    }
    drop(file);

    (temp_dir, path)
}

/// Write a SECOM-style labels file: raw class then a quoted timestamp.
pub fn create_temp_labels(temp_dir: &TempDir, labels: &[i32]) -> PathBuf {
    let path = temp_dir.path().join("labels.data");

    let mut file = std::fs::File::create(&path).unwrap();
    for label in labels {
        writeln!(file, "{} \"19/07/2008 11:55:00\"", label).unwrap();
    }
    drop(file);

    path
}

/// Assert a matrix has the expected shape.
pub fn assert_shape(x: &Mat<f64>, expected_rows: usize, expected_cols: usize) {
    assert_eq!(
        x.nrows(),
        expected_rows,
        "Row count mismatch: expected {}, got {}",
        expected_rows,
        x.nrows()
    );
    assert_eq!(
        x.ncols(),
        expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols,
        x.ncols()
    );
}

/// Assert one column matches the expected values, treating NaN as equal
/// to NaN.
pub fn assert_column_eq(x: &Mat<f64>, col: usize, expected: &[f64]) {
    assert_eq!(
        x.nrows(),
        expected.len(),
        "Column {} has {} rows, expected {}",
        col,
        x.nrows(),
        expected.len()
    );
    for (row, want) in expected.iter().enumerate() {
        let got = x[(row, col)];
        if want.is_nan() {
            assert!(got.is_nan(), "Expected NaN at ({}, {}), got {}", row, col, got);
        } else {
            assert!(
                (got - want).abs() < 1e-12,
                "Value mismatch at ({}, {}): expected {}, got {}",
                row,
                col,
                want,
                got
            );
        }
    }
}
