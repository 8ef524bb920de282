//! Unit tests for correlation-based redundancy pruning

use colsieve::pipeline::{
    CorrelationFilter, CorrelationStrategy, PipelineError, DEFAULT_CORRELATION_THRESHOLD,
};
use faer::Mat;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_perfectly_correlated_pair_loses_one_member() {
    // col 1 = 2 * col 0, correlation exactly 1.0
    let x = mat_from_rows(&[
        &[1.0, 2.0],
        &[2.0, 4.0],
        &[3.0, 6.0],
        &[4.0, 8.0],
        &[5.0, 10.0],
    ]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(
        fitted.keep_mask(),
        &[false, true],
        "The lower-variance member of the pair must be dropped"
    );

    let decisions = fitted.decisions();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].dropped, 0);
    assert_eq!(decisions[0].kept, 1);
    assert!(
        decisions[0].correlation.abs() > 0.999,
        "Recorded correlation should be ~1.0, got {}",
        decisions[0].correlation
    );
}

#[test]
fn test_higher_variance_member_survives_either_order() {
    // Same pair with the wide column first
    let x = mat_from_rows(&[
        &[2.0, 1.0],
        &[4.0, 2.0],
        &[6.0, 3.0],
        &[8.0, 4.0],
        &[10.0, 5.0],
    ]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(
        fitted.keep_mask(),
        &[true, false],
        "Drop choice must follow variance, not column position"
    );
    assert_eq!(fitted.dropped_indices(), vec![1]);
}

#[test]
fn test_variance_tie_drops_lower_index() {
    let x = mat_from_rows(&[
        &[1.0, 1.0],
        &[2.0, 2.0],
        &[3.0, 3.0],
    ]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(fitted.keep_mask(), &[false, true]);
}

#[test]
fn test_negative_correlation_counts_by_magnitude() {
    let x = mat_from_rows(&[
        &[1.0, -1.0],
        &[2.0, -2.0],
        &[3.0, -3.0],
        &[4.0, -4.0],
    ]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(
        fitted.dropped_indices().len(),
        1,
        "Perfect negative correlation is still a violation"
    );
    assert!(
        fitted.decisions()[0].correlation < -0.999,
        "Recorded correlation should keep its sign, got {}",
        fitted.decisions()[0].correlation
    );
}

#[test]
fn test_threshold_is_inclusive() {
    // Identical columns give correlation exactly 1.0, which must violate a
    // threshold of exactly 1.0
    let x = mat_from_rows(&[
        &[1.0, 1.0],
        &[2.0, 2.0],
        &[3.0, 3.0],
    ]);

    let fitted = CorrelationFilter::new(1.0)
        .with_strategy(CorrelationStrategy::Pairwise)
        .fit(&x)
        .unwrap();

    assert_eq!(
        fitted.dropped_indices(),
        vec![0],
        "A pair sitting exactly at the threshold is a violation"
    );
}

#[test]
fn test_below_threshold_pair_survives() {
    // r = 0.5 exactly for this permutation pair
    let x = mat_from_rows(&[
        &[1.0, 1.0],
        &[2.0, 3.0],
        &[3.0, 2.0],
    ]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(fitted.keep_mask(), &[true, true]);
    assert!(fitted.decisions().is_empty());
}

#[test]
fn test_greedy_scan_skips_pairs_with_a_dropped_member() {
    // Three identical columns: pairs (0,1), (0,2), (1,2) all violate.
    // Ascending scan drops 0 against 1, skips (0,2), then drops 1 against 2.
    let x = mat_from_rows(&[
        &[1.0, 1.0, 1.0],
        &[2.0, 2.0, 2.0],
        &[3.0, 3.0, 3.0],
    ]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(
        fitted.keep_mask(),
        &[false, false, true],
        "Only the last of three identical columns survives"
    );

    let decisions = fitted.decisions();
    assert_eq!(decisions.len(), 2, "The (0,2) pair must be skipped, not resolved");
    assert_eq!((decisions[0].dropped, decisions[0].kept), (0, 1));
    assert_eq!((decisions[1].dropped, decisions[1].kept), (1, 2));
}

#[test]
fn test_flat_column_never_violates() {
    // A constant column has undefined correlation with everything
    let x = mat_from_rows(&[
        &[5.0, 1.0, 9.0],
        &[5.0, 2.0, 3.0],
        &[5.0, 3.0, 7.0],
    ]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(
        fitted.keep_mask(),
        &[true, true, true],
        "Undefined correlations are skipped, not treated as violations"
    );
}

#[test]
fn test_pairs_without_overlapping_rows_are_skipped() {
    let nan = f64::NAN;
    // The two columns are never observed in the same row
    let x = mat_from_rows(&[
        &[1.0, nan],
        &[nan, 2.0],
        &[3.0, nan],
        &[nan, 4.0],
    ]);

    let fitted = CorrelationFilter::new(0.0)
        .with_strategy(CorrelationStrategy::Pairwise)
        .fit(&x)
        .unwrap();

    assert_eq!(
        fitted.keep_mask(),
        &[true, true],
        "No overlap means no correlation evidence, so both survive"
    );
}

#[test]
fn test_pairwise_handles_missing_rows() {
    let nan = f64::NAN;
    // Complete rows of the pair line up perfectly; the NaN row is ignored
    let x = mat_from_rows(&[
        &[1.0, 2.0],
        &[nan, 50.0],
        &[2.0, 4.0],
        &[3.0, 6.0],
    ]);

    let fitted = CorrelationFilter::new(0.9)
        .with_strategy(CorrelationStrategy::Pairwise)
        .fit(&x)
        .unwrap();

    assert_eq!(
        fitted.dropped_indices().len(),
        1,
        "Correlation over complete rows only should still catch the pair"
    );
}

#[test]
fn test_uncorrelated_noise_keeps_everything() {
    let x = random_matrix(200, 8, 7);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert_eq!(fitted.keep_mask(), &[true; 8]);
    assert!(fitted.decisions().is_empty());
}

#[test]
fn test_pairwise_and_matrix_strategies_agree() {
    // 20 columns of independent noise with two planted duplicates
    let mut x = random_matrix(100, 20, 13);
    for row in 0..x.nrows() {
        x[(row, 16)] = 2.0 * x[(row, 0)];
        x[(row, 17)] = 1.0 - 3.0 * x[(row, 1)];
    }

    let pairwise = CorrelationFilter::new(0.9)
        .with_strategy(CorrelationStrategy::Pairwise)
        .fit(&x)
        .unwrap();
    let matrix = CorrelationFilter::new(0.9)
        .with_strategy(CorrelationStrategy::Matrix)
        .fit(&x)
        .unwrap();

    assert_eq!(
        pairwise.keep_mask(),
        matrix.keep_mask(),
        "Both strategies must resolve to the same keep mask"
    );
    assert_eq!(pairwise.decisions().len(), matrix.decisions().len());
    for (p, m) in pairwise.decisions().iter().zip(matrix.decisions()) {
        assert_eq!((p.dropped, p.kept), (m.dropped, m.kept));
        let diff = (p.correlation - m.correlation).abs();
        assert!(
            diff < 1e-9,
            "Correlation values should match across strategies: pairwise={:.12}, matrix={:.12}",
            p.correlation,
            m.correlation
        );
    }

    // The planted duplicates are the only casualties
    assert_eq!(pairwise.dropped_indices(), vec![0, 1]);
}

#[test]
fn test_matrix_strategy_on_wide_input() {
    let mut x = random_matrix(50, 30, 99);
    for row in 0..x.nrows() {
        x[(row, 29)] = x[(row, 3)];
    }

    let fitted = CorrelationFilter::new(0.9)
        .with_strategy(CorrelationStrategy::Matrix)
        .fit(&x)
        .unwrap();

    assert_eq!(
        fitted.dropped_indices(),
        vec![3],
        "Equal variances tie-break to the lower index"
    );
}

#[test]
fn test_transform_selects_survivors_on_new_rows() {
    let train = mat_from_rows(&[
        &[1.0, 2.0, 7.0],
        &[2.0, 4.0, 1.0],
        &[3.0, 6.0, 4.0],
    ]);
    let fresh = mat_from_rows(&[&[10.0, 20.0, 30.0]]);

    let fitted = CorrelationFilter::new(0.9).fit(&train).unwrap();
    let reduced = fitted.transform(&fresh).unwrap();

    assert_shape(&reduced, 1, 2);
    assert_column_eq(&reduced, 0, &[20.0]);
    assert_column_eq(&reduced, 1, &[30.0]);
}

#[test]
fn test_transform_rejects_wrong_column_count() {
    let x = mat_from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]);
    let narrow = mat_from_rows(&[&[1.0]]);

    let fitted = CorrelationFilter::new(0.9).fit(&x).unwrap();

    assert!(matches!(
        fitted.transform(&narrow),
        Err(PipelineError::ColumnCountMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn test_fit_rejects_empty_matrix() {
    let x = Mat::<f64>::zeros(0, 5);

    let result = CorrelationFilter::new(0.9).fit(&x);

    assert!(matches!(result, Err(PipelineError::EmptyTrainingData)));
}

#[test]
fn test_default_threshold() {
    let filter = CorrelationFilter::default();

    assert_eq!(filter.threshold, DEFAULT_CORRELATION_THRESHOLD);
    assert_eq!(DEFAULT_CORRELATION_THRESHOLD, 0.9);
}
