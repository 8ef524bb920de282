//! Tests for CLI argument parsing and the installed binary

use clap::Parser;
use colsieve::cli::{derived_sibling, Cli, Commands};
use std::path::{Path, PathBuf};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_default_thresholds() {
    let cli = Cli::parse_from(["colsieve", "-i", "secom.data"]);

    assert_eq!(cli.missing_threshold, 0.5, "Default missing threshold should be 0.5");
    assert_eq!(
        cli.correlation_threshold, 0.9,
        "Default correlation threshold should be 0.9"
    );
    assert!(!cli.no_confirm, "Confirmations should be on by default");
    assert_eq!(cli.infer_schema_length, 10000);
}

#[test]
fn test_threshold_overrides() {
    let cli = Cli::parse_from([
        "colsieve",
        "-i",
        "secom.data",
        "--missing-threshold",
        "0.3",
        "--correlation-threshold",
        "0.95",
    ]);

    assert_eq!(cli.missing_threshold, 0.3);
    assert_eq!(cli.correlation_threshold, 0.95);
}

#[test]
fn test_threshold_above_one_is_rejected() {
    let result = Cli::try_parse_from(["colsieve", "-i", "x.data", "--missing-threshold", "1.5"]);

    assert!(result.is_err(), "Thresholds above 1.0 must be rejected");
}

#[test]
fn test_threshold_must_be_numeric() {
    let result = Cli::try_parse_from(["colsieve", "-i", "x.data", "--correlation-threshold", "high"]);

    assert!(result.is_err());
}

#[test]
fn test_derived_output_paths() {
    let cli = Cli::parse_from(["colsieve", "-i", "data/secom.data"]);

    assert_eq!(
        cli.output_path(),
        Some(PathBuf::from("data/secom_reduced.csv")),
        "Output should default next to the input"
    );
    assert_eq!(
        cli.pipeline_path(),
        Some(PathBuf::from("data/secom_pipeline.json"))
    );
    assert_eq!(
        cli.report_path(),
        Some(PathBuf::from("data/secom_report.json"))
    );
}

#[test]
fn test_explicit_paths_win_over_derived() {
    let cli = Cli::parse_from([
        "colsieve",
        "-i",
        "secom.data",
        "-o",
        "out.parquet",
        "--pipeline-out",
        "model.json",
        "--report-out",
        "report.json",
    ]);

    assert_eq!(cli.output_path(), Some(PathBuf::from("out.parquet")));
    assert_eq!(cli.pipeline_path(), Some(PathBuf::from("model.json")));
    assert_eq!(cli.report_path(), Some(PathBuf::from("report.json")));
}

#[test]
fn test_no_input_yields_no_paths() {
    let cli = Cli::parse_from(["colsieve"]);

    assert!(cli.input().is_none());
    assert!(cli.output_path().is_none());
    assert!(cli.pipeline_path().is_none());
    assert!(cli.report_path().is_none());
}

#[test]
fn test_derived_sibling_keeps_the_parent() {
    assert_eq!(
        derived_sibling(Path::new("/tmp/run/secom.data"), "_reduced.csv"),
        PathBuf::from("/tmp/run/secom_reduced.csv")
    );
    assert_eq!(
        derived_sibling(Path::new("secom.data"), "_pipeline.json"),
        PathBuf::from("secom_pipeline.json")
    );
}

#[test]
fn test_fetch_subcommand_defaults() {
    let cli = Cli::parse_from(["colsieve", "fetch"]);

    match cli.command {
        Some(Commands::Fetch { url, data_dir }) => {
            assert!(
                url.starts_with("https://archive.ics.uci.edu/"),
                "Default URL should point at the UCI repository, got {}",
                url
            );
            assert_eq!(data_dir, PathBuf::from("data"));
        }
        other => panic!("Expected the fetch subcommand, got {:?}", other),
    }
}

#[test]
fn test_apply_subcommand_arguments() {
    let cli = Cli::parse_from(["colsieve", "apply", "model.json", "fresh.data"]);

    match cli.command {
        Some(Commands::Apply {
            pipeline,
            input,
            output,
            infer_schema_length,
        }) => {
            assert_eq!(pipeline, PathBuf::from("model.json"));
            assert_eq!(input, PathBuf::from("fresh.data"));
            assert!(output.is_none(), "Output should be optional");
            assert_eq!(infer_schema_length, 10000);
        }
        other => panic!("Expected the apply subcommand, got {:?}", other),
    }
}

#[test]
fn test_reduce_binary_end_to_end() {
    use assert_cmd::Command;
    use predicates::prelude::*;

    let x = mat_from_rows(&[
        &[f64::NAN, 7.0, 1.0, 2.0],
        &[f64::NAN, 7.0, 2.0, 4.0],
        &[f64::NAN, 7.0, 3.0, 6.0],
        &[1.0, 7.0, 4.0, 8.0],
        &[2.0, 7.0, 5.0, 10.0],
    ]);
    let (temp_dir, features) = create_temp_features(&x);
    let labels = create_temp_labels(&temp_dir, &[-1, -1, 1, -1, 1]);

    Command::cargo_bin("colsieve")
        .unwrap()
        .arg("-i")
        .arg(&features)
        .arg("-l")
        .arg(&labels)
        .arg("--no-confirm")
        .assert()
        .success()
        .stdout(predicate::str::contains("REDUCTION SUMMARY"));

    let output = temp_dir.path().join("features_reduced.csv");
    let pipeline = temp_dir.path().join("features_pipeline.json");
    let report = temp_dir.path().join("features_report.json");
    assert!(output.exists(), "Reduced dataset should be written");
    assert!(pipeline.exists(), "Fitted pipeline JSON should be written");
    assert!(report.exists(), "Reduction report JSON should be written");

    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        contents.lines().next(),
        Some("f0003,label"),
        "Only the surviving column and the label should remain"
    );

    // The saved pipeline reduces a fresh file to the same single column
    let applied = temp_dir.path().join("applied.csv");
    Command::cargo_bin("colsieve")
        .unwrap()
        .arg("apply")
        .arg(&pipeline)
        .arg(&features)
        .arg(&applied)
        .assert()
        .success();
    let applied_contents = std::fs::read_to_string(&applied).unwrap();
    assert_eq!(applied_contents.lines().next(), Some("f0003"));
    assert_eq!(applied_contents.lines().count(), 6, "Header plus five rows");
}

#[test]
fn test_binary_requires_an_input() {
    use assert_cmd::Command;
    use predicates::prelude::*;

    Command::cargo_bin("colsieve")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file is required"));
}
