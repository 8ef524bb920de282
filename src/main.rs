//! colsieve: Column Pruning CLI Tool
//!
//! A command-line tool for pruning columns in wide sensor datasets using
//! missing value analysis, constant detection, median imputation, and
//! correlation-based reduction.

mod cli;
mod data;
mod pipeline;
mod report;
mod utils;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use cli::{confirm_drop_columns, derived_sibling, Cli, Commands};
use pipeline::{
    loader, load_pipeline, matrix, save_pipeline, ConstantFilter, CorrelationFilter, FittedPipeline,
    FittedStage, MedianImputer, MissingFilter,
};
use report::{
    export_reduction_report, ReductionReportBuilder, ReductionSummary, ReportBuilderParams,
};
use utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Fetch { url, data_dir } => run_fetch(url, data_dir),
            Commands::Apply {
                pipeline,
                input,
                output,
                infer_schema_length,
            } => run_apply(pipeline, input, output.as_deref(), *infer_schema_length),
        };
    }

    // Main reduce pipeline - require input
    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;

    // Derive companion paths from the input when not explicitly provided
    let output_path = cli.output_path().unwrap();
    let pipeline_path = cli.pipeline_path().unwrap();
    let report_path = cli.report_path().unwrap();

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(
        input,
        cli.labels.as_deref(),
        &output_path,
        cli.missing_threshold,
        cli.correlation_threshold,
    );

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");

    let step_start = Instant::now();
    let spinner = create_spinner("Loading features...");
    let mut x = loader::load_features(input, cli.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    anyhow::ensure!(
        x.nrows() > 0,
        "Input file {} has no data rows; nothing to fit on",
        input.display()
    );

    let labels = match cli.labels.as_deref() {
        Some(path) => {
            let raw = loader::load_labels(path)?;
            loader::ensure_row_alignment(&x, &raw)?;
            Some(loader::binarize_labels(&raw))
        }
        None => None,
    };

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", x.nrows());
    println!("      Columns: {}", x.ncols());
    println!(
        "      Estimated memory: {:.2} MB",
        matrix::estimated_size_mb(&x)
    );

    let column_names = loader::column_names(x.ncols());
    let mut current_indices: Vec<usize> = (0..x.ncols()).collect();
    let mut summary = ReductionSummary::new(x.ncols());
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Missing value analysis
    print_step_header(2, "Missing Value Analysis");

    let step_start = Instant::now();
    let spinner = create_spinner("Analyzing missing values...");
    let fitted_missing = MissingFilter::new(cli.missing_threshold).fit(&x)?;
    finish_with_success(&spinner, "Missing value analysis complete");

    let dropped = dropped_names(&current_indices, fitted_missing.keep_mask(), &column_names);
    if dropped.is_empty() {
        print_info("No columns exceed the missing value threshold");
    } else {
        print_count(
            "column(s) with high missing values",
            dropped.len(),
            Some(&format!("(>{:.1}%)", cli.missing_threshold * 100.0)),
        );

        if !cli.no_confirm && !confirm_drop_columns(dropped.len(), "missing value")? {
            println!("Cancelled by user.");
            return Ok(());
        }

        summary.add_missing_drops(dropped);
        print_success("Dropped columns with high missing values");
    }
    current_indices = filter_indices(&current_indices, fitted_missing.keep_mask());
    x = fitted_missing.transform(&x)?;
    let missing_elapsed = step_start.elapsed();
    summary.set_missing_time(missing_elapsed);
    print_step_time(missing_elapsed);

    // Step 3: Constant column analysis
    print_step_header(3, "Constant Column Analysis");

    let step_start = Instant::now();
    let spinner = create_spinner("Counting distinct values...");
    let fitted_constant = ConstantFilter::new().fit(&x)?;
    finish_with_success(&spinner, "Constant column analysis complete");

    let dropped = dropped_names(&current_indices, fitted_constant.keep_mask(), &column_names);
    if dropped.is_empty() {
        print_info("No constant columns found");
    } else {
        print_count("constant column(s)", dropped.len(), None);

        if !cli.no_confirm && !confirm_drop_columns(dropped.len(), "constant column")? {
            println!("Cancelled by user.");
            return Ok(());
        }

        summary.add_constant_drops(dropped);
        print_success("Dropped constant columns");
    }
    current_indices = filter_indices(&current_indices, fitted_constant.keep_mask());
    x = fitted_constant.transform(&x)?;
    let constant_elapsed = step_start.elapsed();
    summary.set_constant_time(constant_elapsed);
    print_step_time(constant_elapsed);

    // Step 4: Median imputation
    print_step_header(4, "Median Imputation");

    let step_start = Instant::now();
    let spinner = create_spinner("Computing column medians...");
    let fitted_impute = MedianImputer::new().fit(&x)?;
    let imputed_cells = fitted_impute.count_fills(&x);
    x = fitted_impute.transform(&x)?;
    finish_with_success(&spinner, "Median imputation complete");

    if imputed_cells == 0 {
        print_info("No missing observations remained");
    } else {
        print_count("missing cell(s) filled with column medians", imputed_cells, None);
    }
    summary.imputed_cells = imputed_cells;
    let impute_elapsed = step_start.elapsed();
    summary.set_impute_time(impute_elapsed);
    print_step_time(impute_elapsed);

    // Step 5: Correlation analysis
    print_step_header(5, "Correlation Analysis");

    let step_start = Instant::now();
    let spinner = create_spinner("Calculating correlations...");
    let fitted_correlation = CorrelationFilter::new(cli.correlation_threshold).fit(&x)?;
    finish_with_success(&spinner, "Correlation analysis complete");

    let dropped = dropped_names(
        &current_indices,
        fitted_correlation.keep_mask(),
        &column_names,
    );
    if fitted_correlation.decisions().is_empty() {
        print_info("No highly correlated column pairs found");
    } else {
        print_count(
            "correlated pair(s)",
            fitted_correlation.decisions().len(),
            Some(&format!("(>={:.2})", cli.correlation_threshold)),
        );
        println!(
            "      Dropping {} column(s)",
            style(dropped.len()).yellow().bold()
        );

        if !cli.no_confirm && !confirm_drop_columns(dropped.len(), "correlation")? {
            println!("Cancelled by user.");
            return Ok(());
        }

        summary.add_correlation_drops(dropped);
        print_success("Dropped highly correlated columns");
    }
    current_indices = filter_indices(&current_indices, fitted_correlation.keep_mask());
    x = fitted_correlation.transform(&x)?;
    let correlation_elapsed = step_start.elapsed();
    summary.set_correlation_time(correlation_elapsed);
    print_step_time(correlation_elapsed);

    // Step 6: Save results
    print_step_header(6, "Save Results");

    let step_start = Instant::now();
    let fitted_pipeline = FittedPipeline::new(vec![
        FittedStage::Missing(fitted_missing),
        FittedStage::Constant(fitted_constant),
        FittedStage::Impute(fitted_impute),
        FittedStage::Correlation(fitted_correlation),
    ]);

    let spinner = create_spinner("Writing output files...");
    let surviving_names: Vec<String> = current_indices
        .iter()
        .map(|&index| column_names[index].clone())
        .collect();
    loader::save_dataset(&x, &surviving_names, labels.as_deref(), &output_path)?;
    save_pipeline(&fitted_pipeline, &pipeline_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));

    let save_elapsed = step_start.elapsed();
    summary.set_save_time(save_elapsed);

    // Build and export the reduction report
    let mut report_builder = ReductionReportBuilder::new(
        ReportBuilderParams {
            input_file: input.display().to_string(),
            output_file: output_path.display().to_string(),
            missing_threshold: cli.missing_threshold,
            correlation_threshold: cli.correlation_threshold,
        },
        column_names,
    );
    report_builder.record_pipeline(&fitted_pipeline);
    report_builder.set_imputed_cells(imputed_cells);
    report_builder.set_timing(&summary);
    export_reduction_report(&report_builder.build(), &report_path)?;

    print_info(&format!("Fitted pipeline: {}", pipeline_path.display()));
    print_info(&format!("Reduction report: {}", report_path.display()));
    print_step_time(save_elapsed);

    // Display summary
    summary.display();

    // Final completion message
    print_completion();

    Ok(())
}

/// Run the fetch subcommand: download and extract the SECOM dataset.
fn run_fetch(url: &str, data_dir: &Path) -> Result<()> {
    println!("\n {} Fetching SECOM dataset", style("◆").cyan().bold());

    let paths = data::fetch_dataset(url, data_dir)?;

    print_success(&format!("Features: {}", paths.features.display()));
    print_success(&format!("Labels:   {}", paths.labels.display()));
    Ok(())
}

/// Run the apply subcommand: replay a fitted pipeline on a new file.
fn run_apply(
    pipeline_path: &Path,
    input: &Path,
    output: Option<&Path>,
    infer_schema_length: usize,
) -> Result<()> {
    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derived_sibling(input, "_reduced.csv"));

    println!("\n {} Applying fitted pipeline", style("◆").cyan().bold());
    println!("   Pipeline: {}", style(pipeline_path.display()).dim());
    println!("   Input:    {}", style(input.display()).dim());
    println!("   Output:   {}", style(output_path.display()).dim());
    println!();

    let fitted = load_pipeline(pipeline_path)?;

    let spinner = create_spinner("Loading features...");
    let x = loader::load_features(input, infer_schema_length)?;
    finish_with_success(
        &spinner,
        &format!("Loaded {} rows × {} columns", x.nrows(), x.ncols()),
    );

    let reduced = fitted.transform(&x)?;
    let names: Vec<String> = fitted
        .surviving_indices()
        .into_iter()
        .map(loader::index_column_name)
        .collect();

    let spinner = create_spinner("Writing output file...");
    loader::save_dataset(&reduced, &names, None, &output_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));

    println!(
        "\n   {} columns in, {} columns out",
        style(x.ncols()).yellow(),
        style(reduced.ncols()).yellow()
    );
    Ok(())
}

/// Original indices surviving a stage's keep mask.
fn filter_indices(indices: &[usize], keep: &[bool]) -> Vec<usize> {
    indices
        .iter()
        .zip(keep.iter())
        .filter(|(_, keep)| **keep)
        .map(|(index, _)| *index)
        .collect()
}

/// Names of the columns a stage drops, in position order.
fn dropped_names(indices: &[usize], keep: &[bool], names: &[String]) -> Vec<String> {
    indices
        .iter()
        .zip(keep.iter())
        .filter(|(_, keep)| !**keep)
        .map(|(index, _)| names[*index].clone())
        .collect()
}
