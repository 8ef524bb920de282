//! Comprehensive column reduction report generation
//!
//! Generates a detailed JSON report documenting all input columns, the
//! per-stage measurements, and the reason each dropped column was dropped.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{FittedPipeline, FittedStage};
use crate::report::ReductionSummary;

/// Drop stage enum for tracking where a column was dropped
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropStage {
    Missing,
    Constant,
    Correlation,
}

/// Missing analysis result for a column
#[derive(Debug, Clone, Serialize)]
pub struct MissingAnalysisEntry {
    pub ratio: f64,
    pub threshold: f64,
    pub passed: bool,
}

/// Distinct-value analysis result for a column
#[derive(Debug, Clone, Serialize)]
pub struct DistinctAnalysisEntry {
    pub distinct_values: usize,
    pub passed: bool,
}

/// Correlation analysis result for a column
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationAnalysisEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_correlation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlated_with: Option<String>,
    pub threshold: f64,
    pub passed: bool,
}

/// Complete analysis for a column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<MissingAnalysisEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct: Option<DistinctAnalysisEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationAnalysisEntry>,
}

/// Single column entry in the report
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReportEntry {
    pub name: String,
    pub index: usize,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_at_stage: Option<DropStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub analysis: ColumnAnalysis,
}

/// Thresholds used in the analysis
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdsConfig {
    pub missing_ratio: f64,
    pub correlation: f64,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub colsieve_version: String,
    pub input_file: String,
    pub output_file: String,
    pub thresholds: ThresholdsConfig,
}

/// Stage-level summary
#[derive(Debug, Clone, Serialize)]
pub struct StageSummary {
    pub dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_used: Option<f64>,
}

/// By-stage breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ByStage {
    pub missing: StageSummary,
    pub constant: StageSummary,
    pub correlation: StageSummary,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub missing_ms: u64,
    pub constant_ms: u64,
    pub impute_ms: u64,
    pub correlation_ms: u64,
    pub save_ms: u64,
    pub total_ms: u64,
}

/// Report summary
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub initial_columns: usize,
    pub final_columns: usize,
    pub dropped_count: usize,
    pub imputed_cells: usize,
    pub by_stage: ByStage,
    pub timing: TimingInfo,
}

/// Complete reduction report
#[derive(Debug, Clone, Serialize)]
pub struct ReductionReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub columns: Vec<ColumnReportEntry>,
}

/// Parameters for creating a ReductionReportBuilder
pub struct ReportBuilderParams {
    pub input_file: String,
    pub output_file: String,
    pub missing_threshold: f64,
    pub correlation_threshold: f64,
}

/// Builder for constructing the reduction report from a fitted pipeline
pub struct ReductionReportBuilder {
    // Metadata
    input_file: String,
    output_file: String,

    // Thresholds
    missing_threshold: f64,
    correlation_threshold: f64,

    // Per-column data, keyed by original column index
    column_names: Vec<String>,
    missing_ratios: HashMap<usize, f64>,
    distinct_counts: HashMap<usize, usize>,
    reached_correlation: HashSet<usize>,
    correlation_partners: HashMap<usize, (String, f64)>,

    // Drop tracking
    dropped_missing: HashSet<usize>,
    dropped_constant: HashSet<usize>,
    dropped_correlation: HashSet<usize>,

    imputed_cells: usize,
    timing: TimingInfo,
}

impl ReductionReportBuilder {
    /// Create a new report builder. `column_names` covers every column of
    /// the original input, in position order.
    pub fn new(params: ReportBuilderParams, column_names: Vec<String>) -> Self {
        Self {
            input_file: params.input_file,
            output_file: params.output_file,
            missing_threshold: params.missing_threshold,
            correlation_threshold: params.correlation_threshold,
            column_names,
            missing_ratios: HashMap::new(),
            distinct_counts: HashMap::new(),
            reached_correlation: HashSet::new(),
            correlation_partners: HashMap::new(),
            dropped_missing: HashSet::new(),
            dropped_constant: HashSet::new(),
            dropped_correlation: HashSet::new(),
            imputed_cells: 0,
            timing: TimingInfo::default(),
        }
    }

    /// Walk the fitted stages and record their measurements against the
    /// original column indices. Stage masks index the columns surviving
    /// the previous stages, so an index map is carried through.
    pub fn record_pipeline(&mut self, fitted: &FittedPipeline) {
        let mut current: Vec<usize> = (0..fitted.n_input_columns()).collect();

        for stage in fitted.stages() {
            match stage {
                FittedStage::Missing(filter) => {
                    for (pos, ratio) in filter.missing_ratios().iter().enumerate() {
                        self.missing_ratios.insert(current[pos], *ratio);
                    }
                    for (pos, keep) in filter.keep_mask().iter().enumerate() {
                        if !keep {
                            self.dropped_missing.insert(current[pos]);
                        }
                    }
                }
                FittedStage::Constant(filter) => {
                    for (pos, count) in filter.distinct_counts().iter().enumerate() {
                        self.distinct_counts.insert(current[pos], *count);
                    }
                    for (pos, keep) in filter.keep_mask().iter().enumerate() {
                        if !keep {
                            self.dropped_constant.insert(current[pos]);
                        }
                    }
                }
                FittedStage::Impute(_) => {}
                FittedStage::Correlation(filter) => {
                    for &original in &current {
                        self.reached_correlation.insert(original);
                    }
                    for decision in filter.decisions() {
                        let dropped = current[decision.dropped];
                        let kept = current[decision.kept];

                        self.dropped_correlation.insert(dropped);
                        self.correlation_partners.insert(
                            dropped,
                            (self.column_names[kept].clone(), decision.correlation),
                        );

                        // Remember the strongest partner for the surviving column too
                        let stronger = self
                            .correlation_partners
                            .get(&kept)
                            .map_or(true, |(_, r)| r.abs() < decision.correlation.abs());
                        if stronger {
                            self.correlation_partners.insert(
                                kept,
                                (self.column_names[dropped].clone(), decision.correlation),
                            );
                        }
                    }
                }
            }

            if let Some(mask) = stage.keep_mask() {
                current = current
                    .iter()
                    .zip(mask.iter())
                    .filter(|(_, keep)| **keep)
                    .map(|(index, _)| *index)
                    .collect();
            }
        }
    }

    pub fn set_imputed_cells(&mut self, cells: usize) {
        self.imputed_cells = cells;
    }

    /// Set timing information from the ReductionSummary
    pub fn set_timing(&mut self, summary: &ReductionSummary) {
        self.timing = TimingInfo {
            load_ms: summary.load_time.as_millis() as u64,
            missing_ms: summary.missing_time.as_millis() as u64,
            constant_ms: summary.constant_time.as_millis() as u64,
            impute_ms: summary.impute_time.as_millis() as u64,
            correlation_ms: summary.correlation_time.as_millis() as u64,
            save_ms: summary.save_time.as_millis() as u64,
            total_ms: summary.total_time().as_millis() as u64,
        };
    }

    /// Build the final report
    pub fn build(self) -> ReductionReport {
        let mut columns: Vec<ColumnReportEntry> = (0..self.column_names.len())
            .map(|index| self.build_column_entry(index))
            .collect();

        // Sort columns: kept first, then by drop stage, then by position
        columns.sort_by(|a, b| match (&a.dropped_at_stage, &b.dropped_at_stage) {
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(stage_a), Some(stage_b)) => stage_order(stage_a)
                .cmp(&stage_order(stage_b))
                .then(a.index.cmp(&b.index)),
            (None, None) => a.index.cmp(&b.index),
        });

        let dropped_count = self.dropped_missing.len()
            + self.dropped_constant.len()
            + self.dropped_correlation.len();

        ReductionReport {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                colsieve_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: self.input_file,
                output_file: self.output_file,
                thresholds: ThresholdsConfig {
                    missing_ratio: self.missing_threshold,
                    correlation: self.correlation_threshold,
                },
            },
            summary: ReportSummary {
                initial_columns: self.column_names.len(),
                final_columns: self.column_names.len() - dropped_count,
                dropped_count,
                imputed_cells: self.imputed_cells,
                by_stage: ByStage {
                    missing: StageSummary {
                        dropped: self.dropped_missing.len(),
                        threshold_used: Some(self.missing_threshold),
                    },
                    constant: StageSummary {
                        dropped: self.dropped_constant.len(),
                        threshold_used: None,
                    },
                    correlation: StageSummary {
                        dropped: self.dropped_correlation.len(),
                        threshold_used: Some(self.correlation_threshold),
                    },
                },
                timing: self.timing,
            },
            columns,
        }
    }

    /// Build a single column entry
    fn build_column_entry(&self, index: usize) -> ColumnReportEntry {
        let missing = self
            .missing_ratios
            .get(&index)
            .map(|ratio| MissingAnalysisEntry {
                ratio: *ratio,
                threshold: self.missing_threshold,
                passed: !self.dropped_missing.contains(&index),
            });

        let distinct = self
            .distinct_counts
            .get(&index)
            .map(|count| DistinctAnalysisEntry {
                distinct_values: *count,
                passed: !self.dropped_constant.contains(&index),
            });

        let correlation = if self.reached_correlation.contains(&index) {
            let partner = self.correlation_partners.get(&index);
            Some(CorrelationAnalysisEntry {
                max_correlation: partner.map(|(_, r)| *r),
                correlated_with: partner.map(|(other, _)| other.clone()),
                threshold: self.correlation_threshold,
                passed: !self.dropped_correlation.contains(&index),
            })
        } else {
            None
        };

        let (status, dropped_at_stage, reason) = if self.dropped_missing.contains(&index) {
            let ratio = self.missing_ratios.get(&index).copied().unwrap_or(0.0);
            (
                "dropped".to_string(),
                Some(DropStage::Missing),
                Some(format!(
                    "Missing ratio {:.2} exceeded threshold {:.2}",
                    ratio, self.missing_threshold
                )),
            )
        } else if self.dropped_constant.contains(&index) {
            let count = self.distinct_counts.get(&index).copied().unwrap_or(0);
            (
                "dropped".to_string(),
                Some(DropStage::Constant),
                Some(format!("Only {} distinct non-missing value(s)", count)),
            )
        } else if self.dropped_correlation.contains(&index) {
            let reason = self.correlation_partners.get(&index).map(|(other, r)| {
                format!(
                    "Correlation {:.4} with {} at or above threshold {:.2}",
                    r, other, self.correlation_threshold
                )
            });
            ("dropped".to_string(), Some(DropStage::Correlation), reason)
        } else {
            ("kept".to_string(), None, None)
        };

        ColumnReportEntry {
            name: self.column_names[index].clone(),
            index,
            status,
            dropped_at_stage,
            reason,
            analysis: ColumnAnalysis {
                missing,
                distinct,
                correlation,
            },
        }
    }
}

fn stage_order(stage: &DropStage) -> u8 {
    match stage {
        DropStage::Missing => 0,
        DropStage::Constant => 1,
        DropStage::Correlation => 2,
    }
}

/// Export the reduction report to a JSON file
pub fn export_reduction_report(report: &ReductionReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize reduction report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write reduction report to {}", output_path.display()))?;

    Ok(())
}
