//! Reduction summary report generation

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// Summary of the column-pruning process
#[derive(Debug, Default)]
pub struct ReductionSummary {
    pub initial_columns: usize,
    pub final_columns: usize,
    pub dropped_missing: Vec<String>,
    pub dropped_constant: Vec<String>,
    pub dropped_correlation: Vec<String>,
    pub imputed_cells: usize,
    pub load_time: Duration,
    pub missing_time: Duration,
    pub constant_time: Duration,
    pub impute_time: Duration,
    pub correlation_time: Duration,
    pub save_time: Duration,
}

impl ReductionSummary {
    pub fn new(initial_columns: usize) -> Self {
        Self {
            initial_columns,
            final_columns: initial_columns,
            ..Default::default()
        }
    }

    pub fn add_missing_drops(&mut self, columns: Vec<String>) {
        self.final_columns -= columns.len();
        self.dropped_missing = columns;
    }

    pub fn add_constant_drops(&mut self, columns: Vec<String>) {
        self.final_columns -= columns.len();
        self.dropped_constant = columns;
    }

    pub fn add_correlation_drops(&mut self, columns: Vec<String>) {
        self.final_columns -= columns.len();
        self.dropped_correlation = columns;
    }

    pub fn set_load_time(&mut self, time: Duration) {
        self.load_time = time;
    }

    pub fn set_missing_time(&mut self, time: Duration) {
        self.missing_time = time;
    }

    pub fn set_constant_time(&mut self, time: Duration) {
        self.constant_time = time;
    }

    pub fn set_impute_time(&mut self, time: Duration) {
        self.impute_time = time;
    }

    pub fn set_correlation_time(&mut self, time: Duration) {
        self.correlation_time = time;
    }

    pub fn set_save_time(&mut self, time: Duration) {
        self.save_time = time;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time
            + self.missing_time
            + self.constant_time
            + self.impute_time
            + self.correlation_time
            + self.save_time
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("REDUCTION SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Initial Columns"),
            Cell::new(self.initial_columns),
        ]);

        table.add_row(vec![
            Cell::new("🗑️  Dropped (Missing)"),
            Cell::new(self.dropped_missing.len()).fg(if self.dropped_missing.is_empty() {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        table.add_row(vec![
            Cell::new("➖ Dropped (Constant)"),
            Cell::new(self.dropped_constant.len()).fg(if self.dropped_constant.is_empty() {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        table.add_row(vec![
            Cell::new("🔗 Dropped (Correlation)"),
            Cell::new(self.dropped_correlation.len()).fg(if self.dropped_correlation.is_empty() {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        table.add_row(vec![
            Cell::new("🩹 Imputed Cells"),
            Cell::new(self.imputed_cells).fg(if self.imputed_cells == 0 {
                Color::White
            } else {
                Color::Cyan
            }),
        ]);

        table.add_row(vec![
            Cell::new("✅ Final Columns"),
            Cell::new(self.final_columns)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let reduction_pct = if self.initial_columns > 0 {
            ((self.initial_columns - self.final_columns) as f64 / self.initial_columns as f64)
                * 100.0
        } else {
            0.0
        };

        let color = if reduction_pct > 30.0 {
            Color::Green
        } else if reduction_pct > 10.0 {
            Color::Yellow
        } else {
            Color::Cyan
        };

        table.add_row(vec![
            Cell::new("📉 Reduction"),
            Cell::new(format!("{:.1}%", reduction_pct))
                .fg(color)
                .add_attribute(Attribute::Bold),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        // Show dropped columns details if any
        if !self.dropped_missing.is_empty()
            || !self.dropped_constant.is_empty()
            || !self.dropped_correlation.is_empty()
        {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("DROPPED COLUMNS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());

            print_dropped_group("High Missing Values", &self.dropped_missing);
            print_dropped_group("Constant", &self.dropped_constant);
            print_dropped_group("High Correlation", &self.dropped_correlation);
        }
    }
}

/// List one drop group, truncated so wide datasets stay readable.
fn print_dropped_group(title: &str, columns: &[String]) {
    const MAX_LISTED: usize = 15;

    if columns.is_empty() {
        return;
    }
    println!();
    println!(
        "      {} {}:",
        style(title).yellow(),
        style(format!("({})", columns.len())).dim()
    );
    for column in columns.iter().take(MAX_LISTED) {
        println!("        {} {}", style("•").dim(), column);
    }
    if columns.len() > MAX_LISTED {
        println!(
            "        {}",
            style(format!("... and {} more", columns.len() - MAX_LISTED)).dim()
        );
    }
}
