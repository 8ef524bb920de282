//! Terminal styling utilities for a modern, visually appealing TUI

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TAG: Emoji<'_, '_> = Emoji("🏷️  ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");

/// Print the application banner with ASCII art
pub fn print_banner(version: &str) {
    let banner = r#"
     ██████╗ ██████╗ ██╗     ███████╗██╗███████╗██╗   ██╗███████╗
    ██╔════╝██╔═══██╗██║     ██╔════╝██║██╔════╝██║   ██║██╔════╝
    ██║     ██║   ██║██║     ███████╗██║█████╗  ██║   ██║█████╗
    ██║     ██║   ██║██║     ╚════██║██║██╔══╝  ╚██╗ ██╔╝██╔══╝
    ╚██████╗╚██████╔╝███████╗███████║██║███████╗ ╚████╔╝ ███████╗
     ╚═════╝ ╚═════╝ ╚══════╝╚══════╝╚═╝╚══════╝  ╚═══╝  ╚══════╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("◆").magenta().bold(),
        style("Column pruning for wide sensor data").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(
    input: &Path,
    labels: Option<&Path>,
    output: &Path,
    missing_threshold: f64,
    correlation_threshold: f64,
) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let labels_display = labels
        .map(|p| truncate_path(p, 38))
        .unwrap_or_else(|| "(none)".to_string());

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:  {:<39}│",
        FOLDER,
        truncate_path(input, 38)
    );
    println!("    │  {} Labels: {:<39}│", TAG, labels_display);
    println!(
        "    │  {} Output: {:<39}│",
        SAVE,
        truncate_path(output, 38)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Missing threshold:     {:<24}│",
        CHART,
        style(format!("{:.1}%", missing_threshold * 100.0)).yellow()
    );
    println!(
        "    │  {} Correlation threshold: {:<24}│",
        LINK,
        style(format!("{:.2}", correlation_threshold)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("colsieve reduction complete!").green().bold()
    );
    println!();
}

/// Print the elapsed time of a completed step
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "      {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, threshold_info: Option<&str>) {
    if let Some(info) = threshold_info {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!(
            "      Found {} {}",
            style(count).yellow().bold(),
            description
        );
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("...{}", &s[s.len() - max_len + 3..])
    }
}
