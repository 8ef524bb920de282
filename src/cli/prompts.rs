//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm dropping specific columns
pub fn confirm_drop_columns(column_count: usize, step_name: &str) -> Result<bool> {
    let message = format!(
        "Drop {} column(s) based on {} analysis?",
        column_count, step_name
    );
    confirm_step(&message)
}
