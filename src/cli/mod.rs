//! CLI module - argument parsing and interactive prompts

mod args;
mod prompts;

pub use args::{derived_sibling, Cli, Commands};
pub use prompts::*;
