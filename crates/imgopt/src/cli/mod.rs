//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the imgopt binary.

mod classify;
mod commands;
mod output;
mod run;

pub use classify::describe_key;
pub use commands::{Cli, Commands, LogFormat, OutputFormat};
pub use output::render_report;
pub use run::{purge_scope, resolve_scope, run_variants};
