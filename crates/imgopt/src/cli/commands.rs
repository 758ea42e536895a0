//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// imgopt - retina, mobile and WebP variants for images in a CDN bucket
#[derive(Parser, Debug)]
#[command(name = "imgopt")]
#[command(about = "Retina, mobile and WebP variants for images in a CDN bucket", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file used instead of ./imgopt.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Purge junk, then generate missing variants under a scope
    Run {
        /// Key prefix to process (defaults to the current month's upload folder)
        #[arg(long)]
        scope: Option<String>,

        /// Also generate WebP variants
        #[arg(long)]
        alt_format: bool,

        /// Report what would be purged and created without writing
        #[arg(long)]
        dry_run: bool,

        /// Assets processed at once (overrides pipeline.concurrency)
        #[arg(long)]
        concurrency: Option<NonZeroUsize>,

        /// Report format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Delete junk objects under a scope without generating variants
    Purge {
        /// Key prefix to purge (defaults to the current month's upload folder)
        #[arg(long)]
        scope: Option<String>,

        /// List junk without deleting it
        #[arg(long)]
        dry_run: bool,

        /// Report format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Show how object keys are classified and which variants they derive
    Classify {
        /// Object keys to classify
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    Human,
    /// Full report as JSON
    Json,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text lines
    Text,
    /// One JSON object per event
    Json,
}
