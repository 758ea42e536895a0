//! imgopt CLI binary.
//!
//! This binary provides command-line access to imgopt:
//! - Purge junk and generate variants for a scope
//! - Purge junk only
//! - Inspect how keys are classified

use clap::Parser;
use imgopt::ImgoptConfig;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, LogFormat};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Load .env before reading RUST_LOG or IMGOPT__ variables
    dotenvy::dotenv().ok();

    // Initialize tracing; logs go to stderr so stdout carries only the report
    let filter = if cli.verbose {
        EnvFilter::new("imgopt=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imgopt=info"))
    };
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    let config = ImgoptConfig::load_with(cli.config.as_deref())?;

    // Execute the requested command
    match cli.command {
        Commands::Run {
            scope,
            alt_format,
            dry_run,
            concurrency,
            format,
        } => {
            let scope = cli::resolve_scope(&config, scope.as_deref());
            let report = cli::run_variants(&config, &scope, alt_format, dry_run, concurrency).await?;
            println!("{}", cli::render_report(&report, format)?);
        }

        Commands::Purge {
            scope,
            dry_run,
            format,
        } => {
            let scope = cli::resolve_scope(&config, scope.as_deref());
            let report = cli::purge_scope(&config, &scope, dry_run).await?;
            println!("{}", cli::render_report(&report, format)?);
        }

        Commands::Classify { keys } => {
            for key in &keys {
                println!("{}", cli::describe_key(&config.naming, key));
            }
        }
    }

    Ok(())
}
