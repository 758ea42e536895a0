//! Junk purger and variant pipeline.
//!
//! A run over a [`DirectoryScope`](imgopt_core::DirectoryScope) is:
//!
//! 1. Purge junk objects under the scope ([`JunkPurger`]); this finishes
//!    before anything else is listed.
//! 2. List canonical assets.
//! 3. For each asset, independently and in parallel: Retina, then Mobile,
//!    then (optionally) AltFormat.
//! 4. Fold the per-asset outcomes into a [`RunReport`](imgopt_core::RunReport).
//!
//! Per-asset failures land in the report. Only a failed scope listing
//! aborts the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use imgopt_core::DirectoryScope;
//! use imgopt_pipeline::VariantPipeline;
//! use imgopt_rate_limit::ImgoptConfig;
//! use imgopt_storage::build_store;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ImgoptConfig::load()?;
//! let store = build_store(&config.storage).await?;
//! let pipeline = VariantPipeline::from_config(&config, store)?;
//!
//! let report = pipeline
//!     .run(&DirectoryScope::new("blog/2024/01"), &CancellationToken::new())
//!     .await?;
//! println!("{} variants created", report.total_created());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod listing;
mod options;
mod pipeline;
mod purger;
mod worker;

pub use options::{PipelineOptions, PipelineOptionsBuilder};
pub use pipeline::VariantPipeline;
pub use purger::{JunkPurger, PurgeOutcome};
