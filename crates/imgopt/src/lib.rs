//! imgopt - retina, mobile and WebP variants for a CDN bucket.
//!
//! Given a directory prefix in an object store, imgopt deletes junk left by
//! earlier runs, then derives for every canonical upload:
//!
//! - a **retina** copy (`cover@2x.jpg`)
//! - a **mobile** image at half the retina resolution (`_mobile/cover@2x.jpg`)
//! - optionally a **WebP** re-encode (`cover.jpg.webp`)
//!
//! Variants that already exist are left alone, so runs are idempotent.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use imgopt::{DirectoryScope, ImgoptConfig, VariantPipeline, build_store};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ImgoptConfig::load()?;
//!     let store = build_store(&config.storage).await?;
//!     let pipeline = VariantPipeline::from_config(&config, store)?;
//!
//!     let scope = DirectoryScope::current_month(&config.pipeline.uploads_root);
//!     let report = pipeline.run(&scope, &CancellationToken::new()).await?;
//!     println!("{} variants created", report.total_created());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `s3` - S3-compatible bucket backend (aws-sdk-s3)
//!
//! # Architecture
//!
//! - `imgopt_error` - Error types
//! - `imgopt_core` - Naming scheme, junk patterns, scopes and run reports
//! - `imgopt_rate_limit` - Remote call limits and configuration
//! - `imgopt_storage` - Object store backends and existence checks
//! - `imgopt_codec` - Decode, downscale and encode
//! - `imgopt_pipeline` - Junk purger and variant pipeline
//!
//! This crate re-exports everything for convenience.

pub use imgopt_codec::*;
pub use imgopt_core::*;
pub use imgopt_error::*;
pub use imgopt_pipeline::*;
pub use imgopt_rate_limit::*;
pub use imgopt_storage::*;
