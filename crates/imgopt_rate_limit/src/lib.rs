//! Remote call policy and configuration.
//!
//! Every call imgopt makes to the object store or the public CDN goes
//! through a [`RemoteCallLimiter`], which enforces:
//! - a request-per-second quota (governor, GCRA)
//! - a concurrent call limit (Tokio semaphore)
//! - a per-attempt timeout
//! - bounded exponential backoff with jitter for transient failures
//!
//! This crate also owns [`ImgoptConfig`], the layered TOML configuration
//! every other crate is built from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;

pub use config::{
    BackendKind, ExistenceConfig, ExistenceStrategy, ImgoptConfig, PipelineConfig, RemoteConfig,
    StorageConfig,
};
pub use limiter::{RemoteCallGuard, RemoteCallLimiter};
