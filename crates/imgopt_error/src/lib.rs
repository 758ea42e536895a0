//! Error types for the imgopt workspace.
//!
//! This crate provides the foundation error types used by every imgopt crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use imgopt_error::{ImgoptResult, StorageError, StorageErrorKind};
//!
//! fn fetch(key: &str) -> ImgoptResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::NotFound(key.to_string())))?
//! }
//!
//! assert!(fetch("blog/cover.jpg").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod config;
mod error;
mod http;
mod pipeline;
mod retry;
mod storage;

pub use codec::{CodecError, CodecErrorKind, CodecResult};
pub use config::ConfigError;
pub use error::{ImgoptError, ImgoptErrorKind, ImgoptResult};
pub use http::HttpError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use retry::RetryableError;
pub use storage::{StorageError, StorageErrorKind, StorageResult};
