//! Object store gateway for imgopt.
//!
//! The pipeline talks to the bucket only through the [`ObjectStore`] trait:
//! list by prefix, get, put with a content type, server-side copy, delete,
//! metadata lookup and public URL resolution. Backends hold no cross-call
//! state beyond their connection.
//!
//! # Backends
//!
//! - [`MemoryObjectStore`]: process-local, for tests and dry experiments
//! - [`FileSystemObjectStore`]: a directory tree with atomic writes
//! - `S3ObjectStore`: any S3-compatible bucket (`s3` feature)
//!
//! [`ExistenceResolver`] decides whether a variant is already present, by
//! metadata when the backend has it and by public URL probe otherwise.
//!
//! # Example
//!
//! ```rust
//! use imgopt_storage::{MemoryObjectStore, ObjectStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryObjectStore::new("https://cdn.example.com");
//! store.put("blog/2024/01/cover.jpg", b"jpeg bytes", "image/jpeg").await?;
//! store.copy("blog/2024/01/cover.jpg", "blog/2024/01/cover@2x.jpg").await?;
//!
//! assert!(store.head("blog/2024/01/cover@2x.jpg").await?.is_some());
//! assert_eq!(
//!     store.public_url("blog/2024/01/cover.jpg"),
//!     "https://cdn.example.com/blog/2024/01/cover.jpg"
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod existence;
mod filesystem;
mod memory;
#[cfg(feature = "s3")]
mod s3;
mod store;

pub use builder::build_store;
pub use existence::{ExistenceResolver, PROBE_CONTENT_TYPES};
pub use filesystem::FileSystemObjectStore;
pub use imgopt_error::{StorageError, StorageErrorKind, StorageResult};
pub use memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;
pub use store::{ObjectInfo, ObjectPage, ObjectStore, ObjectStream, encode_key, join_url};
