//! Backend selection from configuration.

use crate::{FileSystemObjectStore, MemoryObjectStore, ObjectStore};
use imgopt_error::{StorageError, StorageErrorKind, StorageResult};
use imgopt_rate_limit::{BackendKind, StorageConfig};
use std::sync::Arc;

/// Base URL for stores with nothing configured.
const LOCAL_PUBLIC_BASE_URL: &str = "http://localhost";

/// Build the object store named by `config.backend`.
///
/// # Errors
///
/// - `StorageErrorKind::Unsupported` for `s3` when built without the `s3` feature
/// - `StorageErrorKind::DirectoryCreation` when the filesystem root cannot be created
#[tracing::instrument(skip(config), fields(backend = %config.backend))]
pub async fn build_store(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.backend {
        BackendKind::Memory => {
            let base = config
                .public_base_url
                .clone()
                .unwrap_or_else(|| LOCAL_PUBLIC_BASE_URL.to_string());
            Ok(Arc::new(MemoryObjectStore::new(base)))
        }
        BackendKind::Filesystem => {
            let base_path = config.base_path.clone().ok_or_else(|| {
                StorageError::new(StorageErrorKind::DirectoryCreation(
                    "storage.base_path is not set".to_string(),
                ))
            })?;
            Ok(Arc::new(FileSystemObjectStore::new(
                base_path,
                config.public_base_url.clone(),
            )?))
        }
        BackendKind::S3 => build_s3(config).await,
    }
}

#[cfg(feature = "s3")]
async fn build_s3(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    Ok(Arc::new(crate::S3ObjectStore::new(config).await?))
}

#[cfg(not(feature = "s3"))]
async fn build_s3(_config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    Err(StorageError::new(StorageErrorKind::Unsupported(
        "s3 backend requires building with the `s3` feature".to_string(),
    )))
}
