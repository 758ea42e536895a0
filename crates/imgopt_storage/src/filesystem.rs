//! Filesystem-backed object store.
//!
//! Object keys map directly onto paths below a base directory, so
//! `blog/2024/01/cover.jpg` lives at `{base_path}/blog/2024/01/cover.jpg`.

use crate::{ObjectInfo, ObjectStore, ObjectStream, join_url};
use futures::StreamExt;
use imgopt_error::{StorageError, StorageErrorKind, StorageResult};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Suffix of in-flight writes. A crash mid-write leaves `key.tmp` behind,
/// which the junk purger removes on the next run.
const TEMP_SUFFIX: &str = ".tmp";

/// Filesystem storage backend.
///
/// # Example Structure
///
/// ```text
/// /srv/media/
/// └── blog/
///     └── 2024/
///         └── 01/
///             ├── cover.jpg
///             ├── cover@2x.jpg
///             └── _mobile/
///                 └── cover@2x.jpg
/// ```
///
/// Writes go to a temp file beside the target and are renamed into place,
/// so readers never observe a partial object.
#[derive(Debug, Clone)]
pub struct FileSystemObjectStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FileSystemObjectStore {
    /// Create a new filesystem store rooted at `base_path`.
    ///
    /// Creates the base directory if it doesn't exist. Without a
    /// `public_base_url`, public URLs are `file://` URLs.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path, public_base_url))]
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: Option<String>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        let public_base_url =
            public_base_url.unwrap_or_else(|| format!("file://{}", base_path.display()));

        tracing::info!(path = %base_path.display(), "Opened filesystem object store");
        Ok(Self {
            base_path,
            public_base_url,
        })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map an object key onto a path, refusing keys that escape the root.
    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let invalid = key.is_empty()
            || key.starts_with('/')
            || key.ends_with('/')
            || key.contains('\\')
            || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if invalid {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(key.to_string())));
        }
        Ok(self.base_path.join(key))
    }

    /// Temp path beside `path`: `cover.jpg` becomes `cover.jpg.tmp`.
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(TEMP_SUFFIX);
        PathBuf::from(name)
    }

    async fn ensure_parent(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        Ok(())
    }

    async fn rename_into_place(temp_path: &Path, path: &Path) -> StorageResult<()> {
        tokio::fs::rename(temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })
    }

    /// Object key for a path below the base directory, `/`-separated.
    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect();
        Some(segments?.join("/"))
    }

    /// Directory to start walking from: the deepest complete folder of `prefix`.
    fn walk_root(&self, prefix: &str) -> PathBuf {
        match prefix.rfind('/') {
            Some(idx) => self.base_path.join(&prefix[..idx]),
            None => self.base_path.clone(),
        }
    }

    /// Read one directory, returning subdirectories and matching files in name order.
    async fn read_level(
        &self,
        dir: &Path,
        prefix: &str,
    ) -> StorageResult<(Vec<PathBuf>, Vec<ObjectInfo>)> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((Vec::new(), Vec::new()));
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    dir.display(),
                    e
                ))));
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        dir.display(),
                        e
                    ))));
                }
            };
            let path = entry.path();
            let metadata = entry.metadata().await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })?;

            if metadata.is_dir() {
                dirs.push(path);
            } else if let Some(key) = self.key_for(&path) {
                if key.starts_with(prefix) {
                    files.push(ObjectInfo::new(key, metadata.len()));
                }
            } else {
                tracing::warn!(path = %path.display(), "Skipping file with non UTF-8 name");
            }
        }

        // Reverse so popping from the stack visits directories in name order.
        dirs.sort_by(|a, b| b.cmp(a));
        files.sort_by(|a, b| a.key.cmp(&b.key));
        Ok((dirs, files))
    }
}

#[async_trait::async_trait]
impl ObjectStore for FileSystemObjectStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    fn list<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a> {
        let state = (vec![self.walk_root(prefix)], VecDeque::<ObjectInfo>::new());
        futures::stream::try_unfold(state, move |(mut dirs, mut pending)| async move {
            loop {
                if let Some(info) = pending.pop_front() {
                    return Ok(Some((info, (dirs, pending))));
                }
                let Some(dir) = dirs.pop() else {
                    return Ok::<_, StorageError>(None);
                };
                let (subdirs, files) = self.read_level(&dir, prefix).await?;
                dirs.extend(subdirs);
                pending.extend(files);
            }
        })
        .boxed()
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(key)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(key.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::debug!(size = data.len(), "Read object");
        Ok(data)
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        Self::ensure_parent(&path).await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = Self::temp_path(&path);
        tokio::fs::write(&temp_path, bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        Self::rename_into_place(&temp_path, &path).await?;

        tracing::debug!("Wrote object");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn copy(&self, src: &str, dst: &str) -> StorageResult<()> {
        let src_path = self.path_for(src)?;
        let dst_path = self.path_for(dst)?;
        Self::ensure_parent(&dst_path).await?;

        let temp_path = Self::temp_path(&dst_path);
        tokio::fs::copy(&src_path, &temp_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(src.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "copy {} to {}: {}",
                    src_path.display(),
                    temp_path.display(),
                    e
                )))
            }
        })?;
        Self::rename_into_place(&temp_path, &dst_path).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))),
        }
    }

    async fn head(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        let path = self.path_for(key)?;

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(ObjectInfo::new(key, metadata.len()))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }
}
