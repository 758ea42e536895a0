//! In-memory object store.

use crate::{ObjectInfo, ObjectPage, ObjectStore, ObjectStream, join_url};
use futures::StreamExt;
use imgopt_error::{StorageError, StorageErrorKind, StorageResult};
use std::collections::BTreeMap;
use std::ops::Bound;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// Page size used by S3 `ListObjectsV2`.
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Object store backed by a sorted map.
///
/// Contents are lost when the store is dropped. Listing returns keys in
/// lexicographic order, matching S3. Paged listings use the last key of a
/// page as the continuation token.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    public_base_url: String,
    metadata: bool,
    page_size: usize,
}

impl MemoryObjectStore {
    /// Create an empty store serving objects under `public_base_url`.
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            public_base_url: public_base_url.into(),
            metadata: true,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Limit [`list_page`](ObjectStore::list_page) to `page_size` objects
    /// per page (at least one).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Hide metadata support so existence checks go through public URL probes.
    pub fn without_metadata(mut self) -> Self {
        self.metadata = false;
        self
    }

    /// All keys currently stored, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Content type recorded for `key`.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.content_type.clone())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn list<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a> {
        futures::stream::once(async move {
            let objects = self.objects.read().await;
            objects
                .range(prefix.to_string()..)
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(key, object)| Ok(ObjectInfo::new(key.clone(), object.bytes.len() as u64)))
                .collect::<Vec<_>>()
        })
        .flat_map(futures::stream::iter)
        .boxed()
    }

    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let start = match continuation {
            Some(token) => Bound::Excluded(token.to_string()),
            None => Bound::Included(prefix.to_string()),
        };
        let objects = self.objects.read().await;
        let mut listed = objects
            .range((start, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectInfo::new(key.clone(), object.bytes.len() as u64));

        let page: Vec<ObjectInfo> = listed.by_ref().take(self.page_size).collect();
        let next = match listed.next() {
            Some(_) => page.last().map(|object| object.key.clone()),
            None => None,
        };
        Ok(ObjectPage {
            objects: page,
            next,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.bytes.clone())
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(key.to_string())))
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        tracing::debug!("Stored object in memory");
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> StorageResult<()> {
        let mut objects = self.objects.write().await;
        let object = objects
            .get(src)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(src.to_string())))?;
        objects.insert(dst.to_string(), object);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn head(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        Ok(self
            .objects
            .read()
            .await
            .get(key)
            .map(|object| ObjectInfo::new(key, object.bytes.len() as u64)))
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }

    fn supports_metadata(&self) -> bool {
        self.metadata
    }
}
