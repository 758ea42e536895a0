//! Object store double with scripted failures.

use futures::StreamExt;
use imgopt_storage::{
    MemoryObjectStore, ObjectInfo, ObjectPage, ObjectStore, ObjectStream, StorageError,
    StorageErrorKind, StorageResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Wraps a [`MemoryObjectStore`] and fails or observes calls on request.
pub struct ScriptedStore {
    inner: MemoryObjectStore,
    list_error: Option<StorageErrorKind>,
    page_delay: Option<Duration>,
    transient_page_failures: AtomicUsize,
    page_requests: AtomicUsize,
    transient_put_failures: AtomicUsize,
    reject_puts: bool,
    reject_deletes: bool,
    cancel_on_get: Option<CancellationToken>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryObjectStore::new("https://cdn.example.com"),
            list_error: None,
            page_delay: None,
            transient_page_failures: AtomicUsize::new(0),
            page_requests: AtomicUsize::new(0),
            transient_put_failures: AtomicUsize::new(0),
            reject_puts: false,
            reject_deletes: false,
            cancel_on_get: None,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    /// Every listing fails with `kind`.
    pub fn failing_list(mut self, kind: StorageErrorKind) -> Self {
        self.list_error = Some(kind);
        self
    }

    /// Listings come back `page_size` objects at a time, each page taking `delay`.
    pub fn slow_pages(mut self, page_size: usize, delay: Duration) -> Self {
        self.inner = MemoryObjectStore::new("https://cdn.example.com").with_page_size(page_size);
        self.page_delay = Some(delay);
        self
    }

    /// The next `count` requests for a page after the first fail with a
    /// transport error.
    pub fn transient_page_failures(self, count: usize) -> Self {
        self.transient_page_failures.store(count, Ordering::SeqCst);
        self
    }

    /// The next `count` puts fail with a transport error.
    pub fn transient_put_failures(self, count: usize) -> Self {
        self.transient_put_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Every put is rejected.
    pub fn rejecting_puts(mut self) -> Self {
        self.reject_puts = true;
        self
    }

    /// Every delete is rejected.
    pub fn rejecting_deletes(mut self) -> Self {
        self.reject_deletes = true;
        self
    }

    /// Cancel `token` during the first get.
    pub fn cancel_on_get(mut self, token: CancellationToken) -> Self {
        self.cancel_on_get = Some(token);
        self
    }

    /// Seed an object without going through the scripted put path.
    pub async fn seed(&self, key: &str, bytes: &[u8], content_type: &str) {
        self.inner
            .put(key, bytes, content_type)
            .await
            .expect("Failed to seed object");
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.inner.keys().await
    }
}

#[async_trait::async_trait]
impl ObjectStore for ScriptedStore {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    fn list<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a> {
        match &self.list_error {
            Some(kind) => {
                let err = StorageError::new(kind.clone());
                futures::stream::once(async move { Err::<ObjectInfo, _>(err) }).boxed()
            }
            None => self.inner.list(prefix),
        }
    }

    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = &self.list_error {
            return Err(StorageError::new(kind.clone()));
        }
        if let Some(delay) = self.page_delay {
            tokio::time::sleep(delay).await;
        }
        let remaining = self.transient_page_failures.load(Ordering::SeqCst);
        if continuation.is_some() && remaining > 0 {
            self.transient_page_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::new(StorageErrorKind::Transport(
                "connection reset by peer".to_string(),
            )));
        }
        self.inner.list_page(prefix, continuation).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_get {
            token.cancel();
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.reject_puts {
            return Err(StorageError::new(StorageErrorKind::Rejected(format!(
                "403 Forbidden: {}",
                key
            ))));
        }
        let remaining = self.transient_put_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_put_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::new(StorageErrorKind::Transport(
                "connection reset by peer".to_string(),
            )));
        }
        self.inner.put(key, bytes, content_type).await
    }

    async fn copy(&self, src: &str, dst: &str) -> StorageResult<()> {
        self.inner.copy(src, dst).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.reject_deletes {
            return Err(StorageError::new(StorageErrorKind::Rejected(format!(
                "403 Forbidden: {}",
                key
            ))));
        }
        self.inner.delete(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        self.inner.head(key).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }
}
