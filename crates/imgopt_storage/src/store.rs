//! Object store trait definition.

use futures::TryStreamExt;
use futures::stream::BoxStream;
use imgopt_error::StorageResult;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Lazily paginated listing of objects under a prefix.
pub type ObjectStream<'a> = BoxStream<'a, StorageResult<ObjectInfo>>;

/// A listed or inspected object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectInfo {
    /// Full object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
}

impl ObjectInfo {
    /// Create a new object description.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Objects on this page, in key order
    pub objects: Vec<ObjectInfo>,
    /// Continuation token for the next page, `None` on the last page
    pub next: Option<String>,
}

/// Capability interface over a remote bucket.
///
/// Every operation touches exactly one key (or one prefix for [`list`]), so a
/// failure on one key never affects another. Callers own retry and error
/// isolation.
///
/// [`list`]: ObjectStore::list
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs ("memory", "filesystem", "s3").
    fn backend_name(&self) -> &'static str;

    /// List every object whose key starts with `prefix`.
    ///
    /// The stream is lazy; dropping it stops pagination. Calling `list`
    /// again restarts from the first page.
    fn list<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a>;

    /// Fetch one page of the listing under `prefix`.
    ///
    /// Pass `None` for the first page and the previous page's `next` token
    /// afterwards. Each page is a single remote call, so callers can bound
    /// and retry pages individually. Backends without native pagination
    /// return the whole listing as one page.
    async fn list_page(
        &self,
        prefix: &str,
        _continuation: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let objects: Vec<ObjectInfo> = self.list(prefix).try_collect().await?;
        Ok(ObjectPage {
            objects,
            next: None,
        })
    }

    /// Read an object's bytes.
    ///
    /// # Errors
    ///
    /// `StorageErrorKind::NotFound` when the key is absent.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Write an object, replacing any existing one.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()>;

    /// Server-side copy of `src` to `dst`.
    ///
    /// # Errors
    ///
    /// `StorageErrorKind::NotFound` when `src` is absent.
    async fn copy(&self, src: &str, dst: &str) -> StorageResult<()>;

    /// Delete an object. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Object metadata, or `None` when the key is absent.
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectInfo>>;

    /// URL under which the object is publicly served.
    fn public_url(&self, key: &str) -> String;

    /// Whether [`head`](ObjectStore::head) reflects the store's real state.
    ///
    /// Backends fronted only by a CDN return `false`, which makes the
    /// existence resolver fall back to public URL probes.
    fn supports_metadata(&self) -> bool {
        true
    }
}

/// Characters escaped inside a key segment. Non-ASCII bytes are always escaped.
const KEY_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode an object key for use in a URL path, keeping `/`.
///
/// ```
/// use imgopt_storage::encode_key;
///
/// assert_eq!(encode_key("blog/2024/01/my cover.jpg"), "blog/2024/01/my%20cover.jpg");
/// ```
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a base URL and an object key with exactly one `/`, encoding the key.
pub fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        encode_key(key.trim_start_matches('/'))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_keeps_separators() {
        assert_eq!(encode_key("blog/2024/01/cover.jpg"), "blog/2024/01/cover.jpg");
        assert_eq!(encode_key("blog/cover@2x.jpg"), "blog/cover@2x.jpg");
    }

    #[test]
    fn test_encode_key_escapes_reserved_and_unicode() {
        assert_eq!(encode_key("a/my cover.jpg"), "a/my%20cover.jpg");
        assert_eq!(encode_key("a/c++ 100%.png"), "a/c%2B%2B%20100%25.png");
        assert_eq!(encode_key("a/what?#.jpg"), "a/what%3F%23.jpg");
        assert_eq!(encode_key("café/ü.jpg"), "caf%C3%A9/%C3%BC.jpg");
    }

    #[test]
    fn test_join_url_encodes_key() {
        assert_eq!(
            join_url("https://cdn.example.com/", "/blog/my cover.jpg"),
            "https://cdn.example.com/blog/my%20cover.jpg"
        );
    }
}
