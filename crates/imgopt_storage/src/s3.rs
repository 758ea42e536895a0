//! S3-compatible object store.

use crate::{ObjectInfo, ObjectPage, ObjectStore, ObjectStream, encode_key, join_url};
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use futures::{StreamExt, TryStreamExt};
use imgopt_error::{StorageError, StorageErrorKind, StorageResult};
use imgopt_rate_limit::StorageConfig;

/// Object store over an S3 bucket.
///
/// Credentials come from the standard AWS provider chain (environment,
/// profile, instance metadata).
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Connect to the bucket named in `config`.
    ///
    /// # Errors
    ///
    /// `StorageErrorKind::Rejected` when no bucket is configured.
    #[tracing::instrument(skip(config), fields(bucket = ?config.bucket, endpoint = ?config.endpoint_url))]
    pub async fn new(config: &StorageConfig) -> StorageResult<Self> {
        let bucket = config.bucket.clone().ok_or_else(|| {
            StorageError::new(StorageErrorKind::Rejected(
                "no bucket configured for the s3 backend".to_string(),
            ))
        })?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(url) = &config.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        let public_base_url = match &config.public_base_url {
            Some(url) => url.clone(),
            None => {
                let region = shared
                    .region()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "us-east-1".to_string());
                format!("https://{}.s3.{}.amazonaws.com", bucket, region)
            }
        };

        tracing::info!(bucket = %bucket, "Connected S3 object store");
        Ok(Self {
            client,
            bucket,
            public_base_url,
        })
    }
}

/// Classify an SDK failure.
///
/// Timeouts, dispatch failures, 5xx and 429 responses are transient; a 404
/// is `NotFound`; everything else is rejected.
fn map_sdk_error<E>(operation: &str, key: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let detail = format!("{} {}: {}", operation, key, DisplayErrorContext(&err));
    let kind = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StorageErrorKind::Transport(detail)
        }
        SdkError::ServiceError(context) => match context.raw().status().as_u16() {
            404 => StorageErrorKind::NotFound(key.to_string()),
            429 => StorageErrorKind::Transport(detail),
            status if status >= 500 => StorageErrorKind::Transport(detail),
            _ => StorageErrorKind::Rejected(detail),
        },
        _ => StorageErrorKind::Rejected(detail),
    };
    StorageError::new(kind)
}

/// `x-amz-copy-source` value for `key` in `bucket`.
///
/// The header is URL-decoded by S3, so each key segment is percent-encoded.
fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, encode_key(key))
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    fn list<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a> {
        // State: None once the last page is read, Some(token) before each page.
        let first_page: Option<Option<String>> = Some(None);
        futures::stream::try_unfold(first_page, move |state| async move {
            let Some(token) = state else {
                return Ok::<_, StorageError>(None);
            };
            let page = self.list_page(prefix, token.as_deref()).await?;
            let objects = futures::stream::iter(page.objects.into_iter().map(Ok::<_, StorageError>));
            Ok(Some((objects, page.next.map(Some))))
        })
        .try_flatten()
        .boxed()
    }

    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix);
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| map_sdk_error("list", prefix, e))?;

        let objects: Vec<ObjectInfo> = response
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                if key.ends_with('/') {
                    return None;
                }
                let size = object.size().unwrap_or(0).max(0) as u64;
                Some(ObjectInfo::new(key, size))
            })
            .collect();
        tracing::debug!(prefix, objects = objects.len(), "Listed page");

        let next = match (response.is_truncated(), response.next_continuation_token()) {
            (Some(true), Some(token)) => Some(token.to_string()),
            _ => None,
        };
        Ok(ObjectPage { objects, next })
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("get", key, e))?;

        let body = output.body.collect().await.map_err(|e| {
            StorageError::new(StorageErrorKind::Transport(format!(
                "read body of {}: {}",
                key, e
            )))
        })?;
        Ok(body.into_bytes().to_vec())
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| map_sdk_error("put", key, e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn copy(&self, src: &str, dst: &str) -> StorageResult<()> {
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(copy_source(&self.bucket, src))
            .key(dst)
            .send()
            .await
            .map_err(|e| map_sdk_error("copy", src, e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("delete", key, e))?;
        Ok(())
    }

    async fn head(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let size = output.content_length().unwrap_or(0).max(0) as u64;
                Ok(Some(ObjectInfo::new(key, size)))
            }
            Err(e) => {
                let err = map_sdk_error("head", key, e);
                if err.is_not_found() { Ok(None) } else { Err(err) }
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }
}
