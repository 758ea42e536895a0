//! Variant existence resolution.
//!
//! Metadata checks ask the store directly and are strongly consistent. Probes
//! GET the public URL and are subject to CDN propagation lag, so they are
//! used only when the backend has no metadata call.
//!
//! Both strategies fail closed: an error means "absent", which triggers a
//! regeneration that is safe to repeat.

use crate::ObjectStore;
use imgopt_error::{ConfigError, HttpError, ImgoptResult, StorageError, StorageErrorKind, StorageResult};
use imgopt_rate_limit::{ExistenceConfig, ExistenceStrategy, RemoteCallLimiter};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Content types a probe accepts as "the variant exists".
///
/// `application/octet-stream` is what some CDNs serve before the content
/// type of a fresh upload settles.
pub const PROBE_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/octet-stream",
];

/// Answers "does this key exist?" for the pipeline.
#[derive(Clone)]
pub struct ExistenceResolver {
    store: Arc<dyn ObjectStore>,
    strategy: ExistenceStrategy,
    client: reqwest::Client,
    limiter: RemoteCallLimiter,
}

impl std::fmt::Debug for ExistenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExistenceResolver")
            .field("backend", &self.store.backend_name())
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl ExistenceResolver {
    /// Create a resolver for `store`.
    ///
    /// `Auto` resolves to `Metadata` when the backend supports it and to
    /// `Probe` otherwise.
    ///
    /// # Errors
    ///
    /// - `ConfigError` when `Metadata` is requested from a backend without it
    /// - `HttpError` when the probe client cannot be built
    pub fn new(
        store: Arc<dyn ObjectStore>,
        config: &ExistenceConfig,
        limiter: RemoteCallLimiter,
    ) -> ImgoptResult<Self> {
        let strategy = match config.strategy {
            ExistenceStrategy::Auto if store.supports_metadata() => ExistenceStrategy::Metadata,
            ExistenceStrategy::Auto => ExistenceStrategy::Probe,
            ExistenceStrategy::Metadata if !store.supports_metadata() => {
                return Err(ConfigError::new(format!(
                    "existence.strategy = metadata, but the {} backend has no metadata call",
                    store.backend_name()
                ))
                .into());
            }
            other => other,
        };

        // A probe never outlives the limiter's per-attempt deadline
        let probe_timeout = Duration::from_millis(config.probe_timeout_ms).min(limiter.timeout());
        let client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build probe client: {}", e)))?;

        debug!(
            backend = store.backend_name(),
            %strategy,
            probe_timeout_ms = probe_timeout.as_millis() as u64,
            "Existence resolver ready"
        );
        Ok(Self {
            store,
            strategy,
            client,
            limiter,
        })
    }

    /// The strategy in effect after resolving `Auto`.
    pub fn strategy(&self) -> ExistenceStrategy {
        self.strategy
    }

    /// Whether `key` exists. Errors count as absent.
    #[instrument(skip(self), fields(strategy = %self.strategy))]
    pub async fn exists(&self, key: &str) -> bool {
        let result = match self.strategy {
            ExistenceStrategy::Probe => self.exists_by_probe(key).await,
            _ => self.exists_by_metadata(key).await,
        };

        match result {
            Ok(present) => {
                debug!(present, "Existence resolved");
                present
            }
            Err(e) => {
                warn!(error = %e, "Existence check failed, treating as absent");
                false
            }
        }
    }

    async fn exists_by_metadata(&self, key: &str) -> StorageResult<bool> {
        let label = format!("head {}", key);
        let info = self
            .limiter
            .execute(&label, || self.store.head(key))
            .await?;
        Ok(info.is_some())
    }

    async fn exists_by_probe(&self, key: &str) -> StorageResult<bool> {
        let url = self.store.public_url(key);
        let label = format!("probe {}", url);
        self.limiter
            .execute(&label, || self.probe(&url))
            .await
    }

    async fn probe(&self, url: &str) -> StorageResult<bool> {
        let response = self.client.get(url).send().await.map_err(|e| {
            StorageError::new(StorageErrorKind::Transport(format!("GET {}: {}", url, e)))
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(StorageError::new(StorageErrorKind::Transport(format!(
                "GET {}: {}",
                url, status
            ))));
        }
        if status != StatusCode::OK {
            return Ok(false);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        Ok(is_probe_content_type(content_type))
    }
}

/// Media type of a `Content-Type` header value is one of [`PROBE_CONTENT_TYPES`].
fn is_probe_content_type(header: &str) -> bool {
    let media_type = header.split(';').next().unwrap_or_default().trim();
    PROBE_CONTENT_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(media_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parameters_are_ignored() {
        assert!(is_probe_content_type("image/jpeg"));
        assert!(is_probe_content_type("IMAGE/PNG; charset=binary"));
        assert!(is_probe_content_type("application/octet-stream"));
        assert!(!is_probe_content_type("text/html; charset=utf-8"));
        assert!(!is_probe_content_type(""));
    }
}
