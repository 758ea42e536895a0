//! Remote call limiter using governor, a Tokio Semaphore and tokio-retry2.
//!
//! The GCRA (Generic Cell Rate Algorithm) quota keeps the object store and the
//! CDN below their request rate limits; the semaphore caps calls in flight.

use crate::RemoteConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use imgopt_error::{RetryableError, StorageError, StorageErrorKind, StorageResult};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

// Type alias for our direct rate limiter
type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Throttles, times out and retries remote calls.
///
/// Cloning is cheap; clones share the same quota and semaphore.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = RemoteCallLimiter::new(&config.remote);
/// let bytes = limiter
///     .execute("get blog/cover.jpg", || store.get("blog/cover.jpg"))
///     .await?;
/// ```
#[derive(Clone)]
pub struct RemoteCallLimiter {
    // Requests per second across all calls
    rps_limiter: Option<Arc<DirectRateLimiter>>,

    // Calls in flight
    concurrent_semaphore: Arc<Semaphore>,

    timeout: Duration,
    max_retries: usize,
    backoff_factor_ms: u64,
    max_backoff: Duration,
}

impl std::fmt::Debug for RemoteCallLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCallLimiter")
            .field("throttled", &self.rps_limiter.is_some())
            .field("available_permits", &self.concurrent_semaphore.available_permits())
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl RemoteCallLimiter {
    /// Create a limiter from remote call settings.
    ///
    /// - `requests_per_second`, when set, is enforced with governor
    /// - `max_concurrent` bounds calls in flight
    /// - `timeout_ms` applies to every attempt
    /// - `max_retries` attempts follow the first for transient failures
    pub fn new(config: &RemoteConfig) -> Self {
        let rps_limiter = config.requests_per_second.and_then(|rps| {
            NonZeroU32::new(rps).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_second(n))))
        });

        let max_concurrent = config.max_concurrent.max(1) as usize;

        Self {
            rps_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            backoff_factor_ms: config.backoff_factor_ms,
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Deadline applied to each attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Wait for quota and a concurrency slot.
    ///
    /// The slot is released when the guard is dropped.
    pub async fn acquire(&self) -> RemoteCallGuard {
        if let Some(limiter) = &self.rps_limiter {
            limiter.until_ready().await;
        }

        // Acquire concurrent slot last to avoid holding it while waiting on quota.
        // The semaphore is never closed, so acquisition only fails in theory.
        let permit = self.concurrent_semaphore.clone().acquire_owned().await.ok();

        RemoteCallGuard { _permit: permit }
    }

    /// Run `operation` under the quota with a per-attempt timeout, retrying
    /// transient failures with exponential backoff.
    ///
    /// Permanent failures (not found, rejected) return immediately. A
    /// timeout counts as transient.
    pub async fn execute<F, Fut, T>(&self, label: &str, operation: F) -> StorageResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        // 2^n * factor: 200ms, 400ms, ... with the default factor of 100
        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor(self.backoff_factor_ms)
            .max_delay(self.max_backoff)
            .map(jitter)
            .take(self.max_retries);

        let operation = &operation;
        Retry::spawn(retry_strategy, move || async move {
            let _guard = self.acquire().await;

            let result = match tokio::time::timeout(self.timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(StorageError::new(StorageErrorKind::Timeout {
                    operation: label.to_string(),
                    millis: self.timeout.as_millis() as u64,
                })),
            };

            match result {
                Ok(value) => {
                    debug!(operation = label, "Remote call succeeded");
                    Ok(value)
                }
                Err(e) if e.is_retryable() => {
                    warn!(operation = label, error = %e, "Transient failure, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await
    }
}

/// RAII guard for a remote call slot.
pub struct RemoteCallGuard {
    _permit: Option<tokio::sync::OwnedSemaphorePermit>,
}
