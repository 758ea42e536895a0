//! Junk purger.
//!
//! Deletes objects matching a [`JunkPattern`] so that a later existence check
//! never mistakes a leftover artifact for a valid variant.

use crate::listing::list_scope;
use futures::StreamExt;
use imgopt_core::{AssetFailure, DirectoryScope, JunkPattern};
use imgopt_error::ImgoptResult;
use imgopt_rate_limit::RemoteCallLimiter;
use imgopt_storage::ObjectStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of one purge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Keys deleted (or that would be, in a dry run), sorted
    pub purged: Vec<String>,
    /// Deletes that failed after retries
    pub failures: Vec<AssetFailure>,
}

/// Scans a scope and deletes junk objects.
#[derive(Clone)]
pub struct JunkPurger {
    store: Arc<dyn ObjectStore>,
    limiter: RemoteCallLimiter,
    concurrency: usize,
}

impl JunkPurger {
    /// Create a purger deleting up to `concurrency` objects at once.
    pub fn new(store: Arc<dyn ObjectStore>, limiter: RemoteCallLimiter, concurrency: usize) -> Self {
        Self {
            store,
            limiter,
            concurrency: concurrency.max(1),
        }
    }

    /// Junk objects under `scope` and the pattern each matched.
    ///
    /// # Errors
    ///
    /// `PipelineErrorKind::ScopeList` when the scope cannot be listed.
    pub async fn find_junk(&self, scope: &DirectoryScope) -> ImgoptResult<Vec<(String, JunkPattern)>> {
        let objects = list_scope(self.store.as_ref(), &self.limiter, scope).await?;
        Ok(objects
            .into_iter()
            .filter_map(|object| JunkPattern::detect(&object.key).map(|pattern| (object.key, pattern)))
            .collect())
    }

    /// Delete every junk object under `scope`.
    ///
    /// A failed delete is recorded and the pass continues. With `dry_run`
    /// the keys are reported but nothing is deleted.
    ///
    /// # Errors
    ///
    /// `PipelineErrorKind::ScopeList` when the scope cannot be listed.
    #[instrument(skip(self), fields(scope = %scope, backend = self.store.backend_name()))]
    pub async fn purge(&self, scope: &DirectoryScope, dry_run: bool) -> ImgoptResult<PurgeOutcome> {
        let junk = self.find_junk(scope).await?;
        let mut outcome = PurgeOutcome::default();

        if dry_run {
            for (key, pattern) in junk {
                info!(key = %key, %pattern, "Would purge junk object");
                outcome.purged.push(key);
            }
            outcome.purged.sort();
            return Ok(outcome);
        }

        let mut deletes = futures::stream::iter(junk)
            .map(|(key, pattern)| async move {
                let label = format!("delete {}", key);
                let result = self.limiter.execute(&label, || self.store.delete(&key)).await;
                (key, pattern, result)
            })
            .buffer_unordered(self.concurrency);

        while let Some((key, pattern, result)) = deletes.next().await {
            match result {
                Ok(()) => {
                    info!(key = %key, %pattern, "Purged junk object");
                    outcome.purged.push(key);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to purge junk object");
                    outcome.failures.push(AssetFailure {
                        key,
                        kind: None,
                        cause: e.kind.to_string(),
                    });
                }
            }
        }

        outcome.purged.sort();
        info!(purged = outcome.purged.len(), failed = outcome.failures.len(), "Purge complete");
        Ok(outcome)
    }
}
