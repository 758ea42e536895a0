//! Variant pipeline orchestration.

use crate::listing::list_scope;
use crate::{JunkPurger, PipelineOptions};
use futures::StreamExt;
use imgopt_codec::ImageCodec;
use imgopt_core::{Asset, DirectoryScope, NamingScheme, RunReport};
use imgopt_error::ImgoptResult;
use imgopt_rate_limit::{ImgoptConfig, RemoteCallLimiter};
use imgopt_storage::{ExistenceResolver, ObjectStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Purge, then derive retina, mobile and alt-format variants over a scope.
///
/// The pipeline holds its collaborators by composition; it keeps no state
/// between runs, and every run returns a fresh [`RunReport`].
#[derive(Clone)]
pub struct VariantPipeline {
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) existence: ExistenceResolver,
    pub(crate) codec: ImageCodec,
    pub(crate) limiter: RemoteCallLimiter,
    pub(crate) naming: NamingScheme,
    pub(crate) options: PipelineOptions,
}

impl std::fmt::Debug for VariantPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantPipeline")
            .field("backend", &self.store.backend_name())
            .field("existence", &self.existence)
            .field("codec", &self.codec)
            .field("naming", &self.naming)
            .field("options", &self.options)
            .finish()
    }
}

impl VariantPipeline {
    /// Assemble a pipeline from its parts.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        existence: ExistenceResolver,
        codec: ImageCodec,
        limiter: RemoteCallLimiter,
        naming: NamingScheme,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            existence,
            codec,
            limiter,
            naming,
            options,
        }
    }

    /// Build a pipeline over `store` from loaded configuration.
    ///
    /// # Errors
    ///
    /// Fails when the existence resolver cannot be built for this backend.
    pub fn from_config(config: &ImgoptConfig, store: Arc<dyn ObjectStore>) -> ImgoptResult<Self> {
        let limiter = RemoteCallLimiter::new(&config.remote);
        let existence = ExistenceResolver::new(store.clone(), &config.existence, limiter.clone())?;
        Ok(Self::new(
            store,
            existence,
            ImageCodec::new(config.pipeline.jpeg_quality),
            limiter,
            config.naming.clone(),
            PipelineOptions::from(&config.pipeline),
        ))
    }

    /// Returns a copy with different run options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Naming scheme in effect.
    pub fn naming(&self) -> &NamingScheme {
        &self.naming
    }

    fn purger(&self) -> JunkPurger {
        JunkPurger::new(self.store.clone(), self.limiter.clone(), *self.options.concurrency())
    }

    /// Run the full pipeline over `scope`.
    ///
    /// Cancelling `cancel` stops new assets from starting; assets already in
    /// flight finish and the partial report is returned with `cancelled` set.
    ///
    /// # Errors
    ///
    /// `PipelineErrorKind::ScopeList` when the scope cannot be listed. Every
    /// other failure is recorded in the report.
    #[instrument(skip(self, cancel), fields(scope = %scope, dry_run = *self.options.dry_run()))]
    pub async fn run(&self, scope: &DirectoryScope, cancel: &CancellationToken) -> ImgoptResult<RunReport> {
        let mut report = RunReport::new(scope.clone(), *self.options.dry_run());
        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(report);
        }

        // Barrier: junk must be gone before anything is listed for generation
        let purge = self.purger().purge(scope, *self.options.dry_run()).await?;
        report.purged = purge.purged;
        report.errors.extend(purge.failures);

        let assets: Vec<Asset> = list_scope(self.store.as_ref(), &self.limiter, scope)
            .await?
            .into_iter()
            .filter_map(|object| Asset::from_key(&self.naming, &object.key, object.size))
            .collect();
        report.assets_seen = assets.len();
        info!(assets = assets.len(), purged = report.purged.len(), "Processing canonical assets");

        let mut outcomes = futures::stream::iter(assets)
            .map(|asset| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(self.process_asset(asset).await)
            })
            .buffer_unordered(*self.options.concurrency());

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Some(outcome) => report.record(outcome),
                None => report.cancelled = true,
            }
        }

        if report.cancelled {
            warn!(processed = report.assets.len(), "Run cancelled before every asset started");
        }
        report.sort();
        info!(
            retina = report.retina_created.len(),
            mobile = report.mobile_created.len(),
            alt_format = report.altformat_created.len(),
            skipped_threshold = report.skipped_threshold.len(),
            skipped_existing = report.skipped_existing,
            errors = report.errors.len(),
            "Run complete"
        );
        Ok(report)
    }

    /// Purge junk under `scope` without generating anything.
    ///
    /// # Errors
    ///
    /// `PipelineErrorKind::ScopeList` when the scope cannot be listed.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn purge_only(&self, scope: &DirectoryScope) -> ImgoptResult<RunReport> {
        let mut report = RunReport::new(scope.clone(), *self.options.dry_run());
        let purge = self.purger().purge(scope, *self.options.dry_run()).await?;
        report.purged = purge.purged;
        report.errors.extend(purge.failures);
        report.sort();
        Ok(report)
    }
}
