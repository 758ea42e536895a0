//! Per-asset variant generation.

use crate::VariantPipeline;
use imgopt_codec::{CodecResult, DecodedImage, OutputFormat};
use imgopt_core::{Asset, AssetOutcome, VariantKind, VariantOutcome};
use imgopt_error::PipelineErrorKind;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Linear reduction from retina to mobile resolution.
const MOBILE_REDUCTION: u32 = 2;

/// Source pixels for one asset, fetched and decoded at most once.
enum Source {
    Pending,
    Ready(Arc<DecodedImage>),
    Unavailable(String),
}

impl VariantPipeline {
    /// Variant kinds enabled for this pipeline, in processing order.
    pub(crate) fn enabled_kinds(&self) -> Vec<VariantKind> {
        let mut kinds = vec![VariantKind::Retina, VariantKind::Mobile];
        if *self.options.alt_format() {
            kinds.push(VariantKind::AltFormat);
        }
        kinds
    }

    /// Generate every missing variant of `asset`.
    ///
    /// Never fails: each pass records its own outcome, and a failure in one
    /// pass does not stop the next.
    #[instrument(skip(self, asset), fields(key = %asset.path()))]
    pub async fn process_asset(&self, mut asset: Asset) -> AssetOutcome {
        let mut outcome = AssetOutcome::new(asset.path());
        let mut source = Source::Pending;

        // Retina strictly before Mobile
        for kind in self.enabled_kinds() {
            let result = self.process_variant(&mut asset, kind, &mut source).await;
            *outcome.outcome_mut(kind) = match result {
                Ok(variant) => variant,
                Err(cause) => {
                    warn!(%kind, cause = %cause, "Variant failed");
                    VariantOutcome::Failed { cause }
                }
            };
        }

        outcome.dimensions = *asset.dimensions();
        outcome
    }

    async fn process_variant(
        &self,
        asset: &mut Asset,
        kind: VariantKind,
        source: &mut Source,
    ) -> Result<VariantOutcome, String> {
        let key = asset
            .variant_key(&self.naming, kind)
            .ok_or_else(|| format!("{} has no {} key under this naming scheme", asset.path(), kind))?;

        if self.existence.exists(&key).await {
            debug!(%kind, key = %key, "Variant already exists");
            return Ok(VariantOutcome::SkippedExists { key });
        }

        let image = self.load_source(asset, source).await?;
        let width = image.width();

        match kind {
            VariantKind::Retina | VariantKind::Mobile if width <= *self.options.width_threshold() => {
                debug!(%kind, width, "Source below width threshold");
                return Ok(VariantOutcome::SkippedThreshold { width });
            }
            _ => {}
        }

        if *self.options.dry_run() {
            info!(%kind, key = %key, "Would create variant");
            return Ok(VariantOutcome::Created { key });
        }

        match kind {
            VariantKind::Retina => {
                // The canonical upload is already full resolution
                let label = format!("copy {} to {}", asset.path(), key);
                self.limiter
                    .execute(&label, || self.store.copy(asset.path(), &key))
                    .await
                    .map_err(|e| e.kind.to_string())?;
            }
            VariantKind::Mobile => {
                let format = OutputFormat::for_source(*asset.extension());
                let codec = self.codec;
                let bytes = self
                    .blocking(move || {
                        let reduced = codec.reduce_by(&image, MOBILE_REDUCTION)?;
                        codec.encode(&reduced, format)
                    })
                    .await?;
                self.write(&key, &bytes, format).await?;
            }
            VariantKind::AltFormat => {
                let codec = self.codec;
                let bytes = self
                    .blocking(move || codec.encode(&image, OutputFormat::WebP))
                    .await?;
                self.write(&key, &bytes, OutputFormat::WebP).await?;
            }
        }

        info!(%kind, key = %key, "Created variant");
        Ok(VariantOutcome::Created { key })
    }

    /// Fetch and decode the asset on first use; later passes reuse the result,
    /// including a failure.
    async fn load_source(&self, asset: &mut Asset, source: &mut Source) -> Result<Arc<DecodedImage>, String> {
        match source {
            Source::Ready(image) => return Ok(image.clone()),
            Source::Unavailable(cause) => return Err(cause.clone()),
            Source::Pending => {}
        }

        let label = format!("get {}", asset.path());
        let loaded = match self
            .limiter
            .execute(&label, || self.store.get(asset.path()))
            .await
        {
            Ok(bytes) => {
                let codec = self.codec;
                self.blocking(move || codec.decode(&bytes)).await
            }
            Err(e) => Err(e.kind.to_string()),
        };

        match loaded {
            Ok(image) => {
                asset.set_dimensions(*image.dimensions());
                let image = Arc::new(image);
                *source = Source::Ready(image.clone());
                Ok(image)
            }
            Err(cause) => {
                *source = Source::Unavailable(cause.clone());
                Err(cause)
            }
        }
    }

    async fn write(&self, key: &str, bytes: &[u8], format: OutputFormat) -> Result<(), String> {
        let label = format!("put {}", key);
        self.limiter
            .execute(&label, || self.store.put(key, bytes, format.content_type()))
            .await
            .map_err(|e| e.kind.to_string())
    }

    /// Run CPU-bound codec work off the async worker threads.
    async fn blocking<T, F>(&self, work: F) -> Result<T, String>
    where
        F: FnOnce() -> CodecResult<T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::task::spawn_blocking(work).await {
            Ok(result) => result.map_err(|e| e.kind.to_string()),
            Err(e) => Err(PipelineErrorKind::Task(e.to_string()).to_string()),
        }
    }
}
