//! Run and purge command handlers.

use imgopt::{
    DirectoryScope, ImgoptConfig, ImgoptResult, PipelineOptions, RunReport, VariantPipeline,
    build_store,
};
use std::num::NonZeroUsize;
use tokio_util::sync::CancellationToken;

/// Scope a command operates on: the explicit prefix, or the current month's
/// upload folder.
pub fn resolve_scope(config: &ImgoptConfig, scope: Option<&str>) -> DirectoryScope {
    match scope {
        Some(prefix) => DirectoryScope::new(prefix),
        None => DirectoryScope::current_month(&config.pipeline.uploads_root),
    }
}

/// Purge and generate variants under `scope`.
///
/// Ctrl-C stops new assets from starting; the partial report is returned.
pub async fn run_variants(
    config: &ImgoptConfig,
    scope: &DirectoryScope,
    alt_format: bool,
    dry_run: bool,
    concurrency: Option<NonZeroUsize>,
) -> ImgoptResult<RunReport> {
    let mut options = PipelineOptions::from(&config.pipeline)
        .with_alt_format(config.pipeline.alt_format || alt_format)
        .with_dry_run(dry_run);
    if let Some(concurrency) = concurrency {
        options = options.with_concurrency(concurrency.get());
    }

    let store = build_store(&config.storage).await?;
    let pipeline = VariantPipeline::from_config(config, store)?.with_options(options);

    tracing::info!(
        scope = %scope,
        backend = %config.storage.backend,
        alt_format = *pipeline.options().alt_format(),
        dry_run,
        "Starting variant run"
    );

    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());
    let report = pipeline.run(scope, &cancel).await;
    watcher.abort();
    report
}

/// Delete junk under `scope` without generating variants.
pub async fn purge_scope(
    config: &ImgoptConfig,
    scope: &DirectoryScope,
    dry_run: bool,
) -> ImgoptResult<RunReport> {
    let store = build_store(&config.storage).await?;
    let options = PipelineOptions::from(&config.pipeline).with_dry_run(dry_run);
    let pipeline = VariantPipeline::from_config(config, store)?.with_options(options);

    tracing::info!(scope = %scope, dry_run, "Starting purge");
    pipeline.purge_only(scope).await
}

fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing assets in flight");
            cancel.cancel();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_scope_is_normalised() {
        let config = ImgoptConfig::default();
        assert_eq!(
            resolve_scope(&config, Some("/blog/2024/01")).prefix(),
            "blog/2024/01/"
        );
    }

    #[test]
    fn default_scope_is_under_uploads_root() {
        let config = ImgoptConfig::default();
        let scope = resolve_scope(&config, None);
        assert!(scope.prefix().starts_with("wp-content/uploads/"));
        // uploads_root/YYYY/MM/
        assert_eq!(scope.prefix().len(), "wp-content/uploads/".len() + 8);
    }
}
