//! Scope listing shared by the purger and the pipeline.

use imgopt_core::DirectoryScope;
use imgopt_error::{ImgoptResult, PipelineError, PipelineErrorKind};
use imgopt_rate_limit::RemoteCallLimiter;
use imgopt_storage::{ObjectInfo, ObjectStore};

/// Collect every object under `scope`, one page at a time.
///
/// Each page is a separate remote call under the limiter: it gets its own
/// timeout, and a transient failure retries that page only. Failure after
/// retries is a scope-level error.
pub(crate) async fn list_scope(
    store: &dyn ObjectStore,
    limiter: &RemoteCallLimiter,
    scope: &DirectoryScope,
) -> ImgoptResult<Vec<ObjectInfo>> {
    let prefix = scope.prefix();
    let mut objects = Vec::new();
    let mut continuation: Option<String> = None;
    let mut pages = 0usize;

    loop {
        pages += 1;
        let label = format!("list {} (page {})", prefix, pages);
        let token = continuation.as_deref();
        let page = limiter
            .execute(&label, || store.list_page(prefix, token))
            .await
            .map_err(|e| {
                PipelineError::new(PipelineErrorKind::ScopeList {
                    scope: prefix.to_string(),
                    message: e.kind.to_string(),
                })
            })?;

        tracing::trace!(scope = %scope, page = pages, objects = page.objects.len(), "Listed page");
        objects.extend(page.objects);
        match page.next {
            Some(next) => continuation = Some(next),
            None => break,
        }
    }

    objects.retain(|object| scope.contains(&object.key));
    tracing::debug!(scope = %scope, objects = objects.len(), pages, "Listed scope");
    Ok(objects)
}
