//! Tests for existence resolution.

use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::get;
use imgopt_rate_limit::{
    ExistenceConfig, ExistenceStrategy, RemoteCallLimiter, RemoteConfig,
};
use imgopt_storage::{ExistenceResolver, MemoryObjectStore, ObjectStore};
use std::sync::Arc;

fn limiter() -> RemoteCallLimiter {
    RemoteCallLimiter::new(&RemoteConfig {
        timeout_ms: 2_000,
        max_retries: 1,
        backoff_factor_ms: 1,
        max_backoff_ms: 5,
        requests_per_second: None,
        max_concurrent: 4,
    })
}

fn config(strategy: ExistenceStrategy) -> ExistenceConfig {
    ExistenceConfig {
        strategy,
        probe_timeout_ms: 2_000,
    }
}

/// Serve a few fixed responses on an ephemeral port, returning the base URL.
async fn spawn_cdn() -> String {
    let app = Router::new()
        .route(
            "/blog/cover@2x.jpg",
            get(|| async { ([(header::CONTENT_TYPE, "image/jpeg")], vec![0xFFu8, 0xD8]) }),
        )
        .route(
            "/blog/pending@2x.jpg",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    vec![0u8; 4],
                )
            }),
        )
        .route(
            "/blog/soft404@2x.jpg",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<h1>Not here</h1>") }),
        )
        .route(
            "/blog/broken@2x.jpg",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_auto_prefers_metadata() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new("http://127.0.0.1:9"));
    let resolver =
        ExistenceResolver::new(store.clone(), &config(ExistenceStrategy::Auto), limiter()).unwrap();
    assert_eq!(resolver.strategy(), ExistenceStrategy::Metadata);

    assert!(!resolver.exists("blog/cover@2x.jpg").await);
    store
        .put("blog/cover@2x.jpg", b"jpeg", "image/jpeg")
        .await
        .unwrap();
    // Visible immediately after the write
    assert!(resolver.exists("blog/cover@2x.jpg").await);
}

#[tokio::test]
async fn test_auto_falls_back_to_probe() {
    let store: Arc<dyn ObjectStore> =
        Arc::new(MemoryObjectStore::new("http://127.0.0.1:9").without_metadata());
    let resolver =
        ExistenceResolver::new(store, &config(ExistenceStrategy::Auto), limiter()).unwrap();
    assert_eq!(resolver.strategy(), ExistenceStrategy::Probe);
}

#[tokio::test]
async fn test_metadata_without_backend_support_is_rejected() {
    let store: Arc<dyn ObjectStore> =
        Arc::new(MemoryObjectStore::new("http://127.0.0.1:9").without_metadata());
    let result = ExistenceResolver::new(store, &config(ExistenceStrategy::Metadata), limiter());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_probe_accepts_image_responses() {
    let base = spawn_cdn().await;
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new(base));
    let resolver =
        ExistenceResolver::new(store, &config(ExistenceStrategy::Probe), limiter()).unwrap();

    assert!(resolver.exists("blog/cover@2x.jpg").await);
    assert!(resolver.exists("blog/pending@2x.jpg").await);
}

#[tokio::test]
async fn test_probe_rejects_non_image_and_missing() {
    let base = spawn_cdn().await;
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new(base));
    let resolver =
        ExistenceResolver::new(store, &config(ExistenceStrategy::Probe), limiter()).unwrap();

    assert!(!resolver.exists("blog/soft404@2x.jpg").await);
    assert!(!resolver.exists("blog/absent@2x.jpg").await);
}

#[tokio::test]
async fn test_probe_fails_closed() {
    let base = spawn_cdn().await;
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new(base));
    let resolver =
        ExistenceResolver::new(store, &config(ExistenceStrategy::Probe), limiter()).unwrap();

    // 503 after retries, and a refused connection, both read as absent
    assert!(!resolver.exists("blog/broken@2x.jpg").await);

    let unreachable: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new("http://127.0.0.1:9"));
    let resolver =
        ExistenceResolver::new(unreachable, &config(ExistenceStrategy::Probe), limiter()).unwrap();
    assert!(!resolver.exists("blog/cover@2x.jpg").await);
}
