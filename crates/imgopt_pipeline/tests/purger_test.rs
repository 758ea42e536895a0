//! Junk purger tests.

mod test_utils;

use imgopt_core::{DirectoryScope, JunkPattern};
use imgopt_error::{ImgoptErrorKind, PipelineErrorKind};
use imgopt_pipeline::JunkPurger;
use imgopt_storage::{FileSystemObjectStore, MemoryObjectStore, ObjectStore, StorageErrorKind};
use std::sync::Arc;
use test_utils::{ScriptedStore, fast_limiter, jpeg};

const LEGITIMATE: &[&str] = &[
    "blog/2024/01/cover.jpg",
    "blog/2024/01/cover@2x.jpg",
    "blog/2024/01/_mobile/cover@2x.jpg",
    "blog/2024/01/cover.jpg.webp",
    "blog/2024/01/2024-01-01.png",
];

const JUNK: &[(&str, JunkPattern)] = &[
    ("blog/2024/01/cover@2x@2x.jpg", JunkPattern::DoubledDensity),
    ("blog/2024/01/cover-optimized.jpg", JunkPattern::OptimizerSuffix),
    ("blog/2024/01/cover.jpg.tmp", JunkPattern::OptimizerSuffix),
    ("blog/2024/01/cover.jpg%3Fver=2", JunkPattern::QueryStringSuffix),
    ("blog/2024/01/cover@2x-1.jpg", JunkPattern::DuplicateNumericSuffix),
    ("blog/2024/01/_mobile/cover@2x.jpg.webp", JunkPattern::MisplacedAltFormat),
    ("blog/2024/01/_mobile/_mobile/cover@2x.jpg", JunkPattern::NestedVariantScope),
];

async fn seeded_memory_store() -> Arc<MemoryObjectStore> {
    let store = Arc::new(MemoryObjectStore::new("https://cdn.example.com"));
    for key in LEGITIMATE {
        store.put(key, b"image", "image/jpeg").await.unwrap();
    }
    for (key, _) in JUNK {
        store.put(key, b"junk", "image/jpeg").await.unwrap();
    }
    store
}

fn scope() -> DirectoryScope {
    DirectoryScope::new("blog/2024/01")
}

#[tokio::test]
async fn test_find_junk_reports_pattern_per_key() {
    let store = seeded_memory_store().await;
    let purger = JunkPurger::new(store, fast_limiter(), 4);

    let mut found = purger.find_junk(&scope()).await.unwrap();
    found.sort();
    let mut expected: Vec<(String, JunkPattern)> =
        JUNK.iter().map(|(k, p)| (k.to_string(), *p)).collect();
    expected.sort();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn test_purge_deletes_only_junk() {
    let store = seeded_memory_store().await;
    let purger = JunkPurger::new(store.clone(), fast_limiter(), 4);

    let outcome = purger.purge(&scope(), false).await.unwrap();

    let mut expected: Vec<&str> = JUNK.iter().map(|(k, _)| *k).collect();
    expected.sort();
    assert_eq!(outcome.purged, expected);
    assert!(outcome.failures.is_empty());

    let mut remaining = LEGITIMATE.to_vec();
    remaining.sort();
    assert_eq!(store.keys().await, remaining);
}

#[tokio::test]
async fn test_purge_dry_run_keeps_everything() {
    let store = seeded_memory_store().await;
    let before = store.keys().await;
    let purger = JunkPurger::new(store.clone(), fast_limiter(), 4);

    let outcome = purger.purge(&scope(), true).await.unwrap();

    assert_eq!(outcome.purged.len(), JUNK.len());
    assert_eq!(store.keys().await, before);
}

#[tokio::test]
async fn test_purge_respects_scope() {
    let store = seeded_memory_store().await;
    store
        .put("blog/2024/02/other@2x@2x.jpg", b"junk", "image/jpeg")
        .await
        .unwrap();
    let purger = JunkPurger::new(store.clone(), fast_limiter(), 4);

    purger.purge(&scope(), false).await.unwrap();

    assert!(
        store
            .head("blog/2024/02/other@2x@2x.jpg")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_failed_deletes_are_recorded() {
    let store = Arc::new(ScriptedStore::new().rejecting_deletes());
    store.seed("blog/2024/01/cover.jpg", &jpeg(10, 10), "image/jpeg").await;
    store.seed("blog/2024/01/cover@2x@2x.jpg", b"junk", "image/jpeg").await;
    let purger = JunkPurger::new(store.clone(), fast_limiter(), 2);

    let outcome = purger.purge(&scope(), false).await.unwrap();

    assert!(outcome.purged.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    let failure = &outcome.failures[0];
    assert_eq!(failure.key, "blog/2024/01/cover@2x@2x.jpg");
    assert_eq!(failure.kind, None);
    assert!(failure.cause.contains("403"));
    assert_eq!(store.keys().await.len(), 2);
}

#[tokio::test]
async fn test_unlistable_scope_is_an_error() {
    let store = Arc::new(
        ScriptedStore::new().failing_list(StorageErrorKind::Transport("bucket unreachable".to_string())),
    );
    let purger = JunkPurger::new(store, fast_limiter(), 2);

    let err = purger.purge(&scope(), false).await.unwrap_err();

    match err.kind() {
        ImgoptErrorKind::Pipeline(e) => {
            assert!(matches!(e.kind, PipelineErrorKind::ScopeList { .. }));
            assert!(e.to_string().contains("bucket unreachable"));
        }
        other => panic!("Expected pipeline error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_purge_on_filesystem_removes_interrupted_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileSystemObjectStore::new(dir.path(), None).unwrap());
    store
        .put("blog/2024/01/cover.jpg", &jpeg(20, 10), "image/jpeg")
        .await
        .unwrap();
    // Left behind by a write that died before its rename
    std::fs::write(dir.path().join("blog/2024/01/cover@2x.jpg.tmp"), b"partial").unwrap();

    let purger = JunkPurger::new(store.clone(), fast_limiter(), 2);
    let outcome = purger.purge(&scope(), false).await.unwrap();

    assert_eq!(outcome.purged, vec!["blog/2024/01/cover@2x.jpg.tmp"]);
    assert!(!dir.path().join("blog/2024/01/cover@2x.jpg.tmp").exists());
    assert!(dir.path().join("blog/2024/01/cover.jpg").exists());
}
