//! Tests for layered configuration.

use imgopt_core::RetinaPlacement;
use imgopt_rate_limit::{BackendKind, ExistenceStrategy, ImgoptConfig};
use std::io::Write;

#[test]
fn test_bundled_defaults() {
    let config = ImgoptConfig::from_toml_str("").unwrap();

    assert_eq!(config.storage.backend, BackendKind::Filesystem);
    assert_eq!(config.pipeline.width_threshold, 1000);
    assert_eq!(config.pipeline.concurrency, 8);
    assert!(!config.pipeline.alt_format);
    assert_eq!(config.pipeline.jpeg_quality, 85);
    assert_eq!(config.existence.strategy, ExistenceStrategy::Auto);
    assert_eq!(config.remote.max_retries, 2);
    assert_eq!(config.remote.requests_per_second, None);
    assert_eq!(*config.naming.retina_placement(), RetinaPlacement::SameFolder);
    assert!(config.naming.excluded_scopes().iter().any(|s| s == "avatars"));
}

#[test]
fn test_overrides_replace_defaults() {
    let config = ImgoptConfig::from_toml_str(
        r#"
        [pipeline]
        width_threshold = 1200
        alt_format = true

        [naming]
        retina_placement = "subscope"

        [remote]
        requests_per_second = 20
        "#,
    )
    .unwrap();

    assert_eq!(config.pipeline.width_threshold, 1200);
    assert!(config.pipeline.alt_format);
    // Untouched keys keep their bundled values
    assert_eq!(config.pipeline.concurrency, 8);
    assert_eq!(*config.naming.retina_placement(), RetinaPlacement::Subscope);
    assert_eq!(config.remote.requests_per_second, Some(20));
}

#[test]
fn test_s3_backend_requires_bucket() {
    let result = ImgoptConfig::from_toml_str(
        r#"
        [storage]
        backend = "s3"
        "#,
    );
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("storage.bucket"));
}

#[test]
fn test_zero_concurrency_rejected() {
    let result = ImgoptConfig::from_toml_str(
        r#"
        [pipeline]
        concurrency = 0
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_out_of_range_quality_rejected() {
    let result = ImgoptConfig::from_toml_str(
        r#"
        [pipeline]
        jpeg_quality = 0
        "#,
    );
    assert!(result.unwrap_err().to_string().contains("jpeg_quality"));
}

#[test]
fn test_zero_requests_per_second_rejected() {
    let result = ImgoptConfig::from_toml_str(
        r#"
        [remote]
        requests_per_second = 0
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    assert!(ImgoptConfig::from_toml_str("[pipeline\nconcurrency = ").is_err());
}

#[test]
fn test_load_with_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[storage]\nbackend = \"memory\"\n\n[pipeline]\nwidth_threshold = 640"
    )
    .unwrap();

    let config = ImgoptConfig::load_with(Some(&path)).unwrap();
    assert_eq!(config.storage.backend, BackendKind::Memory);
    assert_eq!(config.pipeline.width_threshold, 640);
}

#[test]
fn test_load_with_missing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    assert!(ImgoptConfig::load_with(Some(&path)).is_err());
}
