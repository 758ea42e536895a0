//! Test utilities for pipeline tests.
//!
//! Fixture images are generated in-process with the `image` crate.

#![allow(dead_code)]

pub mod scripted_store;

pub use scripted_store::ScriptedStore;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imgopt_codec::ImageCodec;
use imgopt_core::NamingScheme;
use imgopt_pipeline::{PipelineOptions, VariantPipeline};
use imgopt_rate_limit::{ExistenceConfig, RemoteCallLimiter, RemoteConfig};
use imgopt_storage::{ExistenceResolver, ObjectStore};
use std::io::Cursor;
use std::sync::Arc;

fn fixture(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, 90])
    }));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode fixture");
    bytes
}

/// A valid JPEG of the given size.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    fixture(width, height, ImageFormat::Jpeg)
}

/// A valid PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    fixture(width, height, ImageFormat::Png)
}

/// Dimensions of encoded image bytes.
pub fn dimensions_of(bytes: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(bytes).expect("Failed to decode variant");
    (image.width(), image.height())
}

/// Remote limits with millisecond backoff so retries don't slow tests down.
pub fn fast_limiter() -> RemoteCallLimiter {
    RemoteCallLimiter::new(&RemoteConfig {
        timeout_ms: 5_000,
        max_retries: 2,
        backoff_factor_ms: 1,
        max_backoff_ms: 5,
        requests_per_second: None,
        max_concurrent: 8,
    })
}

/// Remote limits with a per-attempt deadline of `timeout_ms`.
pub fn limiter_with_timeout(timeout_ms: u64) -> RemoteCallLimiter {
    RemoteCallLimiter::new(&RemoteConfig {
        timeout_ms,
        max_retries: 2,
        backoff_factor_ms: 1,
        max_backoff_ms: 5,
        requests_per_second: None,
        max_concurrent: 8,
    })
}

/// Pipeline over `store` with the default naming scheme and metadata existence checks.
pub fn pipeline(store: Arc<dyn ObjectStore>, options: PipelineOptions) -> VariantPipeline {
    pipeline_with_limiter(store, options, fast_limiter())
}

/// Same as [`pipeline`] with caller-supplied remote limits.
pub fn pipeline_with_limiter(
    store: Arc<dyn ObjectStore>,
    options: PipelineOptions,
    limiter: RemoteCallLimiter,
) -> VariantPipeline {
    let existence = ExistenceResolver::new(store.clone(), &ExistenceConfig::default(), limiter.clone())
        .expect("Failed to build existence resolver");
    VariantPipeline::new(
        store,
        existence,
        ImageCodec::default(),
        limiter,
        NamingScheme::default(),
        options,
    )
}
