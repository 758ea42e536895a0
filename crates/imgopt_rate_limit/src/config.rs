//! Configuration structures.
//!
//! Configuration is layered with the `config` crate:
//! - Bundled defaults (include_str! from imgopt.toml)
//! - User overrides (~/.config/imgopt/imgopt.toml, then ./imgopt.toml or an explicit path)
//! - Environment variables (`IMGOPT__PIPELINE__CONCURRENCY=4`)
//!
//! Later sources override earlier ones.

use imgopt_core::NamingScheme;
use imgopt_error::{ConfigError, ImgoptError, ImgoptResult};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../imgopt.toml");

/// Which object store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Directory tree on local disk
    #[default]
    #[display("filesystem")]
    Filesystem,
    /// Process-local map, lost on exit
    #[display("memory")]
    Memory,
    /// S3-compatible bucket (requires the `s3` feature)
    #[display("s3")]
    S3,
}

/// Object store settings.
///
/// ```toml
/// [storage]
/// backend = "s3"
/// bucket = "media"
/// region = "us-east-1"
/// public_base_url = "https://cdn.example.com"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: BackendKind,

    /// Root directory for the filesystem backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,

    /// Bucket name for the S3 backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Region for the S3 backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[serde(default)]
    pub force_path_style: bool,

    /// Base URL under which objects are publicly served
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

/// Variant pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sources at or below this width get no retina or mobile variant
    #[serde(default = "default_width_threshold")]
    pub width_threshold: u32,

    /// Assets processed at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Generate WebP variants
    #[serde(default)]
    pub alt_format: bool,

    /// JPEG encoder quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Folder holding `YYYY/MM` upload directories
    #[serde(default = "default_uploads_root")]
    pub uploads_root: String,
}

fn default_width_threshold() -> u32 {
    1000
}

fn default_concurrency() -> usize {
    8
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_uploads_root() -> String {
    "wp-content/uploads".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width_threshold: default_width_threshold(),
            concurrency: default_concurrency(),
            alt_format: false,
            jpeg_quality: default_jpeg_quality(),
            uploads_root: default_uploads_root(),
        }
    }
}

/// How variant existence is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum ExistenceStrategy {
    /// Metadata when the backend offers it, otherwise probe
    #[default]
    #[display("auto")]
    Auto,
    /// Ask the object store directly
    #[display("metadata")]
    Metadata,
    /// GET the public URL
    #[display("probe")]
    Probe,
}

/// Existence resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceConfig {
    /// Strategy selection
    #[serde(default)]
    pub strategy: ExistenceStrategy,

    /// Timeout for a single public URL probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

impl Default for ExistenceConfig {
    fn default() -> Self {
        Self {
            strategy: ExistenceStrategy::default(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Limits applied to every remote call.
///
/// `requests_per_second` of `None` means unthrottled. Retries use
/// exponential backoff: `2^attempt * backoff_factor_ms`, capped at
/// `max_backoff_ms`, with jitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Deadline for one attempt of one call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Backoff multiplier in milliseconds
    #[serde(default = "default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,

    /// Upper bound on a single backoff delay
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Request quota across all remote calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,

    /// Remote calls in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> usize {
    2
}

fn default_backoff_factor_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    5_000
}

fn default_max_concurrent() -> u32 {
    16
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_factor_ms: default_backoff_factor_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            requests_per_second: None,
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Top-level imgopt configuration.
///
/// # Example
///
/// ```no_run
/// use imgopt_rate_limit::ImgoptConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ImgoptConfig::load()?;
/// println!("width threshold: {}", config.pipeline.width_threshold);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImgoptConfig {
    /// Object store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Naming scheme
    #[serde(default)]
    pub naming: NamingScheme,

    /// Variant pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Existence resolver settings
    #[serde(default)]
    pub existence: ExistenceConfig,

    /// Remote call limits
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl ImgoptConfig {
    /// Load configuration with precedence: environment > user override > bundled default.
    ///
    /// Sources in order (later sources override earlier):
    /// 1. Bundled defaults (imgopt.toml shipped with the binary)
    /// 2. `~/.config/imgopt/imgopt.toml`
    /// 3. `./imgopt.toml`
    /// 4. `IMGOPT__SECTION__KEY` environment variables
    ///
    /// User files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> ImgoptResult<Self> {
        Self::load_with(None)
    }

    /// Load configuration, replacing `./imgopt.toml` with `path` when given.
    ///
    /// An explicit path is required to exist.
    #[instrument(skip(path))]
    pub fn load_with(path: Option<&Path>) -> ImgoptResult<Self> {
        debug!("Loading configuration with precedence: env > user file > bundled defaults");

        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/imgopt/imgopt.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match path {
            Some(path) => {
                debug!(path = %path.display(), "Using explicit configuration file");
                builder.add_source(File::from(path).required(true))
            }
            None => builder.add_source(File::with_name("imgopt").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("IMGOPT")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .map_err(|e| {
                ImgoptError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ImgoptError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn from_toml_str(toml: &str) -> ImgoptResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| {
                ImgoptError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ImgoptError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> ImgoptResult<()> {
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::new("pipeline.concurrency must be at least 1").into());
        }
        if !(1..=100).contains(&self.pipeline.jpeg_quality) {
            return Err(ConfigError::new(format!(
                "pipeline.jpeg_quality must be in 1..=100, got {}",
                self.pipeline.jpeg_quality
            ))
            .into());
        }
        if self.remote.max_concurrent == 0 {
            return Err(ConfigError::new("remote.max_concurrent must be at least 1").into());
        }
        if self.remote.requests_per_second == Some(0) {
            return Err(ConfigError::new(
                "remote.requests_per_second must be at least 1 (omit it to disable throttling)",
            )
            .into());
        }
        match self.storage.backend {
            BackendKind::Filesystem if self.storage.base_path.is_none() => {
                Err(ConfigError::new("storage.base_path is required for the filesystem backend").into())
            }
            BackendKind::S3 if self.storage.bucket.is_none() => {
                Err(ConfigError::new("storage.bucket is required for the s3 backend").into())
            }
            _ => Ok(()),
        }
    }
}
