//! Top-level error wrapper types.

use crate::{CodecError, ConfigError, HttpError, PipelineError, StorageError};

/// Every error family produced by the imgopt crates.
///
/// # Examples
///
/// ```
/// use imgopt_error::{ImgoptError, StorageError, StorageErrorKind};
///
/// let missing = StorageError::new(StorageErrorKind::NotFound("blog/2024/01/cover.jpg".into()));
/// let err: ImgoptError = missing.into();
/// assert!(err.to_string().contains("blog/2024/01/cover.jpg"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ImgoptErrorKind {
    /// Object store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Image decode/encode error
    #[from(CodecError)]
    Codec(CodecError),
    /// HTTP client error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Run-level pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Imgopt error with kind discrimination.
///
/// # Examples
///
/// ```
/// use imgopt_error::{ImgoptResult, ConfigError};
///
/// fn require_bucket(bucket: Option<&str>) -> ImgoptResult<&str> {
///     Ok(bucket.ok_or_else(|| ConfigError::new("storage.bucket is required for the s3 backend"))?)
/// }
///
/// assert!(require_bucket(None).is_err());
/// assert_eq!(require_bucket(Some("media")).unwrap(), "media");
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Imgopt Error: {}", _0)]
pub struct ImgoptError(Box<ImgoptErrorKind>);

impl ImgoptError {
    /// Create a new error from a kind.
    pub fn new(kind: ImgoptErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ImgoptErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ImgoptErrorKind
impl<T> From<T> for ImgoptError
where
    T: Into<ImgoptErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for imgopt operations.
pub type ImgoptResult<T> = std::result::Result<T, ImgoptError>;
