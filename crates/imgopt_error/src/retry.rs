//! Retry classification.

use crate::{ImgoptError, ImgoptErrorKind, StorageError};

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use imgopt_error::{RetryableError, StorageError, StorageErrorKind};
///
/// let transient = StorageError::new(StorageErrorKind::Transport("connection reset".into()));
/// assert!(transient.is_retryable());
///
/// let permanent = StorageError::new(StorageErrorKind::NotFound("a.jpg".into()));
/// assert!(!permanent.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Network failures and timeouts return true. Missing objects,
    /// rejected requests and undecodable images return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for StorageError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl RetryableError for ImgoptError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            ImgoptErrorKind::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}
