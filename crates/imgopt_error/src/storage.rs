//! Object store error types.

/// Kinds of object store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Object does not exist at the given key
    #[display("Object not found: {}", _0)]
    NotFound(String),
    /// Network or backend failure that may succeed on retry
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// A remote call exceeded its deadline
    #[display("Timed out after {}ms: {}", millis, operation)]
    Timeout {
        /// Operation that timed out (e.g. "get blog/cover.jpg")
        operation: String,
        /// Deadline in milliseconds
        millis: u64,
    },
    /// Backend refused the request (permissions, bad request)
    #[display("Request rejected: {}", _0)]
    Rejected(String),
    /// Object key cannot be represented by this backend
    #[display("Invalid object key: {}", _0)]
    InvalidKey(String),
    /// Failed to create a directory for a filesystem-backed store
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write an object
    #[display("Failed to write object: {}", _0)]
    FileWrite(String),
    /// Failed to read an object
    #[display("Failed to read object: {}", _0)]
    FileRead(String),
    /// Operation is not offered by this backend
    #[display("Unsupported operation: {}", _0)]
    Unsupported(String),
}

impl StorageErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageErrorKind::Transport(_) | StorageErrorKind::Timeout { .. }
        )
    }
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use imgopt_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("blog/cover.jpg".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True when the object was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}

/// Result type for object store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
