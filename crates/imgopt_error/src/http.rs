//! Errors from the public URL probe client.

/// The probe client could not be built or configured.
///
/// Individual probe failures are storage transport errors and are retried;
/// this error only covers the client itself, so it is fatal at startup.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// What went wrong with the client
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Record a probe client failure at the caller's location.
    ///
    /// ```
    /// use imgopt_error::HttpError;
    ///
    /// let err = HttpError::new("Failed to build probe client: invalid TLS backend");
    /// assert!(err.message.starts_with("Failed to build probe client"));
    /// assert!(err.file.ends_with(".rs"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
