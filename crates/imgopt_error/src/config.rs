//! Configuration error types.

/// A setting is missing, out of range, or contradicts the chosen backend.
///
/// Raised while loading layered settings and while wiring components
/// together, before any object is touched.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Offending setting and the reason, e.g. `pipeline.concurrency must be at least 1`
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Record an invalid setting at the caller's location.
    ///
    /// ```
    /// use imgopt_error::{ConfigError, ImgoptError, ImgoptErrorKind};
    ///
    /// let err: ImgoptError = ConfigError::new("pipeline.concurrency must be at least 1").into();
    /// match err.kind() {
    ///     ImgoptErrorKind::Config(e) => assert!(e.message.contains("pipeline.concurrency")),
    ///     other => panic!("unexpected kind: {other}"),
    /// }
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
