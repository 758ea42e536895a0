//! Image codec error types.

/// Kinds of codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CodecErrorKind {
    /// Source bytes are not a valid image
    #[display("Failed to decode image: {}", _0)]
    Decode(String),
    /// Pixel buffer could not be written in the requested format
    #[display("Failed to encode image: {}", _0)]
    Encode(String),
    /// File extension does not map to a supported format
    #[display("Unsupported image format: {}", _0)]
    UnsupportedFormat(String),
    /// Requested reduction factor cannot be applied
    #[display("Invalid reduction factor {} for {}x{} image", factor, width, height)]
    InvalidFactor {
        /// Requested linear factor
        factor: u32,
        /// Source width
        width: u32,
        /// Source height
        height: u32,
    },
}

/// Codec error with location tracking.
///
/// # Examples
///
/// ```
/// use imgopt_error::{CodecError, CodecErrorKind};
///
/// let err = CodecError::new(CodecErrorKind::Decode("truncated JPEG".to_string()));
/// assert!(format!("{}", err).contains("decode"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Codec Error: {} at line {} in {}", kind, line, file)]
pub struct CodecError {
    /// The kind of error that occurred
    pub kind: CodecErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CodecError {
    /// Create a new codec error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CodecErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
