//! Run-level pipeline error types.
//!
//! Only failures that prevent enumerating work surface here. Per-asset
//! failures are recorded in the run report instead.

/// Kinds of run-level pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Listing the scope failed, so there is nothing to iterate
    #[display("Failed to list scope '{}': {}", scope, message)]
    ScopeList {
        /// Scope prefix being listed
        scope: String,
        /// Underlying failure
        message: String,
    },
    /// A blocking worker task panicked or was aborted
    #[display("Worker task failed: {}", _0)]
    Task(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The error kind
    pub kind: PipelineErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
