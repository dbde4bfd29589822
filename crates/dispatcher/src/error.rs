//! Dispatcher error types

use contracts::{ProcessError, ProgressIndex};
use thiserror::Error;

/// Reasons a dispatch stops before every item is processed
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The caller cancelled the run
    #[error("dispatch cancelled")]
    Cancelled,

    /// The caller's deadline passed
    #[error("dispatch deadline exceeded")]
    DeadlineExceeded,

    /// Non-retryable processor failure, passed through unchanged
    #[error(transparent)]
    Processing(ProcessError),

    /// Too many consecutive zero-length batches
    #[error("processor accepted {consecutive} consecutive empty batches without progress")]
    Stalled { consecutive: u32 },

    /// Resume position lies past the end of the input
    #[error("resume position {start} is past the end of {len} items")]
    InvalidResume { start: usize, len: usize },

    /// Processor creation error
    #[error("failed to create processor '{name}': {message}")]
    ProcessorCreation { name: String, message: String },
}

impl DispatchError {
    /// Create a processor creation error
    pub fn processor_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessorCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether the run ended because of the caller's cancellation signal
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline",
            Self::Processing(_) => "failed",
            Self::Stalled { .. } => "stalled",
            Self::InvalidResume { .. } => "invalid_resume",
            Self::ProcessorCreation { .. } => "setup",
        }
    }
}

/// A run that stopped early, with the last confirmed position.
///
/// Resume with `items[progress.resume_from()..]`.
#[derive(Debug, Error)]
#[error("dispatch interrupted at progress index {progress}")]
pub struct Interrupted {
    progress: ProgressIndex,
    #[source]
    error: DispatchError,
}

impl Interrupted {
    pub fn new(progress: ProgressIndex, error: DispatchError) -> Self {
        Self { progress, error }
    }

    /// Last item confirmed before the run stopped
    pub fn progress(&self) -> ProgressIndex {
        self.progress
    }

    /// Why the run stopped
    pub fn error(&self) -> &DispatchError {
        &self.error
    }

    pub fn into_parts(self) -> (ProgressIndex, DispatchError) {
        (self.progress, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_processing_error_is_verbatim() {
        let err = DispatchError::Processing(ProcessError::failed("svc", "fail to process"));
        assert_eq!(err.to_string(), "processor 'svc' failed: fail to process");
        assert_eq!(err.reason(), "failed");
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_interrupted_exposes_both_halves() {
        let interrupted = Interrupted::new(ProgressIndex::at(4), DispatchError::Cancelled);

        assert_eq!(interrupted.progress().resume_from(), 5);
        assert!(interrupted.error().is_cancellation());
        assert_eq!(
            interrupted.to_string(),
            "dispatch interrupted at progress index 4"
        );
        assert_eq!(
            interrupted.source().map(|s| s.to_string()),
            Some("dispatch cancelled".to_string())
        );
    }
}
