//! Error types for CLI operations.

use contracts::ProgressIndex;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Input file not found
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    /// Command-line override rejected
    #[error("Invalid override for {field}: {message}")]
    InvalidOverride { field: String, message: String },

    /// Dispatch stopped before the input was exhausted
    #[error("Dispatch interrupted at progress index {progress} ({reason}); resume with --resume-from {resume_from}")]
    Interrupted {
        progress: ProgressIndex,
        resume_from: usize,
        reason: String,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn input_not_found(path: impl Into<String>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn invalid_override(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn interrupted(progress: ProgressIndex, reason: impl Into<String>) -> Self {
        Self::Interrupted {
            progress,
            resume_from: progress.resume_from(),
            reason: reason.into(),
        }
    }
}
