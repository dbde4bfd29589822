//! Layered error definitions
//!
//! Categorized by source: config / processor / general

use thiserror::Error;

/// Unified error type for configuration and I/O
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a single `BatchProcessor::process` call that did not succeed.
///
/// `Blocked` is the only retryable kind. Everything else ends the dispatch.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The processor cannot accept this batch right now (quota, load shedding)
    #[error("processor is blocked")]
    Blocked,

    /// Non-retryable processing failure
    #[error("processor '{processor}' failed: {message}")]
    Failed {
        processor: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ProcessError {
    /// Create a non-retryable failure
    pub fn failed(processor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            processor: processor.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a non-retryable failure that keeps its cause
    pub fn failed_with(
        processor: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            processor: processor.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the dispatcher should retry the same items later
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }
}
