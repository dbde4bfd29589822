//! Processor implementations
//!
//! Contains LogProcessor, FileProcessor and the QuotaProcessor wrapper.

mod file;
mod log;
mod quota;

pub use self::file::{FileProcessor, FileProcessorConfig};
pub use self::log::LogProcessor;
pub use self::quota::QuotaProcessor;

use contracts::{BatchProcessor, Item, Limits, ProcessError, ProcessorConfig, ProcessorKind};
use tracing::instrument;

use crate::error::DispatchError;

/// Any processor the configuration can name
pub enum AnyProcessor {
    Log(LogProcessor),
    File(FileProcessor),
}

impl BatchProcessor for AnyProcessor {
    fn name(&self) -> &str {
        match self {
            Self::Log(p) => p.name(),
            Self::File(p) => p.name(),
        }
    }

    fn limits(&self) -> Limits {
        match self {
            Self::Log(p) => p.limits(),
            Self::File(p) => p.limits(),
        }
    }

    async fn process(&mut self, batch: &[Item]) -> Result<(), ProcessError> {
        match self {
            Self::Log(p) => p.process(batch).await,
            Self::File(p) => p.process(batch).await,
        }
    }
}

/// Create a processor from configuration
///
/// `enforce_quota` is left to the caller, which wraps the result in
/// `QuotaProcessor` when set.
#[instrument(
    name = "dispatcher_create_processor",
    skip(config),
    fields(processor = %config.name, kind = ?config.kind)
)]
pub fn create_processor(config: &ProcessorConfig) -> Result<AnyProcessor, DispatchError> {
    let limits = config.limits();
    match config.kind {
        ProcessorKind::Log => Ok(AnyProcessor::Log(LogProcessor::new(&config.name, limits))),
        ProcessorKind::File => {
            let processor = FileProcessor::from_params(&config.name, limits, &config.params)
                .map_err(|e| DispatchError::processor_creation(&config.name, e.to_string()))?;
            Ok(AnyProcessor::File(processor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config(kind: ProcessorKind, params: HashMap<String, String>) -> ProcessorConfig {
        ProcessorConfig {
            name: "out".into(),
            kind,
            max_batch_size: 4,
            min_period_ms: 50,
            enforce_quota: false,
            params,
        }
    }

    #[test]
    fn test_create_log_processor() {
        let processor = create_processor(&config(ProcessorKind::Log, HashMap::new())).unwrap();
        assert!(matches!(processor, AnyProcessor::Log(_)));
        assert_eq!(processor.name(), "out");
        assert_eq!(
            processor.limits(),
            Limits::new(4, Duration::from_millis(50))
        );
    }

    #[tokio::test]
    async fn test_create_file_processor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.txt");
        let params = HashMap::from([("path".to_string(), path.display().to_string())]);

        let mut processor = create_processor(&config(ProcessorKind::File, params)).unwrap();
        processor.process(&[Item::from("x")]).await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "x\n");
    }

    #[test]
    fn test_create_file_processor_without_path() {
        let err = create_processor(&config(ProcessorKind::File, HashMap::new()))
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::ProcessorCreation { .. }));
    }
}
