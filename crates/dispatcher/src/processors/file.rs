//! FileProcessor - appends item payloads to a file, one per line

use contracts::{BatchProcessor, Item, Limits, ProcessError};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileProcessor
#[derive(Debug, Clone)]
pub struct FileProcessorConfig {
    /// Output file, created with its parent directories
    pub path: PathBuf,
}

impl FileProcessorConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("path")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| "missing 'path' parameter".to_string())?;

        Ok(Self {
            path: PathBuf::from(path),
        })
    }
}

/// Processor that appends every item to a file
///
/// A batch counts as processed once all of its lines are flushed.
pub struct FileProcessor {
    name: String,
    limits: Limits,
    config: FileProcessorConfig,
    writer: BufWriter<File>,
}

impl FileProcessor {
    /// Create a new FileProcessor
    pub fn new(
        name: impl Into<String>,
        limits: Limits,
        config: FileProcessorConfig,
    ) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            limits,
            config,
            writer: BufWriter::new(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        limits: Limits,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileProcessorConfig::from_params(params)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        Self::new(name, limits, config)
    }

    pub fn path(&self) -> &PathBuf {
        &self.config.path
    }

    fn write_batch(&mut self, batch: &[Item]) -> std::io::Result<()> {
        for item in batch {
            self.writer.write_all(item.payload())?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }
}

impl BatchProcessor for FileProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> Limits {
        self.limits
    }

    #[instrument(
        name = "file_processor_process",
        skip(self, batch),
        fields(processor = %self.name, size = batch.len())
    )]
    async fn process(&mut self, batch: &[Item]) -> Result<(), ProcessError> {
        self.write_batch(batch).map_err(|e| {
            error!(processor = %self.name, path = %self.config.path.display(), error = %e, "Write failed");
            ProcessError::failed_with(&self.name, e)
        })?;
        debug!(processor = %self.name, size = batch.len(), "Batch written");
        Ok(())
    }
}
