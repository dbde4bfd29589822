//! LogProcessor - logs batch summaries via tracing

use contracts::{BatchProcessor, Item, Limits, ProcessError};
use tracing::{info, instrument};

/// Processor that logs batch summaries and accepts everything
pub struct LogProcessor {
    name: String,
    limits: Limits,
    batches: u64,
    items: u64,
}

impl LogProcessor {
    /// Create a new LogProcessor with the given name and fixed limits
    pub fn new(name: impl Into<String>, limits: Limits) -> Self {
        Self {
            name: name.into(),
            limits,
            batches: 0,
            items: 0,
        }
    }

    /// Items accepted so far
    pub fn items_logged(&self) -> u64 {
        self.items
    }

    fn log_batch_summary(&self, batch: &[Item]) {
        let bytes: usize = batch.iter().map(Item::len).sum();

        info!(
            processor = %self.name,
            batch_no = self.batches,
            size = batch.len(),
            bytes,
            total_items = self.items,
            "Batch received"
        );
    }
}

impl BatchProcessor for LogProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> Limits {
        self.limits
    }

    #[instrument(
        name = "log_processor_process",
        skip(self, batch),
        fields(processor = %self.name, size = batch.len())
    )]
    async fn process(&mut self, batch: &[Item]) -> Result<(), ProcessError> {
        self.batches += 1;
        self.items += batch.len() as u64;
        self.log_batch_summary(batch);
        Ok(())
    }
}
