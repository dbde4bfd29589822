//! QuotaProcessor - rejects submissions that break the advertised limits

use contracts::{BatchProcessor, Item, Limits, ProcessError};
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Wraps a processor and enforces its own limits.
///
/// A batch larger than `max_batch_size`, or one that arrives less than
/// `min_period` after the last accepted batch started, gets `Blocked`
/// without reaching the inner processor.
pub struct QuotaProcessor<P> {
    inner: P,
    last_accepted: Option<Instant>,
    rejected: u64,
}

impl<P: BatchProcessor> QuotaProcessor<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            last_accepted: None,
            rejected: 0,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    /// Submissions answered with `Blocked`
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    fn admits(&self, size: usize, now: Instant) -> bool {
        let limits = self.inner.limits();
        if size > limits.max_batch_size {
            return false;
        }
        match self.last_accepted {
            Some(last) => now.saturating_duration_since(last) >= limits.min_period,
            None => true,
        }
    }
}

impl<P: BatchProcessor> BatchProcessor for QuotaProcessor<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn limits(&self) -> Limits {
        self.inner.limits()
    }

    #[instrument(
        name = "quota_processor_process",
        skip(self, batch),
        fields(processor = %self.inner.name(), size = batch.len())
    )]
    async fn process(&mut self, batch: &[Item]) -> Result<(), ProcessError> {
        let now = Instant::now();
        if !self.admits(batch.len(), now) {
            self.rejected += 1;
            debug!(processor = %self.inner.name(), rejected = self.rejected, "Quota exceeded");
            return Err(ProcessError::Blocked);
        }

        self.last_accepted = Some(now);
        self.inner.process(batch).await
    }
}
