//! Dispatcher - rate-aware batch loop

use std::sync::Arc;

use contracts::{BatchProcessor, DispatcherSettings, Item, ProcessError, ProgressIndex};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::cancel::Cancellation;
use crate::error::{DispatchError, Interrupted};
use crate::metrics::DispatchMetrics;

/// Feeds items to a rate-limited processor, one batch at a time.
///
/// Limits are queried fresh before every batch. A `Blocked` response keeps
/// the same pending items and retries after `retry_delay`; any other error
/// ends the run. Batches are never submitted concurrently.
pub struct Dispatcher<P> {
    processor: P,
    settings: DispatcherSettings,
    metrics: Arc<DispatchMetrics>,
}

impl<P: BatchProcessor> Dispatcher<P> {
    /// Create a dispatcher in front of `processor`
    pub fn new(processor: P, settings: DispatcherSettings) -> Self {
        Self {
            processor,
            settings,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Get the wrapped processor
    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn into_processor(self) -> P {
        self.processor
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Get shared metrics
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Dispatch every item in order.
    ///
    /// Returns the index of the last item when all of them were processed.
    ///
    /// # Errors
    /// `Interrupted` with the last confirmed index when the run is cancelled,
    /// the deadline passes, or the processor fails.
    pub async fn run(
        &mut self,
        items: &[Item],
        cancel: &Cancellation,
    ) -> Result<ProgressIndex, Interrupted> {
        self.run_from(items, 0, cancel).await
    }

    /// Dispatch `items[start..]`, reporting progress in the indexing of `items`.
    ///
    /// Use `start = interrupted.progress().resume_from()` to pick up after an
    /// earlier interrupted run over the same input.
    #[instrument(
        name = "dispatcher_run",
        skip(self, items, cancel),
        fields(processor = %self.processor.name(), items = items.len())
    )]
    pub async fn run_from(
        &mut self,
        items: &[Item],
        start: usize,
        cancel: &Cancellation,
    ) -> Result<ProgressIndex, Interrupted> {
        if start > items.len() {
            let error = DispatchError::InvalidResume {
                start,
                len: items.len(),
            };
            return Err(self.interrupt(ProgressIndex::before(items.len()), error));
        }

        let mut progress = ProgressIndex::before(start);
        let mut pending = &items[start..];

        if pending.is_empty() {
            debug!(start, "Nothing to dispatch");
            return Ok(progress);
        }

        info!(start, pending = pending.len(), "Dispatch started");

        let mut empty_streak: u32 = 0;

        while !pending.is_empty() {
            if let Err(e) = cancel.check() {
                return Err(self.interrupt(progress, e));
            }

            let limits = self.processor.limits();
            let batch = &pending[..limits.batch_len(pending.len())];

            let submitted_at = Instant::now();
            self.metrics.inc_batches_submitted();
            observability::record_batch_submitted(self.processor.name(), batch.len());

            match self.processor.process(batch).await {
                Ok(()) => {}
                Err(ProcessError::Blocked) => {
                    self.metrics.inc_blocked_count();
                    observability::record_blocked(self.processor.name());
                    warn!(
                        progress = %progress,
                        pending = pending.len(),
                        retry_in_ms = self.settings.retry_delay_ms,
                        "Processor blocked, retrying"
                    );

                    if let Err(e) = cancel.sleep(self.settings.retry_delay()).await {
                        return Err(self.interrupt(progress, e));
                    }
                    continue;
                }
                Err(e) => {
                    return Err(self.interrupt(progress, DispatchError::Processing(e)));
                }
            }

            let latency = submitted_at.elapsed();
            progress = progress.advance(batch.len());
            pending = &pending[batch.len()..];

            self.metrics.record_completed(batch.len(), latency);
            observability::record_batch_completed(
                self.processor.name(),
                batch.len(),
                latency.as_secs_f64() * 1000.0,
            );
            observability::record_progress(self.processor.name(), progress);

            if batch.is_empty() {
                empty_streak += 1;
                if let Some(max) = self.settings.max_empty_batches {
                    if empty_streak > max {
                        let error = DispatchError::Stalled {
                            consecutive: empty_streak,
                        };
                        return Err(self.interrupt(progress, error));
                    }
                }
            } else {
                empty_streak = 0;
            }

            if pending.is_empty() {
                break;
            }

            let next_batch_at = submitted_at + limits.min_period;
            debug!(
                batch = batch.len(),
                progress = %progress,
                remaining = pending.len(),
                wait_ms = next_batch_at
                    .saturating_duration_since(Instant::now())
                    .as_millis() as u64,
                "Batch processed, waiting for next slot"
            );

            if let Err(e) = cancel.sleep_until(next_batch_at).await {
                return Err(self.interrupt(progress, e));
            }
        }

        info!(
            processed = progress.processed_count() - start,
            progress = %progress,
            "Dispatch completed"
        );

        Ok(progress)
    }

    fn interrupt(&self, progress: ProgressIndex, error: DispatchError) -> Interrupted {
        if error.is_cancellation() {
            self.metrics.inc_cancelled_count();
            warn!(progress = %progress, reason = error.reason(), "Dispatch cancelled");
        } else {
            self.metrics.inc_failure_count();
            error!(progress = %progress, error = %error, "Dispatch failed");
        }
        observability::record_interrupted(self.processor.name(), error.reason());

        Interrupted::new(progress, error)
    }
}
