//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use observability::{RunningStats, StatsSummary};

/// Metrics for a single dispatcher, shared across runs
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Batches handed to the processor
    batches_submitted: AtomicU64,
    /// Batches the processor confirmed
    batches_completed: AtomicU64,
    /// Items the processor confirmed
    items_processed: AtomicU64,
    /// Blocked responses (each one is a retry)
    blocked_count: AtomicU64,
    /// Non-retryable processor failures
    failure_count: AtomicU64,
    /// Runs stopped by cancellation or deadline
    cancelled_count: AtomicU64,
    /// Sizes of confirmed batches
    batch_sizes: Mutex<RunningStats>,
    /// Duration of confirmed `process` calls, milliseconds
    latency_ms: Mutex<RunningStats>,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches_submitted(&self) -> u64 {
        self.batches_submitted.load(Ordering::Relaxed)
    }

    pub fn inc_batches_submitted(&self) {
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batches_completed(&self) -> u64 {
        self.batches_completed.load(Ordering::Relaxed)
    }

    pub fn items_processed(&self) -> u64 {
        self.items_processed.load(Ordering::Relaxed)
    }

    /// Record a confirmed batch
    pub fn record_completed(&self, size: usize, latency: Duration) {
        self.batches_completed.fetch_add(1, Ordering::Relaxed);
        self.items_processed
            .fetch_add(size as u64, Ordering::Relaxed);
        self.batch_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(size as f64);
        self.latency_ms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(latency.as_secs_f64() * 1000.0);
    }

    pub fn blocked_count(&self) -> u64 {
        self.blocked_count.load(Ordering::Relaxed)
    }

    pub fn inc_blocked_count(&self) {
        self.blocked_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cancelled_count(&self) -> u64 {
        self.cancelled_count.load(Ordering::Relaxed)
    }

    pub fn inc_cancelled_count(&self) {
        self.cancelled_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_submitted: self.batches_submitted(),
            batches_completed: self.batches_completed(),
            items_processed: self.items_processed(),
            blocked_count: self.blocked_count(),
            failure_count: self.failure_count(),
            cancelled_count: self.cancelled_count(),
            batch_size: self
                .batch_sizes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .summary(),
            latency_ms: self
                .latency_ms
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .summary(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub batches_submitted: u64,
    pub batches_completed: u64,
    pub items_processed: u64,
    pub blocked_count: u64,
    pub failure_count: u64,
    pub cancelled_count: u64,
    pub batch_size: StatsSummary,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Batches submitted: {}", self.batches_submitted)?;
        writeln!(f, "Batches completed: {}", self.batches_completed)?;
        writeln!(f, "Items processed: {}", self.items_processed)?;
        writeln!(f, "Blocked retries: {}", self.blocked_count)?;
        writeln!(f, "Failures: {}", self.failure_count)?;
        writeln!(f, "Cancelled runs: {}", self.cancelled_count)?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        write!(f, "Process latency (ms): {}", self.latency_ms)
    }
}
