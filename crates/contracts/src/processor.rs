//! BatchProcessor trait - Dispatcher downstream interface
//!
//! Defines the contract a rate-limited processor must satisfy.

use crate::{Item, Limits, ProcessError};

/// Rate-limited batch processor
///
/// All processor implementations must implement this trait.
#[trait_variant::make(BatchProcessor: Send)]
pub trait LocalBatchProcessor {
    /// Processor name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Current limits, queried before every batch
    ///
    /// Must have no side effects the dispatcher depends on.
    fn limits(&self) -> Limits;

    /// Process exactly the given batch
    ///
    /// `Ok(())` means every item in the batch was processed atomically.
    ///
    /// # Errors
    /// - `ProcessError::Blocked` when the batch cannot be accepted right now
    /// - `ProcessError::Failed` for anything that must not be retried
    async fn process(&mut self, batch: &[Item]) -> Result<(), ProcessError>;
}
