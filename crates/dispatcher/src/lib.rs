//! # Dispatcher
//!
//! Rate-aware batch dispatch.
//!
//! Responsibilities:
//! - Slice an ordered input into batches within the processor's current limits
//! - Retry `Blocked` batches after a fixed delay, stop on any other error
//! - Honor cancellation and deadlines between batches and during waits
//! - Report the last confirmed index so callers can resume without gaps

pub mod cancel;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod mock;
pub mod processors;

pub use cancel::Cancellation;
pub use contracts::{BatchProcessor, DispatcherSettings, Item, Limits, ProcessError, ProgressIndex};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Interrupted};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use mock::{MockHandle, MockProcessor, Submission};
pub use processors::{
    create_processor, AnyProcessor, FileProcessor, FileProcessorConfig, LogProcessor,
    QuotaProcessor,
};
pub use tokio_util::sync::CancellationToken;
