//! Scripted processor for tests and demos
//!
//! Records every submission so callers can check slicing, ordering and pacing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use contracts::{BatchProcessor, Item, Limits, ProcessError};
use tokio::time::Instant;
use tracing::trace;

type LimitsFn = Box<dyn Fn(usize) -> Limits + Send + Sync>;
type Responder = Box<dyn FnMut(usize, &[Item]) -> Result<(), ProcessError> + Send>;

/// One call to `process`
#[derive(Debug, Clone)]
pub struct Submission {
    /// Items handed to the processor
    pub items: Vec<Item>,
    /// When the call started
    pub at: Instant,
    /// Whether the call returned `Ok`
    pub accepted: bool,
}

#[derive(Debug, Default)]
struct MockLog {
    submissions: Vec<Submission>,
}

/// Read access to what a `MockProcessor` saw
#[derive(Debug, Clone)]
pub struct MockHandle {
    log: Arc<Mutex<MockLog>>,
    limit_calls: Arc<AtomicUsize>,
}

impl MockHandle {
    /// Every submission, in order
    pub fn submissions(&self) -> Vec<Submission> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submissions
            .clone()
    }

    pub fn submission_count(&self) -> usize {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submissions
            .len()
    }

    /// Sizes of every submitted batch, accepted or not
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.submissions().iter().map(|s| s.items.len()).collect()
    }

    /// Concatenation of accepted batches
    pub fn accepted_items(&self) -> Vec<Item> {
        self.submissions()
            .into_iter()
            .filter(|s| s.accepted)
            .flat_map(|s| s.items)
            .collect()
    }

    /// Number of `limits()` calls
    pub fn limit_calls(&self) -> usize {
        self.limit_calls.load(Ordering::SeqCst)
    }
}

/// Processor whose limits and responses are scripted by the test
pub struct MockProcessor {
    name: String,
    limits: LimitsFn,
    responder: Responder,
    latency: Duration,
    calls: usize,
    log: Arc<Mutex<MockLog>>,
    limit_calls: Arc<AtomicUsize>,
}

impl MockProcessor {
    /// Fixed limits, every batch succeeds
    pub fn new(name: impl Into<String>, limits: Limits) -> Self {
        Self {
            name: name.into(),
            limits: Box::new(move |_| limits),
            responder: Box::new(|_, _| Ok(())),
            latency: Duration::ZERO,
            calls: 0,
            log: Arc::new(Mutex::new(MockLog::default())),
            limit_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Limits as a function of the zero-based `limits()` call number
    pub fn with_limits_fn(
        mut self,
        f: impl Fn(usize) -> Limits + Send + Sync + 'static,
    ) -> Self {
        self.limits = Box::new(f);
        self
    }

    /// Limits taken in order; the last entry repeats
    pub fn with_limit_sequence(self, sequence: Vec<Limits>) -> Self {
        assert!(!sequence.is_empty(), "limit sequence cannot be empty");
        self.with_limits_fn(move |n| sequence[n.min(sequence.len() - 1)])
    }

    /// Response as a function of the zero-based `process()` call number
    pub fn with_responder(
        mut self,
        f: impl FnMut(usize, &[Item]) -> Result<(), ProcessError> + Send + 'static,
    ) -> Self {
        self.responder = Box::new(f);
        self
    }

    /// Scripted responses; calls past the end succeed
    pub fn with_responses(self, responses: Vec<Result<(), ProcessError>>) -> Self {
        let mut queue: VecDeque<_> = responses.into();
        self.with_responder(move |_, _| queue.pop_front().unwrap_or(Ok(())))
    }

    /// Every call returns `Blocked`
    pub fn always_blocked(self) -> Self {
        self.with_responder(|_, _| Err(ProcessError::Blocked))
    }

    /// Call number `call` fails with `message`; all others succeed
    pub fn failing_at(self, call: usize, message: impl Into<String>) -> Self {
        let name = self.name.clone();
        let message = message.into();
        self.with_responder(move |n, _| {
            if n == call {
                Err(ProcessError::failed(&name, &message))
            } else {
                Ok(())
            }
        })
    }

    /// Simulated time spent inside `process`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            log: Arc::clone(&self.log),
            limit_calls: Arc::clone(&self.limit_calls),
        }
    }
}

impl BatchProcessor for MockProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> Limits {
        let n = self.limit_calls.fetch_add(1, Ordering::SeqCst);
        (self.limits)(n)
    }

    async fn process(&mut self, batch: &[Item]) -> Result<(), ProcessError> {
        let at = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let call = self.calls;
        self.calls += 1;
        let result = (self.responder)(call, batch);
        trace!(processor = %self.name, call, size = batch.len(), ok = result.is_ok(), "Mock submission");

        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submissions
            .push(Submission {
                items: batch.to_vec(),
                at,
                accepted: result.is_ok(),
            });

        result
    }
}
