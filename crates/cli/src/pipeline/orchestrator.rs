//! Dispatch job orchestrator - wires input, processor and dispatcher together.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bytes::Bytes;
use contracts::{BatchProcessor, DispatchBlueprint, DispatcherSettings, Item, ProgressIndex};
use dispatcher::{
    create_processor, Cancellation, CancellationToken, DispatchMetrics, Dispatcher, Interrupted,
    MetricsSnapshot, QuotaProcessor,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::RunReport;

/// Dispatch job configuration
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Loaded and validated configuration
    pub blueprint: DispatchBlueprint,

    /// Input file, one item per line
    pub input: PathBuf,

    /// Index of the first item to dispatch
    pub resume_from: usize,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Drop blank lines while loading input
    pub skip_blank: bool,

    /// Period of the progress log line (None = disabled)
    pub progress_interval: Option<Duration>,
}

/// One dispatch run over an input file
pub struct DispatchJob {
    config: JobConfig,
}

impl DispatchJob {
    /// Create a new job with the given configuration
    pub fn new(config: JobConfig) -> Self {
        Self { config }
    }

    /// Run the job until the input is exhausted or the run is interrupted.
    ///
    /// Interruptions are part of the report, not an `Err`; errors here are
    /// setup failures (unreadable input, processor creation).
    pub async fn run(self, token: CancellationToken) -> Result<RunReport> {
        let JobConfig {
            blueprint,
            input,
            resume_from,
            timeout,
            skip_blank,
            progress_interval,
        } = self.config;

        let items = load_items(&input, skip_blank)?;
        info!(
            input = %input.display(),
            items = items.len(),
            resume_from,
            "Input loaded"
        );

        let mut cancel = Cancellation::new(token);
        if let Some(timeout) = timeout {
            cancel = cancel.with_timeout(timeout);
        }

        let processor = create_processor(&blueprint.processor).with_context(|| {
            format!("Failed to create processor '{}'", blueprint.processor.name)
        })?;

        let start_time = Instant::now();
        let (outcome, metrics) = if blueprint.processor.enforce_quota {
            info!(processor = %blueprint.processor.name, "Quota enforcement enabled");
            dispatch(
                QuotaProcessor::new(processor),
                blueprint.dispatcher,
                &items,
                resume_from,
                &cancel,
                progress_interval,
            )
            .await
        } else {
            dispatch(
                processor,
                blueprint.dispatcher,
                &items,
                resume_from,
                &cancel,
                progress_interval,
            )
            .await
        };

        Ok(RunReport::new(
            &blueprint.processor.name,
            items.len(),
            resume_from,
            outcome,
            metrics,
            start_time.elapsed(),
        ))
    }
}

async fn dispatch<P: BatchProcessor>(
    processor: P,
    settings: DispatcherSettings,
    items: &[Item],
    start: usize,
    cancel: &Cancellation,
    progress_interval: Option<Duration>,
) -> (Result<ProgressIndex, Interrupted>, MetricsSnapshot) {
    let mut dispatcher = Dispatcher::new(processor, settings);
    let reporter = progress_interval
        .map(|every| spawn_progress_reporter(Arc::clone(dispatcher.metrics()), every));

    let outcome = dispatcher.run_from(items, start, cancel).await;

    if let Some(handle) = reporter {
        handle.abort();
    }

    (outcome, dispatcher.metrics().snapshot())
}

fn spawn_progress_reporter(metrics: Arc<DispatchMetrics>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            info!(
                batches = metrics.batches_completed(),
                items = metrics.items_processed(),
                blocked = metrics.blocked_count(),
                "Dispatch progress"
            );
        }
    })
}

/// Read `path` and turn every line into one item.
///
/// Line endings (`\n` or `\r\n`) are stripped. A final line without a
/// trailing newline still counts. Payloads share the file buffer.
pub fn load_items(path: &Path, skip_blank: bool) -> Result<Vec<Item>> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read input from {}", path.display()))?;
    Ok(split_lines(Bytes::from(content), skip_blank))
}

fn split_lines(content: Bytes, skip_blank: bool) -> Vec<Item> {
    let mut items = Vec::new();
    let mut start = 0;

    while start < content.len() {
        let end = content[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(content.len(), |offset| start + offset);

        let mut line_end = end;
        if line_end > start && content[line_end - 1] == b'\r' {
            line_end -= 1;
        }

        let line = content.slice(start..line_end);
        if !(skip_blank && line.iter().all(u8::is_ascii_whitespace)) {
            items.push(Item::from(line));
        }

        start = end + 1;
    }

    items
}
