//! Run report - outcome and statistics of one dispatch job.

use std::time::Duration;

use contracts::ProgressIndex;
use dispatcher::{Interrupted, MetricsSnapshot};
use serde::Serialize;

/// Report of a dispatch run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Processor name from the configuration
    pub processor: String,

    /// Items in the input file
    pub total_items: usize,

    /// First index dispatched by this run
    pub resume_from: usize,

    /// Last confirmed index (-1 = none)
    pub progress: ProgressIndex,

    /// Where a follow-up run should start
    pub next_resume_from: usize,

    /// Items confirmed by this run
    pub items_this_run: usize,

    /// Whether every input item is confirmed
    pub completed: bool,

    /// Interruption label (cancelled, deadline, failed, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted_by: Option<&'static str>,

    /// Interruption error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub duration_secs: f64,

    pub batches_submitted: u64,
    pub batches_completed: u64,
    pub blocked_retries: u64,
    pub mean_batch_size: f64,
    pub mean_latency_ms: f64,
    pub max_latency_ms: f64,

    #[serde(skip)]
    pub metrics: MetricsSnapshot,
}

impl RunReport {
    pub fn new(
        processor: &str,
        total_items: usize,
        resume_from: usize,
        outcome: Result<ProgressIndex, Interrupted>,
        metrics: MetricsSnapshot,
        duration: Duration,
    ) -> Self {
        let (progress, interrupted_by, error) = match outcome {
            Ok(progress) => (progress, None, None),
            Err(interrupted) => (
                interrupted.progress(),
                Some(interrupted.error().reason()),
                Some(interrupted.error().to_string()),
            ),
        };

        Self {
            processor: processor.to_string(),
            total_items,
            resume_from,
            progress,
            next_resume_from: progress.resume_from(),
            items_this_run: progress.processed_count().saturating_sub(resume_from),
            completed: error.is_none(),
            interrupted_by,
            error,
            duration_secs: duration.as_secs_f64(),
            batches_submitted: metrics.batches_submitted,
            batches_completed: metrics.batches_completed,
            blocked_retries: metrics.blocked_count,
            mean_batch_size: metrics.batch_size.mean,
            mean_latency_ms: metrics.latency_ms.mean,
            max_latency_ms: metrics.latency_ms.max,
            metrics,
        }
    }

    /// Items confirmed per second during this run
    pub fn items_per_sec(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.items_this_run as f64 / self.duration_secs
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Dispatch Report                          ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Processor: {}", self.processor);
        println!("   ├─ Duration: {:.2}s", self.duration_secs);
        println!("   ├─ Input items: {}", self.total_items);
        println!("   ├─ Started at index: {}", self.resume_from);
        println!("   ├─ Items this run: {}", self.items_this_run);
        println!("   ├─ Throughput: {:.2} items/s", self.items_per_sec());
        println!("   └─ Progress index: {}", self.progress);

        println!("\n📈 Dispatch Metrics");
        for line in self.metrics.to_string().lines() {
            println!("   ├─ {}", line);
        }
        println!("   └─ Done");

        match (&self.interrupted_by, &self.error) {
            (Some(reason), Some(error)) => {
                println!("\n⚠️  Interrupted ({})", reason);
                println!("   ├─ Error: {}", error);
                println!("   └─ Resume with: --resume-from {}", self.next_resume_from);
            }
            _ => println!("\n✓ All items dispatched"),
        }

        println!();
    }
}
