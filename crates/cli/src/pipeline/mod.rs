//! Dispatch job orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{load_items, DispatchJob, JobConfig};
pub use stats::RunReport;
