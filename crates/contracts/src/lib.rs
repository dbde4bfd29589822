//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Progress model
//! - Items are addressed by their zero-based index in the caller's input
//! - `ProgressIndex` names the last item a processor confirmed, or none (-1)

mod blueprint;
mod error;
mod item;
mod processor;
mod progress;

pub use blueprint::*;
pub use error::*;
pub use item::{Item, Limits};
pub use processor::{BatchProcessor, LocalBatchProcessor};
pub use progress::ProgressIndex;
