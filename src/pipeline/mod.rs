//! Pipeline module
//!
//! Top-level orchestration: input resolution, dedup filtering and the per-chapter state
//! machine, plus the report a run produces.

mod orchestrator;
mod report;

pub use orchestrator::Pipeline;
pub use report::{ChapterOutcome, RunReport};
