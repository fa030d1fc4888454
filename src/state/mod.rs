//! State module for tracking chapter progress
//!
//! # Components
//!
//! - `ChapterState`: Tracks a chapter through download, staging, archiving, caching and cleanup

mod chapter_state;

pub use chapter_state::ChapterState;
