/// Chapter state definitions for tracking a single chapter's processing attempt
///
/// A chapter moves `Pending -> Downloading -> Staged -> Archived -> Cached -> Cleaned`.
/// `Cached` is skipped in override mode. `Failed` is reachable from `Downloading` and `Staged`.
use crate::ArchiverError;
use std::fmt;

/// Represents the current state of a chapter in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChapterState {
    // ===== Active States =====
    /// Metadata is resolved, nothing has been downloaded yet
    Pending,

    /// Pages are being fetched into the staging directory
    Downloading,

    /// Every page is staged on disk
    Staged,

    /// The chapter archive exists at its final path
    Archived,

    /// The chapter id has been recorded in the cache
    Cached,

    // ===== Terminal States =====
    /// The staging directory has been removed after a successful run
    Cleaned,

    /// The attempt failed; staging has been purged
    Failed,
}

impl ChapterState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cleaned | Self::Failed)
    }

    /// Returns true if the transition `self -> next` is allowed
    pub fn can_transition_to(&self, next: ChapterState) -> bool {
        use ChapterState::*;

        matches!(
            (self, next),
            (Pending, Downloading)
                | (Downloading, Staged)
                | (Downloading, Failed)
                | (Staged, Archived)
                | (Staged, Failed)
                | (Archived, Cached)
                | (Archived, Cleaned)
                | (Cached, Cleaned)
        )
    }

    /// Validates and performs a transition, returning the new state
    pub fn transition(self, next: ChapterState) -> Result<ChapterState, ArchiverError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ArchiverError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Staged => "staged",
            Self::Archived => "archived",
            Self::Cached => "cached",
            Self::Cleaned => "cleaned",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ChapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
