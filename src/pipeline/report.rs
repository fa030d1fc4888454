//! Run report
//!
//! Accumulates what a run produced so the binary can print a summary at the end.

use std::path::PathBuf;

/// Result of running the state machine on one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// The archive exists at its final path
    Archived {
        archive: PathBuf,
        volume_cover: Option<PathBuf>,
    },

    /// The gateway listed no pages; nothing was written
    Empty,
}

/// Summary of one run over one or more inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Archives written, in processing order
    pub archives: Vec<PathBuf>,

    /// Volume cover images written
    pub volume_covers: Vec<PathBuf>,

    /// Series cover images written
    pub series_covers: Vec<PathBuf>,

    /// Chapters skipped because they were already archived
    pub skipped: usize,

    /// Chapters skipped because they had no pages
    pub empty: usize,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a chapter outcome into the report
    pub fn record(&mut self, outcome: ChapterOutcome) {
        match outcome {
            ChapterOutcome::Archived {
                archive,
                volume_cover,
            } => {
                self.archives.push(archive);
                self.volume_covers.extend(volume_cover);
            }
            ChapterOutcome::Empty => self.empty += 1,
        }
    }

    pub fn record_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    pub fn record_series_cover(&mut self, path: PathBuf) {
        self.series_covers.push(path);
    }

    /// Total number of chapters the run looked at
    pub fn chapters_seen(&self) -> usize {
        self.archives.len() + self.skipped + self.empty
    }

    /// Prints the summary to stdout
    pub fn print_summary(&self) {
        println!("=== Run Summary ===\n");

        println!("Chapters ({}):", self.chapters_seen());
        println!("  Archived: {}", self.archives.len());
        println!("  Already archived (skipped): {}", self.skipped);
        println!("  Without pages (skipped): {}", self.empty);
        println!();

        if !self.archives.is_empty() {
            println!("Archives ({}):", self.archives.len());
            for path in &self.archives {
                println!("  - {}", path.display());
            }
            println!();
        }

        let covers = self.series_covers.len() + self.volume_covers.len();
        if covers > 0 {
            println!("Covers ({}):", covers);
            for path in self.series_covers.iter().chain(&self.volume_covers) {
                println!("  - {}", path.display());
            }
            println!();
        }
    }
}
