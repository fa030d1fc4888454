//! Cache module for deduplicating work across runs
//!
//! The cache maps a series id to the chapter ids already archived for it. A chapter is only
//! recorded once its archive exists, so the cache never points at a missing archive.
//!
//! Entries behave as a set: recording a chapter that is already present is a no-op.

mod store;

pub use store::CacheStore;

use std::collections::{BTreeMap, HashSet};

/// In-memory view of the cache document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterCache {
    entries: BTreeMap<String, Vec<String>>,
}

impl ChapterCache {
    /// Builds a cache from raw document entries, dropping duplicate ids within a series
    pub fn from_entries(entries: BTreeMap<String, Vec<String>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(series, chapters)| {
                let mut seen = HashSet::new();
                let unique = chapters
                    .into_iter()
                    .filter(|id| seen.insert(id.clone()))
                    .collect();
                (series, unique)
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, Vec<String>> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, series_id: &str, chapter_id: &str) -> bool {
        self.entries
            .get(series_id)
            .is_some_and(|chapters| chapters.iter().any(|id| id == chapter_id))
    }

    /// Chapter ids recorded for a series, in recording order
    pub fn chapters(&self, series_id: &str) -> &[String] {
        self.entries
            .get(series_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every recorded chapter id, across all series (the dedup set)
    pub fn all_chapter_ids(&self) -> HashSet<String> {
        self.entries.values().flatten().cloned().collect()
    }

    /// Adds a chapter under a series; returns false if it was already present
    pub fn insert(&mut self, series_id: &str, chapter_id: &str) -> bool {
        let chapters = self.entries.entry(series_id.to_string()).or_default();
        if chapters.iter().any(|id| id == chapter_id) {
            return false;
        }
        chapters.push(chapter_id.to_string());
        true
    }
}
