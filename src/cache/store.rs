//! JSON-backed cache store
//!
//! The document is an object mapping series ids to arrays of chapter ids, pretty-printed.
//! Every update is a whole-document rewrite through a temporary file in the same directory
//! followed by a rename, so readers never observe a torn document.

use crate::cache::ChapterCache;
use crate::ArchiverError;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Number of times `record` re-initializes a vanished cache file before giving up
const MISSING_FILE_RETRIES: u32 = 1;

/// Persistent store of archived chapter ids
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store for the document at `path` without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty document (and its parent directories) if none exists
    pub fn ensure_exists(&self) -> Result<(), ArchiverError> {
        if self.path.exists() {
            return Ok(());
        }

        tracing::info!("{} does not exist, creating it...", self.path.display());
        self.write_document(&ChapterCache::default())
            .map_err(|source| self.io_error(source))
    }

    /// Loads the full document, initializing an empty one on first use
    pub fn load(&self) -> Result<ChapterCache, ArchiverError> {
        self.ensure_exists()?;
        self.read_document().map_err(|source| self.io_error(source))
    }

    /// Returns true if the chapter is recorded under the series
    pub fn contains(&self, series_id: &str, chapter_id: &str) -> Result<bool, ArchiverError> {
        Ok(self.load()?.contains(series_id, chapter_id))
    }

    /// Records an archived chapter under its series
    ///
    /// Read-modify-write of the whole document. If the document has disappeared since it was
    /// last loaded, it is re-created once and the update retried once more before failing
    /// with `CacheIo`.
    pub fn record(&self, series_id: &str, chapter_id: &str) -> Result<(), ArchiverError> {
        let mut retries_left = MISSING_FILE_RETRIES;

        loop {
            match self.try_record(series_id, chapter_id) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound && retries_left > 0 => {
                    retries_left -= 1;
                    tracing::warn!(
                        "Cache file {} is missing, re-creating it",
                        self.path.display()
                    );
                    self.ensure_exists()?;
                }
                Err(source) => return Err(self.io_error(source)),
            }
        }
    }

    fn try_record(&self, series_id: &str, chapter_id: &str) -> io::Result<()> {
        let mut cache = self.read_document()?;
        if cache.insert(series_id, chapter_id) {
            self.write_document(&cache)?;
            tracing::debug!("Recorded chapter {} of series {}", chapter_id, series_id);
        } else {
            tracing::debug!(
                "Chapter {} of series {} is already recorded",
                chapter_id,
                series_id
            );
        }
        Ok(())
    }

    fn read_document(&self) -> io::Result<ChapterCache> {
        let content = fs::read_to_string(&self.path)?;
        let entries: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(ChapterCache::from_entries(entries))
    }

    fn write_document(&self, cache: &ChapterCache) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut body = serde_json::to_string_pretty(cache.entries())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        body.push('\n');

        let mut temp = NamedTempFile::new_in(&parent)?;
        temp.write_all(body.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> ArchiverError {
        ArchiverError::CacheIo {
            path: self.path.clone(),
            source,
        }
    }
}
