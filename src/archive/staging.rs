//! Staging directory guard
//!
//! A `StagingDir` owns the per-chapter directory pages are downloaded into. It is removed
//! explicitly on success and unconditionally when the guard is dropped, so an early return
//! anywhere in the chapter pipeline still cleans up.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    removed: bool,
}

impl StagingDir {
    /// Creates a fresh staging directory, discarding leftovers from an interrupted run
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();

        if path.exists() {
            tracing::warn!("Removing stale staging directory {}", path.display());
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory, reporting any failure
    pub fn remove(mut self) -> io::Result<()> {
        self.removed = true;
        remove_if_present(&self.path)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        if let Err(e) = remove_if_present(&self.path) {
            tracing::warn!(
                "Failed to remove staging directory {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Removes a directory tree, treating an already-missing directory as success
pub fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
