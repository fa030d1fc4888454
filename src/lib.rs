//! mdex-archiver: chapter acquisition and archival for MangaDex
//!
//! This crate resolves a series or chapter reference, enumerates the chapters that have not
//! been archived yet, downloads every page with bounded retries and packages each chapter into
//! a single comic archive annotated with a `ComicInfo.xml` descriptor.

pub mod archive;
pub mod cache;
pub mod config;
pub mod covers;
pub mod download;
pub mod gateway;
pub mod metadata;
pub mod pipeline;
pub mod resolver;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for archiver operations
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not a recognized MangaDex resource: {input}")]
    Resolution { input: String },

    #[error("Gateway lookup failed for {url}: {source}")]
    RemoteLookup {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Gateway returned an error result for {url}: {message}")]
    RemoteResult { url: String, message: String },

    #[error("Unexpected metadata shape: {0}")]
    MetadataShape(String),

    #[error("Failed to acquire page {page} from {url} after {attempts} attempts: {last_error}")]
    ImageAcquisition {
        page: usize,
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Failed to write metadata descriptor {}: {reason}", path.display())]
    MetadataWrite { path: PathBuf, reason: String },

    #[error("Failed to write archive {}: {source}", path.display())]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Cache file {} unavailable: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid chapter state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ChapterState,
        to: state::ChapterState,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiverError {
    /// Returns true if the error came from the remote gateway (transport, status or result)
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteLookup { .. } | Self::RemoteResult { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for archiver operations
pub type Result<T> = std::result::Result<T, ArchiverError>;

// Re-export commonly used types
pub use config::Config;
pub use metadata::{ChapterInfo, PageSet, SeriesInfo};
pub use pipeline::{Pipeline, RunReport};
pub use resolver::{resolve, Resource, ResourceKind};
pub use state::ChapterState;
