//! Metadata module
//!
//! Turns catalog ids into normalized series and chapter descriptors, resolves the page set of
//! a chapter and enumerates the chapters of a series.
//!
//! # Components
//!
//! - `Catalog`: gateway plus the language/quality settings every lookup needs
//! - `series`: series lookup and title selection
//! - `chapter`: chapter lookup and page hosting resolution
//! - `feed`: paginated chapter enumeration with dedup filtering

mod chapter;
mod feed;
mod series;

pub use chapter::parse_chapter;
pub use feed::{exclude_known, ChapterListing};

use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::ArchiverError;
use chrono::{DateTime, FixedOffset};

/// Normalized series descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInfo {
    pub id: String,
    pub title: String,
    /// Absolute URL of the main cover, when the catalog lists one
    pub cover_url: Option<String>,
}

/// Normalized chapter descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterInfo {
    pub id: String,
    pub series_id: String,
    /// Non-negative chapter number
    pub chapter: f64,
    pub volume: Option<u32>,
    /// Chapter title, `Chapter {number}` when the catalog has none
    pub title: String,
    pub language: Option<String>,
    pub pages: Option<u32>,
    pub published_at: Option<DateTime<FixedOffset>>,
}

impl ChapterInfo {
    /// Chapter number as rendered in descriptors and titles (`12`, `12.5`)
    pub fn number_label(&self) -> String {
        format_chapter_number(self.chapter)
    }
}

/// Ordered page image URLs of one chapter; index `i` (1-based) is page `i`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet {
    urls: Vec<String>,
}

impl PageSet {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterates `(page_number, url)` pairs starting at page 1
    pub fn pages(&self) -> impl Iterator<Item = (usize, &str)> {
        self.urls
            .iter()
            .enumerate()
            .map(|(i, url)| (i + 1, url.as_str()))
    }
}

/// Renders a chapter number with at most one decimal, dropping a trailing `.0`
///
/// # Examples
///
/// ```
/// use mdex_archiver::metadata::format_chapter_number;
///
/// assert_eq!(format_chapter_number(12.0), "12");
/// assert_eq!(format_chapter_number(12.5), "12.5");
/// assert_eq!(format_chapter_number(350.0), "350");
/// ```
pub fn format_chapter_number(number: f64) -> String {
    let formatted = format!("{:.1}", number);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Metadata fetcher bound to a gateway and the configured language
#[derive(Debug, Clone)]
pub struct Catalog {
    gateway: Gateway,
    language: String,
    data_saver: bool,
}

impl Catalog {
    /// Creates a catalog over an existing gateway
    pub fn new(gateway: Gateway, config: &GatewayConfig) -> Self {
        Self {
            gateway,
            language: config.language.clone(),
            data_saver: config.data_saver,
        }
    }

    /// Creates a catalog and its gateway from configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ArchiverError> {
        Ok(Self::new(Gateway::new(config)?, config))
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}
