//! `ComicInfo.xml` metadata descriptor
//!
//! A subset of the ComicRack schema understood by common comic readers and library servers.

use crate::metadata::{ChapterInfo, SeriesInfo};
use crate::resolver::chapter_url;
use chrono::Datelike;
use serde::Serialize;

/// Filename of the descriptor inside the staging directory and the archive
pub const COMIC_INFO_FILENAME: &str = "ComicInfo.xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename = "ComicInfo")]
pub struct ComicInfo {
    #[serde(rename = "@xmlns:xsi")]
    xmlns_xsi: &'static str,
    #[serde(rename = "@xmlns:xsd")]
    xmlns_xsd: &'static str,

    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Series")]
    pub series: String,
    #[serde(rename = "Number")]
    pub number: String,
    #[serde(rename = "Volume", skip_serializing_if = "Option::is_none")]
    pub volume: Option<u32>,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "Year", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "Month", skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(rename = "Day", skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(rename = "Web")]
    pub web: String,
    #[serde(rename = "PageCount")]
    pub page_count: usize,
    #[serde(rename = "LanguageISO", skip_serializing_if = "Option::is_none")]
    pub language_iso: Option<String>,
    #[serde(rename = "Manga")]
    pub manga: &'static str,
}

impl ComicInfo {
    /// Builds the descriptor of a staged chapter
    pub fn new(series: &SeriesInfo, chapter: &ChapterInfo, page_count: usize) -> Self {
        let published = chapter.published_at.as_ref();

        Self {
            xmlns_xsi: "http://www.w3.org/2001/XMLSchema-instance",
            xmlns_xsd: "http://www.w3.org/2001/XMLSchema",
            title: chapter.title.clone(),
            series: series.title.clone(),
            number: chapter.number_label(),
            volume: chapter.volume,
            notes: format!("Chapter ID: {}", chapter.id),
            year: published.map(|d| d.year()),
            month: published.map(|d| d.month()),
            day: published.map(|d| d.day()),
            web: chapter_url(&chapter.id),
            page_count,
            language_iso: chapter.language.clone(),
            manga: "YesAndRightToLeft",
        }
    }

    /// Serializes the descriptor as a standalone XML document
    pub fn to_xml(&self) -> Result<String, quick_xml::se::SeError> {
        let body = quick_xml::se::to_string(self)?;
        Ok(format!("{}\n{}\n", XML_DECLARATION, body))
    }
}
