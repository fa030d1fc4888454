//! Chapter lookups
//!
//! - `fetch_chapter`: chapter entity to `ChapterInfo`
//! - `fetch_page_urls`: page hosting data to an ordered `PageSet`

use crate::gateway::responses::{ChapterData, EntityResponse, PageHostingResponse};
use crate::metadata::{format_chapter_number, Catalog, ChapterInfo, PageSet};
use crate::resolver::is_uuid;
use crate::ArchiverError;
use chrono::DateTime;
use serde_json::Value;

/// Relationship type linking a chapter to its series
const SERIES_RELATIONSHIP: &str = "manga";

impl Catalog {
    /// Fetches and normalizes a chapter's metadata
    ///
    /// # Errors
    ///
    /// * `RemoteLookup` / `RemoteResult` - the gateway could not answer
    /// * `MetadataShape` - no series relationship, or a non-numeric chapter/volume
    pub async fn fetch_chapter(&self, chapter_id: &str) -> Result<ChapterInfo, ArchiverError> {
        let response: EntityResponse<ChapterData> = self
            .gateway()
            .get_json(&format!("/chapter/{}", chapter_id), &[])
            .await?;

        let info = parse_chapter(response.data)?;
        tracing::info!(
            "Got info for \"{} {}\"",
            format_chapter_number(info.chapter),
            info.title
        );

        Ok(info)
    }

    /// Resolves the ordered page image URLs of a chapter
    ///
    /// URLs are built as `{base}/data/{hash}/{filename}` (or `data-saver` when enabled).
    /// Missing hosting data is logged and yields an empty page set.
    pub async fn fetch_page_urls(&self, chapter_id: &str) -> Result<PageSet, ArchiverError> {
        let response: PageHostingResponse = self
            .gateway()
            .get_json(&format!("/at-home/server/{}", chapter_id), &[])
            .await?;

        Ok(build_page_set(chapter_id, response, self.data_saver))
    }
}

fn build_page_set(chapter_id: &str, response: PageHostingResponse, data_saver: bool) -> PageSet {
    let Some(chapter) = response.chapter else {
        tracing::warn!("Could not find page data for chapter {}", chapter_id);
        return PageSet::default();
    };

    let (segment, filenames) = if data_saver {
        ("data-saver", chapter.data_saver)
    } else {
        ("data", chapter.data)
    };

    let Some(filenames) = filenames else {
        tracing::warn!("Could not find page URLs for chapter {}", chapter_id);
        return PageSet::default();
    };

    let (Some(base_url), Some(hash)) = (response.base_url, chapter.hash) else {
        tracing::warn!("Page URLs for chapter {} could not be retrieved", chapter_id);
        return PageSet::default();
    };

    let base_url = base_url.trim_end_matches('/');
    PageSet::new(
        filenames
            .iter()
            .map(|filename| format!("{}/{}/{}/{}", base_url, segment, hash, filename))
            .collect(),
    )
}

/// Normalizes a chapter entity into a `ChapterInfo`
///
/// Shared by single-chapter lookups and feed enumeration so both produce identical descriptors.
pub fn parse_chapter(data: ChapterData) -> Result<ChapterInfo, ArchiverError> {
    if !is_uuid(&data.id) {
        return Err(ArchiverError::MetadataShape(format!(
            "chapter id '{}' is not a UUID",
            data.id
        )));
    }

    let attributes = data.attributes.ok_or_else(|| {
        ArchiverError::MetadataShape(format!("chapter {} has no attributes", data.id))
    })?;

    let series_id = data
        .relationships
        .iter()
        .filter(|r| r.kind == SERIES_RELATIONSHIP)
        .find_map(|r| r.id.clone().filter(|id| is_uuid(id)))
        .ok_or_else(|| {
            ArchiverError::MetadataShape(format!("chapter {} has no series relationship", data.id))
        })?;

    let chapter = parse_number(attributes.chapter.as_ref())
        .map_err(|raw| {
            ArchiverError::MetadataShape(format!(
                "chapter {} has a non-numeric chapter number '{}'",
                data.id, raw
            ))
        })?
        .unwrap_or(0.0);

    if !chapter.is_finite() || chapter < 0.0 {
        return Err(ArchiverError::MetadataShape(format!(
            "chapter {} has an invalid chapter number {}",
            data.id, chapter
        )));
    }

    let volume = parse_volume(attributes.volume.as_ref()).map_err(|raw| {
        ArchiverError::MetadataShape(format!(
            "chapter {} has a non-numeric volume '{}'",
            data.id, raw
        ))
    })?;

    let title = attributes
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("Chapter {}", format_chapter_number(chapter)));

    let published_at = attributes
        .publish_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok());

    Ok(ChapterInfo {
        id: data.id,
        series_id,
        chapter,
        volume,
        title,
        language: attributes.translated_language,
        pages: attributes.pages,
        published_at,
    })
}

/// Parses a JSON string or number; `Err` carries the raw value
fn parse_number(value: Option<&Value>) -> Result<Option<f64>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| n.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| s.clone()),
        Some(other) => Err(other.to_string()),
    }
}

fn parse_volume(value: Option<&Value>) -> Result<Option<u32>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| n.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<u32>().map(Some).map_err(|_| s.clone()),
        Some(other) => Err(other.to_string()),
    }
}
