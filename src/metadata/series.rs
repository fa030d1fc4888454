//! Series lookups

use crate::gateway::responses::{EntityResponse, SeriesData};
use crate::metadata::{Catalog, SeriesInfo};
use crate::ArchiverError;
use serde_json::Value;
use std::collections::HashMap;

/// Relationship type carrying the main cover's filename
const COVER_RELATIONSHIP: &str = "cover_art";

impl Catalog {
    /// Fetches and normalizes a series' metadata
    ///
    /// The title is picked from the localized title map: configured language first, then
    /// English, then any non-empty entry (alternative titles are searched the same way).
    ///
    /// # Errors
    ///
    /// * `RemoteLookup` / `RemoteResult` - the gateway could not answer
    /// * `MetadataShape` - no usable title
    pub async fn fetch_series(&self, series_id: &str) -> Result<SeriesInfo, ArchiverError> {
        let response: EntityResponse<SeriesData> = self
            .gateway()
            .get_json(
                &format!("/manga/{}", series_id),
                &[("includes[]", COVER_RELATIONSHIP.to_string())],
            )
            .await?;

        parse_series(response.data, self.language(), self.gateway().uploads_base_url())
    }
}

fn parse_series(
    data: SeriesData,
    language: &str,
    uploads_base_url: &str,
) -> Result<SeriesInfo, ArchiverError> {
    let attributes = data.attributes.unwrap_or_default();

    let title = pick_title(&attributes.title, language)
        .or_else(|| {
            attributes
                .alt_titles
                .iter()
                .find_map(|titles| pick_title(titles, language))
        })
        .ok_or_else(|| ArchiverError::MetadataShape(format!("series {} has no title", data.id)))?;

    let cover_url = data
        .relationships
        .iter()
        .find(|r| r.kind == COVER_RELATIONSHIP)
        .and_then(|r| r.attributes.as_ref())
        .and_then(|attrs| attrs.get("fileName"))
        .and_then(Value::as_str)
        .map(|filename| format!("{}/covers/{}/{}", uploads_base_url, data.id, filename));

    Ok(SeriesInfo {
        id: data.id,
        title,
        cover_url,
    })
}

fn pick_title(titles: &HashMap<String, String>, language: &str) -> Option<String> {
    let usable = |key: &str| titles.get(key).filter(|t| !t.trim().is_empty()).cloned();

    usable(language).or_else(|| usable("en")).or_else(|| {
        let mut keys: Vec<&String> = titles.keys().collect();
        keys.sort();
        keys.into_iter().find_map(|key| usable(key))
    })
}
