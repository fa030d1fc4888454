//! Wire types for the catalog API
//!
//! Only the fields the archiver consumes are modelled. Numeric attributes arrive as strings,
//! numbers or `null` depending on the entity, so they are kept as raw JSON values and parsed
//! by the metadata layer.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Single-entity response envelope
#[derive(Debug, Deserialize)]
pub struct EntityResponse<T> {
    pub data: T,
}

/// Paginated collection response envelope
#[derive(Debug, Deserialize)]
pub struct CollectionResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Option<Value>,
}

/// Chapter entity
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterData {
    pub id: String,
    pub attributes: Option<ChapterAttributes>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    pub volume: Option<Value>,
    pub chapter: Option<Value>,
    pub title: Option<String>,
    pub translated_language: Option<String>,
    pub external_url: Option<String>,
    pub publish_at: Option<String>,
    pub pages: Option<u32>,
}

/// Series (manga) entity
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesData {
    pub id: String,
    pub attributes: Option<SeriesAttributes>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAttributes {
    #[serde(default)]
    pub title: HashMap<String, String>,
    #[serde(default)]
    pub alt_titles: Vec<HashMap<String, String>>,
}

/// Page hosting ("at-home") response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHostingResponse {
    pub base_url: Option<String>,
    pub chapter: Option<PageHostingChapter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHostingChapter {
    pub hash: Option<String>,
    pub data: Option<Vec<String>>,
    pub data_saver: Option<Vec<String>>,
}
