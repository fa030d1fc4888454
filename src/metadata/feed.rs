//! Chapter enumeration
//!
//! Walks the paginated chapter feed of a series. Two entry points exist:
//!
//! - `list_chapter_ids` filters raw ids against the dedup set; callers resolve the survivors
//!   with `resolve_chapters`
//! - `list_chapters` filters the same way, then resolves the survivors straight from the
//!   feed entries
//!
//! Both end with the same chapter set.

use crate::gateway::responses::{ChapterData, CollectionResponse};
use crate::metadata::{parse_chapter, Catalog, ChapterInfo};
use crate::ArchiverError;
use std::collections::HashSet;

/// Page size of feed requests
const FEED_PAGE_SIZE: u32 = 100;

/// The API refuses `offset + limit` beyond this
const FEED_MAX_WINDOW: u32 = 10_000;

/// Chapters of a series left after dedup filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterListing {
    /// Resolved chapters, in feed order
    pub chapters: Vec<ChapterInfo>,

    /// Feed entries dropped because their id was excluded
    pub excluded: usize,
}

impl Catalog {
    /// Lists the ids of a series' chapters, in feed order, minus `excluded`
    pub async fn list_chapter_ids(
        &self,
        series_id: &str,
        excluded: &HashSet<String>,
    ) -> Result<Vec<String>, ArchiverError> {
        let ids = self
            .fetch_feed(series_id)
            .await?
            .into_iter()
            .map(|data| data.id)
            .collect();

        Ok(exclude_known(ids, excluded, |id| id.as_str()))
    }

    /// Lists the resolved chapters of a series, in feed order, minus `excluded`
    ///
    /// Entries are filtered on their raw id before parsing, so an excluded entry is never
    /// parsed and cannot fail the listing.
    pub async fn list_chapters(
        &self,
        series_id: &str,
        excluded: &HashSet<String>,
    ) -> Result<ChapterListing, ArchiverError> {
        let entries = self.fetch_feed(series_id).await?;
        let total = entries.len();

        let chapters = exclude_known(entries, excluded, |data| data.id.as_str())
            .into_iter()
            .map(parse_chapter)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChapterListing {
            excluded: total - chapters.len(),
            chapters,
        })
    }

    /// Resolves chapter ids one by one, preserving order
    pub async fn resolve_chapters(
        &self,
        chapter_ids: &[String],
    ) -> Result<Vec<ChapterInfo>, ArchiverError> {
        let mut chapters = Vec::with_capacity(chapter_ids.len());
        for id in chapter_ids {
            chapters.push(self.fetch_chapter(id).await?);
        }
        Ok(chapters)
    }

    /// Fetches every hosted feed entry of a series
    async fn fetch_feed(&self, series_id: &str) -> Result<Vec<ChapterData>, ArchiverError> {
        let path = format!("/manga/{}/feed", series_id);
        let mut entries = Vec::new();
        let mut offset = 0u32;

        loop {
            if offset + FEED_PAGE_SIZE > FEED_MAX_WINDOW {
                tracing::warn!(
                    "Feed for series {} exceeds {} entries, stopping enumeration",
                    series_id,
                    FEED_MAX_WINDOW
                );
                break;
            }

            let page: CollectionResponse<ChapterData> = self
                .gateway()
                .get_json(
                    &path,
                    &[
                        ("limit", FEED_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                        ("translatedLanguage[]", self.language().to_string()),
                        ("order[volume]", "asc".to_string()),
                        ("order[chapter]", "asc".to_string()),
                        ("includeExternalUrl", "0".to_string()),
                    ],
                )
                .await?;

            let received = page.data.len() as u32;
            tracing::debug!(
                "Feed for series {}: {} entries at offset {} (total {})",
                series_id,
                received,
                offset,
                page.total
            );

            for entry in page.data {
                let external = entry
                    .attributes
                    .as_ref()
                    .and_then(|a| a.external_url.as_deref())
                    .is_some_and(|url| !url.is_empty());

                if external {
                    tracing::info!("Skipping externally hosted chapter {}", entry.id);
                    continue;
                }
                entries.push(entry);
            }

            offset += received;
            if received == 0 || offset >= page.total {
                break;
            }
        }

        tracing::info!("Found {} chapters for series {}", entries.len(), series_id);
        Ok(entries)
    }
}

/// Drops items whose id is in `excluded`, keeping order
pub fn exclude_known<T, F>(items: Vec<T>, excluded: &HashSet<String>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if excluded.is_empty() {
        return items;
    }

    let before = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| !excluded.contains(id_of(item)))
        .collect();

    if kept.len() != before {
        tracing::info!("Skipping {} already archived chapters", before - kept.len());
    }

    kept
}
