//! Cover manager
//!
//! Two unrelated optional features live here:
//! - the series cover, downloaded once from the gateway's uploads host
//! - per-volume covers, copied from the first staged page of one designated chapter per volume

use crate::archive::{page_filename, series_directory, IMAGE_EXTENSION};
use crate::gateway::Gateway;
use crate::metadata::{ChapterInfo, SeriesInfo};
use crate::ArchiverError;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Downloads the series cover into `{output_root}/{series}/cover.{ext}`
///
/// Returns `Ok(None)` when the catalog lists no cover for the series.
pub async fn download_series_cover(
    gateway: &Gateway,
    series: &SeriesInfo,
    output_root: &Path,
) -> Result<Option<PathBuf>, ArchiverError> {
    let url = match &series.cover_url {
        Some(url) => url,
        None => {
            tracing::info!("No cover listed for \"{}\"", series.title);
            return Ok(None);
        }
    };

    let bytes = gateway
        .get_bytes(url)
        .await
        .map_err(|source| ArchiverError::RemoteLookup {
            url: url.clone(),
            source,
        })?;

    let dir = series_directory(output_root, &series.title);
    fs::create_dir_all(&dir)?;

    let path = dir.join(format!("cover.{}", cover_extension(url)));
    fs::write(&path, bytes)?;

    tracing::info!("Saved series cover to {}", path.display());
    Ok(Some(path))
}

/// Extension of a cover file name, `jpg` when it has none worth keeping
fn cover_extension(url: &str) -> String {
    let file_name = url.rsplit('/').next().unwrap_or_default();
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| IMAGE_EXTENSION.to_string())
}

/// Chooses which chapter supplies each volume's cover
///
/// The designated chapter of a volume is the one with the lowest chapter number; chapters
/// without a volume never supply a cover.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeCoverPlan {
    designated: BTreeMap<u32, (f64, String)>,
}

impl VolumeCoverPlan {
    pub fn from_chapters<'a, I>(chapters: I) -> Self
    where
        I: IntoIterator<Item = &'a ChapterInfo>,
    {
        let mut designated: BTreeMap<u32, (f64, String)> = BTreeMap::new();

        for chapter in chapters {
            let Some(volume) = chapter.volume else {
                continue;
            };

            let replace = designated
                .get(&volume)
                .map_or(true, |(number, _)| chapter.chapter < *number);
            if replace {
                designated.insert(volume, (chapter.chapter, chapter.id.clone()));
            }
        }

        Self { designated }
    }

    /// Volume whose cover `chapter` supplies, if any
    pub fn designated(&self, chapter: &ChapterInfo) -> Option<u32> {
        let volume = chapter.volume?;
        self.designated
            .get(&volume)
            .filter(|(_, id)| *id == chapter.id)
            .map(|_| volume)
    }

    pub fn volumes(&self) -> usize {
        self.designated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designated.is_empty()
    }
}

/// Copies the first staged page of `staging_dir` to `cover_path`
///
/// Returns `Ok(false)` when there is no first page to copy.
pub fn extract_volume_cover(staging_dir: &Path, cover_path: &Path) -> io::Result<bool> {
    let first_page = staging_dir.join(page_filename(1));
    if !first_page.is_file() {
        return Ok(false);
    }

    if let Some(parent) = cover_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&first_page, cover_path)?;
    Ok(true)
}
