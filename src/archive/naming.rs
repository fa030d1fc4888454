//! Output path naming
//!
//! Chapter directories are laid out as `{root}/{series}/{padded number} {title}`; the archive
//! and the optional volume cover are siblings named `{chapter_directory}.{ext}` and
//! `{chapter_directory}.jpg`.

use crate::metadata::ChapterInfo;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension of staged pages and cover images
pub const IMAGE_EXTENSION: &str = "jpg";

/// Replaces every character outside `[A-Za-z0-9_.\- ]` with `_`
///
/// Components made only of dots (or empty after trimming) become `_` so they can never
/// address a parent directory.
///
/// # Examples
///
/// ```
/// use mdex_archiver::archive::sanitize_component;
///
/// assert_eq!(sanitize_component("Sword?Art/Online"), "Sword_Art_Online");
/// ```
pub fn sanitize_component(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory holding a chapter's staged pages
pub fn chapter_directory(output_root: &Path, series_title: &str, chapter: &ChapterInfo) -> PathBuf {
    output_root
        .join(sanitize_component(series_title))
        .join(chapter_directory_name(chapter))
}

/// `{number} {title}`, for example `012 Start` or `350 New Phone`
pub fn chapter_directory_name(chapter: &ChapterInfo) -> String {
    format!(
        "{} {}",
        padded_chapter_number(chapter.chapter),
        sanitize_component(&chapter.title)
    )
}

/// Chapter number padded to at least three integer digits so directories sort numerically
///
/// One decimal is kept; a `.0` fraction is dropped (`012`, `012.5`, `350`).
pub fn padded_chapter_number(number: f64) -> String {
    let formatted = format!("{:05.1}", number);
    match formatted.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

/// Directory holding every archive of a series
pub fn series_directory(output_root: &Path, series_title: &str) -> PathBuf {
    output_root.join(sanitize_component(series_title))
}

/// Appends `.{extension}` to a path without replacing anything after an existing dot
pub fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

/// `{chapter_directory}.{extension}`
pub fn archive_path(chapter_dir: &Path, extension: &str) -> PathBuf {
    with_appended_extension(chapter_dir, extension)
}

/// `{chapter_directory}.jpg`
pub fn volume_cover_path(chapter_dir: &Path) -> PathBuf {
    with_appended_extension(chapter_dir, IMAGE_EXTENSION)
}

/// Zero-padded page filename: `001.jpg`, `002.jpg`, ...
pub fn page_filename(page: usize) -> String {
    format!("{:03}.{}", page, IMAGE_EXTENSION)
}
