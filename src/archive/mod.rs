//! Archive module
//!
//! Everything between "all pages are staged" and "one archive file exists":
//! - `naming`: sanitized output paths for chapters, archives and covers
//! - `staging`: the per-chapter staging directory guard
//! - `comic_info`: the `ComicInfo.xml` descriptor
//! - `builder`: descriptor writing and zip packaging with cleanup on failure

mod builder;
mod comic_info;
mod naming;
mod staging;

pub use builder::{build_archive, create_archive, write_comic_info};
pub use comic_info::{ComicInfo, COMIC_INFO_FILENAME};
pub use naming::{
    archive_path, chapter_directory, chapter_directory_name, padded_chapter_number, page_filename,
    sanitize_component, series_directory, volume_cover_path, with_appended_extension,
    IMAGE_EXTENSION,
};
pub use staging::{remove_if_present, StagingDir};
