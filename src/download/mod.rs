//! Page downloader
//!
//! Fetches each page image of a chapter with bounded retries, normalizes it and stages it as
//! a numbered JPEG inside the chapter's staging directory.

mod page;
mod transform;

pub use page::{PageAttemptError, PageDownloader, MAX_PAGE_ATTEMPTS};
pub use transform::{
    downscale_to_height, normalize_page, save_jpeg, stage_page_image, JPEG_QUALITY,
    MAX_PAGE_HEIGHT,
};
