//! Page download with bounded retries
//!
//! Each page gets a fixed number of attempts. An attempt fetches the image, then decodes,
//! normalizes and stages it; a failure at any of those steps consumes the attempt.

use crate::archive::page_filename;
use crate::download::transform::stage_page_image;
use crate::gateway::Gateway;
use crate::metadata::PageSet;
use crate::ArchiverError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Total attempts per page before the chapter is abandoned
pub const MAX_PAGE_ATTEMPTS: u32 = 5;

/// Why a single attempt at a page failed
#[derive(Debug, Error)]
pub enum PageAttemptError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Downloads chapter pages into a staging directory
#[derive(Debug, Clone)]
pub struct PageDownloader {
    gateway: Gateway,
    retry_delay: Duration,
}

impl PageDownloader {
    pub fn new(gateway: Gateway, retry_delay: Duration) -> Self {
        Self {
            gateway,
            retry_delay,
        }
    }

    /// Downloads every page of `pages` into `staging_dir`, in order
    ///
    /// Stops at the first page that exhausts its attempts; pages already staged are left for
    /// the caller's staging cleanup.
    pub async fn download_chapter(
        &self,
        pages: &PageSet,
        staging_dir: &Path,
        label: &str,
    ) -> Result<Vec<PathBuf>, ArchiverError> {
        let total = pages.len();
        let mut staged = Vec::with_capacity(total);

        for (index, url) in pages.pages() {
            tracing::info!("Downloading page {} of {} for \"{}\"", index, total, label);
            let path = staging_dir.join(page_filename(index));
            self.download_page(index, url, &path).await?;
            staged.push(path);
        }

        Ok(staged)
    }

    /// Downloads and stages a single page, retrying up to `MAX_PAGE_ATTEMPTS` times
    pub async fn download_page(
        &self,
        index: usize,
        url: &str,
        path: &Path,
    ) -> Result<(), ArchiverError> {
        let mut attempt = 0;
        let mut last_error: Option<PageAttemptError> = None;

        while attempt < MAX_PAGE_ATTEMPTS {
            attempt += 1;

            if let Some(error) = &last_error {
                tracing::warn!(
                    "Download of page {} from {} failed ({}), retrying (attempt {}/{})",
                    index,
                    url,
                    error,
                    attempt,
                    MAX_PAGE_ATTEMPTS
                );
                if !self.retry_delay.is_zero() {
                    tokio::time::sleep(self.retry_delay).await;
                }
            }

            match self.attempt_page(url, path).await {
                Ok((width, height)) => {
                    tracing::debug!(
                        "Staged page {} at {} ({}x{}, attempt {})",
                        index,
                        path.display(),
                        width,
                        height,
                        attempt
                    );
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(ArchiverError::ImageAcquisition {
            page: index,
            url: url.to_string(),
            attempts: attempt,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }

    async fn attempt_page(&self, url: &str, path: &Path) -> Result<(u32, u32), PageAttemptError> {
        let bytes = self.gateway.get_bytes(url).await?;
        let path = path.to_path_buf();

        let dims = tokio::task::spawn_blocking(move || stage_page_image(&bytes, &path)).await??;
        Ok(dims)
    }
}
