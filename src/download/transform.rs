//! Page image normalization
//!
//! Decoded pages are converted to 8-bit RGB, downscaled to a fixed maximum height when they
//! exceed it (never upscaled) and written as quality-90 JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageResult, RgbImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pages taller than this are downscaled to exactly this height
pub const MAX_PAGE_HEIGHT: u32 = 2400;

/// JPEG quality of staged pages
pub const JPEG_QUALITY: u8 = 90;

/// Decodes raw bytes and applies color and size normalization
pub fn normalize_page(bytes: &[u8]) -> ImageResult<RgbImage> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(downscale_to_height(decoded.to_rgb8(), MAX_PAGE_HEIGHT))
}

/// Scales an image down to `max_height`, keeping the aspect ratio
///
/// The new width is `floor(width * max_height / height)`, never less than one pixel.
pub fn downscale_to_height(image: RgbImage, max_height: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if height <= max_height {
        return image;
    }

    let new_width = ((u64::from(width) * u64::from(max_height)) / u64::from(height)).max(1) as u32;
    tracing::debug!(
        "Downscaling page from {}x{} to {}x{}",
        width,
        height,
        new_width,
        max_height
    );

    image::imageops::resize(&image, new_width, max_height, FilterType::CatmullRom)
}

/// Writes an RGB image as JPEG, creating parent directories as needed
pub fn save_jpeg(image: &RgbImage, path: &Path) -> ImageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(image)?;
    writer.flush()?;
    Ok(())
}

/// Decodes, normalizes and stages one page; returns the staged dimensions
pub fn stage_page_image(bytes: &[u8], path: &Path) -> ImageResult<(u32, u32)> {
    let page = normalize_page(bytes)?;
    save_jpeg(&page, path)?;
    Ok(page.dimensions())
}
