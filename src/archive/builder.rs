//! Archive builder
//!
//! Writes the metadata descriptor into a fully staged chapter directory and packages the
//! directory into a single zip archive next to it. On failure the staging directory is
//! purged before the error is returned.

use crate::archive::comic_info::{ComicInfo, COMIC_INFO_FILENAME};
use crate::archive::staging::remove_if_present;
use crate::ArchiverError;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes the descriptor and packages `staging_dir` into `archive_path`
///
/// # Errors
///
/// * `MetadataWrite` - the descriptor could not be serialized or written
/// * `ArchiveWrite` - the archive could not be created
///
/// In both cases `staging_dir` no longer exists when this returns.
pub fn build_archive(
    staging_dir: &Path,
    archive_path: &Path,
    descriptor: &ComicInfo,
) -> Result<PathBuf, ArchiverError> {
    let result = write_comic_info(staging_dir, descriptor)
        .and_then(|_| create_archive(staging_dir, archive_path));

    if result.is_err() {
        if let Err(e) = remove_if_present(staging_dir) {
            tracing::warn!(
                "Failed to purge staging directory {}: {}",
                staging_dir.display(),
                e
            );
        }
    }

    result
}

/// Writes `ComicInfo.xml` into the staging directory
pub fn write_comic_info(
    staging_dir: &Path,
    descriptor: &ComicInfo,
) -> Result<PathBuf, ArchiverError> {
    let path = staging_dir.join(COMIC_INFO_FILENAME);

    let xml = descriptor
        .to_xml()
        .map_err(|e| ArchiverError::MetadataWrite {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    fs::write(&path, xml).map_err(|e| ArchiverError::MetadataWrite {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Packages every regular file of `source_dir` into a zip archive at `archive_path`
///
/// Entries are added in filename order at the archive root. Images are stored as-is (they
/// are already compressed); everything else is deflated. The archive is assembled in a
/// temporary sibling file and renamed into place once complete.
pub fn create_archive(source_dir: &Path, archive_path: &Path) -> Result<PathBuf, ArchiverError> {
    let archive_error = |source: ZipError| ArchiverError::ArchiveWrite {
        path: archive_path.to_path_buf(),
        source,
    };

    let parent = archive_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| archive_error(e.into()))?;

    let entries = staged_files(source_dir).map_err(|e| archive_error(e.into()))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| archive_error(e.into()))?;
    {
        let mut zip = ZipWriter::new(temp.as_file_mut());

        let stored = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (name, path) in &entries {
            let options = if is_image(name) { stored } else { deflated };

            zip.start_file(name.as_str(), options)
                .map_err(archive_error)?;
            let mut file = File::open(path).map_err(|e| archive_error(e.into()))?;
            io::copy(&mut file, &mut zip).map_err(|e| archive_error(e.into()))?;
        }

        zip.finish().map_err(archive_error)?;
    }

    temp.as_file_mut()
        .flush()
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| archive_error(e.into()))?;
    temp.persist(archive_path)
        .map_err(|e| archive_error(e.error.into()))?;

    tracing::info!(
        "Created {} ({} entries)",
        archive_path.display(),
        entries.len()
    );
    Ok(archive_path.to_path_buf())
}

/// Regular files of a directory as `(name, path)`, sorted by name
fn staged_files(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, entry.path()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn is_image(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".jpg", ".jpeg", ".png", ".webp", ".gif"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}
