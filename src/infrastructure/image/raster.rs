//! Decoding, resizing and persisting normalized images.
//!
//! All CPU-bound work runs on the blocking pool.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;
use image::imageops::FilterType;
use tokio::fs;
use tracing::{debug, trace};

use crate::domain::entities::Dimensions;
use crate::domain::errors::{CoverError, CoverResult};

const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Decodes image bytes of any supported format.
///
/// # Errors
/// Returns `CoverError::Decode` if the bytes are not a supported image.
pub async fn decode(bytes: Bytes) -> CoverResult<DynamicImage> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| CoverError::decode(format!("Decode task panicked: {e}")))?
        .map_err(|e| CoverError::decode(format!("Failed to decode image: {e}")))
}

/// Decodes `bytes` and stretches the result onto an RGBA canvas of exactly
/// `dimensions`. Aspect ratio is not preserved.
///
/// # Errors
/// Returns `CoverError::Decode` if the bytes are not a supported image.
pub async fn normalize(bytes: Bytes, dimensions: Dimensions) -> CoverResult<DynamicImage> {
    tokio::task::spawn_blocking(move || -> CoverResult<DynamicImage> {
        let source = image::load_from_memory(&bytes)
            .map_err(|e| CoverError::decode(format!("Failed to decode image: {e}")))?;
        let canvas = image::imageops::resize(
            &source,
            dimensions.width,
            dimensions.height,
            RESIZE_FILTER,
        );
        Ok(DynamicImage::ImageRgba8(canvas))
    })
    .await
    .map_err(|e| CoverError::decode(format!("Resize task panicked: {e}")))?
}

/// Reads and decodes the file at `path`, or returns `None` if it does not
/// exist or its existence cannot be established.
///
/// # Errors
/// Returns `CoverError::Io` if the file exists but cannot be read, and
/// `CoverError::Decode` if its contents are not an image.
pub async fn read_existing(path: &Path) -> CoverResult<Option<DynamicImage>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        trace!(path = %path.display(), "No cached file");
        return Ok(None);
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| CoverError::io(format!("Failed to read {}: {e}", path.display())))?;
    trace!(path = %path.display(), size = bytes.len(), "Read cached file");

    decode(Bytes::from(bytes)).await.map(Some)
}

/// Encodes `img` as PNG and writes it to `path`.
///
/// Missing parent directories are created. The bytes go to a temporary file
/// beside `path` that is renamed into place, so `path` either holds a complete
/// image or does not exist.
///
/// # Errors
/// Returns `CoverError::Io` if encoding or any filesystem step fails.
pub async fn write_png(path: &Path, img: Arc<DynamicImage>) -> CoverResult<()> {
    let path: PathBuf = path.to_path_buf();
    let written = path.clone();

    let size = tokio::task::spawn_blocking(move || -> CoverResult<usize> {
        let mut encoded = Cursor::new(Vec::new());
        img.write_to(&mut encoded, image::ImageFormat::Png)
            .map_err(|e| CoverError::io(format!("Failed to encode PNG: {e}")))?;
        let encoded = encoded.into_inner();

        let parent = path
            .parent()
            .ok_or_else(|| CoverError::io(format!("No parent directory for {}", path.display())))?;
        std::fs::create_dir_all(parent)
            .map_err(|e| CoverError::io(format!("Failed to create cache dir: {e}")))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| CoverError::io(format!("Failed to create cache file: {e}")))?;
        temp_file
            .write_all(&encoded)
            .map_err(|e| CoverError::io(format!("Failed to write cache file: {e}")))?;
        temp_file
            .persist(&path)
            .map_err(|e| CoverError::io(format!("Failed to persist cache file: {}", e.error)))?;

        Ok(encoded.len())
    })
    .await
    .map_err(|e| CoverError::io(format!("Write task panicked: {e}")))??;

    debug!(path = %written.display(), size, "Stored normalized image");
    Ok(())
}
