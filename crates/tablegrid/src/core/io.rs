//! Page image loading.

use std::path::Path;

use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use crate::{Result, TableGridError};

const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Decode a page image from memory.
///
/// # Errors
///
/// - `TableGridError::UnsupportedFormat` - PDF input, or bytes in no known image format
/// - `TableGridError::ImageProcessing` - the image could not be decoded
pub fn load_image_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.starts_with(PDF_SIGNATURE) {
        return Err(TableGridError::UnsupportedFormat(
            "application/pdf (rasterize PDF pages to images before extraction)".to_string(),
        ));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TableGridError::image_processing_with_source("Failed to read image format", e))?;

    if reader.format().is_none() {
        return Err(TableGridError::UnsupportedFormat(
            "Could not determine image format".to_string(),
        ));
    }

    let image = reader
        .decode()
        .map_err(|e| TableGridError::image_processing_with_source("Failed to decode image", e))?;

    tracing::debug!("Decoded {}x{} page image", image.width(), image.height());
    Ok(image)
}

/// Read and decode a page image from disk.
///
/// I/O errors bubble up unchanged as `TableGridError::Io`.
pub fn load_image_file(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let bytes = std::fs::read(path.as_ref())?;
    load_image_bytes(&bytes)
}
