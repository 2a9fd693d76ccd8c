//! Error types for tablegrid.
//!
//! Grid extraction itself never fails: a region without a usable grid produces an
//! empty [`TableGrid`](crate::types::TableGrid). Everything around it (loading pages,
//! configuration, OCR and layout collaborators, export) reports failures through
//! [`TableGridError`].
//!
//! **System errors always bubble up unchanged:** `TableGridError::Io` wraps
//! `std::io::Error` and is never rewrapped or swallowed, including in batch mode.
//!
//! # Example
//!
//! ```rust
//! use tablegrid::{TableGridError, Result};
//!
//! fn read_region_list(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!
//!     if content.is_empty() {
//!         return Err(TableGridError::validation(format!("Region list is empty: {}", path)));
//!     }
//!
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `TableGridError`.
pub type Result<T> = std::result::Result<T, TableGridError>;

/// Main error type for all tablegrid operations.
///
/// # Variants
///
/// - `Io` - File system and I/O errors (always bubble up)
/// - `Validation` - Invalid configuration, regions or parameters
/// - `ImageProcessing` - Image decoding, encoding or drawing failures
/// - `Ocr` - Failures reported by an OCR backend
/// - `Layout` - Failures reported by a layout detector
/// - `Serialization` - JSON/CSV serialization errors
/// - `MissingDependency` - Missing external executables (tesseract, etc.)
/// - `UnsupportedFormat` - Input the pipeline cannot rasterise (e.g. PDF)
/// - `Other` - Catch-all for uncommon errors
#[derive(Debug, Error)]
pub enum TableGridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Layout detection error: {message}")]
    Layout {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TableGridError {
    fn from(err: serde_json::Error) -> Self {
        TableGridError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<csv::Error> for TableGridError {
    fn from(err: csv::Error) -> Self {
        TableGridError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for TableGridError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => TableGridError::Io(io),
            other => TableGridError::ImageProcessing {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl TableGridError {
    error_constructor!(validation, Validation);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(ocr, Ocr);
    error_constructor!(layout, Layout);
    error_constructor!(serialization, Serialization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TableGridError = io_err.into();
        assert!(matches!(err, TableGridError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_validation_error() {
        let err = TableGridError::validation("divisor must be positive");
        assert_eq!(err.to_string(), "Validation error: divisor must be positive");
    }

    #[test]
    fn test_validation_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidInput, "bad param");
        let err = TableGridError::validation_with_source("invalid input", source);
        assert_eq!(err.to_string(), "Validation error: invalid input");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_ocr_error_with_source() {
        let source = std::io::Error::other("tesseract exited with status 1");
        let err = TableGridError::ocr_with_source("cell recognition failed", source);
        assert_eq!(err.to_string(), "OCR error: cell recognition failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_layout_error() {
        let err = TableGridError::layout("model returned no blocks");
        assert_eq!(err.to_string(), "Layout detection error: model returned no blocks");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_image_processing_error() {
        let err = TableGridError::image_processing("crop out of bounds");
        assert_eq!(err.to_string(), "Image processing error: crop out of bounds");
    }

    #[test]
    fn test_missing_dependency_error() {
        let err = TableGridError::MissingDependency("tesseract not found".to_string());
        assert_eq!(err.to_string(), "Missing dependency: tesseract not found");
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = TableGridError::UnsupportedFormat("application/pdf".to_string());
        assert_eq!(err.to_string(), "Unsupported format: application/pdf");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TableGridError = json_err.into();
        assert!(matches!(err, TableGridError::Serialization { .. }));
    }

    #[test]
    fn test_image_decode_error_is_image_processing() {
        let decode_err = image::load_from_memory(b"definitely not an image").unwrap_err();
        let err: TableGridError = decode_err.into();
        assert!(matches!(err, TableGridError::ImageProcessing { .. }));
    }

    #[test]
    fn test_image_io_error_bubbles_as_io() {
        let img_err = image::ImageError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err: TableGridError = img_err.into();
        assert!(matches!(err, TableGridError::Io(_)));
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read_file() -> Result<String> {
            let content = std::fs::read_to_string("/nonexistent/tablegrid/file.txt")?;
            Ok(content)
        }

        let result = read_file();
        assert!(matches!(result.unwrap_err(), TableGridError::Io(_)));
    }
}
