//! Core pipeline: configuration, page loading and page processing.

pub mod config;
pub mod io;
pub mod pipeline;

pub use config::{ExtractionConfig, GridConfig, LayoutConfig, OcrConfig};
pub use io::{load_image_bytes, load_image_file};
pub use pipeline::TablePipeline;
