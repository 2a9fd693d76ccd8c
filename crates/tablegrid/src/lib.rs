//! tablegrid - table cell segmentation for scanned documents
//!
//! Given a page image and a table region (usually reported by a layout detector),
//! tablegrid finds the ruling lines of the table with image morphology, derives a
//! row/column grid from their intersections and returns the cells in row-major order.
//! Around that core it offers a small pipeline that OCRs each cell, assembles rows and
//! exports Markdown or CSV.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tablegrid::{GridConfig, extract_cells, load_image_file};
//! use tablegrid::types::BoundingBox;
//!
//! # fn main() -> tablegrid::Result<()> {
//! let page = load_image_file("invoice.png")?;
//! let grid = extract_cells(&page, BoundingBox::new(40, 300, 1200, 900), &GridConfig::default());
//! println!("{} rows x {} columns", grid.rows, grid.columns);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Grid** (`grid`): binarization, line morphology, intersection clustering
//! - **Core** (`core`): configuration, page loading, the page pipeline
//! - **Layout** (`layout`): layout detector seam and table block filtering
//! - **OCR** (`ocr`): OCR backend seam and the Tesseract command-line backend
//! - **Table** (`table`): row assembly, Markdown and CSV export
//! - **Visualization** (`visualization`): region/cell overlays

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod grid;
pub mod layout;
pub mod ocr;
pub mod table;
pub mod types;
pub mod visualization;

pub use error::{Result, TableGridError};
pub use types::*;

pub use core::config::{ExtractionConfig, GridConfig, LayoutConfig, OcrConfig};
pub use core::io::{load_image_bytes, load_image_file};
pub use core::pipeline::TablePipeline;
pub use grid::{cluster_coordinates, extract_cells};
pub use layout::{FixedLayout, LayoutDetector, WholePageTable};
pub use ocr::{OcrBackend, RecognitionMode, TesseractCliBackend};
pub use table::{rows_to_csv, table_to_markdown, text_to_csv};
pub use visualization::render_overlay;
