//! OCR seam.
//!
//! Text recognition is delegated to an [`OcrBackend`]. The crate ships
//! [`TesseractCliBackend`], which drives the `tesseract` executable; any other engine
//! can be plugged in by implementing the trait.

pub mod tesseract;

pub use tesseract::TesseractCliBackend;

use image::DynamicImage;

use crate::Result;
use crate::types::TableGrid;

/// What a recognition call is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMode {
    /// A whole page with arbitrary layout
    Page,
    /// A single table cell, usually one short block of text
    Cell,
}

/// Trait for OCR backends.
///
/// # Thread Safety
///
/// Backends must be `Send + Sync`; batch mode shares one backend across pages.
pub trait OcrBackend: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// Recognize text in `image`, lines separated by `\n`.
    ///
    /// # Errors
    ///
    /// - `TableGridError::Ocr` - recognition failed
    /// - `TableGridError::MissingDependency` - the engine is not installed
    /// - `TableGridError::Io` - I/O errors (these always bubble up)
    fn recognize(&self, image: &DynamicImage, mode: RecognitionMode) -> Result<String>;
}

/// OCR every cell of `grid`, in row-major order.
///
/// Recognized lines inside a cell are trimmed and concatenated without a
/// separator. A cell with no recognizable text yields an empty string.
pub fn recognize_cells(page: &DynamicImage, grid: &TableGrid, backend: &dyn OcrBackend) -> Result<Vec<String>> {
    let mut texts = Vec::with_capacity(grid.cells.len());

    for cell in &grid.cells {
        let bbox = cell.bbox.clamp_to(page.width(), page.height());
        if bbox.is_empty() {
            texts.push(String::new());
            continue;
        }

        let crop = page.crop_imm(bbox.x1, bbox.y1, bbox.width(), bbox.height());
        let raw = backend.recognize(&crop, RecognitionMode::Cell)?;
        texts.push(join_cell_lines(&raw));
    }

    tracing::debug!(
        "Recognized {} cells with backend '{}' ({} non-empty)",
        texts.len(),
        backend.name(),
        texts.iter().filter(|t| !t.is_empty()).count()
    );

    Ok(texts)
}

fn join_cell_lines(raw: &str) -> String {
    raw.lines().map(str::trim).collect()
}

/// Normalize full-page OCR output: trimmed lines, blank lines dropped.
pub fn normalize_page_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
