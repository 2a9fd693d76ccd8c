//! Page processing pipeline.
//!
//! For every page: optional full-page OCR, layout detection, grid extraction for each
//! table region, per-cell OCR and row assembly.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use image::{DynamicImage, GrayImage, Luma};
//! use tablegrid::core::config::ExtractionConfig;
//! use tablegrid::core::pipeline::TablePipeline;
//! use tablegrid::layout::WholePageTable;
//!
//! # fn main() -> tablegrid::Result<()> {
//! let pipeline = TablePipeline::new(ExtractionConfig::default(), Arc::new(WholePageTable), None)?;
//! let page = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 60, Luma([255])));
//! let result = pipeline.process_page(&page)?;
//! assert!(result.tables[0].grid.is_empty());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;

use crate::core::config::ExtractionConfig;
use crate::core::io::{load_image_bytes, load_image_file};
use crate::grid::extract_cells;
use crate::layout::{LayoutDetector, filter_blocks, table_regions};
use crate::ocr::{OcrBackend, RecognitionMode, normalize_page_text, recognize_cells};
use crate::table::{assemble_rows, build_table};
use crate::types::{PageResult, TableResult};
use crate::{Result, TableGridError};

/// Runs layout detection, grid extraction and OCR over pages.
///
/// The pipeline holds no per-page state and can be shared across threads.
#[derive(Clone)]
pub struct TablePipeline {
    config: ExtractionConfig,
    detector: Arc<dyn LayoutDetector>,
    ocr: Option<Arc<dyn OcrBackend>>,
}

impl std::fmt::Debug for TablePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TablePipeline")
            .field("config", &self.config)
            .field("detector", &self.detector.name())
            .field("ocr", &self.ocr.as_ref().map(|o| o.name().to_string()))
            .finish()
    }
}

impl TablePipeline {
    /// Build a pipeline after validating `config`.
    ///
    /// OCR runs only when a backend is supplied and `config.ocr.enabled` is set.
    pub fn new(
        config: ExtractionConfig,
        detector: Arc<dyn LayoutDetector>,
        ocr: Option<Arc<dyn OcrBackend>>,
    ) -> Result<Self> {
        config.validate()?;
        let ocr = ocr.filter(|_| config.ocr.enabled);
        Ok(Self { config, detector, ocr })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Process one page image.
    pub fn process_page(&self, page: &DynamicImage) -> Result<PageResult> {
        let text = match &self.ocr {
            Some(backend) => normalize_page_text(&backend.recognize(page, RecognitionMode::Page)?),
            None => String::new(),
        };

        let detected = self.detector.detect(page)?;
        let detected_count = detected.len();
        let blocks = filter_blocks(detected, self.config.layout.min_score);
        let regions = table_regions(&blocks, self.config.layout.min_score);

        tracing::debug!(
            "Detector '{}' found {} blocks ({} kept, {} table regions)",
            self.detector.name(),
            detected_count,
            blocks.len(),
            regions.len()
        );

        let mut tables = Vec::with_capacity(regions.len());
        for region in regions {
            let region = region.clamp_to(page.width(), page.height());
            if let Some(limit) = self.config.max_region_pixels
                && region.area() > limit
            {
                tracing::warn!(
                    "Skipping table region {}: {} pixels exceeds max_region_pixels={}",
                    region,
                    region.area(),
                    limit
                );
                continue;
            }

            let grid = extract_cells(page, region, &self.config.grid);
            let table = match &self.ocr {
                Some(backend) if !grid.is_empty() => {
                    let texts = recognize_cells(page, &grid, backend.as_ref())?;
                    Some(build_table(assemble_rows(texts, grid.columns)))
                }
                _ => None,
            };

            tracing::info!(
                "Table region {}: {} rows x {} columns",
                grid.region,
                grid.rows,
                grid.columns
            );
            tables.push(TableResult { grid, table });
        }

        Ok(PageResult {
            text,
            blocks,
            tables,
            error: None,
        })
    }

    /// Decode and process a page image from memory.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<PageResult> {
        let page = load_image_bytes(bytes)?;
        self.process_page(&page)
    }

    /// Read, decode and process a page image from disk.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<PageResult> {
        let page = load_image_file(path.as_ref())?;
        self.process_page(&page)
    }

    /// Process many pages concurrently.
    ///
    /// At most `max_concurrent_extractions` pages (default `num_cpus * 2`) are in
    /// flight; each runs on the blocking thread pool. Results keep input order.
    ///
    /// # Errors
    ///
    /// `TableGridError::Io` from any page aborts the batch. Other per-page errors are
    /// reported in that page's [`PageResult::error`].
    #[cfg(feature = "tokio-runtime")]
    pub async fn batch_process(&self, pages: Vec<DynamicImage>) -> Result<Vec<PageResult>> {
        use tokio::sync::Semaphore;
        use tokio::task::JoinSet;

        if pages.is_empty() {
            return Ok(vec![]);
        }

        let max_concurrent = self
            .config
            .max_concurrent_extractions
            .unwrap_or_else(|| num_cpus::get() * 2);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut tasks = JoinSet::new();

        for (index, page) in pages.into_iter().enumerate() {
            let pipeline = self.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| TableGridError::Other(format!("Batch semaphore closed: {}", e)))?;
                let result = tokio::task::spawn_blocking(move || pipeline.process_page(&page))
                    .await
                    .map_err(|e| TableGridError::Other(format!("Page task failed: {}", e)))?;
                Ok::<_, TableGridError>((index, result))
            });
        }

        let mut results: Vec<Option<PageResult>> = vec![None; tasks.len()];

        while let Some(task_result) = tasks.join_next().await {
            let (index, result) = task_result.map_err(|e| TableGridError::Other(format!("Task panicked: {}", e)))??;
            match result {
                Ok(page_result) => results[index] = Some(page_result),
                // System errors must bubble up
                Err(e @ TableGridError::Io(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!("Page {} failed: {}", index, e);
                    results[index] = Some(PageResult::failed(&e));
                }
            }
        }

        tracing::info!("Batch processed {} pages", results.len());

        Ok(results.into_iter().map(Option::unwrap_or_default).collect())
    }
}
