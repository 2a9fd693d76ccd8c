//! Pipeline integration tests.
//!
//! Exercises `TablePipeline` end to end with in-process layout detectors and OCR
//! backends: file and byte input, multi-region pages, exports, overlays and batch
//! error handling.

use std::sync::Arc;

use image::DynamicImage;
use tablegrid::core::config::ExtractionConfig;
use tablegrid::core::pipeline::TablePipeline;
use tablegrid::layout::{FixedLayout, LayoutDetector, WholePageTable};
use tablegrid::ocr::{OcrBackend, RecognitionMode};
use tablegrid::table::rows_to_csv;
use tablegrid::types::{BoundingBox, LayoutBlock};
use tablegrid::visualization::render_overlay;
use tablegrid::{Result, TableGridError};

mod helpers;
use helpers::{RuledPage, blank_page, encode_png};

/// Reports the size of every crop it is asked to read.
struct SizeOcr;

impl OcrBackend for SizeOcr {
    fn name(&self) -> &str {
        "size"
    }

    fn recognize(&self, image: &DynamicImage, mode: RecognitionMode) -> Result<String> {
        match mode {
            RecognitionMode::Page => Ok("Invoice\n\n  Totals  \n".to_string()),
            RecognitionMode::Cell => Ok(format!("{}x\n{}", image.width(), image.height())),
        }
    }
}

/// Fails on pages of a given width.
struct FlakyDetector {
    fail_width: u32,
    io: bool,
}

impl LayoutDetector for FlakyDetector {
    fn name(&self) -> &str {
        "flaky"
    }

    fn detect(&self, page: &DynamicImage) -> Result<Vec<LayoutBlock>> {
        if page.width() == self.fail_width {
            if self.io {
                return Err(TableGridError::Io(std::io::Error::other("model file vanished")));
            }
            return Err(TableGridError::layout("model crashed"));
        }
        WholePageTable.detect(page)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("tablegrid=debug"))
        .with_test_writer()
        .try_init();
}

fn two_by_two_page() -> DynamicImage {
    RuledPage::new(201, 101).table(&[0, 100, 200], &[0, 50, 100], 1).build()
}

fn no_ocr_config() -> ExtractionConfig {
    let mut config = ExtractionConfig::default();
    config.ocr.enabled = false;
    config
}

#[test]
fn test_process_file_without_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.png");
    std::fs::write(&path, encode_png(&two_by_two_page())).unwrap();

    let pipeline = TablePipeline::new(no_ocr_config(), Arc::new(WholePageTable), None).unwrap();
    let result = pipeline.process_file(&path).unwrap();

    assert!(result.text.is_empty());
    assert!(result.error.is_none());
    assert_eq!(result.tables.len(), 1);
    assert_eq!(result.tables[0].grid.cells.len(), 4);
    assert!(result.tables[0].table.is_none());
}

#[test]
fn test_process_bytes_with_ocr_builds_rows() {
    let pipeline = TablePipeline::new(
        ExtractionConfig::default(),
        Arc::new(WholePageTable),
        Some(Arc::new(SizeOcr)),
    )
    .unwrap();

    let result = pipeline.process_bytes(&encode_png(&two_by_two_page())).unwrap();

    assert_eq!(result.text, "Invoice\nTotals");
    let table = result.tables[0].table.as_ref().unwrap();
    // Cell crops are 100x50; recognized lines are joined without a separator.
    assert_eq!(table.cells, vec![vec!["100x50", "100x50"], vec!["100x50", "100x50"]]);
    assert_eq!(
        table.markdown,
        "| 100x50 | 100x50 |\n| --- | --- |\n| 100x50 | 100x50 |\n"
    );
    assert_eq!(rows_to_csv(&table.cells).unwrap(), "100x50,100x50\n100x50,100x50\n");
}

#[test]
fn test_pdf_bytes_are_rejected() {
    let pipeline = TablePipeline::new(no_ocr_config(), Arc::new(WholePageTable), None).unwrap();
    let err = pipeline.process_bytes(b"%PDF-1.4\n1 0 obj\n").unwrap_err();
    assert!(matches!(err, TableGridError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_file_bubbles_io_error() {
    let pipeline = TablePipeline::new(no_ocr_config(), Arc::new(WholePageTable), None).unwrap();
    let err = pipeline.process_file("/nonexistent/scan.png").unwrap_err();
    assert!(matches!(err, TableGridError::Io(_)));
}

#[test]
fn test_every_table_region_is_processed() {
    init_tracing();
    let page = RuledPage::new(400, 300)
        .table(&[10, 90, 170], &[10, 60, 110], 1)
        .table(&[200, 300, 390], &[150, 220, 290], 1)
        .build();
    let detector = FixedLayout::from_table_regions([
        BoundingBox::new(10, 10, 171, 111),
        BoundingBox::new(200, 150, 391, 291),
        BoundingBox::new(0, 120, 150, 140),
    ]);

    let pipeline = TablePipeline::new(no_ocr_config(), Arc::new(detector), None).unwrap();
    let result = pipeline.process_page(&page).unwrap();

    assert_eq!(result.tables.len(), 3);
    assert_eq!(result.tables[0].grid.cells.len(), 4);
    assert_eq!(result.tables[0].grid.cells[0].bbox, BoundingBox::new(10, 10, 90, 60));
    assert_eq!(result.tables[1].grid.cells.len(), 4);
    assert_eq!(result.tables[1].grid.cells[3].bbox, BoundingBox::new(300, 220, 390, 290));
    assert!(result.tables[2].grid.is_empty());

    let overlay = render_overlay(&page, &result.tables).unwrap();
    assert_eq!(overlay.dimensions(), (400, 300));
}

#[test]
fn test_detector_error_propagates_from_process_page() {
    let detector = FlakyDetector { fail_width: 201, io: false };
    let pipeline = TablePipeline::new(no_ocr_config(), Arc::new(detector), None).unwrap();

    let err = pipeline.process_page(&two_by_two_page()).unwrap_err();
    assert!(matches!(err, TableGridError::Layout { .. }));
}

#[tokio::test]
async fn test_batch_process_keeps_order_and_embeds_errors() {
    init_tracing();
    let detector = FlakyDetector { fail_width: 13, io: false };
    let config = ExtractionConfig {
        max_concurrent_extractions: Some(2),
        ..no_ocr_config()
    };
    let pipeline = TablePipeline::new(config, Arc::new(detector), None).unwrap();

    let pages = vec![two_by_two_page(), blank_page(13, 13), blank_page(40, 30), two_by_two_page()];
    let results = pipeline.batch_process(pages).await.unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].tables[0].grid.cells.len(), 4);

    let error = results[1].error.as_ref().expect("failed page carries error metadata");
    assert!(error.message.contains("model crashed"));
    assert!(error.error_type.starts_with("Layout"));
    assert!(results[1].tables.is_empty());

    assert!(results[2].error.is_none());
    assert!(results[2].tables[0].grid.is_empty());
    assert_eq!(results[3].tables[0].grid.cells.len(), 4);
}

#[tokio::test]
async fn test_batch_process_bubbles_io_errors() {
    let detector = FlakyDetector { fail_width: 13, io: true };
    let pipeline = TablePipeline::new(no_ocr_config(), Arc::new(detector), None).unwrap();

    let err = pipeline
        .batch_process(vec![two_by_two_page(), blank_page(13, 13)])
        .await
        .unwrap_err();
    assert!(matches!(err, TableGridError::Io(_)));
}

#[tokio::test]
async fn test_batch_process_empty_input() {
    let pipeline = TablePipeline::new(no_ocr_config(), Arc::new(WholePageTable), None).unwrap();
    assert!(pipeline.batch_process(Vec::new()).await.unwrap().is_empty());
}
