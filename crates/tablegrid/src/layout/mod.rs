//! Layout detection seam.
//!
//! Page layout analysis (finding text, title, list, table and figure blocks) is done
//! by an external model. This module defines the [`LayoutDetector`] trait such a
//! model plugs into, two simple detectors for callers that already know where their
//! tables are, and the block filter that turns detections into table regions.

use image::DynamicImage;

use crate::Result;
use crate::types::{BlockKind, BoundingBox, LayoutBlock, TableRegion};

/// Trait for layout detection backends.
///
/// # Thread Safety
///
/// Detectors must be `Send + Sync`; batch mode shares one detector across pages.
///
/// # Example
///
/// ```rust
/// use image::DynamicImage;
/// use tablegrid::layout::LayoutDetector;
/// use tablegrid::types::{BlockKind, BoundingBox, LayoutBlock};
///
/// struct TopHalfIsTable;
///
/// impl LayoutDetector for TopHalfIsTable {
///     fn name(&self) -> &str {
///         "top-half"
///     }
///
///     fn detect(&self, page: &DynamicImage) -> tablegrid::Result<Vec<LayoutBlock>> {
///         Ok(vec![LayoutBlock {
///             kind: BlockKind::Table,
///             bbox: BoundingBox::new(0, 0, page.width(), page.height() / 2),
///             score: 1.0,
///         }])
///     }
/// }
/// ```
pub trait LayoutDetector: Send + Sync {
    /// Detector name, used in logs.
    fn name(&self) -> &str;

    /// Detect layout blocks on a page.
    ///
    /// # Errors
    ///
    /// - `TableGridError::Layout` - the detector failed
    /// - `TableGridError::Io` - I/O errors (these always bubble up)
    fn detect(&self, page: &DynamicImage) -> Result<Vec<LayoutBlock>>;
}

/// Detector that returns a fixed list of blocks for every page.
#[derive(Debug, Clone, Default)]
pub struct FixedLayout {
    blocks: Vec<LayoutBlock>,
}

impl FixedLayout {
    pub fn new(blocks: Vec<LayoutBlock>) -> Self {
        Self { blocks }
    }

    /// One full-confidence table block per region.
    pub fn from_table_regions(regions: impl IntoIterator<Item = TableRegion>) -> Self {
        Self {
            blocks: regions
                .into_iter()
                .map(|bbox| LayoutBlock {
                    kind: BlockKind::Table,
                    bbox,
                    score: 1.0,
                })
                .collect(),
        }
    }
}

impl LayoutDetector for FixedLayout {
    fn name(&self) -> &str {
        "fixed"
    }

    fn detect(&self, _page: &DynamicImage) -> Result<Vec<LayoutBlock>> {
        Ok(self.blocks.clone())
    }
}

/// Detector that treats the whole page as a single table.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholePageTable;

impl LayoutDetector for WholePageTable {
    fn name(&self) -> &str {
        "whole-page"
    }

    fn detect(&self, page: &DynamicImage) -> Result<Vec<LayoutBlock>> {
        Ok(vec![LayoutBlock {
            kind: BlockKind::Table,
            bbox: BoundingBox::new(0, 0, page.width(), page.height()),
            score: 1.0,
        }])
    }
}

/// Drop blocks scoring below `min_score`, keeping detection order.
pub fn filter_blocks(blocks: Vec<LayoutBlock>, min_score: f32) -> Vec<LayoutBlock> {
    blocks.into_iter().filter(|b| b.score >= min_score).collect()
}

/// Regions of table blocks scoring at least `min_score`, in detection order.
pub fn table_regions(blocks: &[LayoutBlock], min_score: f32) -> Vec<TableRegion> {
    blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Table && b.score >= min_score)
        .map(|b| b.bbox)
        .collect()
}
