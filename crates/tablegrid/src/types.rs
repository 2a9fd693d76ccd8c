use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TableGridError;

/// Axis-aligned pixel rectangle in page coordinates.
///
/// `x2` and `y2` are exclusive, so a box covering a whole `w x h` page is
/// `(0, 0, w, h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

/// A rectangular sub-area of a page flagged as containing tabular content.
pub type TableRegion = BoundingBox;

impl BoundingBox {
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a box from floating point detector output, truncating towards zero.
    ///
    /// Negative coordinates saturate to 0.
    pub fn from_f32_bounds(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.max(0.0) as u32,
            y1: y1.max(0.0) as u32,
            x2: x2.max(0.0) as u32,
            y2: y2.max(0.0) as u32,
        }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Clamp the box to a `width x height` page.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x2 = self.x2.min(width);
        let y2 = self.y2.min(height);
        Self {
            x1: self.x1.min(x2),
            y1: self.y1.min(y2),
            x2,
            y2,
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

impl FromStr for BoundingBox {
    type Err = TableGridError;

    /// Parse `x1,y1,x2,y2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(TableGridError::validation(format!(
                "Expected region as x1,y1,x2,y2, got '{}'",
                s
            )));
        }

        let mut coords = [0u32; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|e| TableGridError::validation_with_source(format!("Invalid coordinate '{}'", part), e))?;
        }

        let bbox = BoundingBox::new(coords[0], coords[1], coords[2], coords[3]);
        if bbox.is_empty() {
            return Err(TableGridError::validation(format!("Region {} has no area", bbox)));
        }
        Ok(bbox)
    }
}

/// One table cell, positioned in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based row index
    pub row: usize,
    /// Zero-based column index
    pub column: usize,
    pub bbox: BoundingBox,
}

/// Result of grid extraction for one table region.
///
/// An empty `cells` vector means no usable grid was found, which is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrid {
    /// The region as it was actually cropped (clamped to the page)
    pub region: TableRegion,
    /// Clustered horizontal line positions, page coordinates, ascending
    pub row_boundaries: Vec<u32>,
    /// Clustered vertical line positions, page coordinates, ascending
    pub column_boundaries: Vec<u32>,
    /// Cells in row-major order
    pub cells: Vec<Cell>,
    pub rows: usize,
    pub columns: usize,
}

impl TableGrid {
    pub fn empty(region: TableRegion) -> Self {
        Self {
            region,
            row_boundaries: Vec::new(),
            column_boundaries: Vec::new(),
            cells: Vec::new(),
            rows: 0,
            columns: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + column)
    }
}

/// Layout block categories, matching the PubLayNet label map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Title,
    List,
    Table,
    Figure,
}

impl BlockKind {
    pub fn from_label_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(BlockKind::Text),
            1 => Some(BlockKind::Title),
            2 => Some(BlockKind::List),
            3 => Some(BlockKind::Table),
            4 => Some(BlockKind::Figure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Title => "title",
            BlockKind::List => "list",
            BlockKind::Table => "table",
            BlockKind::Figure => "figure",
        }
    }
}

impl FromStr for BlockKind {
    type Err = TableGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(BlockKind::Text),
            "title" => Ok(BlockKind::Title),
            "list" => Ok(BlockKind::List),
            "table" => Ok(BlockKind::Table),
            "figure" => Ok(BlockKind::Figure),
            other => Err(TableGridError::validation(format!("Unknown layout label '{}'", other))),
        }
    }
}

/// A block reported by a layout detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub kind: BlockKind,
    pub bbox: BoundingBox,
    /// Detector confidence in `[0, 1]`
    pub score: f32,
}

/// Extracted table contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table cells as a 2D vector (rows × columns)
    pub cells: Vec<Vec<String>>,
    /// Markdown representation of the table
    pub markdown: String,
}

/// Outcome for one table region on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableResult {
    pub grid: TableGrid,
    /// Cell texts; `None` when OCR is disabled or the grid is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
}

/// Error details attached to a page that failed in batch mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMetadata {
    pub error_type: String,
    pub message: String,
}

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Full-page OCR text (empty when OCR is disabled)
    pub text: String,
    /// Layout blocks that passed the score filter
    pub blocks: Vec<LayoutBlock>,
    pub tables: Vec<TableResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorMetadata>,
}

impl PageResult {
    pub(crate) fn failed(err: &TableGridError) -> Self {
        Self {
            error: Some(ErrorMetadata {
                error_type: format!("{:?}", err),
                message: err.to_string(),
            }),
            ..Default::default()
        }
    }
}
