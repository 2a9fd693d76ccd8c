//! Table grid extraction.
//!
//! Derives a row/column grid from a ruled table region:
//!
//! 1. crop the region and binarize it (Otsu, inverted so ink is foreground)
//! 2. keep horizontal and vertical ruling lines with directional erode/dilate
//! 3. intersect both line masks to find line crossings
//! 4. cluster crossing x and y coordinates into column and row boundaries
//! 5. emit one cell per adjacent boundary pair, row-major, in page coordinates
//!
//! Regions without at least two boundaries on each axis yield an empty
//! [`TableGrid`]; callers should read that as "no table structure found".
//!
//! # Example
//!
//! ```rust
//! use image::{DynamicImage, GrayImage, Luma};
//! use tablegrid::core::config::GridConfig;
//! use tablegrid::grid::extract_cells;
//! use tablegrid::types::BoundingBox;
//!
//! let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 80, Luma([255])));
//! let grid = extract_cells(&blank, BoundingBox::new(0, 0, 120, 80), &GridConfig::default());
//! assert!(grid.is_empty());
//! ```

pub mod cluster;
pub mod morphology;

pub use cluster::cluster_coordinates;
pub use morphology::Axis;

use std::collections::BTreeSet;

use image::DynamicImage;

use crate::core::config::GridConfig;
use crate::types::{BoundingBox, Cell, TableGrid, TableRegion};

/// Segment `region` of `page` into grid cells.
///
/// The region is clamped to the page first; the returned grid reports the
/// clamped region. Never fails: an empty grid signals that no usable ruling
/// was found.
pub fn extract_cells(page: &DynamicImage, region: TableRegion, config: &GridConfig) -> TableGrid {
    let region = region.clamp_to(page.width(), page.height());
    if region.is_empty() {
        tracing::debug!("Table region {} is empty after clamping to page", region);
        return TableGrid::empty(region);
    }

    let gray = page
        .crop_imm(region.x1, region.y1, region.width(), region.height())
        .to_luma8();

    let Some(binary) = morphology::binarize_inverted(&gray) else {
        tracing::debug!("Table region {} is uniform, no ruling lines", region);
        return TableGrid::empty(region);
    };

    let (width, height) = binary.dimensions();
    let horizontal_len = kernel_length(width, config.horizontal_kernel_divisor);
    let vertical_len = kernel_length(height, config.vertical_kernel_divisor);

    let horizontal = morphology::extract_lines(&binary, Axis::Horizontal, horizontal_len);
    let vertical = morphology::extract_lines(&binary, Axis::Vertical, vertical_len);
    let crossings = morphology::foreground_points(&morphology::intersect(&horizontal, &vertical));

    if crossings.is_empty() {
        tracing::debug!("No line intersections in table region {}", region);
        return TableGrid::empty(region);
    }

    let xs: Vec<u32> = crossings.iter().map(|&(x, _)| x).collect::<BTreeSet<_>>().into_iter().collect();
    let ys: Vec<u32> = crossings.iter().map(|&(_, y)| y).collect::<BTreeSet<_>>().into_iter().collect();

    let columns = cluster_coordinates(&xs, config.cluster_tolerance);
    let rows = cluster_coordinates(&ys, config.cluster_tolerance);

    tracing::debug!(
        "Table region {}: {} crossings, {} row boundaries, {} column boundaries (kernels {}x1, 1x{})",
        region,
        crossings.len(),
        rows.len(),
        columns.len(),
        horizontal_len,
        vertical_len
    );

    build_grid(region, &rows, &columns)
}

/// Structuring element length for a crop dimension, never below one pixel.
pub fn kernel_length(dimension: u32, divisor: u32) -> u32 {
    (dimension / divisor.max(1)).max(1)
}

/// Turn crop-local boundaries into page-space cells.
fn build_grid(region: TableRegion, rows: &[u32], columns: &[u32]) -> TableGrid {
    let row_boundaries: Vec<u32> = rows.iter().map(|y| region.y1 + y).collect();
    let column_boundaries: Vec<u32> = columns.iter().map(|x| region.x1 + x).collect();

    if row_boundaries.len() < 2 || column_boundaries.len() < 2 {
        return TableGrid {
            row_boundaries,
            column_boundaries,
            ..TableGrid::empty(region)
        };
    }

    let mut cells = Vec::with_capacity((row_boundaries.len() - 1) * (column_boundaries.len() - 1));
    for (row, ys) in row_boundaries.windows(2).enumerate() {
        for (column, xs) in column_boundaries.windows(2).enumerate() {
            cells.push(Cell {
                row,
                column,
                bbox: BoundingBox::new(xs[0], ys[0], xs[1], ys[1]),
            });
        }
    }

    TableGrid {
        region,
        rows: row_boundaries.len() - 1,
        columns: column_boundaries.len() - 1,
        row_boundaries,
        column_boundaries,
        cells,
    }
}
