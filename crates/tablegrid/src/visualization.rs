//! Overlay rendering for extracted tables.
//!
//! Draws each processed table region and the cells found for it on top of the page.
//! Cells are always taken from the same [`TableResult`] as the region outline, so a
//! region whose grid came back empty is drawn without cells.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::types::{BoundingBox, TableResult};

const COLOR_REGION_BORDER: Rgb<u8> = Rgb([255, 165, 0]); // Orange for table regions
const COLOR_CELL_BORDER: Rgb<u8> = Rgb([0, 0, 255]); // Blue for cells
const REGION_BORDER_WIDTH: u32 = 3;

/// Render region and cell outlines over `page`.
///
/// Returns `None` when `tables` is empty, i.e. nothing was processed on this page.
pub fn render_overlay(page: &DynamicImage, tables: &[TableResult]) -> Option<RgbImage> {
    if tables.is_empty() {
        return None;
    }

    let mut canvas = page.to_rgb8();
    for result in tables {
        draw_box(&mut canvas, &result.grid.region, COLOR_REGION_BORDER, REGION_BORDER_WIDTH);
        for cell in &result.grid.cells {
            draw_box(&mut canvas, &cell.bbox, COLOR_CELL_BORDER, 1);
        }
    }
    Some(canvas)
}

/// Draw a hollow box `thickness` pixels wide, growing inwards from `bbox`.
fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    for t in 0..thickness {
        let width = bbox.width().saturating_sub(2 * t);
        let height = bbox.height().saturating_sub(2 * t);
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((bbox.x1 + t) as i32, (bbox.y1 + t) as i32).of_size(width, height);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, TableGrid};
    use image::{GrayImage, Luma};

    fn white_page(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255])))
    }

    #[test]
    fn test_no_tables_no_overlay() {
        assert!(render_overlay(&white_page(10, 10), &[]).is_none());
    }

    #[test]
    fn test_region_without_cells_draws_outline_only() {
        let region = BoundingBox::new(10, 10, 60, 40);
        let tables = vec![TableResult {
            grid: TableGrid::empty(region),
            table: None,
        }];

        let overlay = render_overlay(&white_page(80, 50), &tables).unwrap();
        assert_eq!(*overlay.get_pixel(10, 10), COLOR_REGION_BORDER);
        assert_eq!(*overlay.get_pixel(12, 20), COLOR_REGION_BORDER);
        assert_eq!(*overlay.get_pixel(13, 20), Rgb([255, 255, 255]));
        assert_eq!(*overlay.get_pixel(0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_cells_are_drawn() {
        let region = BoundingBox::new(0, 0, 40, 20);
        let grid = TableGrid {
            region,
            row_boundaries: vec![0, 19],
            column_boundaries: vec![0, 20, 39],
            cells: vec![
                Cell {
                    row: 0,
                    column: 0,
                    bbox: BoundingBox::new(0, 0, 20, 19),
                },
                Cell {
                    row: 0,
                    column: 1,
                    bbox: BoundingBox::new(20, 0, 39, 19),
                },
            ],
            rows: 1,
            columns: 2,
        };
        let tables = vec![TableResult { grid, table: None }];

        let overlay = render_overlay(&white_page(40, 20), &tables).unwrap();
        // Shared cell edge at x=20, inside the region border
        assert_eq!(*overlay.get_pixel(20, 10), COLOR_CELL_BORDER);
        assert_eq!(*overlay.get_pixel(10, 10), Rgb([255, 255, 255]));
    }
}
