//! Synthetic page builders shared by the integration tests.

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;

pub const INK: Luma<u8> = Luma([0]);
pub const PAPER: Luma<u8> = Luma([255]);

/// Builder for ruled pages: straight black lines on white paper.
pub struct RuledPage {
    img: GrayImage,
}

impl RuledPage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: GrayImage::from_pixel(width, height, PAPER),
        }
    }

    /// Horizontal line at `y` spanning `x_from..=x_to`, `thickness` pixels centred on `y`.
    pub fn hline(mut self, y: u32, x_from: u32, x_to: u32, thickness: u32) -> Self {
        for yy in band(y, thickness, self.img.height()) {
            for x in x_from..=x_to.min(self.img.width() - 1) {
                self.img.put_pixel(x, yy, INK);
            }
        }
        self
    }

    /// Vertical line at `x` spanning `y_from..=y_to`, `thickness` pixels centred on `x`.
    pub fn vline(mut self, x: u32, y_from: u32, y_to: u32, thickness: u32) -> Self {
        for xx in band(x, thickness, self.img.width()) {
            for y in y_from..=y_to.min(self.img.height() - 1) {
                self.img.put_pixel(xx, y, INK);
            }
        }
        self
    }

    /// A full ruled table: every `ys` row line spans the `xs` extent and vice versa.
    ///
    /// Lines run past the outer rules by half the thickness so the outer frame is a
    /// clean rectangle.
    pub fn table(self, xs: &[u32], ys: &[u32], thickness: u32) -> Self {
        let half = thickness / 2;
        let (x_min, x_max) = (xs[0].saturating_sub(half), xs[xs.len() - 1] + half);
        let (y_min, y_max) = (ys[0].saturating_sub(half), ys[ys.len() - 1] + half);
        let page = ys.iter().fold(self, |page, &y| page.hline(y, x_min, x_max, thickness));
        xs.iter().fold(page, |page, &x| page.vline(x, y_min, y_max, thickness))
    }

    /// Solid block of ink, roughly glyph sized.
    pub fn blob(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        for yy in y..y + height {
            for xx in x..x + width {
                self.img.put_pixel(xx, yy, INK);
            }
        }
        self
    }

    /// Set every paper pixel adjacent to ink to `gray`, imitating anti-aliased scans.
    pub fn soften(mut self, gray: u8) -> Self {
        let src = self.img.clone();
        let (width, height) = src.dimensions();
        for y in 0..height {
            for x in 0..width {
                if src.get_pixel(x, y) != &PAPER {
                    continue;
                }
                let touches_ink = [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)].iter().any(|&(dx, dy)| {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    nx >= 0
                        && ny >= 0
                        && (nx as u32) < width
                        && (ny as u32) < height
                        && src.get_pixel(nx as u32, ny as u32) == &INK
                });
                if touches_ink {
                    self.img.put_pixel(x, y, Luma([gray]));
                }
            }
        }
        self
    }

    pub fn build(self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.img)
    }
}

fn band(center: u32, thickness: u32, limit: u32) -> impl Iterator<Item = u32> {
    let half = thickness / 2;
    let start = center.saturating_sub(half);
    let end = (center + thickness - 1 - half).min(limit - 1);
    start..=end
}

/// Evenly spaced line positions from `0` to `extent - 1`.
pub fn even_lines(count: u32, extent: u32) -> Vec<u32> {
    (0..count).map(|i| i * (extent - 1) / (count - 1)).collect()
}

pub fn blank_page(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, PAPER))
}

pub fn encode_png(page: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    page.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}
