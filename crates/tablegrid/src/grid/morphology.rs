//! Binary morphology for ruling-line extraction.
//!
//! All masks are `GrayImage`s holding only 0 (background) and 255 (foreground),
//! the same convention `cv2.threshold` produces. Erosion and dilation use a
//! one-pixel-thick rectangular structuring element along a single axis and follow
//! `OpenCV`'s conventions for `MORPH_RECT`:
//!
//! - the anchor sits at `length / 2`
//! - pixels outside the image are ignored (never count as foreground or background)
//!
//! Each line is processed with a running foreground count, so the cost is linear in
//! the image size regardless of the element length.

use image::{GrayImage, Luma};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Orientation of a line structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `length x 1` element, keeps horizontal runs
    Horizontal,
    /// `1 x length` element, keeps vertical runs
    Vertical,
}

/// Otsu-threshold a grayscale image and invert it, so dark ink becomes foreground.
///
/// Pixels at or below the Otsu level become [`FOREGROUND`]. Returns `None` for a
/// uniform image: with a single intensity there is nothing to separate, and Otsu's
/// level would otherwise turn the whole crop into foreground.
#[must_use = "returns a new mask; the input is not modified"]
pub fn binarize_inverted(gray: &GrayImage) -> Option<GrayImage> {
    let mut pixels = gray.pixels().map(|p| p.0[0]);
    let first = pixels.next()?;
    if pixels.all(|v| v == first) {
        return None;
    }

    Some(threshold(gray, otsu_level(gray), ThresholdType::BinaryInverted))
}

/// Erode a binary mask with a line element: a pixel survives only if every
/// in-bounds pixel under the element is foreground.
#[must_use = "returns a new eroded mask"]
pub fn erode(mask: &GrayImage, axis: Axis, length: u32) -> GrayImage {
    apply_line_element(mask, axis, length, |foreground, span| foreground == span)
}

/// Dilate a binary mask with a line element: a pixel is set if any in-bounds
/// pixel under the element is foreground.
#[must_use = "returns a new dilated mask"]
pub fn dilate(mask: &GrayImage, axis: Axis, length: u32) -> GrayImage {
    apply_line_element(mask, axis, length, |foreground, _| foreground > 0)
}

/// Erode then dilate, keeping only runs at least `length` pixels long along `axis`
/// and restoring their extent.
#[must_use = "returns a new mask containing only line structure"]
pub fn extract_lines(mask: &GrayImage, axis: Axis, length: u32) -> GrayImage {
    dilate(&erode(mask, axis, length), axis, length)
}

/// Pixelwise AND of two masks of equal size.
///
/// # Panics
///
/// Panics if the masks differ in size.
#[must_use = "returns a new mask"]
pub fn intersect(a: &GrayImage, b: &GrayImage) -> GrayImage {
    assert_eq!(a.dimensions(), b.dimensions(), "masks must have equal dimensions");
    let (width, height) = a.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let both = a.get_pixel(x, y).0[0] != BACKGROUND && b.get_pixel(x, y).0[0] != BACKGROUND;
        Luma([if both { FOREGROUND } else { BACKGROUND }])
    })
}

/// Coordinates of every foreground pixel, row by row.
pub fn foreground_points(mask: &GrayImage) -> Vec<(u32, u32)> {
    mask.enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] != BACKGROUND)
        .map(|(x, y, _)| (x, y))
        .collect()
}

fn apply_line_element<F>(mask: &GrayImage, axis: Axis, length: u32, keep: F) -> GrayImage
where
    F: Fn(u32, u32) -> bool,
{
    let (width, height) = mask.dimensions();
    let mut result = GrayImage::new(width, height);
    let length = length.max(1);
    let anchor = length / 2;
    let after = length - 1 - anchor;

    let (lines, line_len) = match axis {
        Axis::Horizontal => (height, width),
        Axis::Vertical => (width, height),
    };
    let coords = |line: u32, pos: u32| match axis {
        Axis::Horizontal => (pos, line),
        Axis::Vertical => (line, pos),
    };

    // prefix[i] = foreground pixels among the first i positions of the line
    let mut prefix = vec![0u32; line_len as usize + 1];

    for line in 0..lines {
        for pos in 0..line_len {
            let (x, y) = coords(line, pos);
            let is_fg = u32::from(mask.get_pixel(x, y).0[0] != BACKGROUND);
            prefix[pos as usize + 1] = prefix[pos as usize] + is_fg;
        }

        for pos in 0..line_len {
            let lo = pos.saturating_sub(anchor);
            let hi = pos.saturating_add(after).min(line_len - 1);
            let foreground = prefix[hi as usize + 1] - prefix[lo as usize];
            let span = hi - lo + 1;

            if keep(foreground, span) {
                let (x, y) = coords(line, pos);
                result.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
    }

    result
}
