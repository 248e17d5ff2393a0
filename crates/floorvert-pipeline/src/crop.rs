//! Crop a normalized mask to its ink and prepare it for vector tracing.
//!
//! External tracers expect dark shapes on a light background, so the
//! cropped bitmap is inverted: walls become 0 and background 255.

use image::{GrayImage, Luma};

use crate::binarize::{BACKGROUND, INK};

/// Axis-aligned pixel rectangle, inclusive of `x`/`y`, exclusive of
/// `x + width`/`y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Bounding box of all ink pixels, or `None` if the mask has none.
#[must_use]
pub fn content_bounds(mask: &GrayImage) -> Option<Rect> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in mask.enumerate_pixels() {
        if p.0[0] != INK {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| Rect {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    })
}

/// Crop `mask` to [`content_bounds`] and invert it.
///
/// Returns `None` when there is no ink to trace.
#[must_use]
pub fn crop_for_tracing(mask: &GrayImage) -> Option<GrayImage> {
    let r = content_bounds(mask)?;
    Some(GrayImage::from_fn(r.width, r.height, |x, y| {
        if mask.get_pixel(r.x + x, r.y + y).0[0] == INK {
            Luma([BACKGROUND])
        } else {
            Luma([INK])
        }
    }))
}
