//! Fixed-threshold binarization.
//!
//! Floorplan scans have dark wall strokes on a light background. The
//! threshold keeps solid wall lines and discards faint strokes such as
//! furniture, dimension lines and door-swing arcs.
//!
//! Output polarity: 255 is wall ink, 0 is background. Every later
//! stage (normalizer, boundary extraction, blank guard, crop) agrees
//! on this convention.

use image::{GrayImage, Luma, RgbaImage};

use crate::types::PipelineError;

/// Mask value marking wall ink.
pub const INK: u8 = 255;

/// Mask value marking background.
pub const BACKGROUND: u8 = 0;

/// Threshold a grayscale image into an ink mask.
///
/// A pixel becomes [`INK`] when its intensity is strictly below
/// `threshold`, otherwise [`BACKGROUND`]. An intensity equal to the
/// threshold is background. A threshold of 0 therefore yields an
/// all-background mask.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if the image has no pixels.
pub fn binarize(gray: &GrayImage, threshold: u8) -> Result<GrayImage, PipelineError> {
    if gray.width() == 0 || gray.height() == 0 {
        return Err(PipelineError::EmptyInput);
    }
    Ok(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] < threshold {
            Luma([INK])
        } else {
            Luma([BACKGROUND])
        }
    }))
}

/// Convert a color image to BT.601 grayscale, then threshold it.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if the image has no pixels.
pub fn binarize_rgba(rgba: &RgbaImage, threshold: u8) -> Result<GrayImage, PipelineError> {
    binarize(&crate::grayscale::luma(rgba), threshold)
}

/// Number of ink pixels in a mask.
pub(crate) fn count_ink(mask: &GrayImage) -> u64 {
    mask.pixels().map(|p| u64::from(p.0[0] == INK)).sum()
}
