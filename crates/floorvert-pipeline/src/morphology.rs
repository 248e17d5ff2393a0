//! Wall thickness normalization with a 3×3 square structuring element.
//!
//! Wraps [`imageproc::morphology`]. Under the `L∞` norm a radius of
//! `k` covers a `(2k+1)×(2k+1)` square, which is exactly `k` repeated
//! 3×3 passes, so iteration counts map onto a single call (chunked at
//! the `u8` radius limit).
//!
//! Pixels outside the image are neither ink nor background: erosion
//! does not eat into blobs touching the border and dilation does not
//! grow in from it.

use image::GrayImage;
use imageproc::distance_transform::Norm;

/// Grow ink regions by `iterations` 3×3 dilation passes.
#[must_use = "returns the dilated mask"]
pub fn dilate(mask: &GrayImage, iterations: u32) -> GrayImage {
    apply_chunked(mask, iterations, imageproc::morphology::dilate)
}

/// Shrink ink regions by `iterations` 3×3 erosion passes.
#[must_use = "returns the eroded mask"]
pub fn erode(mask: &GrayImage, iterations: u32) -> GrayImage {
    apply_chunked(mask, iterations, imageproc::morphology::erode)
}

/// Normalize wall stroke thickness.
///
/// First dilates `reduce_iterations` times, bridging gaps and merging
/// strokes that belong to one wall. Then erodes `increase_iterations`
/// times so isolated blobs that did not merge into a wall shrink back
/// (or vanish) while bridged walls survive. With more dilations than
/// erosions the net effect is a slight thickening that closes small
/// gaps.
///
/// Overly aggressive values can flood or empty the mask; see
/// [`crate::blank::is_blank`].
#[must_use = "returns the normalized mask"]
pub fn normalize(mask: &GrayImage, reduce_iterations: u32, increase_iterations: u32) -> GrayImage {
    let reduced = dilate(mask, reduce_iterations);
    erode(&reduced, increase_iterations)
}

fn apply_chunked(
    mask: &GrayImage,
    iterations: u32,
    op: fn(&GrayImage, Norm, u8) -> GrayImage,
) -> GrayImage {
    let mut out = mask.clone();
    let mut remaining = iterations;
    while remaining > 0 {
        let step = u8::try_from(remaining).unwrap_or(u8::MAX);
        out = op(&out, Norm::LInf, step);
        remaining -= u32::from(step);
    }
    out
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::binarize::{BACKGROUND, INK, count_ink};

    fn single_dot(size: u32, x: u32, y: u32) -> GrayImage {
        let mut img = GrayImage::new(size, size);
        img.put_pixel(x, y, Luma([INK]));
        img
    }

    fn filled_square(size: u32, from: u32, to: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (from..to).contains(&x) && (from..to).contains(&y) {
                Luma([INK])
            } else {
                Luma([BACKGROUND])
            }
        })
    }

    #[test]
    fn single_dilation_grows_a_three_by_three_square() {
        let out = dilate(&single_dot(11, 5, 5), 1);
        assert_eq!(count_ink(&out), 9);
        assert_eq!(out.get_pixel(4, 4).0[0], INK);
        assert_eq!(out.get_pixel(6, 6).0[0], INK);
        assert_eq!(out.get_pixel(7, 5).0[0], BACKGROUND);
    }

    #[test]
    fn repeated_dilation_matches_wider_square() {
        let out = dilate(&single_dot(21, 10, 10), 3);
        assert_eq!(count_ink(&out), 49);
    }

    #[test]
    fn erosion_removes_thin_noise() {
        let out = erode(&single_dot(11, 5, 5), 1);
        assert_eq!(count_ink(&out), 0);
    }

    #[test]
    fn erosion_shrinks_square_by_one_ring() {
        let out = erode(&filled_square(20, 5, 15), 1);
        // 10x10 -> 8x8
        assert_eq!(count_ink(&out), 64);
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mask = filled_square(12, 3, 7);
        assert_eq!(normalize(&mask, 0, 0), mask);
    }

    #[test]
    fn normalize_bridges_small_gaps() {
        // Two wall segments separated by a two pixel gap.
        let mask = GrayImage::from_fn(30, 11, |x, y| {
            if (4..7).contains(&y) && (x < 12 || x >= 14) {
                Luma([INK])
            } else {
                Luma([BACKGROUND])
            }
        });
        let out = normalize(&mask, 2, 1);
        assert_eq!(out.get_pixel(12, 5).0[0], INK);
        assert_eq!(out.get_pixel(13, 5).0[0], INK);
    }

    #[test]
    fn normalize_preserves_dimensions() {
        let mask = GrayImage::new(13, 29);
        assert_eq!(normalize(&mask, 5, 3).dimensions(), (13, 29));
    }

    #[test]
    fn large_iteration_counts_are_chunked() {
        let out = dilate(&single_dot(3, 1, 1), 300);
        assert_eq!(count_ink(&out), 9);
    }
}
