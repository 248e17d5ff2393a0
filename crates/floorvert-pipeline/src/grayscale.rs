//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! RGBA original plus a single-channel grayscale image for the
//! binarizer.

use image::{DynamicImage, GrayImage, Luma, RgbaImage};

use crate::types::PipelineError;

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty or the
/// decoded image has no pixels.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PipelineError::EmptyInput);
    }
    Ok(img)
}

/// Convert a decoded image to 8-bit RGBA.
#[must_use = "returns the RGBA image"]
pub fn to_rgba(image: &DynamicImage) -> RgbaImage {
    image.to_rgba8()
}

/// BT.601 weights in 14-bit fixed point (`0.299`, `0.587`, `0.114`).
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// BT.601 luma of each pixel, rounded to nearest. Alpha is ignored.
///
/// The weights sum to `1 << 14`, so gray input (`R == G == B`) maps to
/// itself.
#[must_use = "returns the grayscale image"]
pub fn luma(rgba: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, _] = rgba.get_pixel(x, y).0;
        let value = (u32::from(r) * LUMA_R
            + u32::from(g) * LUMA_G
            + u32::from(b) * LUMA_B
            + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        Luma([u8::try_from(value).unwrap_or(u8::MAX)])
    })
}

/// Convert a decoded image to grayscale with BT.601 weights
/// (`0.299*R + 0.587*G + 0.114*B`), so green dominates and blue
/// contributes least.
#[must_use = "returns the grayscale image"]
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    luma(&image.to_rgba8())
}

/// Decode raw image bytes and convert to grayscale.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    decode(bytes).map(|img| to_gray(&img))
}
