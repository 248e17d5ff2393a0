//! Blank-result guard.
//!
//! A threshold that is too high, or too many thickness reduction
//! passes, can flood the normalized mask with ink or wipe it out
//! entirely. Either way there is nothing left to trace, and tracing it
//! anyway would quietly produce zero vertices. The pipeline checks
//! with [`is_blank`] right after normalization and aborts with
//! [`PipelineError::BlankMask`](crate::PipelineError::BlankMask).

use image::GrayImage;

/// Returns `true` if every pixel equals the maximum pixel value
/// present, i.e. the mask is one uniform value.
///
/// An image with no pixels is blank.
#[must_use]
pub fn is_blank(mask: &GrayImage) -> bool {
    let Some(max) = mask.pixels().map(|p| p.0[0]).max() else {
        return true;
    };
    mask.pixels().all(|p| p.0[0] == max)
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    #[test]
    fn all_ink_is_blank() {
        assert!(is_blank(&GrayImage::from_pixel(8, 8, Luma([255]))));
    }

    #[test]
    fn all_background_is_blank() {
        assert!(is_blank(&GrayImage::new(8, 8)));
    }

    #[test]
    fn single_differing_pixel_is_not_blank() {
        let mut img = GrayImage::new(8, 8);
        img.put_pixel(7, 7, Luma([255]));
        assert!(!is_blank(&img));

        let mut img = GrayImage::from_pixel(8, 8, Luma([255]));
        img.put_pixel(0, 0, Luma([0]));
        assert!(!is_blank(&img));
    }

    #[test]
    fn empty_image_is_blank() {
        assert!(is_blank(&GrayImage::new(0, 0)));
    }
}
