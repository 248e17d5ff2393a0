//! Edge extraction: boundary rim and external contour tracing.
//!
//! The rim of each ink blob is the mask minus its 3×3 erosion, one
//! pixel wide. Tracing that rim yields one closed contour per
//! connected wall component.
//!
//! # Strategy pattern
//!
//! [`ContourTracer`] is implemented by [`ContourTracerKind`] so the
//! tracing algorithm is selected through
//! [`PipelineConfig`](crate::PipelineConfig) while all implementations
//! stay in the core layer with no I/O dependencies.

use image::GrayImage;
use imageproc::contours::BorderType;
use serde::{Deserialize, Serialize};

use crate::types::{Contour, Point};

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourTracerKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`,
    /// keeping only top-level outer borders.
    ///
    /// Holes, and anything nested inside a hole, are not returned: only
    /// the outermost outline of each wall component matters.
    #[default]
    ExternalBorder,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary image (255 = ink, 0 = background).
/// Output: closed contours in raster discovery order, i.e. ordered by
/// the first pixel of each contour met while scanning rows top to
/// bottom, left to right.
pub trait ContourTracer {
    /// Trace contours in the given binary image.
    fn trace(&self, image: &GrayImage) -> Vec<Contour>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, image: &GrayImage) -> Vec<Contour> {
        match *self {
            Self::ExternalBorder => trace_external_borders(image),
        }
    }
}

/// One-pixel rim of every ink blob: `mask - erode(mask)`.
#[must_use = "returns the boundary image"]
pub fn boundary(mask: &GrayImage) -> GrayImage {
    let eroded = crate::morphology::erode(mask, 1);
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        image::Luma([mask
            .get_pixel(x, y)
            .0[0]
            .saturating_sub(eroded.get_pixel(x, y).0[0])])
    })
}

/// Extract the external contours of a normalized mask.
///
/// Computes the [`boundary`] and traces it with `tracer`.
#[must_use = "returns the traced contours"]
pub fn extract_contours(mask: &GrayImage, tracer: &impl ContourTracer) -> Vec<Contour> {
    tracer.trace(&boundary(mask))
}

fn trace_external_borders(image: &GrayImage) -> Vec<Contour> {
    imageproc::contours::find_contours::<u32>(image)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            Contour::new(
                c.points
                    .into_iter()
                    .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                    .collect(),
            )
        })
        .collect()
}
