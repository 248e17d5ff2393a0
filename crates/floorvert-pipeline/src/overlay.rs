//! Vertex overlay rendering.
//!
//! Marks each vertex with a filled dot on a copy of the source image so
//! raw and merged vertex sets can be inspected side by side.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::types::Point;

/// Default dot color (opaque magenta).
pub const MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Default dot radius in pixels.
pub const DEFAULT_RADIUS: i32 = 3;

/// Draw a filled circle at every vertex, rounded to the nearest pixel.
///
/// Returns a new image; `original` is left untouched. Dots that fall
/// partly outside the image are clipped.
#[must_use = "returns the annotated image"]
pub fn draw_vertices(
    original: &RgbaImage,
    vertices: &[Point],
    radius: i32,
    color: Rgba<u8>,
) -> RgbaImage {
    let mut canvas = original.clone();
    for v in vertices {
        let (x, y) = v.rounded();
        let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
            continue;
        };
        draw_filled_circle_mut(&mut canvas, (x, y), radius, color);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn dot_is_drawn_at_rounded_position() {
        let img = RgbaImage::from_pixel(20, 20, WHITE);
        let out = draw_vertices(&img, &[Point::new(9.6, 10.4)], DEFAULT_RADIUS, MAGENTA);
        assert_eq!(*out.get_pixel(10, 10), MAGENTA);
        assert_eq!(*out.get_pixel(12, 10), MAGENTA);
        assert_eq!(*out.get_pixel(0, 0), WHITE);
        assert_eq!(*out.get_pixel(15, 10), WHITE);
    }

    #[test]
    fn original_is_not_modified() {
        let img = RgbaImage::from_pixel(10, 10, WHITE);
        let _ = draw_vertices(&img, &[Point::new(5.0, 5.0)], DEFAULT_RADIUS, MAGENTA);
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn dots_near_the_edge_are_clipped() {
        let img = RgbaImage::from_pixel(10, 10, WHITE);
        let out = draw_vertices(
            &img,
            &[Point::new(0.0, 0.0), Point::new(-50.0, 400.0)],
            DEFAULT_RADIUS,
            MAGENTA,
        );
        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(*out.get_pixel(0, 0), MAGENTA);
    }

    #[test]
    fn no_vertices_returns_copy() {
        let img = RgbaImage::from_pixel(4, 4, WHITE);
        assert_eq!(draw_vertices(&img, &[], 3, MAGENTA), img);
    }
}
