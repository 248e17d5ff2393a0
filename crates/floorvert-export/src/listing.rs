//! Plain-text vertex listing.
//!
//! One vertex per line as `[x, y]`, coordinates rounded to the nearest
//! integer pixel (halves away from zero), in input order.

use std::fmt::Write;

use floorvert_pipeline::Point;

/// Format `vertices` as a newline-terminated listing.
///
/// # Examples
///
/// ```
/// use floorvert_pipeline::Point;
/// use floorvert_export::to_vertex_listing;
///
/// let text = to_vertex_listing(&[Point::new(0.5, 0.0), Point::new(100.0, 99.6)]);
/// assert_eq!(text, "[1, 0]\n[100, 100]\n");
/// ```
#[must_use]
pub fn to_vertex_listing(vertices: &[Point]) -> String {
    let mut out = String::with_capacity(vertices.len() * 12);
    for v in vertices {
        let (x, y) = v.rounded();
        let _ = writeln!(out, "[{x}, {y}]");
    }
    out
}
