//! Polygon approximation of closed contours (Ramer-Douglas-Peucker).
//!
//! Each contour is reduced to the corners that describe it within a
//! tolerance of `ratio × perimeter`. Scaling the tolerance with the
//! perimeter keeps the simplification scale-invariant: a long outer
//! wall tolerates proportionally more deviation than a small pillar.

use image::GrayImage;

use crate::contour::{ContourTracer, extract_contours};
use crate::types::{Contour, Point};

/// Approximate a closed contour by a polygon, returning its vertices.
///
/// The ring is split at its first point and at the point farthest from
/// it; both chains are simplified independently and joined without
/// repeating the split points.
///
/// Degenerate contours (two points or fewer, or zero perimeter)
/// contribute no vertices.
#[must_use = "returns the polygon vertices"]
pub fn approximate(contour: &Contour, ratio: f64) -> Vec<Point> {
    let points = contour.points();
    if points.len() <= 2 {
        return Vec::new();
    }
    let perimeter = contour.perimeter();
    if perimeter <= 0.0 {
        return Vec::new();
    }
    let tolerance = ratio * perimeter;

    let origin = points[0];
    let far = points
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0), |best, (i, p)| {
            let d = p.distance_squared(origin);
            if d > best.1 { (i, d) } else { best }
        })
        .0;
    if far == 0 {
        return Vec::new();
    }

    let first_chain = &points[..=far];
    let mut second_chain: Vec<Point> = points[far..].to_vec();
    second_chain.push(origin);

    let mut vertices = simplify_chain(first_chain, tolerance);
    let second = simplify_chain(&second_chain, tolerance);
    // Drop the shared endpoints (`far` and `origin`) of the second chain.
    if second.len() > 2 {
        vertices.extend_from_slice(&second[1..second.len() - 1]);
    }
    vertices
}

/// Approximate every contour and concatenate the vertices, in contour
/// order, into one raw vertex set.
#[must_use = "returns the raw vertex set"]
pub fn approximate_all(contours: &[Contour], ratio: f64) -> Vec<Point> {
    contours
        .iter()
        .flat_map(|c| approximate(c, ratio))
        .collect()
}

/// Trace a normalized mask and approximate its contours in one call.
#[must_use = "returns the raw vertex set"]
pub fn detect(mask: &GrayImage, ratio: f64, tracer: &impl ContourTracer) -> Vec<Point> {
    approximate_all(&extract_contours(mask, tracer), ratio)
}

/// Simplify an open chain, always keeping both endpoints.
fn simplify_chain(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, tolerance, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step: keep the point farthest from the `start`-`end`
/// segment if it lies beyond `tolerance`, then recurse on both halves.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Distance from `p` to the line through `a` and `b`, or to `a` when
/// the two coincide.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::binarize::INK;
    use crate::contour::ContourTracerKind;

    /// Dense clockwise pixel walk around the rectangle `[x0, x1] × [y0, y1]`.
    fn rectangle_walk(x0: u32, y0: u32, x1: u32, y1: u32) -> Contour {
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push(Point::new(f64::from(x), f64::from(y0)));
        }
        for y in y0..y1 {
            pts.push(Point::new(f64::from(x1), f64::from(y)));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(Point::new(f64::from(x), f64::from(y1)));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(Point::new(f64::from(x0), f64::from(y)));
        }
        Contour::new(pts)
    }

    #[test]
    fn rectangle_reduces_to_four_corners() {
        let contour = rectangle_walk(5, 5, 14, 14);
        let vertices = approximate(&contour, 0.001);
        assert_eq!(
            vertices,
            vec![
                Point::new(5.0, 5.0),
                Point::new(14.0, 5.0),
                Point::new(14.0, 14.0),
                Point::new(5.0, 14.0),
            ]
        );
    }

    #[test]
    fn degenerate_contours_contribute_nothing() {
        assert!(approximate(&Contour::new(vec![]), 0.001).is_empty());
        assert!(approximate(&Contour::new(vec![Point::new(1.0, 1.0)]), 0.001).is_empty());
        let two = Contour::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        assert!(approximate(&two, 0.001).is_empty());
        let stacked = Contour::new(vec![Point::new(2.0, 2.0); 5]);
        assert!(approximate(&stacked, 0.001).is_empty());
    }

    #[test]
    fn tolerance_scales_with_perimeter() {
        // A one-pixel notch on a long edge survives a tight ratio but
        // not a loose one.
        let mut pts = vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0)];
        pts.push(Point::new(51.0, 1.0));
        pts.push(Point::new(52.0, 0.0));
        pts.extend([
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]);
        let contour = Contour::new(pts);
        let tight = approximate(&contour, 0.001);
        let loose = approximate(&contour, 0.01);
        assert!(tight.contains(&Point::new(51.0, 1.0)));
        assert!(!loose.contains(&Point::new(51.0, 1.0)));
        assert_eq!(loose.len(), 4);
    }

    #[test]
    fn approximate_all_concatenates_in_contour_order() {
        let a = rectangle_walk(0, 0, 10, 10);
        let b = rectangle_walk(20, 20, 30, 30);
        let vertices = approximate_all(&[a, b], 0.001);
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[0], Point::new(0.0, 0.0));
        assert_eq!(vertices[4], Point::new(20.0, 20.0));
    }

    #[test]
    fn detect_finds_square_corners_in_mask() {
        let mut img = GrayImage::new(30, 30);
        for y in 8..20 {
            for x in 6..22 {
                img.put_pixel(x, y, Luma([INK]));
            }
        }
        let vertices = detect(&img, 0.001, &ContourTracerKind::ExternalBorder);
        assert_eq!(vertices.len(), 4, "got {vertices:?}");
        for corner in [(6.0, 8.0), (21.0, 8.0), (21.0, 19.0), (6.0, 19.0)] {
            assert!(
                vertices.contains(&Point::new(corner.0, corner.1)),
                "missing corner {corner:?} in {vertices:?}"
            );
        }
    }

    #[test]
    fn perpendicular_distance_on_axis() {
        let d = perpendicular_distance(
            Point::new(1.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-10);
    }

    #[test]
    fn perpendicular_distance_coincident_endpoints() {
        let d = perpendicular_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-10);
    }
}
