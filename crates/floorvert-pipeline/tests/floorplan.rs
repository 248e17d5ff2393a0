//! End-to-end checks on a synthetic floorplan: an L-shaped apartment
//! with an interior partition, faint furniture and a door gap.

#![allow(clippy::unwrap_used)]

use floorvert_pipeline::binarize::INK;
use floorvert_pipeline::{PipelineConfig, Point, process_staged};
use image::{GrayImage, Luma};

const WALL: Luma<u8> = Luma([20]);
const FURNITURE: Luma<u8> = Luma([180]);

fn fill(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Luma<u8>) {
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// L-shaped outline, 5 px walls:
///
/// ```text
/// (20,20) ───────── (180,20)
///    │                  │
///    │        (100,100)─(180,100)
///    │            │
/// (20,180) ── (100,180)
/// ```
fn l_shaped_plan() -> Vec<u8> {
    let mut img = GrayImage::from_pixel(200, 200, Luma([255]));
    // Outer walls.
    fill(&mut img, 20, 20, 181, 25, WALL);
    fill(&mut img, 20, 20, 25, 181, WALL);
    fill(&mut img, 176, 20, 181, 101, WALL);
    fill(&mut img, 96, 96, 181, 101, WALL);
    fill(&mut img, 96, 96, 101, 181, WALL);
    fill(&mut img, 20, 176, 101, 181, WALL);
    // Partition wall with a door gap of two pixels.
    fill(&mut img, 20, 60, 70, 64, WALL);
    fill(&mut img, 72, 60, 97, 64, WALL);
    // A table drawn in light gray: below the threshold, so ignored.
    fill(&mut img, 40, 120, 70, 150, FURNITURE);

    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn near(vertices: &[Point], x: f64, y: f64, tolerance: f64) -> bool {
    vertices.iter().any(|v| v.distance(Point::new(x, y)) <= tolerance)
}

#[test]
fn l_shape_yields_its_six_corners() {
    let staged = process_staged(&l_shaped_plan(), &PipelineConfig::default()).unwrap();

    assert_eq!(staged.contours.len(), 1, "door gap should be bridged");
    assert_eq!(staged.vertices.len(), 6, "got {:?}", staged.vertices);
    for (x, y) in [
        (20.0, 20.0),
        (180.0, 20.0),
        (180.0, 100.0),
        (100.0, 100.0),
        (100.0, 180.0),
        (20.0, 180.0),
    ] {
        assert!(
            near(&staged.vertices, x, y, 4.0),
            "no vertex near ({x}, {y}) in {:?}",
            staged.vertices
        );
    }
}

#[test]
fn furniture_does_not_reach_the_mask() {
    let staged = process_staged(&l_shaped_plan(), &PipelineConfig::default()).unwrap();
    assert_ne!(staged.binary.get_pixel(20, 20).0[0], 0);
    assert_eq!(staged.binary.get_pixel(55, 135).0[0], 0);
}

#[test]
fn door_gap_is_closed_by_normalization() {
    let staged = process_staged(&l_shaped_plan(), &PipelineConfig::default()).unwrap();
    assert_eq!(staged.binary.get_pixel(70, 62).0[0], 0);
    assert_eq!(staged.normalized.get_pixel(70, 62).0[0], INK);
}

#[test]
fn overlay_and_crop_work_from_staged_result() {
    let staged = process_staged(&l_shaped_plan(), &PipelineConfig::default()).unwrap();

    let overlay = floorvert_pipeline::overlay::draw_vertices(
        &staged.original,
        &staged.vertices,
        floorvert_pipeline::overlay::DEFAULT_RADIUS,
        floorvert_pipeline::overlay::MAGENTA,
    );
    assert_eq!(overlay.dimensions(), staged.original.dimensions());
    assert_ne!(overlay, staged.original);

    let bounds = floorvert_pipeline::crop::content_bounds(&staged.normalized).unwrap();
    let cropped = floorvert_pipeline::crop::crop_for_tracing(&staged.normalized).unwrap();
    assert_eq!(cropped.dimensions(), (bounds.width, bounds.height));
    // Walls are dark in the tracing bitmap.
    assert_eq!(cropped.get_pixel(0, 0).0[0], 0);
}
