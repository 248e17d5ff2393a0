//! Run a synthetic floorplan through the pipeline and render every
//! artifact from the result.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use floorvert_export::{
    BlenderParams, ReportParams, SvgMetadata, to_blender_script, to_diagnostic_svg,
    to_typst_report, to_vertex_listing,
};
use floorvert_pipeline::{PipelineConfig, process_staged};
use image::{GrayImage, Luma};

/// One rectangular room, 6 px walls, outer corners at (10,10) and (89,69).
fn room_png() -> Vec<u8> {
    let img = GrayImage::from_fn(100, 80, |x, y| {
        let outer = (10..90).contains(&x) && (10..70).contains(&y);
        let inner = (16..84).contains(&x) && (16..64).contains(&y);
        if outer && !inner {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn listing_has_one_line_per_vertex() {
    let staged = process_staged(&room_png(), &PipelineConfig::default()).unwrap();
    let listing = to_vertex_listing(&staged.vertices);
    assert_eq!(listing.lines().count(), staged.vertices.len());
    assert_eq!(staged.vertices.len(), 4, "got {:?}", staged.vertices);
    for line in listing.lines() {
        assert!(line.starts_with('[') && line.ends_with(']'), "{line}");
    }
}

#[test]
fn diagnostic_svg_draws_contours_and_vertices() {
    let staged = process_staged(&room_png(), &PipelineConfig::default()).unwrap();
    let svg = to_diagnostic_svg(
        &staged.contours,
        &staged.vertices,
        staged.dimensions,
        &SvgMetadata {
            title: Some("room.png"),
            ..SvgMetadata::default()
        },
    );
    assert!(svg.contains("viewBox=\"0 0 100 80\""));
    assert_eq!(svg.matches("<path").count(), staged.contours.len());
    assert_eq!(svg.matches("<circle").count(), staged.vertices.len());
}

#[test]
fn report_embeds_listing_and_script() {
    let config = PipelineConfig::default();
    let staged = process_staged(&room_png(), &config).unwrap();
    let listing = to_vertex_listing(&staged.vertices);
    let script = to_blender_script(&BlenderParams {
        svg_path: Path::new("/srv/output/room/image/cropped.svg"),
        scale: 1.0,
        height: 2.8,
    });
    let report = to_typst_report(&ReportParams {
        version: env!("CARGO_PKG_VERSION"),
        time: "09:00:00",
        date: "2026-01-01",
        filename: "room.png",
        threshold: config.threshold,
        reduce_iterations: config.thickness_reduce_iterations,
        increase_iterations: config.thickness_increase_iterations,
        scale: 1.0,
        height: 2.8,
        dimensions: staged.dimensions,
        vertex_listing: &listing,
        traced_svg: "<svg/>",
        blender_script: &script,
    });

    assert!(!report.contains("-PLACEHOLDER#"));
    assert!(report.contains(listing.trim_end()));
    assert!(report.contains("/srv/output/room/image/cropped.svg"));
    assert!(report.contains("100 × 80 px"));
}
