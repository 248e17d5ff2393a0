//! Typst report generation.
//!
//! The report is written next to the raster artifacts in `image/` and
//! references `input.png`, `raw-vertices.png`, `merged-vertices.png`
//! and `cropped.svg` by bare filename: Typst refuses to read outside
//! the document's root directory.

use floorvert_pipeline::Dimensions;

use crate::template::render;

/// The built-in report template.
pub const TEMPLATE: &str = include_str!("../templates/report.typ");

/// Values substituted into the report template.
#[derive(Debug, Clone)]
pub struct ReportParams<'a> {
    /// Tool version printed in the header.
    pub version: &'a str,
    /// Generation time, `HH:MM:SS`.
    pub time: &'a str,
    /// Generation date, `YYYY-MM-DD`.
    pub date: &'a str,
    /// Input image filename.
    pub filename: &'a str,
    pub threshold: u8,
    pub reduce_iterations: u32,
    pub increase_iterations: u32,
    pub scale: f64,
    pub height: f64,
    /// Source image size.
    pub dimensions: Dimensions,
    /// Output of [`crate::to_vertex_listing`].
    pub vertex_listing: &'a str,
    /// Contents of the traced outline SVG.
    pub traced_svg: &'a str,
    /// Contents of the generated Blender script.
    pub blender_script: &'a str,
}

/// Render the built-in report template.
///
/// Multi-line values (listing, SVG, script) land inside raw blocks, so
/// they are inserted verbatim with trailing newlines trimmed.
#[must_use]
pub fn to_typst_report(params: &ReportParams<'_>) -> String {
    let threshold = params.threshold.to_string();
    let tri = params.reduce_iterations.to_string();
    let tii = params.increase_iterations.to_string();
    let scale = params.scale.to_string();
    let height = params.height.to_string();
    let width_px = params.dimensions.width.to_string();
    let height_px = params.dimensions.height.to_string();
    render(
        TEMPLATE,
        &[
            ("VERSION", params.version),
            ("TIME", params.time),
            ("DATE", params.date),
            ("FILENAME", params.filename),
            ("THRESHOLD", &threshold),
            ("TRI", &tri),
            ("TII", &tii),
            ("SCALE", &scale),
            ("HEIGHT", &height),
            ("IMAGE-WIDTH", &width_px),
            ("IMAGE-HEIGHT", &height_px),
            ("VERTEX-LIST", params.vertex_listing.trim_end()),
            ("SVG", params.traced_svg.trim_end()),
            ("BLENDER-SCRIPT", params.blender_script.trim_end()),
        ],
    )
}
