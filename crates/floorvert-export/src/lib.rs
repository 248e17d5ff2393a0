//! floorvert-export: Pure format serializers (sans-IO)
//!
//! Turns pipeline output into the artifacts written next to each input:
//! a plain-text vertex listing, a diagnostic SVG, a Blender script that
//! rebuilds the walls, and a Typst report. Every function returns a
//! `String`; writing files is left to the caller.

pub mod blender;
pub mod listing;
pub mod svg;
mod template;
pub mod typst;

pub use blender::{BlenderParams, render_template, to_blender_script};
pub use listing::to_vertex_listing;
pub use svg::{SvgMetadata, build_path_data, to_diagnostic_svg};
pub use typst::{ReportParams, to_typst_report};
