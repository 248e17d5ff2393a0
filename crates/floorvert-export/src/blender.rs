//! Blender script generation.
//!
//! Fills the built-in `bpy` template, which clears the scene, imports
//! the traced outline SVG, and extrudes it into walls.

use std::path::Path;

use crate::template::{render, unix_path};

/// The built-in Blender template.
pub const TEMPLATE: &str = include_str!("../templates/blender.py");

/// Values substituted into a Blender template.
#[derive(Debug, Clone, Copy)]
pub struct BlenderParams<'a> {
    /// Traced outline to import. Should be absolute: Blender resolves
    /// relative paths against its own working directory.
    pub svg_path: &'a Path,
    /// Horizontal scale applied to the imported outline.
    pub scale: f64,
    /// Extrusion height of the walls.
    pub height: f64,
}

/// Render `template`, replacing `#SVG-PATH-PLACEHOLDER#`,
/// `#SCALE-PLACEHOLDER#` and `#HEIGHT-PLACEHOLDER#`.
#[must_use]
pub fn render_template(template: &str, params: &BlenderParams<'_>) -> String {
    let svg_path = unix_path(params.svg_path);
    let scale = params.scale.to_string();
    let height = params.height.to_string();
    render(
        template,
        &[
            ("SVG-PATH", &svg_path),
            ("SCALE", &scale),
            ("HEIGHT", &height),
        ],
    )
}

/// Render the built-in [`TEMPLATE`].
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use floorvert_export::{BlenderParams, to_blender_script};
///
/// let script = to_blender_script(&BlenderParams {
///     svg_path: Path::new("/tmp/plan/image/cropped.svg"),
///     scale: 0.5,
///     height: 3.0,
/// });
/// assert!(script.contains("SVG_PATH = r\"/tmp/plan/image/cropped.svg\""));
/// assert!(script.contains("SCALE = 0.5"));
/// ```
#[must_use]
pub fn to_blender_script(params: &BlenderParams<'_>) -> String {
    render_template(TEMPLATE, params)
}
