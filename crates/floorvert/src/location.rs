//! Output file layout.
//!
//! For an input `plan.png` everything lands under `<output>/plan/`:
//!
//! ```text
//! plan/
//! ├── blender.py
//! ├── data/vertex-coordinates.txt
//! └── image/
//!     ├── input.png            clean-background.png
//!     ├── cropped.bmp          cropped.png          cropped.svg
//!     ├── raw-vertices.png     merged-vertices.png
//!     ├── diagnostic.svg
//!     └── typst.typ
//! ```
//!
//! Rasters and the report share `image/` because Typst only reads
//! files below the document's own directory.

use std::path::{Path, PathBuf};

const IMAGE_DIR: &str = "image";
const DATA_DIR: &str = "data";

/// Every path a run reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub input: PathBuf,
    pub root: PathBuf,
    pub image_dir: PathBuf,
    pub data_dir: PathBuf,
    pub input_copy: PathBuf,
    pub clean_background: PathBuf,
    /// Potrace only reads BMP.
    pub cropped_bitmap: PathBuf,
    pub cropped_png: PathBuf,
    /// Where the trace of `cropped_bitmap` is kept. Potrace writes here
    /// directly; other vectorizers' output is copied here.
    pub traced_svg: PathBuf,
    pub raw_vertices: PathBuf,
    pub merged_vertices: PathBuf,
    pub diagnostic_svg: PathBuf,
    pub report: PathBuf,
    pub vertex_listing: PathBuf,
    pub blender_script: PathBuf,
}

impl OutputPaths {
    /// Lay out outputs for `input` under `output_root/<input stem>/`.
    #[must_use]
    pub fn new(input: &Path, output_root: &Path) -> Self {
        let stem = input
            .file_stem()
            .map_or_else(|| "floorplan".into(), |s| s.to_string_lossy());
        let root = output_root.join(stem.as_ref());
        let image_dir = root.join(IMAGE_DIR);
        let data_dir = root.join(DATA_DIR);
        Self {
            input: input.to_path_buf(),
            input_copy: image_dir.join("input.png"),
            clean_background: image_dir.join("clean-background.png"),
            cropped_bitmap: image_dir.join("cropped.bmp"),
            cropped_png: image_dir.join("cropped.png"),
            traced_svg: image_dir.join("cropped.svg"),
            raw_vertices: image_dir.join("raw-vertices.png"),
            merged_vertices: image_dir.join("merged-vertices.png"),
            diagnostic_svg: image_dir.join("diagnostic.svg"),
            report: image_dir.join("typst.typ"),
            vertex_listing: data_dir.join("vertex-coordinates.txt"),
            blender_script: root.join("blender.py"),
            root,
            image_dir,
            data_dir,
        }
    }

    /// Create the output directories if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns the first directory creation failure.
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.image_dir)?;
        std::fs::create_dir_all(&self.data_dir)
    }
}
