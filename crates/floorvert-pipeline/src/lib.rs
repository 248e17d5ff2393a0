//! floorvert-pipeline: Pure floorplan vertex extraction (sans-IO).
//!
//! Converts a floorplan raster into a deduplicated set of wall-corner
//! vertices through:
//! decode -> grayscale -> threshold -> thickness normalization ->
//! boundary contours -> polygon approximation -> proximity clustering.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! byte slices and returns structured data. Filesystem access, external
//! tracers and serialization to disk live in the `floorvert` binary and
//! `floorvert-export`.

pub mod approximate;
pub mod binarize;
pub mod blank;
pub mod cluster;
pub mod contour;
pub mod crop;
pub mod diagnostics;
pub mod grayscale;
pub mod morphology;
pub mod overlay;
pub mod pipeline;
pub mod types;

pub use cluster::Cluster;
pub use contour::{ContourTracer, ContourTracerKind};
pub use pipeline::Pipeline;
pub use types::{
    Contour, Dimensions, ErrorKind, GrayImage, PipelineConfig, PipelineError, Point,
    ProcessResult, RgbaImage, StagedResult,
};

/// Run the full pipeline and return the merged and raw vertex sets.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP). The source dimensions
/// are returned alongside so serializers can size their coordinate
/// space.
///
/// An image whose walls produce no contours is not an error: the result
/// simply carries empty vertex sets.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` is out of range.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::BlankMask`] if normalization leaves a uniform mask.
pub fn process(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    config.validate()?;

    let gray = grayscale::decode_and_grayscale(image_bytes)?;
    let dimensions = Dimensions {
        width: gray.width(),
        height: gray.height(),
    };

    let binary = binarize::binarize(&gray, config.threshold)?;
    let normalized = morphology::normalize(
        &binary,
        config.thickness_reduce_iterations,
        config.thickness_increase_iterations,
    );
    if blank::is_blank(&normalized) {
        return Err(PipelineError::BlankMask);
    }

    let raw_vertices = approximate::detect(&normalized, config.approx_ratio, &config.contour_tracer);
    let vertices = cluster::merge(&raw_vertices, config.cluster_epsilon);

    Ok(ProcessResult {
        vertices,
        raw_vertices,
        dimensions,
    })
}

/// Run the full pipeline, preserving every intermediate.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    use pipeline::PipelineStage;

    Pipeline::new(image_bytes.to_vec(), config.clone()).complete()
}
