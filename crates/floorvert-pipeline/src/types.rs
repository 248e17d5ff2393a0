//! Shared types for the floorvert vertex extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;
use crate::contour::ContourTracerKind;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate masks without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference the
/// original decoded image without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in image coordinates.
///
/// Origin is the top-left pixel, x grows rightward and y grows
/// downward. Every stage uses this convention; nothing flips axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Round both coordinates to the nearest integer pixel, halves
    /// away from zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded(self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// A closed boundary traced around one connected wall component.
///
/// The last point connects back to the first; the closing point is
/// not repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Create a new contour from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the contour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Closed arc length, including the segment from the last point
    /// back to the first.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let n = self.0.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.0[i].distance(self.0[(i + 1) % n]))
            .sum()
    }

    /// Consumes the contour and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the vertex extraction pipeline.
///
/// Defaults match the values the floorplan tooling has been tuned
/// with: threshold 100, five dilations followed by three erosions, and
/// a 12 pixel merge radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Intensity cutoff. Pixels strictly darker than this become wall
    /// ink; everything else (faint furniture, dimension lines, door
    /// arcs) becomes background.
    pub threshold: u8,

    /// Number of 3×3 dilations applied to the ink mask.
    pub thickness_reduce_iterations: u32,

    /// Number of 3×3 erosions applied after the dilations.
    pub thickness_increase_iterations: u32,

    /// Maximum distance in pixels between a cluster anchor and a
    /// vertex merged into it.
    pub cluster_epsilon: f64,

    /// Polygon approximation tolerance as a fraction of each contour's
    /// perimeter.
    pub approx_ratio: f64,

    /// Which contour tracing algorithm to use.
    pub contour_tracer: ContourTracerKind,
}

impl PipelineConfig {
    /// Default binarization threshold.
    pub const DEFAULT_THRESHOLD: u8 = 100;
    /// Default number of thickness reduction (dilation) passes.
    pub const DEFAULT_THICKNESS_REDUCE_ITERATIONS: u32 = 5;
    /// Default number of thickness increase (erosion) passes.
    pub const DEFAULT_THICKNESS_INCREASE_ITERATIONS: u32 = 3;
    /// Default vertex merge radius in pixels.
    pub const DEFAULT_CLUSTER_EPSILON: f64 = 12.0;
    /// Default polygon approximation ratio.
    pub const DEFAULT_APPROX_RATIO: f64 = 0.001;

    /// Check the numeric parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `cluster_epsilon` or
    /// `approx_ratio` is negative or not finite.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.cluster_epsilon.is_finite() || self.cluster_epsilon < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "cluster_epsilon must be finite and >= 0, got {}",
                self.cluster_epsilon
            )));
        }
        if !self.approx_ratio.is_finite() || self.approx_ratio < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "approx_ratio must be finite and >= 0, got {}",
                self.approx_ratio
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            thickness_reduce_iterations: Self::DEFAULT_THICKNESS_REDUCE_ITERATIONS,
            thickness_increase_iterations: Self::DEFAULT_THICKNESS_INCREASE_ITERATIONS,
            cluster_epsilon: Self::DEFAULT_CLUSTER_EPSILON,
            approx_ratio: Self::DEFAULT_APPROX_RATIO,
            contour_tracer: ContourTracerKind::default(),
        }
    }
}

/// Result of running the full pipeline.
///
/// Carries both vertex sets so callers can render the raw detections
/// next to the merged ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Merged vertex set, one centroid per cluster, in anchor order.
    pub vertices: Vec<Point>,

    /// Raw vertex set before clustering.
    pub raw_vertices: Vec<Point>,

    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
}

/// Result of running the pipeline with every intermediate preserved.
///
/// The original image is kept untouched so overlays can be drawn on
/// it after the fact.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Original decoded RGBA image.
    pub original: RgbaImage,
    /// Luminance-weighted grayscale image.
    pub grayscale: GrayImage,
    /// Thresholded ink mask (255 = wall).
    pub binary: GrayImage,
    /// Mask after dilation and erosion.
    pub normalized: GrayImage,
    /// One-pixel rim of every blob in the normalized mask.
    pub boundary: GrayImage,
    /// External contours in discovery order.
    pub contours: Vec<Contour>,
    /// Approximated polygon vertices of every contour, concatenated.
    pub raw_vertices: Vec<Point>,
    /// Clusters over `raw_vertices`, in anchor order.
    pub clusters: Vec<Cluster>,
    /// One centroid per cluster.
    pub vertices: Vec<Point>,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

impl StagedResult {
    /// Drop the raster intermediates, keeping the vertex sets.
    #[must_use]
    pub fn into_process_result(self) -> ProcessResult {
        ProcessResult {
            vertices: self.vertices,
            raw_vertices: self.raw_vertices,
            dimensions: self.dimensions,
        }
    }
}

/// Broad category of a [`PipelineError`].
///
/// Lets callers tell a bad input file apart from parameters that need
/// re-tuning without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The raster is empty, unreadable or corrupt.
    InvalidInput,
    /// A configuration value is out of range.
    InvalidConfig,
    /// The parameters wiped out the mask. Re-running with the same
    /// values reproduces the failure.
    DegenerateParameters,
}

/// Errors that can occur during pipeline processing.
///
/// Serializes through [`PipelineErrorProxy`] because
/// `image::ImageError` has no serde support; `ImageDecode` travels as
/// its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes (or pixels) were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The normalized mask collapsed to a single uniform value.
    #[error(
        "blank mask after thickness normalization: reduce the threshold and/or thickness reduction iterations"
    )]
    BlankMask,
}

impl PipelineError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ImageDecode(_) | Self::EmptyInput => ErrorKind::InvalidInput,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::BlankMask => ErrorKind::DegenerateParameters,
        }
    }
}

#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    ImageDecode(String),
    EmptyInput,
    InvalidConfig(String),
    BlankMask,
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::InvalidConfig(s) => PipelineErrorProxy::InvalidConfig(s.clone()),
            Self::BlankMask => PipelineErrorProxy::BlankMask,
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PipelineErrorProxy::deserialize(deserializer)? {
            // The typed decoder error is gone; keep its message.
            PipelineErrorProxy::ImageDecode(msg) => {
                Self::ImageDecode(image::ImageError::Decoding(image::error::DecodingError::new(
                    image::error::ImageFormatHint::Unknown,
                    msg,
                )))
            }
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
            PipelineErrorProxy::BlankMask => Self::BlankMask,
        })
    }
}
