//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pipeline in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use floorvert_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let staged = Pipeline::new(png, PipelineConfig::default())
//!     .decode()?
//!     .binarize()?
//!     .normalize()?
//!     .trace_contours()
//!     .approximate()
//!     .merge()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates.
//!
//! # Memory
//!
//! Every stage retains the original RGBA image and all masks computed so
//! far. For a 2000×2000 floorplan scan that is roughly 16 MB of RGBA
//! plus 4 MB per mask, pinned until [`Merged::into_result`]. Callers
//! that only need the vertex sets should prefer [`crate::process`].

use tracing::debug;

use crate::cluster::Cluster;
use crate::contour::ContourTracer;
use crate::diagnostics::StageMetrics;
use crate::types::{
    Contour, Dimensions, GrayImage, PipelineConfig, PipelineError, Point, RgbaImage, StagedResult,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Validate the configuration, decode the source image and convert
    /// it to grayscale.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the configuration is
    /// out of range, [`PipelineError::EmptyInput`] if the source is
    /// empty, or [`PipelineError::ImageDecode`] if it cannot be decoded.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        self.config.validate()?;
        let source_len = self.source.len();
        let image = crate::grayscale::decode(&self.source)?;
        let original = crate::grayscale::to_rgba(&image);
        let grayscale = crate::grayscale::luma(&original);
        let dimensions = Dimensions {
            width: original.width(),
            height: original.height(),
        };
        debug!(
            width = dimensions.width,
            height = dimensions.height,
            source_len,
            "decoded source image"
        );
        Ok(Decoded {
            config: self.config,
            original,
            grayscale,
            dimensions,
            source_len,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding and grayscale conversion.
#[must_use = "pipeline stages are consumed by advancing; call .binarize() to continue"]
pub struct Decoded {
    config: PipelineConfig,
    original: RgbaImage,
    grayscale: GrayImage,
    dimensions: Dimensions,
    source_len: usize,
}

impl Decoded {
    /// The original decoded RGBA image.
    #[must_use]
    pub const fn original(&self) -> &RgbaImage {
        &self.original
    }

    /// The grayscale image.
    #[must_use]
    pub const fn grayscale(&self) -> &GrayImage {
        &self.grayscale
    }

    /// Threshold the grayscale image into an ink mask.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if the image has no pixels.
    pub fn binarize(self) -> Result<Binarized, PipelineError> {
        let binary = crate::binarize::binarize(&self.grayscale, self.config.threshold)?;
        debug!(
            threshold = self.config.threshold,
            ink_pixels = crate::binarize::count_ink(&binary),
            "binarized"
        );
        Ok(Binarized {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            binary,
            dimensions: self.dimensions,
        })
    }
}

// ───────────────────────── Stage 2: Binarized ────────────────────────

/// Pipeline state after thresholding.
#[must_use = "pipeline stages are consumed by advancing; call .normalize() to continue"]
pub struct Binarized {
    config: PipelineConfig,
    original: RgbaImage,
    grayscale: GrayImage,
    binary: GrayImage,
    dimensions: Dimensions,
}

impl Binarized {
    /// The ink mask (255 = wall).
    #[must_use]
    pub const fn binary(&self) -> &GrayImage {
        &self.binary
    }

    /// Normalize wall thickness, then check the result is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BlankMask`] if the normalized mask is a
    /// single uniform value.
    pub fn normalize(self) -> Result<Normalized, PipelineError> {
        let normalized = crate::morphology::normalize(
            &self.binary,
            self.config.thickness_reduce_iterations,
            self.config.thickness_increase_iterations,
        );
        if crate::blank::is_blank(&normalized) {
            debug!("normalized mask is blank");
            return Err(PipelineError::BlankMask);
        }
        debug!(
            reduce = self.config.thickness_reduce_iterations,
            increase = self.config.thickness_increase_iterations,
            ink_pixels = crate::binarize::count_ink(&normalized),
            "normalized wall thickness"
        );
        Ok(Normalized {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            binary: self.binary,
            normalized,
            dimensions: self.dimensions,
        })
    }
}

// ───────────────────────── Stage 3: Normalized ───────────────────────

/// Pipeline state after thickness normalization and the blank guard.
#[must_use = "pipeline stages are consumed by advancing; call .trace_contours() to continue"]
pub struct Normalized {
    config: PipelineConfig,
    original: RgbaImage,
    grayscale: GrayImage,
    binary: GrayImage,
    normalized: GrayImage,
    dimensions: Dimensions,
}

impl Normalized {
    /// The normalized mask.
    #[must_use]
    pub const fn normalized(&self) -> &GrayImage {
        &self.normalized
    }

    /// Extract the boundary rim and trace external contours.
    pub fn trace_contours(self) -> ContoursTraced {
        let boundary = crate::contour::boundary(&self.normalized);
        let contours = self.config.contour_tracer.trace(&boundary);
        debug!(contours = contours.len(), "traced contours");
        ContoursTraced {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            binary: self.binary,
            normalized: self.normalized,
            boundary,
            contours,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 4: ContoursTraced ───────────────────

/// Pipeline state after contour tracing.
#[must_use = "pipeline stages are consumed by advancing; call .approximate() to continue"]
pub struct ContoursTraced {
    config: PipelineConfig,
    original: RgbaImage,
    grayscale: GrayImage,
    binary: GrayImage,
    normalized: GrayImage,
    boundary: GrayImage,
    contours: Vec<Contour>,
    dimensions: Dimensions,
}

impl ContoursTraced {
    /// The boundary rim image.
    #[must_use]
    pub const fn boundary(&self) -> &GrayImage {
        &self.boundary
    }

    /// The traced contours, in discovery order.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Approximate every contour by a polygon.
    pub fn approximate(self) -> Approximated {
        let raw_vertices =
            crate::approximate::approximate_all(&self.contours, self.config.approx_ratio);
        debug!(
            ratio = self.config.approx_ratio,
            raw_vertices = raw_vertices.len(),
            "approximated contours"
        );
        Approximated {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            binary: self.binary,
            normalized: self.normalized,
            boundary: self.boundary,
            contours: self.contours,
            raw_vertices,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 5: Approximated ─────────────────────

/// Pipeline state after polygon approximation.
#[must_use = "pipeline stages are consumed by advancing; call .merge() to continue"]
pub struct Approximated {
    config: PipelineConfig,
    original: RgbaImage,
    grayscale: GrayImage,
    binary: GrayImage,
    normalized: GrayImage,
    boundary: GrayImage,
    contours: Vec<Contour>,
    raw_vertices: Vec<Point>,
    dimensions: Dimensions,
}

impl Approximated {
    /// The raw vertex set, before clustering.
    #[must_use]
    pub fn raw_vertices(&self) -> &[Point] {
        &self.raw_vertices
    }

    /// Cluster nearby vertices and keep one centroid per cluster.
    pub fn merge(self) -> Merged {
        let clusters = crate::cluster::cluster(&self.raw_vertices, self.config.cluster_epsilon);
        let vertices: Vec<Point> = clusters
            .iter()
            .map(|c| c.centroid(&self.raw_vertices))
            .collect();
        debug!(
            epsilon = self.config.cluster_epsilon,
            raw = self.raw_vertices.len(),
            merged = vertices.len(),
            "merged vertices"
        );
        Merged {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            binary: self.binary,
            normalized: self.normalized,
            boundary: self.boundary,
            contours: self.contours,
            raw_vertices: self.raw_vertices,
            clusters,
            vertices,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Stage 6: Merged ───────────────────────────

/// Pipeline state after clustering, the final stage.
#[must_use = "call .into_result() to extract the StagedResult"]
pub struct Merged {
    config: PipelineConfig,
    original: RgbaImage,
    grayscale: GrayImage,
    binary: GrayImage,
    normalized: GrayImage,
    boundary: GrayImage,
    contours: Vec<Contour>,
    raw_vertices: Vec<Point>,
    clusters: Vec<Cluster>,
    vertices: Vec<Point>,
    dimensions: Dimensions,
}

impl Merged {
    /// The merged vertex set.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// The clusters over the raw vertex set.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            original: self.original,
            grayscale: self.grayscale,
            binary: self.binary,
            normalized: self.normalized,
            boundary: self.boundary,
            contours: self.contours,
            raw_vertices: self.raw_vertices,
            clusters: self.clusters,
            vertices: self.vertices,
            dimensions: self.dimensions,
        }
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 7;

/// Trait implemented by every pipeline stage, enabling uniform iteration.
///
/// # Loop pattern
///
/// ```rust
/// # use floorvert_pipeline::{Pipeline, PipelineConfig, PipelineError};
/// # use floorvert_pipeline::pipeline::{Stage, Advance};
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let mut stage: Stage = Pipeline::new(png, PipelineConfig::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let result = stage.complete()?;
/// # Ok(())
/// # }
/// ```
pub trait PipelineStage: Sized {
    /// Human-readable name of this stage (e.g. `"source"`, `"merge"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Pending through `6` for
    /// Merged).
    const INDEX: usize;

    /// Metrics describing the work done to reach this state, or `None`
    /// for [`Pending`].
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage, or `Ok(None)` at the final stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the stage transition fails.
    fn next(self) -> Result<Option<Stage>, PipelineError>;

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    fn complete(self) -> Result<StagedResult, PipelineError>;
}

impl PipelineStage for Pending {
    const NAME: &str = "source";
    const INDEX: usize = 0;

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(Stage::Decoded(self.decode()?)))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.decode()?.complete()
    }
}

/// Stages that have done work and can always report metrics.
pub(crate) trait Measured {
    fn measure(&self) -> StageMetrics;
}

impl Measured for Decoded {
    fn measure(&self) -> StageMetrics {
        StageMetrics::Decode {
            input_bytes: self.source_len,
            width: self.dimensions.width,
            height: self.dimensions.height,
            pixel_count: u64::from(self.dimensions.width) * u64::from(self.dimensions.height),
        }
    }
}

impl Measured for Binarized {
    fn measure(&self) -> StageMetrics {
        StageMetrics::Binarize {
            threshold: self.config.threshold,
            ink_pixel_count: crate::binarize::count_ink(&self.binary),
            total_pixel_count: u64::from(self.binary.width()) * u64::from(self.binary.height()),
        }
    }
}

impl Measured for Normalized {
    fn measure(&self) -> StageMetrics {
        StageMetrics::Normalize {
            reduce_iterations: self.config.thickness_reduce_iterations,
            increase_iterations: self.config.thickness_increase_iterations,
            ink_pixels_before: crate::binarize::count_ink(&self.binary),
            ink_pixels_after: crate::binarize::count_ink(&self.normalized),
        }
    }
}

impl Measured for ContoursTraced {
    fn measure(&self) -> StageMetrics {
        let stats = crate::diagnostics::contour_stats(&self.contours);
        StageMetrics::ContourTracing {
            boundary_pixel_count: crate::binarize::count_ink(&self.boundary),
            contour_count: self.contours.len(),
            total_point_count: stats.total,
            min_contour_points: stats.min,
            max_contour_points: stats.max,
            mean_contour_points: stats.mean,
        }
    }
}

impl Measured for Approximated {
    fn measure(&self) -> StageMetrics {
        StageMetrics::Approximation {
            ratio: self.config.approx_ratio,
            points_before: self.contours.iter().map(Contour::len).sum(),
            vertex_count: self.raw_vertices.len(),
        }
    }
}

impl Measured for Merged {
    fn measure(&self) -> StageMetrics {
        StageMetrics::Clustering {
            epsilon: self.config.cluster_epsilon,
            raw_vertex_count: self.raw_vertices.len(),
            cluster_count: self.clusters.len(),
            largest_cluster: self.clusters.iter().map(Cluster::len).max().unwrap_or(0),
        }
    }
}

/// Implement [`PipelineStage`] for a measured stage, given its name,
/// index and the transition to the next stage.
macro_rules! measured_stage {
    ($stage:ident, $name:literal, $index:literal, |$s:ident| $next:expr, |$c:ident| $complete:expr) => {
        impl PipelineStage for $stage {
            const NAME: &str = $name;
            const INDEX: usize = $index;

            fn metrics(&self) -> Option<StageMetrics> {
                Some(self.measure())
            }

            fn next(self) -> Result<Option<Stage>, PipelineError> {
                let $s = self;
                $next
            }

            fn complete(self) -> Result<StagedResult, PipelineError> {
                let $c = self;
                $complete
            }
        }
    };
}

measured_stage!(
    Decoded,
    "decode",
    1,
    |s| Ok(Some(Stage::Binarized(s.binarize()?))),
    |s| s.binarize()?.complete()
);
measured_stage!(
    Binarized,
    "binarize",
    2,
    |s| Ok(Some(Stage::Normalized(s.normalize()?))),
    |s| s.normalize()?.complete()
);
measured_stage!(
    Normalized,
    "normalize",
    3,
    |s| Ok(Some(Stage::ContoursTraced(s.trace_contours()))),
    |s| s.trace_contours().complete()
);
measured_stage!(
    ContoursTraced,
    "contours",
    4,
    |s| Ok(Some(Stage::Approximated(s.approximate()))),
    |s| s.approximate().complete()
);
measured_stage!(
    Approximated,
    "approximate",
    5,
    |s| Ok(Some(Stage::Merged(s.merge()))),
    |s| s.merge().complete()
);
measured_stage!(
    Merged,
    "merge",
    6,
    |_s| Ok(None),
    |s| Ok(s.into_result())
);

/// Enum wrapping all pipeline stages for uniform, loopable access.
#[must_use]
pub enum Stage {
    /// See [`Pending`].
    Pending(Pending),
    /// See [`Decoded`].
    Decoded(Decoded),
    /// See [`Binarized`].
    Binarized(Binarized),
    /// See [`Normalized`].
    Normalized(Normalized),
    /// See [`ContoursTraced`].
    ContoursTraced(ContoursTraced),
    /// See [`Approximated`].
    Approximated(Approximated),
    /// See [`Merged`].
    Merged(Merged),
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance {
    /// The pipeline advanced to this next stage.
    Next(Stage),
    /// The pipeline was already at the final stage.
    Complete(Stage),
}

/// Delegate a method call to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Pending(s) => s.$method($($arg),*),
            Self::Decoded(s) => s.$method($($arg),*),
            Self::Binarized(s) => s.$method($($arg),*),
            Self::Normalized(s) => s.$method($($arg),*),
            Self::ContoursTraced(s) => s.$method($($arg),*),
            Self::Approximated(s) => s.$method($($arg),*),
            Self::Merged(s) => s.$method($($arg),*),
        }
    };
}

impl Stage {
    /// Human-readable name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// Stage-specific metrics for diagnostics.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Merged(_))
    }

    /// Advance to the next stage, or `Ok(None)` if already complete.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn next(self) -> Result<Option<Self>, PipelineError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, returning `self` unchanged if
    /// already complete.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn advance(self) -> Result<Advance, PipelineError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Only the final stage returns `None` from `next()`.
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-final stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    pub fn complete(self) -> Result<StagedResult, PipelineError> {
        delegate!(self, complete)
    }
}

// `PipelineStage` constants are not callable through `self`, so the
// delegate macro goes through this helper.
trait StageMetadata {
    fn name(&self) -> &'static str;
    fn index(&self) -> usize;
}

impl<T: PipelineStage> StageMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn index(&self) -> usize {
        T::INDEX
    }
}

macro_rules! stage_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Stage {
                fn from(s: $variant) -> Self {
                    Self::$variant(s)
                }
            }
        )*
    };
}

stage_from!(
    Pending,
    Decoded,
    Binarized,
    Normalized,
    ContoursTraced,
    Approximated,
    Merged
);

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental floorplan vertex extraction pipeline.
///
/// Created via [`Pipeline::new`], which stores the source image and
/// config without doing any processing. Each stage method consumes the
/// current state and returns the next, so stages cannot be skipped or
/// run out of order.
pub struct Pipeline;

impl Pipeline {
    /// Store the source bytes and configuration. No processing is
    /// performed until [`.decode()`](Pending::decode) is called.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: PipelineConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }
}
