//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Intended for parameter tuning. A floorplan that comes out with too
//! many or too few corners is usually explained by one of these
//! numbers: ink coverage after thresholding, how much normalization
//! grew or shrank the walls, or how many raw vertices each cluster
//! absorbed.
//!
//! Time is read through the [`Clock`] trait so the core stays free of
//! platform time sources; the CLI supplies an `Instant`-backed clock.
//!
//! Durations are serialized as fractional seconds (`f64`) since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Measured, Pipeline};
use crate::types::{Contour, PipelineConfig, PipelineError, StagedResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Image decoding and grayscale conversion.
    pub decode: StageDiagnostics,
    /// Thresholding.
    pub binarize: StageDiagnostics,
    /// Thickness normalization and blank guard.
    pub normalize: StageDiagnostics,
    /// Boundary extraction and contour tracing.
    pub contour_tracing: StageDiagnostics,
    /// Polygon approximation.
    pub approximation: StageDiagnostics,
    /// Vertex clustering.
    pub clustering: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Thresholding metrics.
    Binarize {
        /// Intensity cutoff used.
        threshold: u8,
        /// Pixels classified as wall ink.
        ink_pixel_count: u64,
        /// Total pixel count for computing ink coverage.
        total_pixel_count: u64,
    },
    /// Thickness normalization metrics.
    Normalize {
        /// Dilation passes.
        reduce_iterations: u32,
        /// Erosion passes.
        increase_iterations: u32,
        /// Ink pixels in the thresholded mask.
        ink_pixels_before: u64,
        /// Ink pixels in the normalized mask.
        ink_pixels_after: u64,
    },
    /// Contour tracing metrics.
    ContourTracing {
        /// Pixels on the boundary rim.
        boundary_pixel_count: u64,
        /// Number of external contours found.
        contour_count: usize,
        /// Total number of points across all contours.
        total_point_count: usize,
        /// Minimum points in any single contour.
        min_contour_points: usize,
        /// Maximum points in any single contour.
        max_contour_points: usize,
        /// Mean points per contour.
        mean_contour_points: f64,
    },
    /// Polygon approximation metrics.
    Approximation {
        /// Tolerance as a fraction of each contour's perimeter.
        ratio: f64,
        /// Contour points before approximation.
        points_before: usize,
        /// Raw vertices after approximation.
        vertex_count: usize,
    },
    /// Clustering metrics.
    Clustering {
        /// Merge radius in pixels.
        epsilon: f64,
        /// Vertices before clustering.
        raw_vertex_count: usize,
        /// Clusters (and therefore merged vertices).
        cluster_count: usize,
        /// Members in the largest cluster.
        largest_cluster: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of external contours.
    pub contour_count: usize,
    /// Vertices before clustering.
    pub raw_vertex_count: usize,
    /// Vertices after clustering.
    pub vertex_count: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Binarize", &self.binarize),
            ("Normalize", &self.normalize),
            ("Contour Tracing", &self.contour_tracing),
            ("Approximation", &self.approximation),
            ("Clustering", &self.clustering),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Contours: {}  |  Raw vertices: {}  |  Merged vertices: {}",
            self.summary.contour_count, self.summary.raw_vertex_count, self.summary.vertex_count,
        ));

        lines.join("\n")
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Binarize {
            threshold,
            ink_pixel_count,
            total_pixel_count,
        } => format!(
            "threshold={threshold} ink={ink_pixel_count} ({:.1}%)",
            percent(*ink_pixel_count, *total_pixel_count),
        ),
        StageMetrics::Normalize {
            reduce_iterations,
            increase_iterations,
            ink_pixels_before,
            ink_pixels_after,
        } => format!(
            "dilate={reduce_iterations} erode={increase_iterations} ink={ink_pixels_before}->{ink_pixels_after}",
        ),
        StageMetrics::ContourTracing {
            boundary_pixel_count,
            contour_count,
            total_point_count,
            min_contour_points,
            max_contour_points,
            mean_contour_points,
        } => format!(
            "rim={boundary_pixel_count} {contour_count} contours, {total_point_count} pts (min={min_contour_points} max={max_contour_points} mean={mean_contour_points:.1})",
        ),
        StageMetrics::Approximation {
            ratio,
            points_before,
            vertex_count,
        } => format!("ratio={ratio} {points_before}->{vertex_count} pts"),
        StageMetrics::Clustering {
            epsilon,
            raw_vertex_count,
            cluster_count,
            largest_cluster,
        } => format!(
            "eps={epsilon:.1} {raw_vertex_count}->{cluster_count} vertices (largest={largest_cluster})",
        ),
    }
}

/// Statistics for a set of contours.
pub(crate) struct ContourStats {
    pub total: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

pub(crate) fn contour_stats(contours: &[Contour]) -> ContourStats {
    let total: usize = contours.iter().map(Contour::len).sum();
    let min = contours.iter().map(Contour::len).min().unwrap_or(0);
    let max = contours.iter().map(Contour::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if contours.is_empty() {
        0.0
    } else {
        total as f64 / contours.len() as f64
    };
    ContourStats {
        total,
        min,
        max,
        mean,
    }
}

/// Run the full pipeline, timing every stage with `clock`.
///
/// # Errors
///
/// Same as [`process_staged`](crate::process_staged).
pub fn process_staged_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let start = clock.now();

    let t = clock.now();
    let decoded = Pipeline::new(image_bytes.to_vec(), config.clone()).decode()?;
    let decode = timed(&decoded, clock.elapsed(&t));

    let t = clock.now();
    let binarized = decoded.binarize()?;
    let binarize = timed(&binarized, clock.elapsed(&t));

    let t = clock.now();
    let normalized = binarized.normalize()?;
    let normalize = timed(&normalized, clock.elapsed(&t));

    let t = clock.now();
    let traced = normalized.trace_contours();
    let contour_tracing = timed(&traced, clock.elapsed(&t));

    let t = clock.now();
    let approximated = traced.approximate();
    let approximation = timed(&approximated, clock.elapsed(&t));

    let t = clock.now();
    let merged = approximated.merge();
    let clustering = timed(&merged, clock.elapsed(&t));

    let staged = merged.into_result();
    let total_duration = clock.elapsed(&start);

    let summary = PipelineSummary {
        image_width: staged.dimensions.width,
        image_height: staged.dimensions.height,
        pixel_count: u64::from(staged.dimensions.width) * u64::from(staged.dimensions.height),
        contour_count: staged.contours.len(),
        raw_vertex_count: staged.raw_vertices.len(),
        vertex_count: staged.vertices.len(),
    };

    Ok((
        staged,
        PipelineDiagnostics {
            decode,
            binarize,
            normalize,
            contour_tracing,
            approximation,
            clustering,
            total_duration,
            summary,
        },
    ))
}

fn timed(stage: &impl Measured, duration: Duration) -> StageDiagnostics {
    StageDiagnostics {
        duration,
        metrics: stage.measure(),
    }
}
