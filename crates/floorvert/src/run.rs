//! One end-to-end run: read the floorplan, extract vertices, and write
//! every artifact.
//!
//! Only reading the input, the pipeline itself and the core artifacts
//! (listing, overlays, cleaned rasters, diagnostic SVG) can fail a run.
//! Tracing and typesetting are best-effort: a failure is logged and
//! skips just the artifacts that depend on it.

use std::path::{Path, PathBuf};

use floorvert_export::{
    BlenderParams, ReportParams, SvgMetadata, to_blender_script, to_diagnostic_svg,
    to_typst_report, to_vertex_listing,
};
use floorvert_pipeline::diagnostics::{Clock, PipelineDiagnostics, process_staged_with_diagnostics};
use floorvert_pipeline::{PipelineConfig, ProcessResult, StagedResult, crop, overlay};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::location::OutputPaths;
use crate::vectorize::{Typesetter, Vectorizer};

/// Radius of the merged-vertex markers.
const MERGED_RADIUS: i32 = 2;

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output_root: PathBuf,
    pub app: AppConfig,
    pub pipeline: PipelineConfig,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub result: ProcessResult,
    pub diagnostics: PipelineDiagnostics,
    pub paths: OutputPaths,
    /// Set when the vectorizer succeeded.
    pub traced_svg: Option<PathBuf>,
    /// Set when the typesetter compiled the report.
    pub report_compiled: bool,
}

/// Run the pipeline on `options.input` and write its artifacts.
///
/// Pass `None` for `vectorizer` to skip tracing; the Blender script and
/// the report depend on the trace and are skipped with it. Pass `None`
/// for `typesetter` to write the report without compiling it.
///
/// # Errors
///
/// Returns [`AppError`] if the input cannot be read, the pipeline
/// rejects it, or a core artifact cannot be written.
pub fn run<C: Clock>(
    options: &RunOptions,
    clock: &C,
    vectorizer: Option<&dyn Vectorizer>,
    typesetter: Option<&dyn Typesetter>,
) -> Result<RunSummary, AppError> {
    let paths = OutputPaths::new(&options.input, &options.output_root);

    let bytes = std::fs::read(&paths.input).map_err(AppError::io(&paths.input))?;
    tracing::info!(input = %paths.input.display(), bytes = bytes.len(), "processing");

    let (staged, diagnostics) = process_staged_with_diagnostics(&bytes, &options.pipeline, clock)?;
    tracing::debug!("\n{}", diagnostics.report());
    tracing::info!(
        raw = staged.raw_vertices.len(),
        merged = staged.vertices.len(),
        "detected vertices"
    );
    // Nothing is written for input the pipeline rejects.
    paths.create_dirs().map_err(AppError::io(&paths.root))?;
    if staged.vertices.is_empty() {
        tracing::warn!("no vertices found; check the threshold and thickness settings");
    }

    write_text(&paths.vertex_listing, &to_vertex_listing(&staged.vertices))?;
    tracing::info!(path = %paths.vertex_listing.display(), "saved vertex coordinates");

    write_rasters(&staged, &paths)?;

    let description = describe(&options.pipeline);
    let config_json = serde_json::to_string(&options.pipeline).ok();
    let title = paths
        .input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned());
    let svg = to_diagnostic_svg(
        &staged.contours,
        &staged.vertices,
        staged.dimensions,
        &SvgMetadata {
            title: title.as_deref(),
            description: Some(&description),
            config_json: config_json.as_deref(),
        },
    );
    write_text(&paths.diagnostic_svg, &svg)?;

    let traced_svg = vectorizer.and_then(|v| trace(v, &paths));
    let mut report_compiled = false;
    if let Some(traced) = &traced_svg {
        write_blender_and_report(options, &staged, &paths, traced)?;
        report_compiled = typesetter.is_some_and(|t| compile(t, &paths.report));
    }

    Ok(RunSummary {
        result: staged.into_process_result(),
        diagnostics,
        paths,
        traced_svg,
        report_compiled,
    })
}

fn write_text(path: &Path, contents: &str) -> Result<(), AppError> {
    std::fs::write(path, contents).map_err(AppError::io(path))
}

fn describe(config: &PipelineConfig) -> String {
    format!(
        "threshold={} reduce={} increase={} epsilon={} ratio={}",
        config.threshold,
        config.thickness_reduce_iterations,
        config.thickness_increase_iterations,
        config.cluster_epsilon,
        config.approx_ratio,
    )
}

/// Input copy, vertex overlays, cleaned mask and the tracing bitmap.
fn write_rasters(staged: &StagedResult, paths: &OutputPaths) -> Result<(), AppError> {
    let save_rgba = |img: &floorvert_pipeline::RgbaImage, path: &Path| {
        img.save(path).map_err(AppError::encode(path))
    };
    let save_gray = |img: &floorvert_pipeline::GrayImage, path: &Path| {
        img.save(path).map_err(AppError::encode(path))
    };

    save_rgba(&staged.original, &paths.input_copy)?;

    let raw = overlay::draw_vertices(
        &staged.original,
        &staged.raw_vertices,
        overlay::DEFAULT_RADIUS,
        overlay::MAGENTA,
    );
    save_rgba(&raw, &paths.raw_vertices)?;
    let merged = overlay::draw_vertices(
        &staged.original,
        &staged.vertices,
        MERGED_RADIUS,
        overlay::MAGENTA,
    );
    save_rgba(&merged, &paths.merged_vertices)?;

    // Dark walls on white, like the input.
    let mut clean = staged.normalized.clone();
    image::imageops::invert(&mut clean);
    save_gray(&clean, &paths.clean_background)?;

    match crop::crop_for_tracing(&staged.normalized) {
        Some(cropped) => {
            save_gray(&cropped, &paths.cropped_bitmap)?;
            save_gray(&cropped, &paths.cropped_png)?;
        }
        None => tracing::warn!("mask has no walls to crop"),
    }
    Ok(())
}

/// Trace the cropped bitmap and make sure the result sits at
/// [`OutputPaths::traced_svg`], where the report expects it.
fn trace(vectorizer: &dyn Vectorizer, paths: &OutputPaths) -> Option<PathBuf> {
    if !paths.cropped_bitmap.is_file() {
        return None;
    }
    let svg = match vectorizer.trace(&paths.cropped_bitmap) {
        Ok(svg) => svg,
        Err(e) => {
            tracing::warn!("tracing failed, skipping Blender script and report: {e}");
            return None;
        }
    };
    if svg != paths.traced_svg {
        tracing::debug!(from = %svg.display(), to = %paths.traced_svg.display(), "moving trace");
        if let Err(e) = std::fs::copy(&svg, &paths.traced_svg) {
            tracing::warn!(
                "cannot copy trace {} into place, skipping Blender script and report: {e}",
                svg.display()
            );
            return None;
        }
    }
    tracing::info!(path = %paths.traced_svg.display(), "traced outline");
    Some(paths.traced_svg.clone())
}

fn compile(typesetter: &dyn Typesetter, report: &Path) -> bool {
    match typesetter.compile(report) {
        Ok(()) => {
            tracing::info!(path = %report.display(), "compiled report");
            true
        }
        Err(e) => {
            tracing::warn!("report compilation failed: {e}");
            false
        }
    }
}

fn write_blender_and_report(
    options: &RunOptions,
    staged: &StagedResult,
    paths: &OutputPaths,
    traced: &Path,
) -> Result<(), AppError> {
    let svg_path = std::path::absolute(traced).map_err(AppError::io(traced))?;
    let script = to_blender_script(&BlenderParams {
        svg_path: &svg_path,
        scale: options.app.scale,
        height: options.app.height,
    });
    write_text(&paths.blender_script, &script)?;
    tracing::info!(path = %paths.blender_script.display(), "saved Blender script");

    let traced_svg = std::fs::read_to_string(traced).map_err(AppError::io(traced))?;
    let listing = to_vertex_listing(&staged.vertices);
    let now = chrono::Local::now();
    let time = now.format("%H:%M:%S").to_string();
    let date = now.format("%Y-%m-%d").to_string();
    let filename = paths
        .input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let report = to_typst_report(&ReportParams {
        version: env!("CARGO_PKG_VERSION"),
        time: &time,
        date: &date,
        filename: &filename,
        threshold: options.pipeline.threshold,
        reduce_iterations: options.pipeline.thickness_reduce_iterations,
        increase_iterations: options.pipeline.thickness_increase_iterations,
        scale: options.app.scale,
        height: options.app.height,
        dimensions: staged.dimensions,
        vertex_listing: &listing,
        traced_svg: &traced_svg,
        blender_script: &script,
    });
    write_text(&paths.report, &report)?;
    tracing::info!(path = %paths.report.display(), "saved report");
    Ok(())
}
