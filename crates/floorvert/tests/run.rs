//! End-to-end runs against a temporary directory with stand-in tools.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use floorvert::{
    AppConfig, AppError, RunOptions, Typesetter, VectorizeError, Vectorizer, run,
};
use floorvert_pipeline::diagnostics::Clock;
use floorvert_pipeline::{PipelineConfig, PipelineError};
use image::{GrayImage, Luma};

/// Clock that never advances.
struct FrozenClock;

impl Clock for FrozenClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// Writes a minimal SVG where Potrace would.
struct FakePotrace;

impl Vectorizer for FakePotrace {
    fn trace(&self, bitmap: &Path) -> Result<PathBuf, VectorizeError> {
        let svg = bitmap.with_extension("svg");
        std::fs::write(&svg, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>\n").unwrap();
        Ok(svg)
    }
}

/// Writes its SVG beside the bitmap under a different name.
struct OffsetPotrace;

impl Vectorizer for OffsetPotrace {
    fn trace(&self, bitmap: &Path) -> Result<PathBuf, VectorizeError> {
        let svg = bitmap.with_file_name("elsewhere.svg");
        std::fs::write(&svg, "<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"offset\"/>\n")
            .unwrap();
        Ok(svg)
    }
}

/// Fails like a missing executable.
struct BrokenPotrace;

impl Vectorizer for BrokenPotrace {
    fn trace(&self, _bitmap: &Path) -> Result<PathBuf, VectorizeError> {
        Err(VectorizeError::Launch {
            program: PathBuf::from("potrace"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

/// Records which documents it was asked to compile.
#[derive(Default)]
struct RecordingTypst {
    compiled: RefCell<Vec<PathBuf>>,
}

impl Typesetter for RecordingTypst {
    fn compile(&self, document: &Path) -> Result<(), VectorizeError> {
        self.compiled.borrow_mut().push(document.to_path_buf());
        Ok(())
    }
}

/// Two rooms sharing a wall, 6 px strokes.
fn write_plan(dir: &Path) -> PathBuf {
    let img = GrayImage::from_fn(120, 80, |x, y| {
        let outline = (10..110).contains(&x) && (10..70).contains(&y);
        let left = (16..57).contains(&x) && (16..64).contains(&y);
        let right = (63..104).contains(&x) && (16..64).contains(&y);
        if outline && !left && !right {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    let path = dir.join("plan.png");
    img.save(&path).unwrap();
    path
}

fn options(dir: &Path, input: PathBuf) -> RunOptions {
    let app = AppConfig::default();
    RunOptions {
        input,
        output_root: dir.join("output"),
        pipeline: app.pipeline_config(),
        app,
    }
}

#[test]
fn full_run_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), write_plan(dir.path()));
    let typst = RecordingTypst::default();

    let summary = run(&opts, &FrozenClock, Some(&FakePotrace), Some(&typst)).unwrap();
    let paths = &summary.paths;

    assert_eq!(paths.root, dir.path().join("output").join("plan"));
    for artifact in [
        &paths.input_copy,
        &paths.clean_background,
        &paths.cropped_bitmap,
        &paths.cropped_png,
        &paths.traced_svg,
        &paths.raw_vertices,
        &paths.merged_vertices,
        &paths.diagnostic_svg,
        &paths.report,
        &paths.vertex_listing,
        &paths.blender_script,
    ] {
        assert!(artifact.is_file(), "missing {}", artifact.display());
    }

    assert_eq!(summary.result.vertices.len(), 4);
    assert_eq!(summary.traced_svg.as_ref(), Some(&paths.traced_svg));
    assert!(summary.report_compiled);
    assert_eq!(*typst.compiled.borrow(), [paths.report.clone()]);
}

#[test]
fn listing_matches_result() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), write_plan(dir.path()));
    let summary = run(&opts, &FrozenClock, None, None).unwrap();

    let listing = std::fs::read_to_string(&summary.paths.vertex_listing).unwrap();
    assert_eq!(
        listing,
        floorvert_export::to_vertex_listing(&summary.result.vertices)
    );
}

#[test]
fn blender_script_points_at_absolute_trace() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), write_plan(dir.path()));
    let summary = run(&opts, &FrozenClock, Some(&FakePotrace), None).unwrap();

    let script = std::fs::read_to_string(&summary.paths.blender_script).unwrap();
    let traced = std::path::absolute(&summary.paths.traced_svg).unwrap();
    let expected = traced.to_string_lossy().replace('\\', "/");
    assert!(script.contains(&expected), "{script}");
    assert!(!summary.report_compiled);
}

#[test]
fn report_embeds_listing() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), write_plan(dir.path()));
    let summary = run(&opts, &FrozenClock, Some(&FakePotrace), None).unwrap();

    let report = std::fs::read_to_string(&summary.paths.report).unwrap();
    let listing = std::fs::read_to_string(&summary.paths.vertex_listing).unwrap();
    assert!(report.contains(listing.trim_end()));
    assert!(report.contains("`plan.png`, 120 × 80 px"));
}

#[test]
fn tracing_failure_skips_dependent_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), write_plan(dir.path()));
    let typst = RecordingTypst::default();

    let summary = run(&opts, &FrozenClock, Some(&BrokenPotrace), Some(&typst)).unwrap();

    assert!(summary.traced_svg.is_none());
    assert!(!summary.paths.blender_script.exists());
    assert!(!summary.paths.report.exists());
    assert!(typst.compiled.borrow().is_empty());
    // The vertex set is unaffected.
    assert!(summary.paths.vertex_listing.is_file());
    assert_eq!(summary.result.vertices.len(), 4);
}

#[test]
fn trace_written_elsewhere_is_moved_into_place() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), write_plan(dir.path()));
    let summary = run(&opts, &FrozenClock, Some(&OffsetPotrace), None).unwrap();
    let paths = &summary.paths;

    assert_eq!(summary.traced_svg.as_ref(), Some(&paths.traced_svg));
    let traced = std::fs::read_to_string(&paths.traced_svg).unwrap();
    assert!(traced.contains("id=\"offset\""), "{traced}");
    let report = std::fs::read_to_string(&paths.report).unwrap();
    assert!(report.contains("id=\"offset\""));
}

#[test]
fn clean_background_has_dark_walls() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), write_plan(dir.path()));
    let summary = run(&opts, &FrozenClock, None, None).unwrap();

    let clean = image::open(&summary.paths.clean_background)
        .unwrap()
        .into_luma8();
    assert_eq!(clean.dimensions(), (120, 80));
    assert_eq!(clean.get_pixel(12, 40).0[0], 0);
    assert_eq!(clean.get_pixel(2, 2).0[0], 255);
}

#[test]
fn blank_image_fails_before_writing_listing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("blank.png");
    GrayImage::from_pixel(40, 40, Luma([255])).save(&input).unwrap();
    let opts = options(dir.path(), input);

    let err = run(&opts, &FrozenClock, None, None).unwrap_err();
    assert!(matches!(err, AppError::Pipeline(PipelineError::BlankMask)), "{err}");
    assert!(!opts.output_root.join("blank").exists());
}

#[test]
fn undecodable_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage.png");
    std::fs::write(&input, b"not an image").unwrap();
    let opts = options(dir.path(), input);

    let err = run(&opts, &FrozenClock, None, None).unwrap_err();
    assert!(matches!(err, AppError::Pipeline(PipelineError::ImageDecode(_))), "{err}");
    assert!(!opts.output_root.join("garbage").exists());
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), dir.path().join("absent.png"));
    let err = run(&opts, &FrozenClock, None, None).unwrap_err();
    assert!(matches!(err, AppError::Io { .. }), "{err}");
    assert!(!opts.output_root.join("absent").exists());
}

#[test]
fn invalid_pipeline_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), write_plan(dir.path()));
    opts.pipeline = PipelineConfig {
        cluster_epsilon: f64::NAN,
        ..PipelineConfig::default()
    };
    let err = run(&opts, &FrozenClock, None, None).unwrap_err();
    assert!(matches!(err, AppError::Pipeline(PipelineError::InvalidConfig(_))), "{err}");
}
