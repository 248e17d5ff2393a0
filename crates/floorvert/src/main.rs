//! floorvert: extract wall vertices from a floorplan image.
//!
//! Reads `config.json` (or `--config`), runs the vertex pipeline on the
//! configured image, and writes the vertex listing, overlays, a Blender
//! script and a Typst report under `output/<image name>/`.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin floorvert -- [OPTIONS] [IMAGE_PATH]
//! ```

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use floorvert::{AppConfig, AppError, Potrace, RunOptions, Typesetter, Typst, Vectorizer};
use floorvert_pipeline::diagnostics::Clock;
use floorvert_pipeline::{PipelineConfig, PipelineError};
use tracing_subscriber::EnvFilter;

/// Extract wall vertices from a floorplan image.
///
/// Command-line values override the config file.
#[derive(Parser)]
#[command(name = "floorvert", version)]
struct Cli {
    /// Floorplan image. Defaults to `input/<filename>` from the config.
    image_path: Option<PathBuf>,

    /// Config file [default: config.json when present].
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving `<image name>/` output folders.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Binarization threshold: darker pixels are walls.
    #[arg(long)]
    threshold: Option<u8>,

    /// Thickness reduction passes.
    #[arg(long)]
    reduce_iterations: Option<u32>,

    /// Thickness increase passes.
    #[arg(long)]
    increase_iterations: Option<u32>,

    /// Vertex merge distance in pixels.
    #[arg(long)]
    cluster_epsilon: Option<f64>,

    /// Polygon approximation tolerance as a fraction of contour length.
    #[arg(long)]
    approx_ratio: Option<f64>,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags and config
    /// file values are ignored.
    #[arg(long)]
    config_json: Option<String>,

    /// Skip Potrace and Typst; the Blender script and report are not
    /// written.
    #[arg(long)]
    skip_vectorize: bool,

    /// Print the result (or the failure) as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Log per-stage diagnostics.
    #[arg(short, long)]
    verbose: bool,
}

/// Layer command-line overrides onto the file config.
fn apply_overrides(cli: &Cli, mut app: AppConfig) -> AppConfig {
    if let Some(v) = cli.threshold {
        app.threshold_value = v;
    }
    if let Some(v) = cli.reduce_iterations {
        app.thickness_reduction_iterations = v;
    }
    if let Some(v) = cli.increase_iterations {
        app.thickness_increase_iterations = v;
    }
    if let Some(v) = cli.cluster_epsilon {
        app.cluster_epsilon = v;
    }
    app
}

/// Build the [`PipelineConfig`] for this run.
///
/// If `--config-json` is provided it is parsed directly and every other
/// pipeline parameter is ignored.
fn pipeline_config(cli: &Cli, app: &AppConfig) -> Result<PipelineConfig, AppError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(AppError::ConfigJson);
    }
    let mut config = app.pipeline_config();
    if let Some(ratio) = cli.approx_ratio {
        config.approx_ratio = ratio;
    }
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&cli, &e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<(), AppError> {
    let app = apply_overrides(cli, AppConfig::load_or_default(cli.config.as_deref())?);
    app.log();

    if !cli.skip_vectorize {
        let missing = app.missing_executables();
        if !missing.is_empty() {
            floorvert::config::log_missing_executables(&missing);
            return Err(AppError::MissingExecutables(missing));
        }
    }

    let pipeline = pipeline_config(cli, &app)?;
    let input = cli
        .image_path
        .clone()
        .or_else(|| app.input_path())
        .ok_or(AppError::NoInput)?;

    let potrace = Potrace {
        executable: app.potrace_path.clone(),
    };
    let typst = Typst {
        executable: app.typst_path.clone(),
    };
    let (vectorizer, typesetter): (Option<&dyn Vectorizer>, Option<&dyn Typesetter>) =
        if cli.skip_vectorize {
            (None, None)
        } else {
            (Some(&potrace as &dyn Vectorizer), Some(&typst as &dyn Typesetter))
        };

    let options = RunOptions {
        input,
        output_root: cli.output_dir.clone(),
        app,
        pipeline,
    };
    let summary = floorvert::run(&options, &StdClock, vectorizer, typesetter)?;
    tracing::info!(
        vertices = summary.result.vertices.len(),
        total_ms = summary.diagnostics.total_duration.as_secs_f64() * 1000.0,
        output = %summary.paths.root.display(),
        "done"
    );

    if cli.json {
        match serde_json::to_string_pretty(&summary.result) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("failed to serialize result: {e}"),
        }
    }
    Ok(())
}

fn report_failure(cli: &Cli, err: &AppError) {
    tracing::error!("{err}");
    if let AppError::Pipeline(pipeline_err) = err {
        if matches!(pipeline_err, PipelineError::BlankMask) {
            tracing::info!(
                "try lowering --threshold or --reduce-iterations so walls survive normalization"
            );
        }
        if cli.json {
            match serde_json::to_string_pretty(pipeline_err) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("failed to serialize error: {e}"),
            }
        }
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
