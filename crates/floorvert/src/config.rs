//! Run configuration loaded from `config.json`.
//!
//! The file keeps the key names used by earlier releases of the tool so
//! existing configs keep working. Keys that are absent fall back to the
//! pipeline defaults.

use std::path::{Path, PathBuf};

use floorvert_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Directory that bare `filename` entries are resolved against.
pub const INPUT_DIR: &str = "input";

const POTRACE_DOWNLOAD: &str = "https://potrace.sourceforge.io/#downloading";
const TYPST_DOWNLOAD: &str = "https://github.com/typst/typst/releases/latest";

/// Contents of `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Image under [`INPUT_DIR`] to process.
    pub filename: String,
    pub threshold_value: u8,
    pub thickness_reduction_iterations: u32,
    pub thickness_increase_iterations: u32,
    pub cluster_epsilon: f64,
    /// Potrace executable, either a path or a name looked up on `PATH`.
    pub potrace_path: PathBuf,
    /// Typst executable, either a path or a name looked up on `PATH`.
    pub typst_path: PathBuf,
    /// Horizontal scale applied by the Blender script.
    pub scale: f64,
    /// Wall height used by the Blender script.
    pub height: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filename: String::new(),
            threshold_value: PipelineConfig::DEFAULT_THRESHOLD,
            thickness_reduction_iterations: PipelineConfig::DEFAULT_THICKNESS_REDUCE_ITERATIONS,
            thickness_increase_iterations: PipelineConfig::DEFAULT_THICKNESS_INCREASE_ITERATIONS,
            cluster_epsilon: PipelineConfig::DEFAULT_CLUSTER_EPSILON,
            potrace_path: PathBuf::from("potrace"),
            typst_path: PathBuf::from("typst"),
            scale: 1.0,
            height: 3.0,
        }
    }
}

impl AppConfig {
    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConfigRead`] if the file cannot be read and
    /// [`AppError::ConfigParse`] if it is not valid config JSON.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given; otherwise [`DEFAULT_CONFIG_PATH`] when it
    /// exists, else defaults.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_PATH}, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Pipeline parameters carried by this config.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            threshold: self.threshold_value,
            thickness_reduce_iterations: self.thickness_reduction_iterations,
            thickness_increase_iterations: self.thickness_increase_iterations,
            cluster_epsilon: self.cluster_epsilon,
            ..PipelineConfig::default()
        }
    }

    /// `input/<filename>`, or `None` when no filename is configured.
    #[must_use]
    pub fn input_path(&self) -> Option<PathBuf> {
        (!self.filename.is_empty()).then(|| Path::new(INPUT_DIR).join(&self.filename))
    }

    /// Names of the external tools whose configured executable is not
    /// usable.
    ///
    /// An executable counts as usable when its file name names the tool
    /// and, if it is given as a path rather than a bare name, the file
    /// exists.
    #[must_use]
    pub fn missing_executables(&self) -> Vec<&'static str> {
        [("potrace", &self.potrace_path), ("typst", &self.typst_path)]
            .into_iter()
            .filter(|(tool, exe)| !executable_looks_usable(exe, tool))
            .map(|(tool, _)| tool)
            .collect()
    }

    /// Log the loaded configuration.
    pub fn log(&self) {
        tracing::info!(
            filename = %self.filename,
            threshold = self.threshold_value,
            reduce_iterations = self.thickness_reduction_iterations,
            increase_iterations = self.thickness_increase_iterations,
            cluster_epsilon = self.cluster_epsilon,
            "read configuration"
        );
        tracing::debug!(
            potrace = %self.potrace_path.display(),
            typst = %self.typst_path.display(),
            scale = self.scale,
            height = self.height,
            "external tools"
        );
    }
}

/// Log where to get each missing tool.
pub fn log_missing_executables(missing: &[&str]) {
    for tool in missing {
        let url = if *tool == "potrace" {
            POTRACE_DOWNLOAD
        } else {
            TYPST_DOWNLOAD
        };
        tracing::error!("set the path of the `{tool}` executable in the config");
        tracing::info!("download {tool} from {url}");
    }
}

fn executable_looks_usable(exe: &Path, tool: &str) -> bool {
    let named = exe
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.to_ascii_lowercase().starts_with(tool));
    let bare = exe.components().count() == 1;
    named && (bare || exe.is_file())
}
