//! Errors surfaced by the command-line front end.

use std::path::PathBuf;

use floorvert_pipeline::PipelineError;

/// Anything that stops a run before the vertex listing is written.
///
/// Vectorizer and typesetter failures are not in this list: they are
/// logged and only skip the artifacts that depend on them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid --config-json: {0}")]
    ConfigJson(#[source] serde_json::Error),

    /// No input image was named on the command line or in the config.
    #[error("no input image: pass a path or set `filename` in the config")]
    NoInput,

    #[error("external tools not configured: {}", .0.join(", "))]
    MissingExecutables(Vec<&'static str>),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write image {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn encode(path: impl Into<PathBuf>) -> impl FnOnce(image::ImageError) -> Self {
        let path = path.into();
        move |source| Self::Encode { path, source }
    }
}
