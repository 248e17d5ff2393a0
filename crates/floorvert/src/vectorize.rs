//! External tool collaborators: the bitmap vectorizer and the report
//! typesetter.
//!
//! Both are capability traits so the run can be exercised without the
//! tools installed. The production implementations shell out to
//! Potrace and Typst.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Failure of an external tool run.
#[derive(Debug, thiserror::Error)]
pub enum VectorizeError {
    #[error("failed to launch {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {stderr}", program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{} produced no output at {}", program.display(), expected.display())]
    MissingOutput { program: PathBuf, expected: PathBuf },
}

/// Turns a bitmap into a vector outline.
pub trait Vectorizer {
    /// Trace `bitmap`, returning the path of the SVG written.
    ///
    /// # Errors
    ///
    /// Returns [`VectorizeError`] if the tool cannot be launched, fails,
    /// or leaves no output behind.
    fn trace(&self, bitmap: &Path) -> Result<PathBuf, VectorizeError>;
}

/// Compiles a generated report document.
pub trait Typesetter {
    /// Compile `document` in place.
    ///
    /// # Errors
    ///
    /// Returns [`VectorizeError`] if the tool cannot be launched or fails.
    fn compile(&self, document: &Path) -> Result<(), VectorizeError>;
}

/// Potrace, invoked as `<executable> <bitmap> -b svg`.
///
/// Potrace writes `<bitmap stem>.svg` next to the bitmap.
#[derive(Debug, Clone)]
pub struct Potrace {
    pub executable: PathBuf,
}

impl Vectorizer for Potrace {
    fn trace(&self, bitmap: &Path) -> Result<PathBuf, VectorizeError> {
        let mut command = Command::new(&self.executable);
        command.arg(bitmap).args(["-b", "svg"]);
        run(&self.executable, &mut command)?;

        let expected = bitmap.with_extension("svg");
        if !expected.is_file() {
            return Err(VectorizeError::MissingOutput {
                program: self.executable.clone(),
                expected,
            });
        }
        Ok(expected)
    }
}

/// Typst, invoked as `<executable> compile <document>`.
#[derive(Debug, Clone)]
pub struct Typst {
    pub executable: PathBuf,
}

impl Typesetter for Typst {
    fn compile(&self, document: &Path) -> Result<(), VectorizeError> {
        let mut command = Command::new(&self.executable);
        command.arg("compile").arg(document);
        run(&self.executable, &mut command)
    }
}

fn run(program: &Path, command: &mut Command) -> Result<(), VectorizeError> {
    tracing::debug!(?command, "running external tool");
    let output = command.output().map_err(|source| VectorizeError::Launch {
        program: program.to_path_buf(),
        source,
    })?;
    if output.status.success() {
        return Ok(());
    }
    Err(VectorizeError::Failed {
        program: program.to_path_buf(),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}
