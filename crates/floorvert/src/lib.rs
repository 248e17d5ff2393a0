//! floorvert: command-line front end for floorplan vertex extraction.
//!
//! Owns everything with side effects: config loading, the output
//! directory layout, launching Potrace and Typst, and writing the
//! artifacts produced by `floorvert-pipeline` and `floorvert-export`.

pub mod config;
pub mod error;
pub mod location;
pub mod run;
pub mod vectorize;

pub use config::AppConfig;
pub use error::AppError;
pub use location::OutputPaths;
pub use run::{RunOptions, RunSummary, run};
pub use vectorize::{Potrace, Typesetter, Typst, VectorizeError, Vectorizer};
