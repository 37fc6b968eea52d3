//! All errors produced by the export pipeline.
//!
//! The pipeline follows a first-failure-wins policy: the first stage that
//! fails aborts the export, later stages are skipped, and files already
//! written stay on disk. A failed export directory is not usable — callers
//! rerun the whole pipeline, and every stage is safe to rerun over its own
//! previous output.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// The events code generator failed for a named scene or sheet.
    #[error("events code generation failed for '{scene}': {message}")]
    Generation { scene: String, message: String },

    /// A file the export needs to read does not exist.
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A file the export needs to write could not be written.
    #[error("cannot write '{}': {}", .path.display(), .message)]
    DestinationUnwritable { path: PathBuf, message: String },

    /// The shell document template itself is unreadable.
    #[error("template file unreadable: {}", .0.display())]
    Template(PathBuf),

    /// The caller supplied contradictory export options.
    #[error("invalid export configuration: {0}")]
    Config(String),

    /// Two different sources resolve to the same export-relative path.
    #[error("export path collision: two sources map to '{path}'")]
    Collision { path: String },

    /// The export was interrupted through its cancellation token.
    #[error("export cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Shorthand constructors.
impl ExportError {
    pub fn generation(scene: &str, message: impl ToString) -> Self {
        Self::Generation {
            scene: scene.to_string(),
            message: message.to_string(),
        }
    }

    pub fn unwritable(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::DestinationUnwritable {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl ToString) -> Self {
        Self::Config(message.to_string())
    }
}
