//! Error types for the importer

use leveler_audio::AudioError;
use std::path::PathBuf;
use thiserror::Error;

/// Importer errors
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// A file that could not be processed
///
/// The run continues past it; failures are counted and reported at the end.
#[derive(Debug)]
pub struct FileFailure {
    /// Path relative to the input root
    pub relative: PathBuf,
    /// What went wrong
    pub error: ImportError,
}

impl FileFailure {
    /// Create a failure for `relative`
    pub fn new(relative: impl Into<PathBuf>, error: impl Into<ImportError>) -> Self {
        Self {
            relative: relative.into(),
            error: error.into(),
        }
    }
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.relative.display(), self.error)
    }
}
