//! Mirrored output tree
//!
//! Every input file maps to exactly one output path: the output root joined
//! with the file's path relative to the input root.

use crate::{ImportError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to a non-audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The original was copied byte for byte
    Copied(PathBuf),
    /// The destination already existed and was left alone
    Skipped(PathBuf),
    /// Dry run: the copy would have happened
    DryRun(PathBuf),
}

/// Input and output roots of a run
#[derive(Debug, Clone)]
pub struct OutputTree {
    input_root: PathBuf,
    output_root: PathBuf,
}

impl OutputTree {
    /// Create a tree mapping `input_root` onto `output_root`
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Input root
    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    /// Output root
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Path of `source` relative to the input root
    pub fn relative_of(&self, source: &Path) -> Result<PathBuf> {
        source
            .strip_prefix(&self.input_root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                ImportError::InvalidPath(format!(
                    "{} is outside {}",
                    source.display(),
                    self.input_root.display()
                ))
            })
    }

    /// Output path for a relative input path
    pub fn mirror(&self, relative: &Path) -> PathBuf {
        self.output_root.join(relative)
    }

    /// Create the parent directories of `destination`
    pub fn prepare(&self, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Copy a non-audio file through to its mirrored location
    ///
    /// An existing destination is never overwritten.
    pub fn copy_through(
        &self,
        source: &Path,
        relative: &Path,
        dry_run: bool,
    ) -> Result<CopyOutcome> {
        let destination = self.mirror(relative);

        if destination.exists() {
            tracing::info!("{} already exists - skipping", destination.display());
            return Ok(CopyOutcome::Skipped(destination));
        }

        if dry_run {
            tracing::info!("Would copy {} to {}", source.display(), destination.display());
            return Ok(CopyOutcome::DryRun(destination));
        }

        self.prepare(&destination)?;
        fs::copy(source, &destination)?;
        tracing::debug!("Copied {} to {}", source.display(), destination.display());

        Ok(CopyOutcome::Copied(destination))
    }
}
