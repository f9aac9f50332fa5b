//! Ingestion: decode every file under the input root
//!
//! Files the decoder does not recognize as audio are copied through to the
//! output tree as they are encountered, interleaved with decoding.

use crate::error::FileFailure;
use crate::output::{CopyOutcome, OutputTree};
use leveler_audio::AudioDecoder;
use leveler_core::DecodedRecord;
use std::path::{Path, PathBuf};

/// What to do with files that are not audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Copy them to the mirrored output path
    #[default]
    Copy,
    /// Report the copies without touching the file system
    DryRun,
    /// Leave them alone (measurement-only runs)
    Off,
}

/// Result of ingesting a file list
#[derive(Debug, Default)]
pub struct Ingested {
    /// Decoded audio, in traversal order
    pub records: Vec<DecodedRecord>,
    /// Relative paths of files that are not audio
    pub not_audio: Vec<PathBuf>,
    /// What happened to each non-audio file, unless copying is off
    pub copies: Vec<CopyOutcome>,
    /// Files that could not be read, decoded or copied
    pub failures: Vec<FileFailure>,
}

/// Decodes input files into records and copies non-audio files through
pub struct Ingestor<D> {
    decoder: D,
    tree: OutputTree,
    copy_mode: CopyMode,
}

impl<D: AudioDecoder> Ingestor<D> {
    /// Create an ingestor that copies non-audio files into `tree`
    pub fn new(decoder: D, tree: OutputTree) -> Self {
        Self {
            decoder,
            tree,
            copy_mode: CopyMode::Copy,
        }
    }

    /// Set how non-audio files are handled
    pub fn copy_mode(mut self, mode: CopyMode) -> Self {
        self.copy_mode = mode;
        self
    }

    /// Output tree non-audio files are copied into
    pub fn tree(&self) -> &OutputTree {
        &self.tree
    }

    /// Ingest every file in `files`
    ///
    /// Paths must lie under the tree's input root. A failure on one file never
    /// stops the others.
    pub fn ingest<P: AsRef<Path>>(&self, files: &[P]) -> Ingested {
        let mut ingested = Ingested::default();

        for source in files {
            let source = source.as_ref();
            let relative = match self.tree.relative_of(source) {
                Ok(relative) => relative,
                Err(e) => {
                    tracing::error!("{}", e);
                    ingested
                        .failures
                        .push(FileFailure::new(source.to_path_buf(), e));
                    continue;
                }
            };

            match self.decoder.decode(source) {
                Ok(audio) => {
                    tracing::debug!(
                        "Decoded {} ({}, {} ch, {:.1}s)",
                        relative.display(),
                        audio.format.sample_rate,
                        audio.format.channels,
                        audio.duration_secs()
                    );
                    ingested
                        .records
                        .push(DecodedRecord::new(source.to_path_buf(), relative, audio));
                }
                Err(e) if e.is_unrecognized_format() => {
                    tracing::info!(
                        "{} is no audio-file (copying original to output)",
                        relative.display()
                    );
                    self.pass_through(source, relative, &mut ingested);
                }
                Err(e) => {
                    tracing::error!("Failed to decode {}: {}", relative.display(), e);
                    ingested.failures.push(FileFailure::new(relative, e));
                }
            }
        }

        ingested
    }

    fn pass_through(&self, source: &Path, relative: PathBuf, ingested: &mut Ingested) {
        let result = match self.copy_mode {
            CopyMode::Off => None,
            CopyMode::Copy => Some(self.tree.copy_through(source, &relative, false)),
            CopyMode::DryRun => Some(self.tree.copy_through(source, &relative, true)),
        };

        match result {
            Some(Ok(outcome)) => ingested.copies.push(outcome),
            Some(Err(e)) => {
                tracing::error!("Failed to copy {}: {}", relative.display(), e);
                ingested.failures.push(FileFailure::new(relative.clone(), e));
            }
            None => {}
        }

        ingested.not_audio.push(relative);
    }
}

impl<D> std::fmt::Debug for Ingestor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("tree", &self.tree)
            .field("copy_mode", &self.copy_mode)
            .finish_non_exhaustive()
    }
}
