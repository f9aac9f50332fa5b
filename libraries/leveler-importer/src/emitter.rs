//! Emission of normalized records into the mirrored output tree

use crate::error::FileFailure;
use crate::output::OutputTree;
use crate::Result;
use leveler_audio::AudioEncoder;
use leveler_core::NormalizedRecord;
use std::path::{Path, PathBuf};

/// What happened to one normalized record at the output side
#[derive(Debug, Clone, PartialEq)]
pub enum EmitOutcome {
    /// A normalized file was written
    Written {
        /// Destination path
        path: PathBuf,
        /// Achieved minus original loudness, in dB
        delta_db: f64,
        /// Integrated loudness of the written buffer
        achieved_lufs: f64,
        /// Samples clamped at full scale while encoding
        clipped_samples: usize,
    },
    /// The destination already existed
    Skipped {
        /// Destination path
        path: PathBuf,
    },
    /// Dry run: the destination would have been written
    DryRun {
        /// Destination path
        path: PathBuf,
    },
}

impl EmitOutcome {
    /// Destination path of this outcome
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. }
            | Self::Skipped { path }
            | Self::DryRun { path } => path,
        }
    }
}

/// Outcomes of emitting a whole collection
#[derive(Debug, Default)]
pub struct Emitted {
    /// One outcome per record that did not fail
    pub outcomes: Vec<EmitOutcome>,
    /// Records that could not be written
    pub failures: Vec<FileFailure>,
}

/// Writes normalized records under the output root
pub struct Emitter<E> {
    encoder: E,
    tree: OutputTree,
    dry_run: bool,
}

impl<E: AudioEncoder> Emitter<E> {
    /// Create an emitter writing into `tree`
    pub fn new(encoder: E, tree: OutputTree) -> Self {
        Self {
            encoder,
            tree,
            dry_run: false,
        }
    }

    /// Report what would be written without writing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Emit one record
    ///
    /// An existing destination is skipped, never overwritten.
    pub fn emit(&self, record: &NormalizedRecord) -> Result<EmitOutcome> {
        let path = self.tree.mirror(&record.relative);

        if path.exists() {
            tracing::info!("{} already exists - skipping", path.display());
            return Ok(EmitOutcome::Skipped { path });
        }

        let delta_db = record.delta_db();

        if self.dry_run {
            tracing::info!("{}: {:+.2} dB (dry run)", path.display(), delta_db);
            return Ok(EmitOutcome::DryRun { path });
        }

        self.tree.prepare(&path)?;
        let report = self.encoder.encode(&path, &record.audio)?;

        tracing::info!("{}: {:+.2} dB", path.display(), delta_db);

        Ok(EmitOutcome::Written {
            path,
            delta_db,
            achieved_lufs: record.achieved_lufs,
            clipped_samples: report.clipped_samples,
        })
    }

    /// Emit every record, consuming it once written
    pub fn emit_all(&self, records: Vec<NormalizedRecord>) -> Emitted {
        let mut emitted = Emitted::default();

        for record in records {
            match self.emit(&record) {
                Ok(outcome) => emitted.outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("Failed to write {}: {}", record.relative.display(), e);
                    emitted.failures.push(FileFailure::new(record.relative, e));
                }
            }
        }

        emitted
    }
}

impl<E> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("tree", &self.tree)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leveler_audio::{EncodeReport, Result as AudioResult};
    use leveler_core::{AudioBuffer, AudioFormat, SampleEncoding, SampleRate};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Records every path it is asked to encode and writes a marker file
    #[derive(Default)]
    struct RecordingEncoder {
        written: RefCell<Vec<PathBuf>>,
    }

    impl AudioEncoder for RecordingEncoder {
        fn encode(&self, path: &Path, _buffer: &AudioBuffer) -> AudioResult<EncodeReport> {
            fs::write(path, b"encoded")?;
            self.written.borrow_mut().push(path.to_path_buf());
            Ok(EncodeReport::default())
        }
    }

    fn normalized(relative: &str) -> NormalizedRecord {
        NormalizedRecord {
            source: PathBuf::from("/in").join(relative),
            relative: PathBuf::from(relative),
            audio: AudioBuffer::new(
                vec![0.1; 480],
                AudioFormat::new(SampleRate::DVD_QUALITY, 1, SampleEncoding::Int16),
            ),
            original_lufs: -14.0,
            target_lufs: -20.0,
            achieved_lufs: -20.1,
        }
    }

    #[test]
    fn test_emit_mirrors_relative_path() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("output");
        let emitter = Emitter::new(
            RecordingEncoder::default(),
            OutputTree::new(temp.path().join("origs"), &output),
        );

        let outcome = emitter.emit(&normalized("a/b/c.wav")).unwrap();

        let expected = output.join("a").join("b").join("c.wav");
        assert!(output.join("a").join("b").is_dir());
        assert_eq!(outcome.path(), expected.as_path());
        match outcome {
            EmitOutcome::Written {
                delta_db,
                achieved_lufs,
                ..
            } => {
                assert!((delta_db - (-6.1)).abs() < 1e-9);
                assert!((achieved_lufs - (-20.1)).abs() < 1e-12);
            }
            other => panic!("expected a write, got {other:?}"),
        }
    }

    #[test]
    fn test_emit_skips_existing() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("output");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("take.wav"), b"previous run").unwrap();

        let emitter = Emitter::new(
            RecordingEncoder::default(),
            OutputTree::new(temp.path().join("origs"), &output),
        );
        let emitted = emitter.emit_all(vec![normalized("take.wav"), normalized("new.wav")]);

        assert!(emitted.failures.is_empty());
        assert_eq!(
            emitted.outcomes[0],
            EmitOutcome::Skipped {
                path: output.join("take.wav")
            }
        );
        assert!(matches!(emitted.outcomes[1], EmitOutcome::Written { .. }));
        assert_eq!(fs::read(output.join("take.wav")).unwrap(), b"previous run");
        assert_eq!(*emitter.encoder.written.borrow(), vec![output.join("new.wav")]);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("output");
        let emitter = Emitter::new(
            RecordingEncoder::default(),
            OutputTree::new(temp.path().join("origs"), &output),
        )
        .dry_run(true);

        let outcome = emitter.emit(&normalized("x/y.wav")).unwrap();

        assert!(matches!(outcome, EmitOutcome::DryRun { .. }));
        assert!(!output.exists());
        assert!(emitter.encoder.written.borrow().is_empty());
    }
}
