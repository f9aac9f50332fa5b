//! Run orchestration
//!
//! Scan → ingest (non-audio copied through) → measure → normalize → emit.
//! Pass 1 finishes for the whole collection before pass 2 starts, because the
//! target is only known once every file has been measured.

use crate::config::LevelerConfig;
use crate::error::Result;
use leveler_audio::{SymphoniaDecoder, WavEncoder};
use leveler_core::Measurement;
use leveler_importer::{
    CopyMode, CopyOutcome, EmitOutcome, Emitter, FileScanner, Ingestor, OutputTree, ScanOutcome,
};
use leveler_loudness::LoudnessEngine;
use std::fmt;
use std::path::PathBuf;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    /// Non-audio files copied through
    pub copied: usize,
    /// Normalized audio files written
    pub written: usize,
    /// Outputs that already existed
    pub skipped: usize,
    /// Files that could not be scanned, decoded, measured, rendered or written
    pub failed: usize,
    /// Frozen collection target, if any audio was measured
    pub target_lufs: Option<f64>,
    /// Nothing was written; `copied` and `written` count what would have been
    pub dry_run: bool,
}

impl RunSummary {
    /// Whether every file was handled
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn tally_copy(&mut self, outcome: &CopyOutcome) {
        match outcome {
            CopyOutcome::Copied(_) | CopyOutcome::DryRun(_) => self.copied += 1,
            CopyOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    fn tally_emit(&mut self, outcome: &EmitOutcome) {
        match outcome {
            EmitOutcome::Written { .. } | EmitOutcome::DryRun { .. } => self.written += 1,
            EmitOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.dry_run { "Dry run: would have " } else { "" };
        write!(
            f,
            "{prefix}written {} file(s), copied {}, skipped {}, failed {}",
            self.written, self.copied, self.skipped, self.failed
        )?;
        if let Some(target) = self.target_lufs {
            write!(f, " (target {target:.2} LUFS)")?;
        }
        Ok(())
    }
}

/// Pass-1 figures for one audio file
#[derive(Debug, Clone)]
pub struct AnalyzedFile {
    /// Path relative to the input root
    pub relative: PathBuf,
    /// Measured loudness and peak
    pub measurement: Measurement,
}

/// Result of a measurement-only run
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// Measured audio files, in traversal order
    pub files: Vec<AnalyzedFile>,
    /// Files that are not audio
    pub not_audio: usize,
    /// Files that could not be scanned, decoded or measured
    pub failed: usize,
    /// Minimum peak-normalized loudness under the configured policy
    pub collection_minimum: Option<f64>,
    /// Target a full run would use
    pub target_lufs: Option<f64>,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>10} {:>10}  File", "LUFS", "Peak LUFS", "dBTP")?;
        for file in &self.files {
            let m = &file.measurement;
            writeln!(
                f,
                "{:>10.2} {:>10.2} {:>10.2}  {}",
                m.original_lufs,
                m.peak_normalized_lufs,
                m.true_peak_dbtp,
                file.relative.display()
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Audio files: {}", self.files.len())?;
        writeln!(f, "Other files: {}", self.not_audio)?;
        writeln!(f, "Failed:      {}", self.failed)?;
        match self.collection_minimum {
            Some(minimum) => writeln!(f, "Minimum:     {minimum:.2} LUFS")?,
            None => writeln!(f, "Minimum:     none")?,
        }
        match self.target_lufs {
            Some(target) => write!(f, "Target:      {target:.2} LUFS"),
            None => write!(f, "Target:      none (no audio measured)"),
        }
    }
}

/// A configured run over one input tree
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: LevelerConfig,
    dry_run: bool,
}

impl Pipeline {
    /// Create a pipeline from validated configuration
    pub fn new(config: LevelerConfig) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Run everything but write nothing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Configuration this pipeline runs with
    pub fn config(&self) -> &LevelerConfig {
        &self.config
    }

    fn tree(&self) -> OutputTree {
        OutputTree::new(
            &self.config.paths.input_root,
            &self.config.paths.output_root,
        )
    }

    fn scan(&self) -> Result<ScanOutcome> {
        let mut scanner = FileScanner::new().follow_links(self.config.scan.follow_links);
        if let Some(depth) = self.config.scan.max_depth {
            scanner = scanner.max_depth(depth);
        }

        let outcome = scanner.scan_directory(&self.config.paths.input_root)?;
        tracing::info!(
            "Found {} file(s) under {}",
            outcome.files.len(),
            self.config.paths.input_root.display()
        );
        Ok(outcome)
    }

    /// Normalize the whole tree
    ///
    /// Per-file problems are counted in the summary; only setup errors
    /// (unreadable input root, invalid settings) abort the run.
    pub fn run(&self) -> Result<RunSummary> {
        let settings = self.config.engine_settings()?;
        let mut engine = LoudnessEngine::new(settings)?;
        let tree = self.tree();

        let mut summary = RunSummary {
            dry_run: self.dry_run,
            ..RunSummary::default()
        };

        let scan = self.scan()?;
        summary.failed += scan.errors.len();

        let copy_mode = if self.dry_run {
            CopyMode::DryRun
        } else {
            CopyMode::Copy
        };
        let ingestor = Ingestor::new(SymphoniaDecoder::new(), tree.clone()).copy_mode(copy_mode);
        let ingested = ingestor.ingest(&scan.files);

        summary.failed += ingested.failures.len();
        for outcome in &ingested.copies {
            summary.tally_copy(outcome);
        }

        tracing::info!(
            "Measuring {} audio file(s) at a {:.1} dBTP ceiling",
            ingested.records.len(),
            settings.peak_ceiling_dbtp
        );
        let measured = engine.measure(ingested.records);
        summary.failed += measured.failures.len();

        let Some(target) = measured.target_lufs else {
            tracing::info!("No audio to normalize");
            tracing::info!("{}", summary);
            return Ok(summary);
        };
        summary.target_lufs = Some(target);

        tracing::info!("Normalizing to {:.2} LUFS", target);
        let normalized = engine.normalize(measured.measured, target);
        summary.failed += normalized.failures.len();

        let emitter = Emitter::new(WavEncoder::new(), tree).dry_run(self.dry_run);
        let emitted = emitter.emit_all(normalized.normalized);
        summary.failed += emitted.failures.len();
        for outcome in &emitted.outcomes {
            summary.tally_emit(outcome);
        }

        tracing::info!("{}", summary);
        Ok(summary)
    }

    /// Measure the whole tree without writing or copying anything
    pub fn analyze(&self) -> Result<AnalysisReport> {
        let settings = self.config.engine_settings()?;
        let mut engine = LoudnessEngine::new(settings)?;

        let scan = self.scan()?;
        let ingestor =
            Ingestor::new(SymphoniaDecoder::new(), self.tree()).copy_mode(CopyMode::Off);
        let ingested = ingestor.ingest(&scan.files);
        let measured = engine.measure(ingested.records);

        Ok(AnalysisReport {
            files: measured
                .measured
                .into_iter()
                .map(|record| AnalyzedFile {
                    relative: record.relative,
                    measurement: record.measurement,
                })
                .collect(),
            not_audio: ingested.not_audio.len(),
            failed: scan.errors.len() + ingested.failures.len() + measured.failures.len(),
            collection_minimum: measured.collection_minimum,
            target_lufs: measured.target_lufs,
        })
    }
}
