//! Two-pass collection normalization
//!
//! Pass 1 measures every record after peak-normalizing it to a common
//! ceiling and tracks the quietest result. Pass 2 renders every record at
//! that frozen target. Pass 2 can only start once pass 1 has seen the whole
//! collection, so the two passes are separate calls with the target handed
//! over explicitly.

use crate::error::{LoudnessError, Result};
use crate::gain;
use crate::meter::MeterRegistry;
use leveler_core::{DecodedRecord, MeasuredRecord, Measurement, NormalizedRecord};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default pass-1 comparison ceiling
pub const DEFAULT_PEAK_CEILING_DBTP: f64 = -1.0;

/// Starting value of the running minimum under [`TargetPolicy::SentinelFloor`]
pub const SENTINEL_TARGET_LUFS: f64 = 0.0;

/// How the collection target is seeded before the first measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetPolicy {
    /// Seed from the first successful measurement; the target is the true
    /// minimum of the collection
    #[default]
    TrueMinimum,
    /// Seed with 0 LUFS; a collection whose every value is above 0 leaves
    /// the target at 0
    SentinelFloor,
}

impl TargetPolicy {
    /// Convert to string for settings persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrueMinimum => "true_minimum",
            Self::SentinelFloor => "sentinel_floor",
        }
    }
}

impl fmt::Display for TargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetPolicy {
    type Err = LoudnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "true_minimum" | "minimum" | "min" => Ok(Self::TrueMinimum),
            "sentinel_floor" | "sentinel" | "legacy" => Ok(Self::SentinelFloor),
            other => Err(LoudnessError::InvalidSetting(format!(
                "unknown target policy '{other}' (expected true_minimum or sentinel_floor)"
            ))),
        }
    }
}

/// Running minimum of peak-normalized loudness
///
/// Only strictly lower values replace the current one, so on ties the
/// first record seen wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetTracker {
    current: Option<f64>,
}

impl TargetTracker {
    /// Start tracking under `policy`
    pub fn new(policy: TargetPolicy) -> Self {
        let current = match policy {
            TargetPolicy::TrueMinimum => None,
            TargetPolicy::SentinelFloor => Some(SENTINEL_TARGET_LUFS),
        };
        Self { current }
    }

    /// Feed one measurement; returns true if it became the new minimum
    pub fn observe(&mut self, lufs: f64) -> bool {
        match self.current {
            Some(current) if lufs >= current => false,
            _ => {
                self.current = Some(lufs);
                true
            }
        }
    }

    /// Current minimum, if any
    pub fn value(&self) -> Option<f64> {
        self.current
    }
}

/// Settings for the loudness engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Ceiling used to rank files in pass 1 (dBTP); never applied to output
    pub peak_ceiling_dbtp: f64,
    /// Seeding policy for the running minimum
    pub target_policy: TargetPolicy,
    /// Fixed target that replaces the collection minimum (LUFS)
    pub target_override_lufs: Option<f64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            peak_ceiling_dbtp: DEFAULT_PEAK_CEILING_DBTP,
            target_policy: TargetPolicy::default(),
            target_override_lufs: None,
        }
    }
}

impl EngineSettings {
    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if !self.peak_ceiling_dbtp.is_finite() || self.peak_ceiling_dbtp > 0.0 {
            return Err(LoudnessError::InvalidSetting(format!(
                "peak ceiling must be a finite value <= 0 dBTP, got {}",
                self.peak_ceiling_dbtp
            )));
        }
        if let Some(target) = self.target_override_lufs {
            if !target.is_finite() {
                return Err(LoudnessError::InvalidSetting(format!(
                    "target loudness must be finite, got {target}"
                )));
            }
        }
        Ok(())
    }
}

/// A record that could not be measured or rendered
#[derive(Debug)]
pub struct RecordFailure {
    /// Record identity (path relative to the input root)
    pub relative: PathBuf,
    /// What went wrong
    pub error: LoudnessError,
}

/// Outcome of the measurement pass
#[derive(Debug, Default)]
pub struct MeasurePass {
    /// Records that were measured, in input order
    pub measured: Vec<MeasuredRecord>,
    /// Records that could not be measured
    pub failures: Vec<RecordFailure>,
    /// Quietest peak-normalized loudness seen (policy-dependent)
    pub collection_minimum: Option<f64>,
    /// Frozen target for pass 2
    pub target_lufs: Option<f64>,
}

/// Outcome of the normalization pass
#[derive(Debug, Default)]
pub struct NormalizePass {
    /// Rendered records, in input order
    pub normalized: Vec<NormalizedRecord>,
    /// Records that could not be rendered
    pub failures: Vec<RecordFailure>,
}

/// Loudness engine owning the meter registry and the pass-1 ceiling
#[derive(Debug)]
pub struct LoudnessEngine {
    settings: EngineSettings,
    meters: MeterRegistry,
}

impl LoudnessEngine {
    /// Create an engine with validated settings
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            meters: MeterRegistry::new(),
        })
    }

    /// Engine settings
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Meters created so far
    pub fn meters(&self) -> &MeterRegistry {
        &self.meters
    }

    /// Measure one record: original loudness plus loudness at the ceiling
    pub fn measure_record(&mut self, record: &DecodedRecord) -> Result<Measurement> {
        let original = self.meters.measure(&record.audio)?;
        let (peak_normalized, peak_gain_db) = gain::peak_normalize(
            &record.audio,
            original.true_peak_dbtp,
            self.settings.peak_ceiling_dbtp,
        );
        let at_ceiling = self.meters.measure(&peak_normalized)?;

        Ok(Measurement {
            original_lufs: original.integrated_lufs,
            true_peak_dbtp: original.true_peak_dbtp,
            peak_gain_db,
            peak_normalized_lufs: at_ceiling.integrated_lufs,
        })
    }

    /// Pass 1: measure the whole collection and freeze the target
    pub fn measure(&mut self, records: Vec<DecodedRecord>) -> MeasurePass {
        let mut tracker = TargetTracker::new(self.settings.target_policy);
        let mut pass = MeasurePass::default();

        for record in records {
            match self.measure_record(&record) {
                Ok(measurement) => {
                    tracing::debug!(
                        file = %record.relative.display(),
                        original_lufs = measurement.original_lufs,
                        true_peak_dbtp = measurement.true_peak_dbtp,
                        "Measured {:.2} LUFS at {:.1} dBTP ceiling",
                        measurement.peak_normalized_lufs,
                        self.settings.peak_ceiling_dbtp
                    );
                    if tracker.observe(measurement.peak_normalized_lufs) {
                        tracing::info!(
                            "Lowest loudness crest is {:.2} LUFS ({})",
                            measurement.peak_normalized_lufs,
                            record.source.display()
                        );
                    }
                    pass.measured.push(MeasuredRecord::new(record, measurement));
                }
                Err(error) => {
                    tracing::error!(
                        file = %record.relative.display(),
                        "Failed to measure loudness: {}",
                        error
                    );
                    pass.failures.push(RecordFailure {
                        relative: record.relative,
                        error,
                    });
                }
            }
        }

        pass.collection_minimum = tracker.value();
        pass.target_lufs = match self.settings.target_override_lufs {
            Some(target) => {
                tracing::info!("Using fixed target loudness {:.2} LUFS", target);
                Some(target)
            }
            None if pass.measured.is_empty() => None,
            None => pass.collection_minimum,
        };
        pass
    }

    /// Render one measured record at `target_lufs`
    pub fn normalize_record(
        &mut self,
        record: MeasuredRecord,
        target_lufs: f64,
    ) -> std::result::Result<NormalizedRecord, RecordFailure> {
        let original_lufs = record.measurement.original_lufs;
        let audio = gain::loudness_normalize(&record.audio, original_lufs, target_lufs);

        match self.meters.measure(&audio) {
            Ok(info) => Ok(NormalizedRecord {
                source: record.source,
                relative: record.relative,
                audio,
                original_lufs,
                target_lufs,
                achieved_lufs: info.integrated_lufs,
            }),
            Err(error) => Err(RecordFailure {
                relative: record.relative,
                error,
            }),
        }
    }

    /// Pass 2: render every measured record at the frozen target
    pub fn normalize(&mut self, measured: Vec<MeasuredRecord>, target_lufs: f64) -> NormalizePass {
        let mut pass = NormalizePass::default();

        for record in measured {
            match self.normalize_record(record, target_lufs) {
                Ok(normalized) => {
                    tracing::debug!(
                        file = %normalized.relative.display(),
                        "Rendered at {:.2} LUFS (target {:.2})",
                        normalized.achieved_lufs,
                        target_lufs
                    );
                    pass.normalized.push(normalized);
                }
                Err(failure) => {
                    tracing::error!(
                        file = %failure.relative.display(),
                        "Failed to normalize: {}",
                        failure.error
                    );
                    pass.failures.push(failure);
                }
            }
        }

        pass
    }
}
