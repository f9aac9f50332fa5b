/// Per-file record states threaded through the two normalization passes
///
/// Each stage is its own type holding only what is valid at that stage, so a
/// loudness delta can only be reported once a record has been normalized.
use super::audio::AudioBuffer;
use std::path::PathBuf;

/// A file that decoded successfully
#[derive(Debug, Clone)]
pub struct DecodedRecord {
    /// Absolute (or root-joined) source path
    pub source: PathBuf,
    /// Path relative to the input root; the record's identity
    pub relative: PathBuf,
    /// Original samples
    pub audio: AudioBuffer,
}

impl DecodedRecord {
    /// Create a new decoded record
    pub fn new(source: PathBuf, relative: PathBuf, audio: AudioBuffer) -> Self {
        Self {
            source,
            relative,
            audio,
        }
    }
}

/// Loudness figures gathered for a record in the measurement pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Integrated loudness of the original samples (LUFS)
    pub original_lufs: f64,
    /// True peak of the original samples (dBTP)
    pub true_peak_dbtp: f64,
    /// Gain that brought the true peak to the ceiling (dB)
    pub peak_gain_db: f64,
    /// Integrated loudness after peak normalization (LUFS)
    pub peak_normalized_lufs: f64,
}

/// A record after the measurement pass
#[derive(Debug, Clone)]
pub struct MeasuredRecord {
    /// Absolute (or root-joined) source path
    pub source: PathBuf,
    /// Path relative to the input root
    pub relative: PathBuf,
    /// Original samples, kept for the normalization pass
    pub audio: AudioBuffer,
    /// Measured loudness
    pub measurement: Measurement,
}

impl MeasuredRecord {
    /// Advance a decoded record with its measurement
    pub fn new(decoded: DecodedRecord, measurement: Measurement) -> Self {
        Self {
            source: decoded.source,
            relative: decoded.relative,
            audio: decoded.audio,
            measurement,
        }
    }
}

/// A record rendered at the collection target
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    /// Absolute (or root-joined) source path
    pub source: PathBuf,
    /// Path relative to the input root
    pub relative: PathBuf,
    /// Normalized samples
    pub audio: AudioBuffer,
    /// Loudness of the original samples (LUFS)
    pub original_lufs: f64,
    /// Target the record was rendered at (LUFS)
    pub target_lufs: f64,
    /// Re-measured loudness of the normalized samples (LUFS)
    pub achieved_lufs: f64,
}

impl NormalizedRecord {
    /// Achieved change in loudness, in dB
    ///
    /// This is "achieved minus original", not "achieved minus target".
    pub fn delta_db(&self) -> f64 {
        self.achieved_lufs - self.original_lufs
    }
}
