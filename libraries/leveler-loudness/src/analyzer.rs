//! EBU R128 loudness analysis
//!
//! This module provides EBU R128-compliant loudness measurement using the ebur128 crate.
//! It measures:
//! - Integrated loudness (LUFS) - the overall perceived loudness
//! - True peak (dBTP) - the maximum inter-sample peak level
//! - Sample peak (dBFS) - the maximum sample value

use crate::error::{LoudnessError, Result};
use ebur128::{EbuR128, Mode};
use std::fmt;
use std::ops::RangeInclusive;

/// Sample rates accepted by the underlying ebur128 meter
const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 16..=2_822_400;

/// Channel counts accepted by the underlying ebur128 meter
const CHANNEL_RANGE: RangeInclusive<u32> = 1..=64;

/// Measurements enabled on every analyzer
fn analysis_mode() -> Mode {
    Mode::I | Mode::SAMPLE_PEAK | Mode::TRUE_PEAK
}

/// Information about the loudness characteristics of an audio buffer
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessInfo {
    /// Integrated loudness in LUFS (Loudness Units Full Scale)
    pub integrated_lufs: f64,

    /// True peak in dBTP (decibels True Peak)
    /// Uses 4x oversampling for sample rates < 96kHz as per ITU-R BS.1770
    pub true_peak_dbtp: f64,

    /// Sample peak in dBFS (decibels Full Scale)
    pub sample_peak_dbfs: f64,

    /// Duration of the analyzed audio in seconds
    pub duration_seconds: f64,

    /// Sample rate of the analyzed audio
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u32,
}

impl fmt::Display for LoudnessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: {:.1} LUFS, True Peak: {:.1} dBTP, Sample Peak: {:.1} dBFS",
            self.integrated_lufs, self.true_peak_dbtp, self.sample_peak_dbfs
        )
    }
}

/// EBU R128 loudness analyzer
///
/// Analyzes audio samples to measure loudness according to EBU R128 / ITU-R BS.1770.
/// Unlike a one-shot measurement, the analyzer can be reset and reconfigured
/// so that one instance serves many buffers at the same sample rate.
///
/// # Example
///
/// ```ignore
/// use leveler_loudness::LoudnessAnalyzer;
///
/// let mut analyzer = LoudnessAnalyzer::new(48000, 2)?;
/// analyzer.add_frames(&audio_samples)?;
/// let info = analyzer.summary()?;
/// println!("Integrated loudness: {:.1} LUFS", info.integrated_lufs);
/// ```
pub struct LoudnessAnalyzer {
    /// EBU R128 analyzer instance
    ebur128: EbuR128,
    /// Sample rate
    sample_rate: u32,
    /// Number of channels
    channels: u32,
    /// Total samples processed since the last reset
    samples_processed: usize,
}

impl fmt::Debug for LoudnessAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoudnessAnalyzer")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("samples_processed", &self.samples_processed)
            .finish_non_exhaustive()
    }
}

impl LoudnessAnalyzer {
    /// Create a new loudness analyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz (16-2822400)
    /// * `channels` - Number of channels (1-64)
    ///
    /// # Errors
    /// Returns error if sample rate or channel count is invalid
    pub fn new(sample_rate: u32, channels: u32) -> Result<Self> {
        validate_sample_rate(sample_rate)?;
        validate_channels(channels)?;

        let ebur128 = EbuR128::new(channels, sample_rate, analysis_mode())?;

        Ok(Self {
            ebur128,
            sample_rate,
            channels,
            samples_processed: 0,
        })
    }

    /// Sample rate this analyzer is configured for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count this analyzer is configured for
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Add audio frames for analysis
    ///
    /// # Arguments
    /// * `samples` - Interleaved audio samples as f32 (-1.0 to 1.0)
    ///
    /// # Notes
    /// - Samples should be interleaved (L R L R... for stereo)
    /// - Length must be divisible by channel count
    pub fn add_frames(&mut self, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        if samples.len() % self.channels as usize != 0 {
            return Err(LoudnessError::AnalysisError(format!(
                "Sample count {} is not divisible by channel count {}",
                samples.len(),
                self.channels
            )));
        }

        self.ebur128.add_frames_f32(samples)?;
        self.samples_processed += samples.len();

        Ok(())
    }

    /// Loudness information for everything added since the last reset
    ///
    /// # Errors
    /// Returns error if no samples were provided or audio is completely silent
    pub fn summary(&self) -> Result<LoudnessInfo> {
        if self.samples_processed == 0 {
            return Err(LoudnessError::NoSamples);
        }

        let frames = self.samples_processed / self.channels as usize;
        let duration_seconds = frames as f64 / self.sample_rate as f64;

        let integrated_lufs = self.ebur128.loudness_global()?;

        // ebur128 returns -inf for silence and for buffers shorter than one gating block
        if integrated_lufs.is_infinite() || integrated_lufs.is_nan() {
            return Err(LoudnessError::SilentAudio);
        }

        // Maximum across all channels
        let mut true_peak_linear = 0.0_f64;
        let mut sample_peak_linear = 0.0_f64;
        for ch in 0..self.channels {
            true_peak_linear = true_peak_linear.max(self.ebur128.true_peak(ch).unwrap_or(0.0));
            sample_peak_linear =
                sample_peak_linear.max(self.ebur128.sample_peak(ch).unwrap_or(0.0));
        }

        Ok(LoudnessInfo {
            integrated_lufs,
            true_peak_dbtp: linear_to_db(true_peak_linear),
            sample_peak_dbfs: linear_to_db(sample_peak_linear),
            duration_seconds,
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }

    /// Get the number of samples processed since the last reset
    pub fn samples_processed(&self) -> usize {
        self.samples_processed
    }

    /// Clear all accumulated state, keeping the configuration
    pub fn reset(&mut self) {
        self.ebur128.reset();
        self.samples_processed = 0;
    }

    /// Switch to a different channel count and clear accumulated state
    pub fn set_channels(&mut self, channels: u32) -> Result<()> {
        validate_channels(channels)?;
        if channels != self.channels {
            self.ebur128.change_parameters(channels, self.sample_rate)?;
            self.channels = channels;
        }
        self.reset();
        Ok(())
    }
}

fn validate_sample_rate(sample_rate: u32) -> Result<()> {
    if SAMPLE_RATE_RANGE.contains(&sample_rate) {
        Ok(())
    } else {
        Err(LoudnessError::InvalidSampleRate(sample_rate))
    }
}

fn validate_channels(channels: u32) -> Result<()> {
    if CHANNEL_RANGE.contains(&channels) {
        Ok(())
    } else {
        Err(LoudnessError::InvalidChannelCount(channels))
    }
}

/// Convert a linear amplitude to dB (0 maps to -inf)
pub fn linear_to_db(linear: f64) -> f64 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f64::NEG_INFINITY
    }
}
