/// Audio-related types
use crate::error::{LevelerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Common sample rates
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// On-disk sample encoding of a PCM stream
///
/// Decoding keeps track of the source encoding so that the normalized
/// output is written back with the same bit depth and sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 8-bit integer PCM (stored unsigned in WAV)
    Int8,
    /// 16-bit signed integer PCM
    Int16,
    /// 24-bit signed integer PCM
    Int24,
    /// 32-bit signed integer PCM
    Int32,
    /// 32-bit IEEE float PCM
    Float32,
}

impl SampleEncoding {
    /// Bits per sample for this encoding
    pub fn bits_per_sample(&self) -> u16 {
        match self {
            Self::Int8 => 8,
            Self::Int16 => 16,
            Self::Int24 => 24,
            Self::Int32 | Self::Float32 => 32,
        }
    }

    /// Whether samples are stored as floating point
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32)
    }

    /// Integer encoding for a given bit depth
    pub fn from_int_bits(bits: u32) -> Result<Self> {
        match bits {
            1..=8 => Ok(Self::Int8),
            9..=16 => Ok(Self::Int16),
            17..=24 => Ok(Self::Int24),
            25..=32 => Ok(Self::Int32),
            other => Err(LevelerError::UnsupportedEncoding(format!(
                "{other}-bit integer PCM"
            ))),
        }
    }
}

impl fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_float() {
            write!(f, "{}-bit float", self.bits_per_sample())
        } else {
            write!(f, "{}-bit int", self.bits_per_sample())
        }
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,

    /// Source sample encoding
    pub encoding: SampleEncoding,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, encoding: SampleEncoding) -> Self {
        Self {
            sample_rate,
            channels,
            encoding,
        }
    }

    /// Bits per sample of the source encoding
    pub fn bits_per_sample(&self) -> u16 {
        self.encoding.bits_per_sample()
    }
}

/// Audio buffer containing decoded samples
///
/// Samples are stored as f32, nominally in the range [-1.0, 1.0].
/// Interleaved format: [L, R, L, R, ...] for stereo.
/// Gain changes may push samples past full scale; clamping is left
/// to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioBuffer {
    /// Create a new audio buffer without validation
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Create a new audio buffer, checking that the samples fit the format
    pub fn try_new(samples: Vec<f32>, format: AudioFormat) -> Result<Self> {
        if format.channels == 0 {
            return Err(LevelerError::invalid_buffer("channel count is zero"));
        }
        if samples.len() % format.channels as usize != 0 {
            return Err(LevelerError::invalid_buffer(format!(
                "sample count {} is not divisible by channel count {}",
                samples.len(),
                format.channels
            )));
        }
        Ok(Self { samples, format })
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.format.channels == 0 {
            return 0;
        }
        self.samples.len() / self.format.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.format.sample_rate.as_hz() as f64
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Largest absolute sample value (linear)
    pub fn sample_peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }

    /// Copy of this buffer with every sample multiplied by `linear_gain`
    #[must_use]
    pub fn scaled(&self, linear_gain: f32) -> Self {
        Self {
            samples: self.samples.iter().map(|s| s * linear_gain).collect(),
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_48k() -> AudioFormat {
        AudioFormat::new(SampleRate::DVD_QUALITY, 1, SampleEncoding::Int16)
    }

    #[test]
    fn sample_rate_common_values() {
        assert_eq!(SampleRate::CD_QUALITY.as_hz(), 44_100);
        assert_eq!(SampleRate::DVD_QUALITY.as_hz(), 48_000);
        assert_eq!(SampleRate::new(22_050).to_string(), "22050 Hz");
    }

    #[test]
    fn encoding_from_int_bits() {
        assert_eq!(SampleEncoding::from_int_bits(8).unwrap(), SampleEncoding::Int8);
        assert_eq!(SampleEncoding::from_int_bits(16).unwrap(), SampleEncoding::Int16);
        assert_eq!(SampleEncoding::from_int_bits(20).unwrap(), SampleEncoding::Int24);
        assert_eq!(SampleEncoding::from_int_bits(32).unwrap(), SampleEncoding::Int32);
        assert!(SampleEncoding::from_int_bits(0).is_err());
        assert!(SampleEncoding::from_int_bits(64).is_err());
    }

    #[test]
    fn try_new_rejects_ragged_frames() {
        let format = AudioFormat::new(SampleRate::CD_QUALITY, 2, SampleEncoding::Float32);
        assert!(AudioBuffer::try_new(vec![0.0; 5], format).is_err());
        assert!(AudioBuffer::try_new(vec![0.0; 6], format).is_ok());
    }

    #[test]
    fn audio_buffer_duration() {
        let buffer = AudioBuffer::new(vec![0.0; 96_000], mono_48k());
        assert_eq!(buffer.frames(), 96_000);
        assert!((buffer.duration_secs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn scaled_applies_linear_gain() {
        let buffer = AudioBuffer::new(vec![0.5, -0.25, 0.1], mono_48k());
        let louder = buffer.scaled(2.0);
        assert_eq!(louder.samples, vec![1.0, -0.5, 0.2]);
        assert_eq!(louder.format, buffer.format);
        assert!((louder.sample_peak() - 1.0).abs() < f32::EPSILON);
    }
}
