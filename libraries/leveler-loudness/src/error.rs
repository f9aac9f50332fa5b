//! Error types for loudness analysis

use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur during loudness analysis
#[derive(Error, Debug)]
pub enum LoudnessError {
    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 16 and 2822400)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-64)")]
    InvalidChannelCount(u32),

    /// Buffer handed to a meter bound to another rate
    #[error("Sample rate mismatch: meter runs at {meter} Hz, buffer is {buffer} Hz")]
    SampleRateMismatch {
        /// Rate the meter was created for
        meter: u32,
        /// Rate of the offending buffer
        buffer: u32,
    },

    /// EBU R128 analysis error
    #[error("EBU R128 analysis failed: {0}")]
    AnalysisError(String),

    /// No samples were provided for analysis
    #[error("No audio samples provided for analysis")]
    NoSamples,

    /// Audio is completely silent or too short to gate
    #[error("Audio is silent (no loudness data available)")]
    SilentAudio,

    /// Invalid engine setting
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl From<ebur128::Error> for LoudnessError {
    fn from(err: ebur128::Error) -> Self {
        Self::AnalysisError(format!("{:?}", err))
    }
}
