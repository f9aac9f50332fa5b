/// Audio-specific errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The decoding library does not recognize the file as audio it can decode
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),

    /// Decoding error after the format was recognized
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// WAV encoding error
    #[error("Encode error: {0}")]
    Encode(#[from] hound::Error),

    /// Buffer or format validation error
    #[error(transparent)]
    Core(#[from] leveler_core::LevelerError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Whether this error means "not an audio file" rather than a real failure
    ///
    /// Files failing with such an error are passed through unchanged.
    pub fn is_unrecognized_format(&self) -> bool {
        matches!(self, Self::UnrecognizedFormat(_))
    }
}
