/// Core error types for Leveler
use thiserror::Error;

/// Result type alias using `LevelerError`
pub type Result<T> = std::result::Result<T, LevelerError>;

/// Core error type for Leveler
#[derive(Error, Debug)]
pub enum LevelerError {
    /// Buffer does not match its declared format
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// Unsupported sample encoding
    #[error("Unsupported sample encoding: {0}")]
    UnsupportedEncoding(String),
}

impl LevelerError {
    /// Create an invalid buffer error
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }
}
