//! Leveler Audio
//!
//! Audio decoding and encoding for Leveler.
//!
//! This crate provides:
//! - Full-file decoding via Symphonia, restricted to WAV/PCM so that every
//!   decoded file can be written back in its own container
//! - Classification of "not an audio file" purely from the decoder's
//!   format-recognition errors
//! - WAV encoding via hound, preserving sample rate, channels and encoding
//!
//! # Example
//!
//! ```rust,no_run
//! use leveler_audio::{AudioDecoder, AudioEncoder, SymphoniaDecoder, WavEncoder};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let buffer = SymphoniaDecoder::new().decode(Path::new("/music/take1.wav"))?;
//! let quieter = buffer.scaled(0.5);
//! WavEncoder::new().encode(Path::new("/out/take1.wav"), &quieter)?;
//! # Ok(())
//! # }
//! ```

mod decoder;
mod encoder;
mod error;

pub use decoder::SymphoniaDecoder;
pub use encoder::{quantize, EncodeReport, WavEncoder};
pub use error::{AudioError, Result};

use leveler_core::AudioBuffer;
use std::path::Path;

/// Audio decoder trait
///
/// Implementers decode a whole file into an [`AudioBuffer`].
pub trait AudioDecoder {
    /// Decode an audio file from the given path
    ///
    /// # Errors
    /// Returns [`AudioError::UnrecognizedFormat`] if the file is not audio the
    /// decoder understands, or another error if reading or decoding fails
    fn decode(&self, path: &Path) -> Result<AudioBuffer>;
}

/// Audio encoder trait
pub trait AudioEncoder {
    /// Encode `buffer` to `path`, replacing any file already there
    fn encode(&self, path: &Path, buffer: &AudioBuffer) -> Result<EncodeReport>;
}
