//! Leveler Core
//!
//! Shared types and error handling for the Leveler workspace.
//!
//! The core crate defines:
//! - **Audio Types**: `SampleRate`, `SampleEncoding`, `AudioFormat`, `AudioBuffer`
//! - **Record States**: `DecodedRecord` → `MeasuredRecord` → `NormalizedRecord`
//! - **Error Handling**: `LevelerError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use leveler_core::{AudioBuffer, AudioFormat, SampleEncoding, SampleRate};
//!
//! let format = AudioFormat::new(SampleRate::new(48_000), 1, SampleEncoding::Int16);
//! let buffer = AudioBuffer::try_new(vec![0.0; 48_000], format).unwrap();
//! assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{LevelerError, Result};
pub use types::{
    AudioBuffer, AudioFormat, DecodedRecord, MeasuredRecord, Measurement, NormalizedRecord,
    SampleEncoding, SampleRate,
};
