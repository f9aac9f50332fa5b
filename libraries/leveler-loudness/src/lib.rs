//! Loudness measurement and collection normalization for Leveler
//!
//! This crate provides:
//! - EBU R128 loudness measurement (integrated LUFS, true peak)
//! - Per-sample-rate meters, created lazily and reused
//! - Peak and loudness normalization as pure gain changes
//! - The two-pass engine that brings a whole collection to the loudness of
//!   its quietest member
//!
//! # Architecture
//!
//! ```text
//! Pass 1 (measure, whole collection)
//! ┌───────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │ DecodedRecord │ ──► │ Peak → ceiling  │ ──► │ MeterRegistry    │ ──► running minimum
//! └───────────────┘     └─────────────────┘     └──────────────────┘
//!
//! Pass 2 (normalize, target frozen)
//! ┌────────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │ MeasuredRecord │ ──► │ Gain → target   │ ──► │ Re-measure       │ ──► NormalizedRecord
//! └────────────────┘     └─────────────────┘     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use leveler_loudness::{EngineSettings, LoudnessEngine};
//!
//! let mut engine = LoudnessEngine::new(EngineSettings::default())?;
//! let pass1 = engine.measure(decoded_records);
//! if let Some(target) = pass1.target_lufs {
//!     let pass2 = engine.normalize(pass1.measured, target);
//!     for record in &pass2.normalized {
//!         println!("{}: {:+.2} dB", record.relative.display(), record.delta_db());
//!     }
//! }
//! ```

#![deny(unsafe_code)]

mod analyzer;
mod engine;
mod error;
pub mod gain;
mod meter;

pub use analyzer::{linear_to_db, LoudnessAnalyzer, LoudnessInfo};
pub use engine::{
    EngineSettings, LoudnessEngine, MeasurePass, NormalizePass, RecordFailure, TargetPolicy,
    TargetTracker, DEFAULT_PEAK_CEILING_DBTP, SENTINEL_TARGET_LUFS,
};
pub use error::{LoudnessError, Result};
pub use meter::{Meter, MeterRegistry};

/// Tolerance for "achieved loudness equals target" (LU)
///
/// Gating and quantization keep the re-measured loudness from matching
/// the target exactly.
pub const TARGET_TOLERANCE_LU: f64 = 0.5;
