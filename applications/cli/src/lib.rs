//! Leveler
//!
//! Batch two-pass loudness normalization of a directory tree.
//!
//! Every audio file under the input root is brought to the integrated
//! loudness of the quietest file in the collection (measured after peak
//! normalization) and written to a mirrored output tree. Files that are not
//! audio are copied through unchanged.
//!
//! This library exposes configuration and run orchestration so the binary
//! stays thin and the whole run can be tested in-process.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{CliOverrides, LevelerConfig};
pub use error::{AppError, Result};
pub use pipeline::{AnalysisReport, AnalyzedFile, Pipeline, RunSummary};
