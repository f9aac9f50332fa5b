//! Leveler Importer
//!
//! Everything on the file-system side of a run: finding input files,
//! decoding them into records, copying non-audio files through and writing
//! normalized records into an output tree that mirrors the input tree.
//!
//! # Architecture
//!
//! - `scanner`: recursive walk of the input root (every file, no filtering)
//! - `output`: relative-path mirroring and byte-for-byte copy-through
//! - `ingest`: decode or copy each scanned file
//! - `emitter`: write normalized records, skipping existing outputs
//!
//! Existing output files are never overwritten, so a second run over the
//! same roots writes nothing.

mod error;

pub mod emitter;
pub mod ingest;
pub mod output;
pub mod scanner;

pub use emitter::{EmitOutcome, Emitted, Emitter};
pub use error::{FileFailure, ImportError};
pub use ingest::{CopyMode, Ingested, Ingestor};
pub use output::{CopyOutcome, OutputTree};
pub use scanner::{FileScanner, ScanOutcome};

/// Re-export commonly used types
pub type Result<T> = std::result::Result<T, ImportError>;
