//! Extraction harness for benchmarking a document engine.
//!
//! The harness loads one document through a [`DocumentEngine`], walks its
//! pages, and writes two files next to each other:
//!
//! - `<stem>.<tag>.md` - text lines of every page under a `--- Page N ---`
//!   header
//! - `<stem>.<tag>.stats.json` - page count, iteration time, per-page cell
//!   counts, character colour frequencies and the text file path
//!
//! [`ExportedDocumentEngine`] serves pages from a JSON export so the harness
//! can run without a native parser.

#![deny(missing_docs)]

/// Engine and document traits.
pub mod engine;
/// Error types for extraction.
pub mod errors;
/// Engine over pre-exported page JSON.
pub mod exported;
/// The extraction run itself.
pub mod harness;

pub use engine::{DocumentEngine, LoadedDocument, LogLevel, PageExport};
pub use errors::ExtractError;
pub use exported::{ExportedDocument, ExportedDocumentEngine};
pub use harness::{
    color_key, run_extraction, stats_path, ExtractionOptions, ExtractionStats, PageStats,
};
