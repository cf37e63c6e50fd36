//! Ground-truth reconciliation for parser parity fixtures.
//!
//! A candidate parser writes one JSON dump per test document. This crate pairs
//! each dump with the ground-truth file of the same name, rounds the dump's
//! floats with [`docparity_canonical::normalize`], re-encodes it canonically,
//! and replaces the ground truth only when the text actually differs.
//!
//! ## Key Types
//!
//! - [`Reconciler`] - Scans the directories and processes each pair
//! - [`reconcile_pair`] - The per-file step, usable on its own
//! - [`Tally`] - Outcome counters folded over a run

#![deny(missing_docs)]

/// Error types for reconciliation.
pub mod errors;
/// Per-file outcomes and run tallies.
pub mod outcome;
/// Directory scan and per-file processing.
pub mod reconciler;

pub use errors::{DirectoryRole, ReconcileError};
pub use outcome::{FileOutcome, FileReport, ReconcileReport, Tally};
pub use reconciler::{
    reconcile_pair, same_ignoring_trailing_whitespace, FilePair, ReconcileOptions, Reconciler,
    DEFAULT_DUMP_SUFFIX,
};
