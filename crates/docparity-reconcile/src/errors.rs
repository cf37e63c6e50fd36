use std::fmt;
use std::path::PathBuf;

use docparity_canonical::{EncodeError, ParseError};
use thiserror::Error;

/// Which of the two input directories an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryRole {
    /// Directory holding candidate dumps.
    Dump,
    /// Directory holding accepted ground-truth files.
    GroundTruth,
}

impl fmt::Display for DirectoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryRole::Dump => f.write_str("Dump"),
            DirectoryRole::GroundTruth => f.write_str("Ground truth"),
        }
    }
}

/// Errors that can occur during reconciliation.
///
/// [`DirectoryNotFound`](ReconcileError::DirectoryNotFound) aborts a run; the
/// other variants are raised per file and end up as errored outcomes.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// One of the input directories does not exist.
    #[error("{role} directory not found: {}", path.display())]
    DirectoryNotFound {
        /// Which directory is missing.
        role: DirectoryRole,
        /// Path as given by the caller.
        path: PathBuf,
    },
    /// Reading or writing a file failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Dump text is not valid JSON.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Normalized dump could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ReconcileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReconcileError::Io {
            path: path.into(),
            source,
        }
    }
}
