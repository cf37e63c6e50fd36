use std::path::PathBuf;

use docparity_canonical::{EncodeError, ParseError};
use thiserror::Error;

/// Errors that can occur while running the extraction harness.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The input document does not exist.
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),
    /// I/O error while reading the document or writing outputs.
    #[error("{}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Exported document text is not valid JSON.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Statistics could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The engine returned data that does not have the expected layout.
    #[error("invalid page export: {0}")]
    InvalidExport(String),
    /// A page index outside the document was requested.
    #[error("page index {index} out of range for {count} pages")]
    PageOutOfRange {
        /// Requested zero-based index.
        index: usize,
        /// Pages in the document.
        count: usize,
    },
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }
}
