//! Document engine seam.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use docparity_canonical::DocValue;

use crate::errors::ExtractError;

/// Verbosity requested from the engine's own logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Errors and warnings.
    #[default]
    Warning,
    /// Progress messages.
    Info,
    /// Everything.
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!(
                "unknown log level '{other}' (expected error, warning, info or debug)"
            )),
        }
    }
}

/// Structural export of one page: the three cell collections the harness
/// reads. Cells are kept as opaque records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageExport {
    /// One-based page number.
    pub page_number: usize,
    /// Character cells; each may carry an `rgba` record.
    pub char_cells: Vec<DocValue>,
    /// Word cells.
    pub word_cells: Vec<DocValue>,
    /// Text-line cells; each may carry a `text` field.
    pub textline_cells: Vec<DocValue>,
}

impl PageExport {
    /// Builds a page export from a page record holding `char_cells`,
    /// `word_cells` and `textline_cells` arrays. Missing collections are
    /// treated as empty.
    pub fn from_value(page_number: usize, page: &DocValue) -> Result<Self, ExtractError> {
        if !matches!(page, DocValue::Mapping(_)) {
            return Err(ExtractError::InvalidExport(format!(
                "page {page_number} is not an object"
            )));
        }
        Ok(Self {
            page_number,
            char_cells: cells(page, "char_cells", page_number)?,
            word_cells: cells(page, "word_cells", page_number)?,
            textline_cells: cells(page, "textline_cells", page_number)?,
        })
    }
}

fn cells(page: &DocValue, key: &str, page_number: usize) -> Result<Vec<DocValue>, ExtractError> {
    match page.get(key) {
        None => Ok(Vec::new()),
        Some(DocValue::Sequence(items)) => Ok(items.clone()),
        Some(_) => Err(ExtractError::InvalidExport(format!(
            "page {page_number}: '{key}' is not an array"
        ))),
    }
}

/// A document parsing engine.
pub trait DocumentEngine {
    /// Handle to a loaded document.
    type Document: LoadedDocument;

    /// Loads the document at `path`.
    fn load(&self, path: &Path, log_level: LogLevel) -> Result<Self::Document, ExtractError>;
}

/// A document held by an engine.
///
/// [`unload`](LoadedDocument::unload) releases the engine's resources and must
/// be called once iteration is over.
pub trait LoadedDocument {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Exports the page at zero-based `index`.
    fn export_page(&mut self, index: usize) -> Result<PageExport, ExtractError>;

    /// Releases the document.
    fn unload(self) -> Result<(), ExtractError>;
}
