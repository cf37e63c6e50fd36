//! Engine backed by a page export written by the reference parser.

use std::fs;
use std::path::Path;

use docparity_canonical::DocValue;
use tracing::{debug, info};

use crate::engine::{DocumentEngine, LoadedDocument, LogLevel, PageExport};
use crate::errors::ExtractError;

/// Engine reading a document that was already exported to JSON.
///
/// Accepts either `{"pages": [page, ...]}` or a bare array of pages. A page's
/// number is taken from `page_number` or `page_no` when present, otherwise
/// from its position (starting at 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportedDocumentEngine;

impl ExportedDocumentEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }
}

/// Pages of a loaded export.
#[derive(Debug)]
pub struct ExportedDocument {
    pages: Vec<DocValue>,
    log_level: LogLevel,
}

impl DocumentEngine for ExportedDocumentEngine {
    type Document = ExportedDocument;

    fn load(&self, path: &Path, log_level: LogLevel) -> Result<ExportedDocument, ExtractError> {
        let text = fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
        let root = DocValue::from_json_str(&text)?;
        let pages = match root {
            DocValue::Sequence(pages) => pages,
            DocValue::Mapping(mut map) => match map.swap_remove("pages") {
                Some(DocValue::Sequence(pages)) => pages,
                _ => {
                    return Err(ExtractError::InvalidExport(
                        "expected a 'pages' array".to_string(),
                    ))
                }
            },
            _ => {
                return Err(ExtractError::InvalidExport(
                    "expected an object or an array of pages".to_string(),
                ))
            }
        };
        if log_level >= LogLevel::Info {
            info!(path = %path.display(), pages = pages.len(), "loaded exported document");
        }
        Ok(ExportedDocument { pages, log_level })
    }
}

impl LoadedDocument for ExportedDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn export_page(&mut self, index: usize) -> Result<PageExport, ExtractError> {
        let page = self.pages.get(index).ok_or(ExtractError::PageOutOfRange {
            index,
            count: self.pages.len(),
        })?;
        let page_number = page
            .get("page_number")
            .or_else(|| page.get("page_no"))
            .and_then(DocValue::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(index + 1);
        if self.log_level >= LogLevel::Debug {
            debug!(page = page_number, "exporting page");
        }
        PageExport::from_value(page_number, page)
    }

    fn unload(self) -> Result<(), ExtractError> {
        if self.log_level >= LogLevel::Debug {
            debug!(pages = self.pages.len(), "unloading exported document");
        }
        Ok(())
    }
}
