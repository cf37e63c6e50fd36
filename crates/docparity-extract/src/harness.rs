//! Extraction run: page iteration, statistics, and output files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use docparity_canonical::{
    encode_document, format_float, to_reference_string, trim_trailing_whitespace, DocValue,
    Layout,
};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::{DocumentEngine, LoadedDocument, LogLevel, PageExport};
use crate::errors::ExtractError;

/// Options for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Tag inserted in output file names, `<stem>.<tag>.md` (default: `rust`).
    pub tag: String,
    /// Verbosity passed to the engine (default: warning).
    pub log_level: LogLevel,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            tag: "rust".to_string(),
            log_level: LogLevel::Warning,
        }
    }
}

/// Cell counts for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageStats {
    /// One-based page number.
    pub page: usize,
    /// Character cells.
    pub chars: usize,
    /// Word cells.
    pub words: usize,
    /// Text-line cells.
    pub lines: usize,
}

/// Summary written to `<stem>.<tag>.stats.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Pages visited.
    pub pages: usize,
    /// Milliseconds spent iterating pages.
    pub time_ms: u64,
    /// Counts per page, in document order.
    pub per_page: Vec<PageStats>,
    /// Character-cell colour frequencies keyed `rgba(r,g,b,a)`, in order of
    /// first appearance.
    pub colors: IndexMap<String, u64>,
    /// Path of the extracted text file.
    pub text_file: String,
}

/// Accumulates page exports into text lines and statistics.
#[derive(Debug, Default)]
struct Collector {
    per_page: Vec<PageStats>,
    colors: IndexMap<String, u64>,
    text_lines: Vec<String>,
}

impl Collector {
    fn add_page(&mut self, page: &PageExport) -> Result<(), ExtractError> {
        self.text_lines.push(format!("--- Page {} ---", page.page_number));
        for cell in &page.textline_cells {
            let text = match cell.get("text") {
                None => "",
                Some(DocValue::Text(text)) => text.as_str(),
                Some(_) => {
                    return Err(ExtractError::InvalidExport(format!(
                        "page {}: text-line 'text' is not a string",
                        page.page_number
                    )))
                }
            };
            self.text_lines.push(trim_trailing_whitespace(text).to_string());
        }
        self.text_lines.push(String::new());

        for cell in &page.char_cells {
            *self.colors.entry(color_key(cell)).or_insert(0) += 1;
        }

        self.per_page.push(PageStats {
            page: page.page_number,
            chars: page.char_cells.len(),
            words: page.word_cells.len(),
            lines: page.textline_cells.len(),
        });
        Ok(())
    }
}

/// Colour key of a character cell, `rgba(r,g,b,a)`.
///
/// Missing channels default to 0 for red, green and blue and to 255 for
/// alpha.
pub fn color_key(cell: &DocValue) -> String {
    let rgba = cell.get("rgba");
    let channel = |name: &str, default: &str| -> String {
        rgba.and_then(|c| c.get(name))
            .map(channel_text)
            .unwrap_or_else(|| default.to_string())
    };
    format!(
        "rgba({},{},{},{})",
        channel("r", "0"),
        channel("g", "0"),
        channel("b", "0"),
        channel("a", "255")
    )
}

fn channel_text(value: &DocValue) -> String {
    match value {
        DocValue::Int(n) => n.to_string(),
        DocValue::UInt(n) => n.to_string(),
        DocValue::BigInt(digits) => digits.clone(),
        DocValue::Float(x) if x.is_nan() => "nan".to_string(),
        DocValue::Float(x) if x.is_infinite() => {
            if *x > 0.0 { "inf" } else { "-inf" }.to_string()
        }
        DocValue::Float(x) => format_float(*x),
        DocValue::Text(s) => s.clone(),
        DocValue::Bool(true) => "True".to_string(),
        DocValue::Bool(false) => "False".to_string(),
        DocValue::Null => "None".to_string(),
        nested => encode_document(nested, Layout::Compact).unwrap_or_default(),
    }
}

/// Runs `engine` over `document` and writes the text and statistics files
/// into `output_dir`.
///
/// The document is always unloaded once iteration stops, including when a
/// page fails to export; the page error takes precedence over an unload
/// error.
pub fn run_extraction<E: DocumentEngine>(
    engine: &E,
    document: &Path,
    output_dir: &Path,
    options: &ExtractionOptions,
) -> Result<ExtractionStats, ExtractError> {
    if !document.exists() {
        return Err(ExtractError::DocumentNotFound(document.to_path_buf()));
    }
    fs::create_dir_all(output_dir).map_err(|e| ExtractError::io(output_dir, e))?;
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!(document = %document.display(), "loading document");
    let mut loaded = engine.load(document, options.log_level)?;

    let started = Instant::now();
    let mut collector = Collector::default();
    let iterated = (0..loaded.page_count()).try_for_each(|index| {
        let page = loaded.export_page(index)?;
        collector.add_page(&page)
    });
    let time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let unloaded = loaded.unload();
    iterated?;
    if let Err(err) = unloaded {
        warn!(error = %err, "document unload failed");
        return Err(err);
    }

    let text_file = output_dir.join(format!("{stem}.{}.md", options.tag));
    write_output(&text_file, &collector.text_lines.join("\n"))?;

    let stats = ExtractionStats {
        pages: collector.per_page.len(),
        time_ms,
        per_page: collector.per_page,
        colors: collector.colors,
        text_file: text_file.to_string_lossy().into_owned(),
    };
    let stats_file = stats_path(output_dir, &stem, &options.tag);
    write_output(&stats_file, &to_reference_string(&stats, Layout::Compact)?)?;
    debug!(pages = stats.pages, time_ms, "extraction finished");

    Ok(stats)
}

/// Path of the statistics file for a document stem.
pub fn stats_path(output_dir: &Path, stem: &str, tag: &str) -> PathBuf {
    output_dir.join(format!("{stem}.{tag}.stats.json"))
}

fn write_output(path: &Path, contents: &str) -> Result<(), ExtractError> {
    fs::write(path, contents).map_err(|e| ExtractError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> DocValue {
        DocValue::from_json_str(text).unwrap()
    }

    #[test]
    fn color_key_uses_channel_values() {
        let c = cell(r#"{"rgba": {"r": 12, "g": 34, "b": 56, "a": 128}}"#);
        assert_eq!(color_key(&c), "rgba(12,34,56,128)");
    }

    #[test]
    fn color_key_defaults_missing_channels() {
        assert_eq!(color_key(&cell("{}")), "rgba(0,0,0,255)");
        assert_eq!(color_key(&cell(r#"{"rgba": {"g": 9}}"#)), "rgba(0,9,0,255)");
    }

    #[test]
    fn color_key_formats_non_integer_channels() {
        let c = cell(r#"{"rgba": {"r": 0.5, "g": null, "b": true, "a": "x"}}"#);
        assert_eq!(color_key(&c), "rgba(0.5,None,True,x)");
    }

    #[test]
    fn collector_builds_text_block_per_page() {
        let page = PageExport {
            page_number: 2,
            char_cells: vec![cell("{}"), cell(r#"{"rgba": {"r": 255}}"#), cell("{}")],
            word_cells: vec![cell("{}")],
            textline_cells: vec![cell(r#"{"text": "Hello  "}"#), cell("{}")],
        };
        let mut collector = Collector::default();
        collector.add_page(&page).unwrap();

        assert_eq!(collector.text_lines, ["--- Page 2 ---", "Hello", "", ""]);
        assert_eq!(
            collector.per_page,
            [PageStats {
                page: 2,
                chars: 3,
                words: 1,
                lines: 2
            }]
        );
        let colors: Vec<(&str, u64)> =
            collector.colors.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(colors, [("rgba(0,0,0,255)", 2), ("rgba(255,0,0,255)", 1)]);
    }

    #[test]
    fn color_key_spells_wide_and_non_finite_channels() {
        let c = cell(r#"{"rgba": {"r": 123456789012345678901234567890, "g": NaN, "b": -Infinity, "a": [1]}}"#);
        assert_eq!(
            color_key(&c),
            "rgba(123456789012345678901234567890,nan,-inf,[1])"
        );
    }

    #[test]
    fn text_lines_drop_trailing_separator_characters() {
        let page = PageExport {
            page_number: 1,
            textline_cells: vec![cell(r#"{"text": "Total\u001c\u001f \u00a0"}"#)],
            ..PageExport::default()
        };
        let mut collector = Collector::default();
        collector.add_page(&page).unwrap();
        assert_eq!(collector.text_lines[1], "Total");
    }

    #[test]
    fn non_string_text_is_rejected() {
        let page = PageExport {
            page_number: 1,
            textline_cells: vec![cell(r#"{"text": 5}"#)],
            ..PageExport::default()
        };
        assert!(Collector::default().add_page(&page).is_err());
    }
}
