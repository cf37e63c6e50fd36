//! Extract command implementation.

use docparity_canonical::{to_reference_string, Layout};
use docparity_extract::{run_extraction, ExportedDocumentEngine, ExtractionOptions, LogLevel};
use std::path::Path;

pub fn run(
    document: String,
    output_dir: String,
    tag: String,
    log_level: LogLevel,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractionOptions { tag, log_level };
    let stats = run_extraction(
        &ExportedDocumentEngine::new(),
        Path::new(&document),
        Path::new(&output_dir),
        &options,
    )?;
    println!("{}", to_reference_string(&stats, Layout::Compact)?);
    Ok(())
}
