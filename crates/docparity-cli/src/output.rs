//! Output formatting utilities.

use docparity_reconcile::{FileOutcome, FileReport, Tally};

/// Formats the progress line for a file, if its outcome is reported.
///
/// Unchanged files are silent.
pub fn format_file_line(file: &FileReport, dry_run: bool) -> Option<String> {
    match &file.outcome {
        FileOutcome::Updated if dry_run => Some(format!("WOULD UPDATE: {}", file.name)),
        FileOutcome::Updated => Some(format!("UPDATED: {}", file.name)),
        FileOutcome::Skipped => Some(format!(
            "SKIP: {} (no matching ground truth file)",
            file.name
        )),
        FileOutcome::Errored(message) => Some(format!("ERROR: {}: {}", file.name, message)),
        FileOutcome::Unchanged => None,
    }
}

/// Formats the final summary line.
pub fn format_summary(tally: &Tally, dry_run: bool) -> String {
    let line = format!(
        "Done: {} updated, {} unchanged, {} errors",
        tally.updated, tally.unchanged, tally.errors
    );
    if dry_run {
        format!("{} (check only, nothing written)", line)
    } else {
        line
    }
}
