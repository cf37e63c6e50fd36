//! Directory scan and per-file reconciliation.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use docparity_canonical::{
    normalize_in_place, normalize_newlines, to_canonical_string, trim_trailing_whitespace,
    DocValue, DEFAULT_PRECISION,
};
use tracing::{debug, info, warn};

use crate::errors::{DirectoryRole, ReconcileError};
use crate::outcome::{FileOutcome, FileReport, ReconcileReport, Tally};

/// File-name suffix of candidate dumps produced for the reference parser.
pub const DEFAULT_DUMP_SUFFIX: &str = ".py.json";

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Fractional digits kept for float leaves (default: 3).
    pub precision: u32,
    /// Only dump files whose name ends with this suffix are processed
    /// (default: `.py.json`).
    pub suffix: String,
    /// Classify files without writing ground truth (default: false).
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            suffix: DEFAULT_DUMP_SUFFIX.to_string(),
            dry_run: false,
        }
    }
}

/// A dump file and the ground-truth path it is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// File name shared by both sides.
    pub name: String,
    /// Path of the candidate dump.
    pub dump_path: PathBuf,
    /// Path of the ground-truth file; it may not exist.
    pub ground_truth_path: PathBuf,
}

/// Batch job replacing stale ground truth with normalized dumps.
///
/// Files are processed one at a time in lexicographic name order. A failure
/// on one file is recorded as [`FileOutcome::Errored`] and never stops the
/// run; only a missing input directory is fatal, and it is detected before
/// any file is read.
///
/// # Example
///
/// ```rust,no_run
/// use docparity_reconcile::{ReconcileOptions, Reconciler};
///
/// let reconciler = Reconciler::new("dumps", "groundtruth", ReconcileOptions::default())?;
/// let report = reconciler.run()?;
/// println!("{} updated", report.tally.updated);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Reconciler {
    dump_dir: PathBuf,
    ground_truth_dir: PathBuf,
    options: ReconcileOptions,
}

impl Reconciler {
    /// Creates a reconciler after checking that both directories exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::DirectoryNotFound`] naming the first missing
    /// directory (dump directory first).
    pub fn new(
        dump_dir: impl Into<PathBuf>,
        ground_truth_dir: impl Into<PathBuf>,
        options: ReconcileOptions,
    ) -> Result<Self, ReconcileError> {
        let dump_dir = dump_dir.into();
        let ground_truth_dir = ground_truth_dir.into();
        require_dir(&dump_dir, DirectoryRole::Dump)?;
        require_dir(&ground_truth_dir, DirectoryRole::GroundTruth)?;
        Ok(Self {
            dump_dir,
            ground_truth_dir,
            options,
        })
    }

    /// Options this reconciler was built with.
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Lists dump files matching the suffix, sorted by name, paired with
    /// their ground-truth paths.
    ///
    /// Names that are not valid UTF-8 cannot match the suffix and are ignored.
    pub fn pairs(&self) -> Result<Vec<FilePair>, ReconcileError> {
        let entries =
            fs::read_dir(&self.dump_dir).map_err(|e| ReconcileError::io(&self.dump_dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ReconcileError::io(&self.dump_dir, e))?;
            match entry.file_name().into_string() {
                Ok(name) if name.ends_with(&self.options.suffix) => names.push(name),
                Ok(_) => {}
                Err(raw) => debug!(name = ?raw, "ignoring non UTF-8 file name"),
            }
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| FilePair {
                dump_path: self.dump_dir.join(&name),
                ground_truth_path: self.ground_truth_dir.join(&name),
                name,
            })
            .collect())
    }

    /// Runs reconciliation over every matching dump file.
    pub fn run(&self) -> Result<ReconcileReport, ReconcileError> {
        self.run_with(|_| {})
    }

    /// Runs reconciliation, calling `on_file` as soon as each file is
    /// classified.
    pub fn run_with<F>(&self, mut on_file: F) -> Result<ReconcileReport, ReconcileError>
    where
        F: FnMut(&FileReport),
    {
        let pairs = self.pairs()?;
        info!(
            dump_dir = %self.dump_dir.display(),
            ground_truth_dir = %self.ground_truth_dir.display(),
            files = pairs.len(),
            dry_run = self.options.dry_run,
            "reconciling"
        );

        let mut files = Vec::with_capacity(pairs.len());
        let mut tally = Tally::default();
        for pair in &pairs {
            let report = FileReport {
                name: pair.name.clone(),
                outcome: reconcile_pair(pair, &self.options),
            };
            tally.record(&report.outcome);
            on_file(&report);
            files.push(report);
        }

        Ok(ReconcileReport {
            dry_run: self.options.dry_run,
            files,
            tally,
        })
    }
}

/// Reconciles a single pair; never fails, errors become
/// [`FileOutcome::Errored`].
pub fn reconcile_pair(pair: &FilePair, options: &ReconcileOptions) -> FileOutcome {
    if !pair.ground_truth_path.exists() {
        debug!(file = %pair.name, "no matching ground truth");
        return FileOutcome::Skipped;
    }
    match try_reconcile(pair, options) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(file = %pair.name, error = %err, "reconciliation failed");
            FileOutcome::Errored(err.to_string())
        }
    }
}

fn try_reconcile(pair: &FilePair, options: &ReconcileOptions) -> Result<FileOutcome, ReconcileError> {
    let dump_text = fs::read_to_string(&pair.dump_path)
        .map_err(|e| ReconcileError::io(&pair.dump_path, e))?;
    let mut value = DocValue::from_json_str(&dump_text)?;
    normalize_in_place(&mut value, options.precision);
    let rendered = to_canonical_string(&value)?;

    let current = fs::read_to_string(&pair.ground_truth_path)
        .map_err(|e| ReconcileError::io(&pair.ground_truth_path, e))?;

    // Ground truth is compared as text-mode reads see it, CRLF as LF.
    if same_ignoring_trailing_whitespace(&normalize_newlines(&current), &rendered) {
        debug!(file = %pair.name, "unchanged");
        return Ok(FileOutcome::Unchanged);
    }

    if options.dry_run {
        debug!(file = %pair.name, "would update");
    } else {
        write_file(&pair.ground_truth_path, &rendered)?;
        debug!(file = %pair.name, bytes = rendered.len(), "updated");
    }
    Ok(FileOutcome::Updated)
}

/// Compares two texts after stripping trailing whitespace from both.
///
/// Whitespace here also covers the information separators U+001C..U+001F,
/// which the reference string strip removes as well.
pub fn same_ignoring_trailing_whitespace(left: &str, right: &str) -> bool {
    trim_trailing_whitespace(left) == trim_trailing_whitespace(right)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReconcileError> {
    let mut file = File::create(path).map_err(|e| ReconcileError::io(path, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| ReconcileError::io(path, e))
}

fn require_dir(path: &Path, role: DirectoryRole) -> Result<(), ReconcileError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ReconcileError::DirectoryNotFound {
            role,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_whitespace_is_ignored() {
        assert!(same_ignoring_trailing_whitespace("{}\n", "{}"));
        assert!(same_ignoring_trailing_whitespace("{}  \r\n\t", "{}\n"));
        assert!(same_ignoring_trailing_whitespace("{}\u{1f}", "{}"));
    }

    #[test]
    fn other_whitespace_is_significant() {
        assert!(!same_ignoring_trailing_whitespace("\n{}", "{}"));
        assert!(!same_ignoring_trailing_whitespace("{\n  \"a\": 1\n}", "{\n    \"a\": 1\n}"));
        assert!(!same_ignoring_trailing_whitespace("{\"a\": 1}", "{\"a\":1}"));
    }

    #[test]
    fn default_options_match_reference_script() {
        let options = ReconcileOptions::default();
        assert_eq!(options.precision, 3);
        assert_eq!(options.suffix, ".py.json");
        assert!(!options.dry_run);
    }
}
