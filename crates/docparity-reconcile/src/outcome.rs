//! Per-file outcomes and the run tally.

use serde::Serialize;

/// Result of reconciling one dump file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Ground truth differed and was replaced (or would be, in a dry run).
    Updated,
    /// Ground truth already matched the normalized dump.
    Unchanged,
    /// No ground-truth file with the same name exists.
    Skipped,
    /// The file could not be processed; carries the error message.
    Errored(String),
}

impl FileOutcome {
    /// Returns `true` for [`FileOutcome::Errored`].
    pub fn is_error(&self) -> bool {
        matches!(self, FileOutcome::Errored(_))
    }
}

/// Outcome for a named dump file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// File name shared by the dump and its ground truth.
    pub name: String,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Outcome counters for a run.
///
/// Counts are a commutative sum, so tallies of disjoint file sets can be
/// merged in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Files whose ground truth was (or would be) replaced.
    pub updated: u64,
    /// Files whose ground truth already matched.
    pub unchanged: u64,
    /// Dump files without a ground-truth counterpart.
    pub skipped: u64,
    /// Files that failed to process.
    pub errors: u64,
}

impl Tally {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Updated => self.updated += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Errored(_) => self.errors += 1,
        }
    }

    /// Adds the counts of `other` to this tally.
    pub fn merge(self, other: Tally) -> Tally {
        Tally {
            updated: self.updated + other.updated,
            unchanged: self.unchanged + other.unchanged,
            skipped: self.skipped + other.skipped,
            errors: self.errors + other.errors,
        }
    }

    /// Number of files that went through the comparison (skips excluded).
    pub fn processed(&self) -> u64 {
        self.updated + self.unchanged + self.errors
    }
}

impl<'a> FromIterator<&'a FileOutcome> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a FileOutcome>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for outcome in iter {
            tally.record(outcome);
        }
        tally
    }
}

/// Everything a reconciliation run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Whether ground-truth writes were suppressed.
    pub dry_run: bool,
    /// One entry per matching dump file, in processing order.
    pub files: Vec<FileReport>,
    /// Aggregate counts over `files`.
    pub tally: Tally,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_each_outcome_kind() {
        let outcomes = [
            FileOutcome::Updated,
            FileOutcome::Unchanged,
            FileOutcome::Unchanged,
            FileOutcome::Skipped,
            FileOutcome::Errored("boom".into()),
        ];
        let tally: Tally = outcomes.iter().collect();
        assert_eq!(
            tally,
            Tally {
                updated: 1,
                unchanged: 2,
                skipped: 1,
                errors: 1
            }
        );
        assert_eq!(tally.processed(), 4);
    }

    #[test]
    fn merge_is_order_independent() {
        let a: Tally = [FileOutcome::Updated, FileOutcome::Skipped].iter().collect();
        let b: Tally = [FileOutcome::Errored("x".into())].iter().collect();
        assert_eq!(a.merge(b), b.merge(a));
        assert_eq!(a.merge(b).skipped, 1);
    }

    #[test]
    fn report_serializes_outcome_inline() {
        let report = FileReport {
            name: "a.py.json".into(),
            outcome: FileOutcome::Errored("bad".into()),
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"name":"a.py.json","outcome":"errored","message":"bad"}"#
        );
        let report = FileReport {
            name: "b.py.json".into(),
            outcome: FileOutcome::Updated,
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"name":"b.py.json","outcome":"updated"}"#
        );
    }
}
