//! Reconcile command implementation.

use crate::output;
use docparity_reconcile::{ReconcileOptions, Reconciler};

pub struct Args {
    pub dump_dir: String,
    pub ground_truth_dir: String,
    pub precision: u32,
    pub suffix: String,
    pub check: bool,
    pub strict: bool,
    pub json: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum StrictFailure {
    #[error("{0} file(s) failed to reconcile")]
    Errors(u64),
    #[error("{0} ground truth file(s) are out of date")]
    Stale(u64),
}

pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let options = ReconcileOptions {
        precision: args.precision,
        suffix: args.suffix,
        dry_run: args.check,
    };
    let reconciler = Reconciler::new(&args.dump_dir, &args.ground_truth_dir, options)?;

    let report = if args.json {
        let report = reconciler.run()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        report
    } else {
        let report = reconciler.run_with(|file| {
            if let Some(line) = output::format_file_line(file, args.check) {
                println!("{}", line);
            }
        })?;
        println!();
        println!("{}", output::format_summary(&report.tally, args.check));
        report
    };

    if args.strict {
        if report.tally.errors > 0 {
            return Err(StrictFailure::Errors(report.tally.errors).into());
        }
        if args.check && report.tally.updated > 0 {
            return Err(StrictFailure::Stale(report.tally.updated).into());
        }
    }

    Ok(())
}
