//! Docparity CLI - ground-truth reconciliation and extraction statistics.

use clap::{Parser, Subcommand};
use docparity_extract::LogLevel;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{extract, reconcile, round};

#[derive(Parser)]
#[command(name = "docparity")]
#[command(about = "Parser parity tooling: ground-truth reconciliation and extraction statistics")]
struct Cli {
    /// Log debug diagnostics to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Round dump floats and replace ground truth files that differ
    Reconcile {
        /// Directory holding candidate dumps
        dump_dir: String,
        /// Directory holding ground truth files
        ground_truth_dir: String,
        /// Fractional digits kept for floats
        #[arg(long, default_value_t = docparity_canonical::DEFAULT_PRECISION)]
        precision: u32,
        /// Only process dump files with this name suffix
        #[arg(long, default_value = docparity_reconcile::DEFAULT_DUMP_SUFFIX)]
        suffix: String,
        /// Report what would change without writing ground truth
        #[arg(long)]
        check: bool,
        /// Exit with error code if any file errors (or, with --check, would change)
        #[arg(long)]
        strict: bool,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the rounded canonical form of a JSON document
    Round {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Fractional digits kept for floats
        #[arg(long, default_value_t = docparity_canonical::DEFAULT_PRECISION)]
        precision: u32,
    },
    /// Extract page text and statistics from an exported document
    Extract {
        /// Exported document (JSON pages)
        document: String,
        /// Directory for the text and stats files
        output_dir: String,
        /// Tag used in output file names
        #[arg(long, default_value = "rust")]
        tag: String,
        /// Engine log level (error, warning, info, debug)
        #[arg(long, default_value = "warning")]
        log_level: LogLevel,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Reconcile {
            dump_dir,
            ground_truth_dir,
            precision,
            suffix,
            check,
            strict,
            json,
        } => reconcile::run(reconcile::Args {
            dump_dir,
            ground_truth_dir,
            precision,
            suffix,
            check,
            strict,
            json,
        }),
        Commands::Round { input, precision } => round::run(input, precision),
        Commands::Extract {
            document,
            output_dir,
            tag,
            log_level,
        } => extract::run(document, output_dir, tag, log_level),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
