//! Command-line interface module for classifier.
//!
//! This module handles:
//! - Argument parsing and path validation
//! - Tracing setup
//! - Loading the configuration and driving a [`Classifier`] run
//! - Printing the end-of-run summary

use crate::classifier::{Classifier, RunSummary};
use crate::config::ClassifierConfig;
use crate::error::{ClassifyError, Result};
use crate::output::OutputFormatter;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Copy a directory tree into category folders, skipping duplicate content.
#[derive(Debug, Parser)]
#[command(name = "classifier", version, about)]
pub struct Cli {
    /// YAML configuration file; the built-in defaults are used when omitted
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log every file decision
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Absolute path of the directory to classify
    pub source: PathBuf,

    /// Absolute path of the destination root
    pub dest: PathBuf,
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` and the
/// default is `warn`. Logs go to stderr so they never mix with the summary.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Rejects relative source or destination paths.
pub fn validate_paths(source: &Path, dest: &Path) -> Result<()> {
    if !source.is_absolute() || !dest.is_absolute() {
        return Err(ClassifyError::Usage(
            "source and destination must be absolute paths".to_string(),
        ));
    }
    Ok(())
}

/// Runs one classification as described by `cli`.
///
/// # Examples
///
/// ```no_run
/// use classifier::cli::{Cli, run_cli};
/// use clap::Parser;
///
/// let cli = Cli::parse_from(["classifier", "/data/inbox", "/data/sorted"]);
/// match run_cli(&cli) {
///     Ok(summary) => println!("copied {} files", summary.total_copied()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<RunSummary> {
    validate_paths(&cli.source, &cli.dest)?;

    let rules = ClassifierConfig::load(cli.config.as_deref())?.compile()?;
    debug!(
        patterns = rules.dates.len(),
        default_category = rules.categories.default_category(),
        "configuration loaded"
    );

    let show_progress = !cli.quiet && !cli.verbose;
    if show_progress {
        OutputFormatter::info(&format!(
            "Classifying {} into {}",
            cli.source.display(),
            cli.dest.display()
        ));
    }

    let spinner = show_progress.then(OutputFormatter::create_spinner);
    let result = Classifier::new(&rules, &cli.source, &cli.dest).run(|path| {
        if let Some(spinner) = &spinner {
            let shown = path.strip_prefix(&cli.source).unwrap_or(path);
            spinner.set_message(shown.display().to_string());
            spinner.inc(1);
        }
    });
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let summary = result?;

    if !cli.quiet {
        print_summary(&summary);
    }
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    OutputFormatter::summary_table(&summary.copied_by_category(), summary.total_copied());

    if let Some(report) = &summary.report_path {
        OutputFormatter::warning(&format!(
            "{} duplicate(s) skipped, see {}",
            summary.skipped.len(),
            report.display()
        ));
    }
    if summary.undersized > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) below the minimum size were not copied",
            summary.undersized
        ));
    }

    OutputFormatter::success("Classification complete!");
}
