//! dirdedupe - Flat Directory Deduplicator
//!
//! Finds files with identical content directly inside one directory by
//! hashing them with BLAKE3 on a fixed pool of worker threads, then either
//! reports them, deletes the duplicates, or copies one file per content class
//! into a new directory.
//!
//! # Library use
//!
//! ```no_run
//! use std::path::Path;
//!
//! let records = dirdedupe::find_duplicates(Path::new("in")).unwrap();
//! for record in records.iter().filter(|r| r.is_duplicate()) {
//!     println!("duplicate: {}", record.path.display());
//! }
//!
//! dirdedupe::deduplicate_to_new(Path::new("in"), Path::new("out")).unwrap();
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod dedupe;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{copy_unique, delete_duplicates, deletion_candidates};
use crate::cli::{Cli, Commands, CopyArgs, DeleteArgs, FindArgs, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FileRecord, ScanSummary};
use crate::error::ExitCode;
use crate::output::{write_text, JsonOutput};
use crate::progress::{Progress, ProgressCallback};

pub use dedupe::{
    deduplicate_by_deletion, deduplicate_by_deletion_with_config, deduplicate_to_new,
    deduplicate_to_new_with_config, find_duplicates, find_duplicates_with_config, DedupeError,
};

/// Run the command described by `cli`.
///
/// Logging must already be initialized. Returns the exit code for a
/// completed run; fatal errors are returned as `Err` and map to
/// [`ExitCode::GeneralError`].
///
/// # Errors
///
/// Returns an error if configuration fails to load or the operation aborts.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let base = Config::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Find(args) => {
            let config = base.apply_overrides(&args.finder.overrides());
            handle_find(&args, &config, quiet)
        }
        Commands::Delete(args) => {
            let config = base.apply_overrides(&args.finder.overrides());
            handle_delete(&args, &config, quiet)
        }
        Commands::Copy(args) => {
            let config = base.apply_overrides(&args.finder.overrides());
            handle_copy(&args, &config, quiet)
        }
    }
}

fn progress_for(config: &Config, quiet: bool) -> Option<Arc<dyn ProgressCallback>> {
    (config.progress && !quiet).then(|| Arc::new(Progress::new(false)) as Arc<dyn ProgressCallback>)
}

fn scan(
    directory: &Path,
    config: &Config,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<(Vec<FileRecord>, ScanSummary)> {
    log::info!(
        "Scanning {} with {} workers ({:?} order)",
        directory.display(),
        config.workers,
        config.order
    );
    let mut finder_config = config.to_finder_config();
    if let Some(callback) = progress {
        finder_config = finder_config.with_progress_callback(Arc::clone(callback));
    }
    let result = DuplicateFinder::new(finder_config)
        .find_duplicates(directory)
        .with_context(|| format!("Failed to scan {}", directory.display()))?;
    Ok(result)
}

fn handle_find(args: &FindArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let progress = progress_for(config, quiet);
    let (records, summary) = scan(&args.directory, config, progress.as_ref())?;

    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Text => write_text(&mut stdout, &records, &summary)?,
        OutputFormat::Json => JsonOutput::new(&records, &summary).write_to(&mut stdout, true)?,
    }

    Ok(ExitCode::for_scan(summary.duplicate_files, summary.failed_files))
}

fn handle_delete(args: &DeleteArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let progress = progress_for(config, quiet);
    let (records, summary) = scan(&args.directory, config, progress.as_ref())?;

    if args.dry_run {
        for path in deletion_candidates(&records) {
            println!("would delete {}", path.display());
        }
        return Ok(ExitCode::for_scan(summary.duplicate_files, summary.failed_files));
    }

    let report = delete_duplicates(&records, progress.as_ref())
        .context("Deletion stopped")?;

    if !quiet {
        println!("{}", report.summary());
    }
    Ok(ExitCode::for_scan(report.deleted_count(), summary.failed_files))
}

fn handle_copy(args: &CopyArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let progress = progress_for(config, quiet);
    let (records, summary) = scan(&args.source, config, progress.as_ref())?;

    let report = copy_unique(&args.source, &args.dest, &records, progress.as_ref())
        .with_context(|| format!("Failed to copy into {}", args.dest.display()))?;

    if !quiet {
        println!("{}", report.summary());
    }
    Ok(ExitCode::for_action(summary.failed_files))
}
