//! Command-line interface definitions for dirdedupe.
//!
//! Global options (verbosity, config file, error format) come before the
//! subcommand; each subcommand takes the directory arguments plus the shared
//! finder options.
//!
//! # Example
//!
//! ```bash
//! # Report duplicates in a directory
//! dirdedupe find ~/Downloads
//!
//! # Same, as JSON, with deterministic originals
//! dirdedupe find ~/Downloads --order path --output json
//!
//! # Remove every duplicate, or only show what would be removed
//! dirdedupe delete ~/Downloads --dry-run
//!
//! # Copy one file per content class into a new directory
//! dirdedupe copy ~/Downloads ~/Downloads-unique
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::duplicates::{ClassifyStrategy, RecordOrder};

/// Find and remove duplicate files in a flat directory.
///
/// Every regular file directly inside the directory is hashed with BLAKE3;
/// files with equal digests are duplicates of the first such file.
#[derive(Debug, Parser)]
#[command(name = "dirdedupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every file with its classification
    Find(FindArgs),
    /// Delete every duplicate, keeping one file per content class
    Delete(DeleteArgs),
    /// Copy one file per content class into a new directory
    ///
    /// Exits 0 once the copy completes, even if nothing was a duplicate,
    /// and 3 if some files could not be hashed.
    Copy(CopyArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct FinderArgs {
    /// Number of hashing workers (default: 4)
    #[arg(short = 'w', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Record order deciding which copy counts as the original
    ///
    /// `completion` follows hashing order and can differ between runs;
    /// `path` sorts by path first and is repeatable.
    #[arg(long, value_enum)]
    pub order: Option<RecordOrder>,

    /// Classification algorithm
    #[arg(long, value_enum)]
    pub strategy: Option<ClassifyStrategy>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl FinderArgs {
    /// Convert to configuration overrides.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            workers: self.workers,
            order: self.order,
            strategy: self.strategy,
            no_progress: self.no_progress,
        }
    }
}

/// Arguments for the find subcommand.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// Directory to scan
    #[arg(value_name = "DIR")]
    pub directory: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub finder: FinderArgs,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Directory to deduplicate in place
    #[arg(value_name = "DIR")]
    pub directory: PathBuf,

    /// Only list the files that would be deleted
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub finder: FinderArgs,
}

/// Arguments for the copy subcommand.
#[derive(Debug, Args)]
pub struct CopyArgs {
    /// Directory to read from (left unchanged)
    #[arg(value_name = "SRC")]
    pub source: PathBuf,

    /// Directory to copy unique files into (created if missing)
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    #[command(flatten)]
    pub finder: FinderArgs,
}

/// Output format for find results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per file plus a summary
    Text,
    /// A single JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
