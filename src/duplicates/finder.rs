//! Duplicate finder: the enumerate → hash → classify pipeline.
//!
//! # Overview
//!
//! 1. **List**: collect the regular files directly inside the directory
//! 2. **Hash**: hash them on a fixed worker pool ([`HashPool`])
//! 3. **Order**: keep completion order, or sort by path ([`RecordOrder`])
//! 4. **Classify**: mark every later copy as a duplicate of the first
//!
//! # Example
//!
//! ```no_run
//! use dirdedupe::duplicates::{DuplicateFinder, FinderConfig, RecordOrder};
//! use std::path::Path;
//!
//! let config = FinderConfig::default()
//!     .with_workers(8)
//!     .with_order(RecordOrder::Path);
//! let finder = DuplicateFinder::new(config);
//!
//! let (records, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//! for record in records.iter().filter(|r| r.is_duplicate()) {
//!     println!("{}", record.path.display());
//! }
//! println!("Reclaimable space: {} bytes", summary.reclaimable_space);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::classify::{classify, ClassifyStrategy};
use super::pool::{HashPool, PoolError, DEFAULT_WORKERS};
use super::FileRecord;
use crate::progress::ProgressCallback;
use crate::scanner::{list_filenames, Hasher, ScanError};

/// Order in which records are handed to the classifier.
///
/// The first record of each digest class in this order is kept as the
/// original; the rest are duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOrder {
    /// Worker completion order. Which copy counts as the original may vary
    /// between runs.
    #[default]
    Completion,
    /// Sorted by path. Deterministic.
    Path,
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers (at least 1).
    pub workers: usize,
    /// Record order used for first-occurrence selection.
    pub order: RecordOrder,
    /// Classification algorithm.
    pub strategy: ClassifyStrategy,
    /// Read buffer size for the hasher.
    pub buffer_size: usize,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("workers", &self.workers)
            .field("order", &self.order)
            .field("strategy", &self.strategy)
            .field("buffer_size", &self.buffer_size)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            order: RecordOrder::default(),
            strategy: ClassifyStrategy::default(),
            buffer_size: crate::scanner::DEFAULT_BUFFER_SIZE,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing workers.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the record order.
    #[must_use]
    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the classification strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ClassifyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the hasher read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Number of files listed
    pub total_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Files that could not be hashed
    pub failed_files: usize,
    /// Files marked as duplicates
    pub duplicate_files: usize,
    /// Digest classes with at least one duplicate
    pub duplicate_groups: usize,
    /// Bytes hashed across all files
    pub total_size: u64,
    /// Bytes freed by removing every duplicate
    pub reclaimable_space: u64,
    /// Wall time of the scan
    #[serde(serialize_with = "serialize_duration_ms", rename = "scan_duration_ms")]
    pub scan_duration: Duration,
}

fn serialize_duration_ms<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl ScanSummary {
    /// Compute the summary of classified `records`.
    #[must_use]
    pub fn from_records(records: &[FileRecord], scan_duration: Duration) -> Self {
        let mut summary = Self {
            total_files: records.len(),
            scan_duration,
            ..Self::default()
        };
        let mut groups = HashSet::new();

        for record in records {
            if record.error.is_some() {
                summary.failed_files += 1;
                continue;
            }
            summary.hashed_files += 1;
            summary.total_size += record.size;
            if let Some(first) = record.duplicate_of {
                summary.duplicate_files += 1;
                summary.reclaimable_space += record.size;
                groups.insert(first);
            }
        }
        summary.duplicate_groups = groups.len();
        summary
    }

    /// Percentage of hashed bytes taken up by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The directory could not be listed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The hashing pool failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Duplicate finder that runs the whole pipeline over one directory.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Hash and classify every regular file directly inside `directory`.
    ///
    /// Returns one record per listed file, including files that could not be
    /// hashed (their `error` is set), plus summary statistics.
    ///
    /// # Errors
    ///
    /// - `FinderError::Scan` if the directory is missing, not a directory, or
    ///   unreadable; nothing is hashed in that case
    /// - `FinderError::Pool` if the worker pool itself fails
    pub fn find_duplicates(
        &self,
        directory: &Path,
    ) -> Result<(Vec<FileRecord>, ScanSummary), FinderError> {
        let start = Instant::now();

        let names = list_filenames(directory)?;
        log::info!("Found {} files in {}", names.len(), directory.display());

        let paths = names.iter().map(|name| directory.join(name)).collect();

        let hasher = Hasher::new().with_buffer_size(self.config.buffer_size);
        let mut pool = HashPool::new(hasher, self.config.workers);
        if let Some(cb) = &self.config.progress_callback {
            pool = pool.with_progress(cb.clone());
        }
        let mut records = pool.hash_all(paths)?;

        if self.config.order == RecordOrder::Path {
            records.sort_by(|a, b| a.path.cmp(&b.path));
        }
        classify(&mut records, self.config.strategy);

        let summary = ScanSummary::from_records(&records, start.elapsed());
        log::info!(
            "{} duplicate files in {} groups ({} bytes reclaimable, {} unreadable)",
            summary.duplicate_files,
            summary.duplicate_groups,
            summary.reclaimable_space,
            summary.failed_files
        );

        Ok((records, summary))
    }
}
