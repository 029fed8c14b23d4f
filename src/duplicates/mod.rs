//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Parallel content hashing over a fixed worker pool ([`pool`])
//! - First-occurrence classification of hashed records ([`classify`])
//! - The enumerate → hash → classify pipeline ([`finder`])

pub mod classify;
pub mod finder;
pub mod pool;

use std::path::PathBuf;

use crate::scanner::HashError;

pub use classify::{classify, classify_by_digest, classify_pairwise, ClassifyStrategy};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, RecordOrder, ScanSummary};
pub use pool::{HashPool, PoolError, DEFAULT_WORKERS};

/// One file discovered in the scanned directory.
///
/// Filled in by the hashing pool (`digest`, `size` or `error`) and then by the
/// classifier (`duplicate_of`). Read-only afterwards.
#[derive(Debug)]
pub struct FileRecord {
    /// Path of the file (directory joined with the listed name).
    pub path: PathBuf,
    /// Hex BLAKE3 digest of the full content; empty if hashing failed.
    pub digest: String,
    /// Bytes hashed; 0 if hashing failed.
    pub size: u64,
    /// Index of the first occurrence with the same digest, within the list
    /// this record belongs to. `None` for first occurrences and unique files.
    pub duplicate_of: Option<usize>,
    /// Why hashing failed, if it did.
    pub error: Option<HashError>,
}

impl FileRecord {
    /// A successfully hashed record.
    #[must_use]
    pub fn hashed(path: PathBuf, digest: String, size: u64) -> Self {
        Self {
            path,
            digest,
            size,
            duplicate_of: None,
            error: None,
        }
    }

    /// A record whose hashing failed.
    #[must_use]
    pub fn failed(path: PathBuf, error: HashError) -> Self {
        Self {
            path,
            digest: String::new(),
            size: 0,
            duplicate_of: None,
            error: Some(error),
        }
    }

    /// Whether hashing produced a usable digest.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        self.error.is_none() && !self.digest.is_empty()
    }

    /// Whether this record duplicates an earlier one.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.duplicate_of.is_some()
    }

    /// Whether this record survives deduplication (first occurrence, unique,
    /// or never proven duplicate because hashing failed).
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.duplicate_of.is_none()
    }
}
