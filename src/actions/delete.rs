//! Deleting duplicates in place.
//!
//! # Overview
//!
//! [`delete_duplicates`] removes every file marked as a duplicate of an
//! earlier record. First occurrences, unique files and files that could not
//! be hashed are never touched.
//!
//! The batch stops at the first failed removal. Files removed before that
//! stay removed and the remaining candidates are left alone.
//!
//! # Example
//!
//! ```no_run
//! use dirdedupe::actions::delete::delete_duplicates;
//! use dirdedupe::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let (records, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("/tmp/photos"))
//!     .unwrap();
//! match delete_duplicates(&records, None) {
//!     Ok(report) => println!("{}", report.summary()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::duplicates::FileRecord;
use crate::progress::{ProgressCallback, PHASE_DELETE};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// General I/O error.
    #[error("cannot remove {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}

/// Outcome of a completed deletion batch.
#[derive(Debug, Clone, Default)]
pub struct DeleteReport {
    /// Files removed, in removal order.
    pub deleted: Vec<PathBuf>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl DeleteReport {
    /// Number of files removed.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Deleted {} duplicate file(s), freed {} bytes",
            self.deleted_count(),
            self.bytes_freed
        )
    }
}

/// Paths that [`delete_duplicates`] would remove, in record order.
#[must_use]
pub fn deletion_candidates(records: &[FileRecord]) -> Vec<&Path> {
    records
        .iter()
        .filter(|r| r.is_duplicate() && r.error.is_none())
        .map(|r| r.path.as_path())
        .collect()
}

/// Permanently remove a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if removal is not allowed
/// - `Io` for any other failure
pub fn remove_file(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|e| {
        log::error!("Delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })?;
    log::info!("Deleted: {}", path.display());
    Ok(())
}

/// Remove every duplicate in `records`.
///
/// # Errors
///
/// Returns the first removal failure. Earlier removals are not undone.
pub fn delete_duplicates(
    records: &[FileRecord],
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<DeleteReport, DeleteError> {
    let candidates: Vec<&FileRecord> = records
        .iter()
        .filter(|r| r.is_duplicate() && r.error.is_none())
        .collect();
    let mut report = DeleteReport::default();

    if let Some(cb) = progress {
        cb.on_phase_start(PHASE_DELETE, candidates.len());
    }

    let mut failure = None;
    for (index, record) in candidates.iter().enumerate() {
        if let Err(e) = remove_file(&record.path) {
            failure = Some(e);
            break;
        }
        report.bytes_freed += record.size;
        report.deleted.push(record.path.clone());
        if let Some(cb) = progress {
            cb.on_progress(index + 1, &record.path.to_string_lossy());
        }
    }

    if let Some(cb) = progress {
        cb.on_phase_end(PHASE_DELETE);
    }

    match failure {
        None => {
            log::info!("{}", report.summary());
            Ok(report)
        }
        Some(e) => {
            log::info!(
                "Stopping deletion after {} file(s) due to error",
                report.deleted_count()
            );
            Err(e)
        }
    }
}
