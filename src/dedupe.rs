//! Top-level deduplication operations.
//!
//! These run the full pipeline over one directory and, for the two
//! deduplicating operations, apply the matching action:
//!
//! - [`find_duplicates`]: hash and classify only
//! - [`deduplicate_by_deletion`]: then remove every duplicate
//! - [`deduplicate_to_new`]: then copy every non-duplicate to a new directory
//!
//! The `*_with_config` variants take a [`FinderConfig`]; the plain ones use
//! its defaults (4 workers, completion order).

use std::path::Path;

use crate::actions::{copy_unique, delete_duplicates, CopyError, CopyReport, DeleteError, DeleteReport};
use crate::duplicates::{DuplicateFinder, FileRecord, FinderConfig, FinderError};

/// Errors from the top-level operations.
#[derive(thiserror::Error, Debug)]
pub enum DedupeError {
    /// The directory could not be enumerated or hashed.
    #[error("cannot scan directory: {0}")]
    Enumeration(#[from] FinderError),

    /// A duplicate could not be removed.
    #[error("deletion failed: {0}")]
    Deletion(#[from] DeleteError),

    /// The destination directory could not be created.
    #[error("cannot create destination: {0}")]
    DirectoryCreation(#[source] CopyError),

    /// A unique file could not be copied.
    #[error("copy failed: {0}")]
    Copy(#[source] CopyError),
}

impl From<CopyError> for DedupeError {
    fn from(err: CopyError) -> Self {
        if err.is_directory_creation() {
            Self::DirectoryCreation(err)
        } else {
            Self::Copy(err)
        }
    }
}

/// Hash and classify every regular file in `directory`.
///
/// # Errors
///
/// Returns `DedupeError::Enumeration` if the directory cannot be listed.
pub fn find_duplicates(directory: &Path) -> Result<Vec<FileRecord>, DedupeError> {
    find_duplicates_with_config(directory, FinderConfig::default())
}

/// [`find_duplicates`] with an explicit configuration.
///
/// # Errors
///
/// Returns `DedupeError::Enumeration` if the directory cannot be listed.
pub fn find_duplicates_with_config(
    directory: &Path,
    config: FinderConfig,
) -> Result<Vec<FileRecord>, DedupeError> {
    let (records, _summary) = DuplicateFinder::new(config).find_duplicates(directory)?;
    Ok(records)
}

/// Find duplicates in `directory` and delete them.
///
/// # Errors
///
/// - `Enumeration` if the directory cannot be listed
/// - `Deletion` on the first file that cannot be removed
pub fn deduplicate_by_deletion(directory: &Path) -> Result<DeleteReport, DedupeError> {
    deduplicate_by_deletion_with_config(directory, FinderConfig::default())
}

/// [`deduplicate_by_deletion`] with an explicit configuration.
///
/// # Errors
///
/// See [`deduplicate_by_deletion`].
pub fn deduplicate_by_deletion_with_config(
    directory: &Path,
    config: FinderConfig,
) -> Result<DeleteReport, DedupeError> {
    let progress = config.progress_callback.clone();
    let records = find_duplicates_with_config(directory, config)?;
    Ok(delete_duplicates(&records, progress.as_ref())?)
}

/// Find duplicates in `source` and copy every non-duplicate into `dest`.
///
/// `source` itself is not modified.
///
/// # Errors
///
/// - `Enumeration` if the source directory cannot be listed
/// - `DirectoryCreation` if `dest` (or a subdirectory) cannot be created
/// - `Copy` on the first file that cannot be copied
pub fn deduplicate_to_new(source: &Path, dest: &Path) -> Result<CopyReport, DedupeError> {
    deduplicate_to_new_with_config(source, dest, FinderConfig::default())
}

/// [`deduplicate_to_new`] with an explicit configuration.
///
/// # Errors
///
/// See [`deduplicate_to_new`].
pub fn deduplicate_to_new_with_config(
    source: &Path,
    dest: &Path,
    config: FinderConfig,
) -> Result<CopyReport, DedupeError> {
    let progress = config.progress_callback.clone();
    let records = find_duplicates_with_config(source, config)?;
    Ok(copy_unique(source, dest, &records, progress.as_ref())?)
}
