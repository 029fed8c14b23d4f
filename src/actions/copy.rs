//! Copying unique files into a new directory.
//!
//! # Overview
//!
//! [`copy_unique`] materialises a duplicate-free copy of a scanned directory.
//! Every record that is not a duplicate is copied, including records whose
//! hashing failed, since those were never proven to be duplicates. Such a
//! file that still cannot be opened is skipped and listed in
//! [`CopyReport::skipped`].
//!
//! Destination paths keep the part of the source path below the source root.
//! Existing files are never overwritten: if the name is taken, the first
//! free `name (N).ext` variant is used instead.
//!
//! The batch stops at the first I/O failure and leaves already copied files
//! in place.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::duplicates::FileRecord;
use crate::progress::{ProgressCallback, PHASE_COPY};

/// Error type for copy operations.
#[derive(Debug, Error)]
pub enum CopyError {
    /// A destination directory could not be created.
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source file could not be opened.
    #[error("cannot open {path}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The destination file could not be created.
    #[error("cannot create {path}: {source}")]
    CreateDest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying bytes failed part way.
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CopyError {
    /// Whether this failure happened while creating a directory.
    #[must_use]
    pub fn is_directory_creation(&self) -> bool {
        matches!(self, Self::CreateDir { .. })
    }
}

/// Outcome of a completed copy batch.
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    /// `(source, destination)` pairs, in copy order.
    pub copied: Vec<(PathBuf, PathBuf)>,
    /// Total bytes written.
    pub bytes_copied: u64,
    /// Files written under a disambiguated name.
    pub renamed: usize,
    /// Files that failed hashing and still could not be opened.
    pub skipped: Vec<PathBuf>,
}

impl CopyReport {
    /// Number of files copied.
    #[must_use]
    pub fn copied_count(&self) -> usize {
        self.copied.len()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Copied {} unique file(s), {} bytes",
            self.copied_count(),
            self.bytes_copied
        );
        if self.renamed > 0 {
            line.push_str(&format!(
                " ({} renamed to avoid overwriting)",
                self.renamed
            ));
        }
        if !self.skipped.is_empty() {
            line.push_str(&format!(", {} unreadable skipped", self.skipped.len()));
        }
        line
    }
}

/// Create `path` and any missing parents.
///
/// # Errors
///
/// Returns `CreateDir` if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), CopyError> {
    fs::create_dir_all(path).map_err(|source| CopyError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy the bytes of `source` into a new file at `dest`.
///
/// `dest` must not exist yet. Both handles are closed before this returns.
///
/// # Errors
///
/// - `OpenSource` if `source` cannot be opened
/// - `CreateDest` if `dest` cannot be created (including when it exists)
/// - `Copy` if reading, writing or flushing fails; the partial `dest` is
///   removed first
pub fn copy_bytes(source: &Path, dest: &Path) -> Result<u64, CopyError> {
    let reader = File::open(source).map_err(|e| CopyError::OpenSource {
        path: source.to_path_buf(),
        source: e,
    })?;
    let writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| CopyError::CreateDest {
            path: dest.to_path_buf(),
            source: e,
        })?;

    let copy_err = |e: io::Error| CopyError::Copy {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    };

    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);
    let copied = io::copy(&mut reader, &mut writer).and_then(|bytes| {
        writer.flush()?;
        Ok(bytes)
    });
    drop(writer);

    copied.map_err(|e| {
        // A partial file must not look like a finished copy.
        if let Err(cleanup) = fs::remove_file(dest) {
            log::warn!("Cannot remove partial copy {}: {}", dest.display(), cleanup);
        }
        copy_err(e)
    })
}

/// Path of `path` relative to `source_root`, or its file name when it does
/// not live under the root.
#[must_use]
pub fn relative_destination(source_root: &Path, path: &Path) -> Option<PathBuf> {
    match path.strip_prefix(source_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => Some(rel.to_path_buf()),
        _ => path.file_name().map(PathBuf::from),
    }
}

/// First path based on `candidate` that does not exist yet.
///
/// Tries `candidate`, then `stem (1).ext`, `stem (2).ext`, and so on.
#[must_use]
pub fn free_destination(candidate: &Path) -> PathBuf {
    if !is_taken(candidate) {
        return candidate.to_path_buf();
    }

    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));
    let stem = candidate
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    let extension = candidate.extension();

    (1u64..)
        .map(|n| {
            let mut name = stem.clone();
            name.push(format!(" ({n})"));
            if let Some(ext) = extension {
                name.push(".");
                name.push(ext);
            }
            parent.join(name)
        })
        .find(|p| !is_taken(p))
        .unwrap_or_else(|| candidate.to_path_buf())
}

fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copy every non-duplicate record from under `source_root` into `dest`.
///
/// # Errors
///
/// Returns the first failure (creating directories, opening a source,
/// creating a destination, or copying bytes). Files copied before it stay.
pub fn copy_unique(
    source_root: &Path,
    dest: &Path,
    records: &[FileRecord],
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<CopyReport, CopyError> {
    ensure_dir(dest)?;

    let uniques: Vec<&FileRecord> = records.iter().filter(|r| r.is_unique()).collect();
    let mut report = CopyReport::default();

    if let Some(cb) = progress {
        cb.on_phase_start(PHASE_COPY, uniques.len());
    }
    let outcome = copy_each(source_root, dest, &uniques, &mut report, progress);
    if let Some(cb) = progress {
        cb.on_phase_end(PHASE_COPY);
    }

    match outcome {
        Ok(()) => {
            log::info!("{}", report.summary());
            Ok(report)
        }
        Err(e) => {
            log::info!(
                "Stopping copy after {} file(s) due to error",
                report.copied_count()
            );
            Err(e)
        }
    }
}

fn copy_each(
    source_root: &Path,
    dest: &Path,
    uniques: &[&FileRecord],
    report: &mut CopyReport,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<(), CopyError> {
    for (index, record) in uniques.iter().enumerate() {
        let relative = relative_destination(source_root, &record.path).ok_or_else(|| {
            CopyError::OpenSource {
                path: record.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            }
        })?;

        let wanted = dest.join(relative);
        if let Some(parent) = wanted.parent() {
            ensure_dir(parent)?;
        }
        let target = free_destination(&wanted);
        let renamed = target != wanted;
        if renamed {
            log::info!(
                "{} exists, writing {} instead",
                wanted.display(),
                target.display()
            );
        }

        let bytes = match copy_bytes(&record.path, &target) {
            Ok(bytes) => bytes,
            // Already unreadable during hashing; keep going without it.
            Err(CopyError::OpenSource { path, source }) if record.error.is_some() => {
                log::warn!("Skipping unreadable {}: {}", path.display(), source);
                report.skipped.push(path);
                continue;
            }
            Err(e) => return Err(e),
        };
        log::info!("Copied: {} -> {}", record.path.display(), target.display());

        report.bytes_copied += bytes;
        report.renamed += usize::from(renamed);
        report.copied.push((record.path.clone(), target));
        if let Some(cb) = progress {
            cb.on_progress(index + 1, &record.path.to_string_lossy());
        }
    }
    Ok(())
}
