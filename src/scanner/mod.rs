//! Scanner module for directory listing and file hashing.
//!
//! This module provides the I/O collaborators used by the duplicate pipeline:
//! - [`walker`]: Non-recursive listing of the regular files in one directory
//! - [`hasher`]: Streaming BLAKE3 content hashing
//!
//! # Example
//!
//! ```no_run
//! use dirdedupe::scanner::{list_filenames, Hasher};
//! use std::path::Path;
//!
//! let dir = Path::new(".");
//! let hasher = Hasher::new();
//! for name in list_filenames(dir).unwrap() {
//!     let path = dir.join(&name);
//!     match hasher.hash_file(&path) {
//!         Ok(digest) => println!("{} {}", digest.hex, path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::io;
use std::path::PathBuf;

pub use hasher::{Digest, Hasher, DEFAULT_BUFFER_SIZE};
pub use walker::list_filenames;

/// Errors that can occur while enumerating a directory.
///
/// All of these are fatal to the operation that requested the listing.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when reading the directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while reading the directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while touching `path`.
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Errors that can occur while hashing a single file.
///
/// These never abort a scan; they are recorded on the file's record.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when opening the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The file could not be opened for reading.
    #[error("Cannot open {path}: {source}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Reading the file failed part way through.
    #[error("Cannot read {path}: {source}")]
    Read {
        /// Path that failed to read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an error raised while opening `path`.
    pub(crate) fn on_open(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Open { path, source },
        }
    }

    /// Whether the failure happened before any byte was read.
    #[must_use]
    pub fn is_open_failure(&self) -> bool {
        !matches!(self, Self::Read { .. })
    }
}
