//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing BLAKE3 digests
//! of file contents. Files are read through a fixed-size buffer, so memory
//! use does not grow with file size.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::HashError;

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Hex-encoded digest of a file plus the number of bytes that went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Lowercase hexadecimal BLAKE3 digest (64 characters).
    pub hex: String,
    /// Number of bytes hashed.
    pub bytes: u64,
}

/// Streaming BLAKE3 content hasher.
///
/// Holds no shared state; a single instance can be used from many threads.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Use a custom read buffer size (at least 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Configured read buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Hash the full content of the file at `path`.
    ///
    /// The file handle is dropped before this returns, on success and on error.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `PermissionDenied` / `Open` if the file cannot be opened
    /// - `Read` if reading fails after the file was opened
    pub fn hash_file(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::on_open(path.to_path_buf(), e))?;

        let digest = self
            .hash_reader(file)
            .map_err(|source| HashError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        log::trace!("{} {} ({} bytes)", digest.hex, path.display(), digest.bytes);
        Ok(digest)
    }

    /// Hash everything `reader` yields until EOF.
    ///
    /// # Errors
    ///
    /// Returns the first non-interrupt I/O error from `reader`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<Digest> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total: u64 = 0;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
            total += n as u64;
        }

        Ok(Digest {
            hex: hasher.finalize().to_hex().to_string(),
            bytes: total,
        })
    }
}
