//! Non-recursive directory listing.
//!
//! # Overview
//!
//! [`list_filenames`] returns the bare names of the regular files directly
//! inside one directory. Subdirectories are not descended into and symbolic
//! links are not followed; both are skipped.
//!
//! # Example
//!
//! ```no_run
//! use dirdedupe::scanner::list_filenames;
//! use std::path::Path;
//!
//! for name in list_filenames(Path::new("/home/user/Downloads")).unwrap() {
//!     println!("{}", name.to_string_lossy());
//! }
//! ```

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use super::ScanError;

/// List the names of the regular files in `directory`, sorted by name.
///
/// # Errors
///
/// - `NotFound` if the directory does not exist
/// - `NotADirectory` if the path exists but is not a directory
/// - `PermissionDenied` / `Io` if the directory cannot be opened or read
pub fn list_filenames(directory: &Path) -> Result<Vec<OsString>, ScanError> {
    let metadata = fs::metadata(directory)
        .map_err(|e| ScanError::from_io(directory.to_path_buf(), e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(directory.to_path_buf()));
    }

    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut names = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(directory).to_path_buf();
            match e.into_io_error() {
                Some(source) => ScanError::from_io(path, source),
                None => ScanError::Io {
                    path,
                    source: io::Error::other("directory walk failed"),
                },
            }
        })?;

        if entry.file_type().is_file() {
            names.push(entry.file_name().to_os_string());
        } else {
            log::debug!("Skipping non-regular entry: {}", entry.path().display());
        }
    }

    log::debug!("Listed {} files in {}", names.len(), directory.display());
    Ok(names)
}
