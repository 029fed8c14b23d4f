//! JSON output formatter for scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "files": [
//!     {
//!       "path": "in/a.txt",
//!       "digest": "af1349b9...",
//!       "size": 1024,
//!       "duplicate_of": null,
//!       "error": null
//!     },
//!     {
//!       "path": "in/b.txt",
//!       "digest": "af1349b9...",
//!       "size": 1024,
//!       "duplicate_of": "in/a.txt",
//!       "error": null
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 2,
//!     "hashed_files": 2,
//!     "failed_files": 0,
//!     "duplicate_files": 1,
//!     "duplicate_groups": 1,
//!     "total_size": 2048,
//!     "reclaimable_space": 1024,
//!     "scan_duration_ms": 3
//!   }
//! }
//! ```
//!
//! `duplicate_of` is the original's path rather than its index, so the
//! document stays meaningful on its own.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{FileRecord, ScanSummary};

/// A single record in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    pub path: String,
    /// Hex BLAKE3 digest; null if hashing failed
    pub digest: Option<String>,
    pub size: u64,
    /// Path of the first occurrence this file duplicates
    pub duplicate_of: Option<String>,
    /// Hashing error message
    pub error: Option<String>,
}

impl JsonRecord {
    /// Convert `record`, resolving `duplicate_of` against `records`.
    #[must_use]
    pub fn from_record(record: &FileRecord, records: &[FileRecord]) -> Self {
        Self {
            path: record.path.to_string_lossy().into_owned(),
            digest: record.is_hashed().then(|| record.digest.clone()),
            size: record.size,
            duplicate_of: record
                .duplicate_of
                .and_then(|i| records.get(i))
                .map(|original| original.path.to_string_lossy().into_owned()),
            error: record.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Every record, in classification order
    pub files: Vec<JsonRecord>,
    /// Scan summary statistics
    pub summary: ScanSummary,
}

impl JsonOutput {
    /// Create a new JSON output from classified records and their summary.
    ///
    /// # Example
    ///
    /// ```
    /// use dirdedupe::duplicates::ScanSummary;
    /// use dirdedupe::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default());
    /// assert!(output.files.is_empty());
    /// ```
    #[must_use]
    pub fn new(records: &[FileRecord], summary: &ScanSummary) -> Self {
        Self {
            files: records
                .iter()
                .map(|r| JsonRecord::from_record(r, records))
                .collect(),
            summary: summary.clone(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
