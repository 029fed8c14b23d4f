//! Process exit codes and structured error reports.

use serde::Serialize;

/// Exit codes for the dirdedupe binary.
///
/// - 0: Success (duplicates found, or a copy completed)
/// - 1: General error (the operation was aborted)
/// - 2: No duplicates found
/// - 3: Partial success (completed, but some files could not be hashed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The operation completed and found or removed duplicates.
    Success = 0,
    /// The operation was aborted by an error.
    GeneralError = 1,
    /// The scan completed but found no duplicates.
    NoDuplicates = 2,
    /// The operation completed but some files could not be hashed.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DD000",
            Self::GeneralError => "DD001",
            Self::NoDuplicates => "DD002",
            Self::PartialSuccess => "DD003",
        }
    }

    /// Pick the exit code for an action that ran to completion.
    ///
    /// Unlike [`ExitCode::for_scan`], having nothing to deduplicate is not
    /// reported separately: the action was applied.
    #[must_use]
    pub fn for_action(failed_files: usize) -> Self {
        if failed_files > 0 {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Pick the exit code for a completed scan.
    #[must_use]
    pub fn for_scan(duplicate_files: usize, failed_files: usize) -> Self {
        if failed_files > 0 {
            Self::PartialSuccess
        } else if duplicate_files == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
