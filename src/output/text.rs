//! Plain text report: a tab-separated status and path per file.
//!
//! ```text
//! UNIQUE	in/a.txt
//! DUP  of in/a.txt	in/b.txt
//! ERROR Permission denied: in/secret.bin	in/secret.bin
//! 3 files, 1 duplicates in 1 groups, 1 failed, 12 bytes reclaimable (50.0%)
//! ```

use std::io::{self, Write};

use crate::duplicates::{FileRecord, ScanSummary};

/// Render one record.
///
/// `records` is the full list `record` belongs to; it is needed to resolve
/// `duplicate_of` to the original's path.
#[must_use]
pub fn format_record(record: &FileRecord, records: &[FileRecord]) -> String {
    let path = record.path.display();
    if let Some(err) = &record.error {
        return format!("ERROR {err}\t{path}");
    }
    match record.duplicate_of.and_then(|i| records.get(i)) {
        Some(original) => format!("DUP  of {}\t{path}", original.path.display()),
        None => format!("UNIQUE\t{path}"),
    }
}

/// Render the summary line.
#[must_use]
pub fn format_summary(summary: &ScanSummary) -> String {
    let mut line = format!(
        "{} files, {} duplicates in {} groups",
        summary.total_files, summary.duplicate_files, summary.duplicate_groups
    );
    if summary.failed_files > 0 {
        line.push_str(&format!(", {} failed", summary.failed_files));
    }
    line.push_str(&format!(
        ", {} bytes reclaimable ({:.1}%)",
        summary.reclaimable_space,
        summary.wasted_percentage()
    ));
    line
}

/// Write every record followed by the summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_text<W: Write>(
    writer: &mut W,
    records: &[FileRecord],
    summary: &ScanSummary,
) -> io::Result<()> {
    for record in records {
        writeln!(writer, "{}", format_record(record, records))?;
    }
    writeln!(writer, "{}", format_summary(summary))?;
    writer.flush()
}
