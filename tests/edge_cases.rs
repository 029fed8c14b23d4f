//! Edge cases: empty inputs, nested entries, files that cannot be read.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirdedupe::dedupe::DedupeError;
use dirdedupe::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dirdedupe::progress::{ProgressCallback, PHASE_HASH};
use dirdedupe::scanner::ScanError;
use dirdedupe::{
    deduplicate_by_deletion, deduplicate_by_deletion_with_config, deduplicate_to_new,
    deduplicate_to_new_with_config, find_duplicates,
};
use tempfile::{tempdir, TempDir};

/// Moves one file out of the directory while hashing runs, so it is listed
/// but cannot be opened, then puts it back for the action phase.
struct VanishDuringHash {
    path: PathBuf,
    parked: PathBuf,
    _holder: TempDir,
}

impl VanishDuringHash {
    fn new(path: &Path) -> Self {
        let holder = tempdir().unwrap();
        Self {
            path: path.to_path_buf(),
            parked: holder.path().join("parked"),
            _holder: holder,
        }
    }
}

impl ProgressCallback for VanishDuringHash {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        if phase == PHASE_HASH {
            fs::rename(&self.path, &self.parked).unwrap();
        }
    }

    fn on_progress(&self, _current: usize, _path: &str) {}

    fn on_phase_end(&self, phase: &str) {
        if phase == PHASE_HASH {
            fs::rename(&self.parked, &self.path).unwrap();
        }
    }
}

fn vanishing(path: &Path) -> FinderConfig {
    FinderConfig::default().with_progress_callback(Arc::new(VanishDuringHash::new(path)))
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let (records, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.wasted_percentage(), 0.0);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("e1")).unwrap();
    File::create(dir.path().join("e2")).unwrap();

    let records = find_duplicates(dir.path()).unwrap();
    assert_eq!(records.iter().filter(|r| r.is_duplicate()).count(), 1);
    assert!(records.iter().all(|r| r.size == 0));
}

#[test]
fn test_subdirectories_are_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("top.txt"), b"same").unwrap();
    let sub = dir.path().join("nested");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("inner.txt"), b"same").unwrap();

    let records = find_duplicates(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].duplicate_of.is_none());

    deduplicate_by_deletion(dir.path()).unwrap();
    assert!(sub.join("inner.txt").exists());
}

#[test]
fn test_missing_directory_is_enumeration_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");

    let err = find_duplicates(&missing).unwrap_err();
    assert!(matches!(
        err,
        DedupeError::Enumeration(FinderError::Scan(ScanError::NotFound(_)))
    ));
}

#[test]
fn test_file_instead_of_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();

    let err = find_duplicates(&file).unwrap_err();
    assert!(matches!(
        err,
        DedupeError::Enumeration(FinderError::Scan(ScanError::NotADirectory(_)))
    ));
}

#[test]
fn test_copy_into_blocked_destination() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"a").unwrap();

    let out = tempdir().unwrap();
    let dest = out.path().join("as-file");
    fs::write(&dest, b"").unwrap();

    let err = deduplicate_to_new(dir.path(), &dest).unwrap_err();
    assert!(matches!(err, DedupeError::DirectoryCreation(_)));
}

#[test]
fn test_many_identical_files() {
    let dir = tempdir().unwrap();
    for i in 0..50 {
        fs::write(dir.path().join(format!("copy{i}")), b"identical").unwrap();
    }

    let records = find_duplicates(dir.path()).unwrap();
    assert_eq!(records.len(), 50);
    assert_eq!(records.iter().filter(|r| r.is_duplicate()).count(), 49);

    let report = deduplicate_by_deletion(dir.path()).unwrap();
    assert_eq!(report.deleted_count(), 49);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_file_gone_while_hashing_is_recorded() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"X").unwrap();
    fs::write(dir.path().join("b.txt"), b"X").unwrap();
    let flaky = dir.path().join("flaky.txt");
    fs::write(&flaky, b"X").unwrap();

    let (records, summary) = DuplicateFinder::new(vanishing(&flaky))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(summary.failed_files, 1);
    let failed: Vec<_> = records.iter().filter(|r| r.error.is_some()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].path, flaky);
    assert!(failed[0].duplicate_of.is_none());
    assert_eq!(records.iter().filter(|r| r.is_duplicate()).count(), 1);
}

#[test]
fn test_file_gone_while_hashing_survives_deletion() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"X").unwrap();
    fs::write(dir.path().join("b.txt"), b"X").unwrap();
    let flaky = dir.path().join("flaky.txt");
    fs::write(&flaky, b"X").unwrap();

    let report = deduplicate_by_deletion_with_config(dir.path(), vanishing(&flaky)).unwrap();

    assert_eq!(report.deleted_count(), 1);
    assert!(flaky.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_file_gone_while_hashing_is_still_copied() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"X").unwrap();
    fs::write(dir.path().join("c.txt"), b"Y").unwrap();
    let flaky = dir.path().join("flaky.txt");
    fs::write(&flaky, b"Z").unwrap();

    let out = tempdir().unwrap();
    let report = deduplicate_to_new_with_config(dir.path(), out.path(), vanishing(&flaky)).unwrap();

    assert_eq!(report.copied_count(), 3);
    assert!(report.skipped.is_empty());
    assert_eq!(fs::read(out.path().join("flaky.txt")).unwrap(), b"Z");
    assert_eq!(fs::read(&flaky).unwrap(), b"Z");
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Root ignores file permissions, so these checks are meaningless there.
    fn running_as_root() -> bool {
        let scratch = tempdir().unwrap();
        let path = scratch.path().join("locked");
        fs::write(&path, b"x").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        File::open(&path).is_ok()
    }

    fn lock(path: &Path) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    }

    fn unlock(path: &Path) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_unreadable_file_is_recorded_not_fatal() {
        if running_as_root() {
            return;
        }
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"X").unwrap();
        fs::write(dir.path().join("b.txt"), b"X").unwrap();
        let secret = dir.path().join("secret.txt");
        fs::write(&secret, b"X").unwrap();
        lock(&secret);

        let records = find_duplicates(dir.path()).unwrap();
        unlock(&secret);

        assert_eq!(records.len(), 3);
        let failed: Vec<_> = records.iter().filter(|r| r.error.is_some()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].path, secret);
        assert!(failed[0].digest.is_empty());
        assert!(failed[0].duplicate_of.is_none());
        assert_eq!(records.iter().filter(|r| r.is_duplicate()).count(), 1);
        for record in &records {
            if let Some(first) = record.duplicate_of {
                assert!(records[first].error.is_none());
            }
        }
    }

    #[test]
    fn test_unreadable_file_survives_deletion() {
        if running_as_root() {
            return;
        }
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"X").unwrap();
        fs::write(dir.path().join("b.txt"), b"X").unwrap();
        let secret = dir.path().join("secret.txt");
        fs::write(&secret, b"X").unwrap();
        lock(&secret);

        let report = deduplicate_by_deletion(dir.path());
        unlock(&secret);

        assert_eq!(report.unwrap().deleted_count(), 1);
        assert!(secret.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_unreadable_file_skipped_by_copy() {
        if running_as_root() {
            return;
        }
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"X").unwrap();
        fs::write(dir.path().join("c.txt"), b"Y").unwrap();
        let secret = dir.path().join("secret.txt");
        fs::write(&secret, b"Z").unwrap();
        lock(&secret);

        let out = tempdir().unwrap();
        let report = deduplicate_to_new(dir.path(), out.path());
        unlock(&secret);

        let report = report.unwrap();
        assert_eq!(report.copied_count(), 2);
        assert_eq!(report.skipped, vec![secret.clone()]);
        assert!(secret.exists());
        assert!(!out.path().join("secret.txt").exists());
    }

    #[test]
    fn test_unreadable_directory_is_fatal() {
        if running_as_root() {
            return;
        }
        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a"), b"a").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = find_duplicates(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(DedupeError::Enumeration(_))));
    }
}
