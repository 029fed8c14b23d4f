//! Fixed-size worker pool for content hashing.
//!
//! # Overview
//!
//! [`HashPool::hash_all`] hashes every input path on exactly `W` worker
//! threads and returns one [`FileRecord`] per path:
//!
//! ```text
//! orchestrator: seed job queue (capacity n) → close it → spawn W workers
//! worker i:     recv path → open → stream through BLAKE3 → send record → next
//! orchestrator: recv exactly n records → join workers
//! ```
//!
//! Workers only talk through the two channels. A file that cannot be opened
//! or read produces a record with `error` set; it never stops a worker or
//! the pool. Completion order is whatever order workers finish in.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use super::FileRecord;
use crate::progress::{ProgressCallback, PHASE_HASH};
use crate::scanner::Hasher;

/// Default number of hashing workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Infrastructure failures of the pool itself.
///
/// Per-file I/O failures are never reported here.
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// Not a single worker thread could be started.
    #[error("failed to start hashing worker: {0}")]
    Spawn(#[source] io::Error),

    /// A worker died and the results it owed were lost.
    #[error("hashing worker panicked: received {received} of {expected} results")]
    WorkerPanicked {
        /// Results the pool should have produced
        expected: usize,
        /// Results actually received
        received: usize,
    },
}

/// Hashing worker pool.
///
/// # Example
///
/// ```no_run
/// use dirdedupe::duplicates::HashPool;
/// use dirdedupe::scanner::Hasher;
/// use std::path::PathBuf;
///
/// let pool = HashPool::new(Hasher::new(), 4);
/// let records = pool
///     .hash_all(vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")])
///     .unwrap();
/// assert_eq!(records.len(), 2);
/// ```
pub struct HashPool {
    hasher: Hasher,
    workers: usize,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for HashPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashPool")
            .field("hasher", &self.hasher)
            .field("workers", &self.workers)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl HashPool {
    /// Create a pool of `workers` threads (at least 1).
    #[must_use]
    pub fn new(hasher: Hasher, workers: usize) -> Self {
        if workers == 0 {
            log::warn!("Worker count must be at least 1, using 1");
        }
        Self {
            hasher,
            workers: workers.max(1),
            progress: None,
        }
    }

    /// Report per-file progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Number of worker threads this pool runs.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Hash every path and return exactly one record per path.
    ///
    /// Records come back in completion order, which is unrelated to the input
    /// order. An empty input returns an empty list without starting threads.
    ///
    /// # Errors
    ///
    /// Returns `PoolError` only if no worker could be started or a worker
    /// panicked. Files that fail to open or read are reported on their record.
    pub fn hash_all(&self, paths: Vec<PathBuf>) -> Result<Vec<FileRecord>, PoolError> {
        let total = paths.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        // Seed and close the queue before any worker starts.
        let (job_tx, job_rx) = bounded::<PathBuf>(total);
        for path in paths {
            if let Err(rejected) = job_tx.try_send(path) {
                // Capacity is `total` and `job_rx` is alive, so this is unreachable.
                log::error!("Job queue rejected {}", rejected.into_inner().display());
            }
        }
        drop(job_tx);

        let (result_tx, result_rx) = bounded::<FileRecord>(total);

        if let Some(cb) = &self.progress {
            cb.on_phase_start(PHASE_HASH, total);
        }
        log::info!("Hashing {} files with {} workers", total, self.workers);

        let completed = AtomicUsize::new(0);
        let outcome = thread::scope(|scope| {
            let completed = &completed;
            let mut handles = Vec::with_capacity(self.workers);

            for index in 0..self.workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("hash-worker-{index}"))
                    .spawn_scoped(scope, move || self.run_worker(index, &jobs, &results, completed));

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) if handles.is_empty() => return Err(PoolError::Spawn(e)),
                    Err(e) => {
                        log::warn!(
                            "Could not start worker {}: {}; continuing with {}",
                            index,
                            e,
                            handles.len()
                        );
                        break;
                    }
                }
            }

            // Only workers hold channel ends now; the results channel
            // disconnects once the last of them exits.
            drop(job_rx);
            drop(result_tx);

            let records: Vec<FileRecord> = result_rx.iter().take(total).collect();

            let mut panicked = 0;
            for handle in handles {
                if handle.join().is_err() {
                    panicked += 1;
                }
            }
            if panicked > 0 {
                log::error!("{} hashing worker(s) panicked", panicked);
            }

            Ok(records)
        });

        if let Some(cb) = &self.progress {
            cb.on_phase_end(PHASE_HASH);
        }

        let records = outcome?;
        if records.len() != total {
            return Err(PoolError::WorkerPanicked {
                expected: total,
                received: records.len(),
            });
        }

        let failed = records.iter().filter(|r| r.error.is_some()).count();
        log::info!("Hashed {} files ({} failed)", total - failed, failed);
        Ok(records)
    }

    /// Worker loop: drain the queue until it is closed and empty.
    fn run_worker(
        &self,
        index: usize,
        jobs: &Receiver<PathBuf>,
        results: &Sender<FileRecord>,
        completed: &AtomicUsize,
    ) {
        let mut handled = 0usize;

        for path in jobs.iter() {
            let record = self.hash_one(path);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = &self.progress {
                cb.on_progress(done, &record.path.to_string_lossy());
                cb.on_item_completed(record.size);
            }

            if results.send(record).is_err() {
                log::error!("Worker {} lost its results channel", index);
                break;
            }
            handled += 1;
        }

        log::trace!("Worker {} finished after {} files", index, handled);
    }

    fn hash_one(&self, path: PathBuf) -> FileRecord {
        match self.hasher.hash_file(&path) {
            Ok(digest) => FileRecord::hashed(path, digest.hex, digest.bytes),
            Err(e) => {
                log::warn!("Cannot hash {}: {}", path.display(), e);
                FileRecord::failed(path, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn write_files(dir: &TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("file_{i}.txt"));
                fs::write(&path, format!("content {}", i % 5)).unwrap();
                path
            })
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        bytes: AtomicUsize,
    }

    impl ProgressCallback for Recorder {
        fn on_phase_start(&self, phase: &str, total: usize) {
            self.events.lock().unwrap().push(format!("start {phase} {total}"));
        }
        fn on_progress(&self, _current: usize, _path: &str) {
            self.events.lock().unwrap().push("progress".to_string());
        }
        fn on_item_completed(&self, bytes: u64) {
            self.bytes.fetch_add(bytes as usize, Ordering::SeqCst);
        }
        fn on_phase_end(&self, phase: &str) {
            self.events.lock().unwrap().push(format!("end {phase}"));
        }
    }

    #[test]
    fn test_workers_min() {
        assert_eq!(HashPool::new(Hasher::new(), 0).workers(), 1);
        assert_eq!(HashPool::new(Hasher::new(), 8).workers(), 8);
    }

    #[test]
    fn test_empty_input() {
        let pool = HashPool::new(Hasher::new(), DEFAULT_WORKERS);
        assert!(pool.hash_all(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_one_record_per_path() {
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, 50);

        let records = HashPool::new(Hasher::new(), 4)
            .hash_all(paths.clone())
            .unwrap();

        assert_eq!(records.len(), 50);
        let seen: HashSet<PathBuf> = records.iter().map(|r| r.path.clone()).collect();
        let expected: HashSet<PathBuf> = paths.into_iter().collect();
        assert_eq!(seen, expected);
        assert!(records.iter().all(|r| r.is_hashed()));
    }

    #[test]
    fn test_fewer_jobs_than_workers() {
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, 2);

        let records = HashPool::new(Hasher::new(), 16).hash_all(paths).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_single_worker() {
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, 10);

        let records = HashPool::new(Hasher::new(), 1).hash_all(paths).unwrap();
        assert_eq!(records.len(), 10);
    }

    #[test]
    fn test_missing_file_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let mut paths = write_files(&dir, 5);
        paths.insert(2, dir.path().join("vanished.txt"));

        let records = HashPool::new(Hasher::new(), 3).hash_all(paths).unwrap();

        assert_eq!(records.len(), 6);
        let failed: Vec<_> = records.iter().filter(|r| r.error.is_some()).collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].path.ends_with("vanished.txt"));
        assert!(failed[0].digest.is_empty());
        assert_eq!(records.iter().filter(|r| r.is_hashed()).count(), 5);
    }

    #[test]
    fn test_same_content_same_digest() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"X").unwrap();
        fs::write(&b, b"X").unwrap();

        let records = HashPool::new(Hasher::new(), 2).hash_all(vec![a, b]).unwrap();
        assert_eq!(records[0].digest, records[1].digest);
        assert_eq!(records[0].size, 1);
    }

    #[test]
    fn test_progress_callback() {
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, 4);
        let recorder = Arc::new(Recorder::default());

        HashPool::new(Hasher::new(), 2)
            .with_progress(recorder.clone())
            .hash_all(paths)
            .unwrap();

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.first().unwrap(), "start hash 4");
        assert_eq!(events.last().unwrap(), "end hash");
        assert_eq!(events.iter().filter(|e| *e == "progress").count(), 4);
        // "content N" is 9 bytes per file
        assert_eq!(recorder.bytes.load(Ordering::SeqCst), 36);
    }

    /// Records which worker thread handled each file.
    #[derive(Default)]
    struct ThreadNames {
        names: Mutex<HashSet<String>>,
    }

    impl ProgressCallback for ThreadNames {
        fn on_phase_start(&self, _phase: &str, _total: usize) {}
        fn on_progress(&self, _current: usize, _path: &str) {
            let name = thread::current().name().unwrap_or("<unnamed>").to_string();
            self.names.lock().unwrap().insert(name);
        }
        fn on_phase_end(&self, _phase: &str) {}
    }

    /// Panics inside whichever worker reports the `fail_at`-th file.
    struct PanicAt {
        fail_at: usize,
        calls: AtomicUsize,
    }

    impl ProgressCallback for PanicAt {
        fn on_phase_start(&self, _phase: &str, _total: usize) {}
        fn on_progress(&self, _current: usize, _path: &str) {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
                panic!("worker died mid-batch");
            }
        }
        fn on_phase_end(&self, _phase: &str) {}
    }

    #[test]
    fn test_at_most_w_named_workers() {
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, 60);
        let names = Arc::new(ThreadNames::default());

        let records = HashPool::new(Hasher::new(), 3)
            .with_progress(names.clone())
            .hash_all(paths.clone())
            .unwrap();

        assert_eq!(records.len(), paths.len());
        let seen: HashSet<PathBuf> = records.iter().map(|r| r.path.clone()).collect();
        assert_eq!(seen.len(), paths.len());

        let names = names.names.lock().unwrap();
        assert!(!names.is_empty());
        assert!(names.len() <= 3);
        let allowed: HashSet<String> = (0..3).map(|i| format!("hash-worker-{i}")).collect();
        assert!(names.is_subset(&allowed), "unexpected threads: {names:?}");
    }

    #[test]
    fn test_worker_panic_reports_missing_results() {
        let dir = TempDir::new().unwrap();
        let paths = write_files(&dir, 20);
        let callback = Arc::new(PanicAt {
            fail_at: 3,
            calls: AtomicUsize::new(0),
        });

        let result = HashPool::new(Hasher::new(), 2)
            .with_progress(callback)
            .hash_all(paths);

        match result {
            Err(PoolError::WorkerPanicked { expected, received }) => {
                assert_eq!(expected, 20);
                assert_eq!(received, 19);
            }
            other => panic!("expected WorkerPanicked, got {other:?}"),
        }
    }
}
