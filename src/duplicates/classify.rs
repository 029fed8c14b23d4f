//! First-occurrence classification.
//!
//! Given hashed records in some order, every record whose digest matches an
//! earlier record's digest is marked as a duplicate of the *earliest* such
//! record. Chains are single-level: a duplicate always points at a record
//! that is itself not a duplicate.
//!
//! Records that failed hashing (error set or empty digest) take no part in
//! either role.
//!
//! Two strategies give identical results:
//! - [`classify_pairwise`]: compares every ordered pair, O(n²)
//! - [`classify_by_digest`]: digest → first index map, O(n)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::FileRecord;

/// Which classification algorithm to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifyStrategy {
    /// Compare every pair of records.
    #[default]
    Pairwise,
    /// Index first occurrences by digest.
    DigestMap,
}

/// Classify `records` in place using `strategy`.
pub fn classify(records: &mut [FileRecord], strategy: ClassifyStrategy) {
    match strategy {
        ClassifyStrategy::Pairwise => classify_pairwise(records),
        ClassifyStrategy::DigestMap => classify_by_digest(records),
    }
}

/// Pairwise classification.
///
/// For every `i < j`, if both records are hashed with equal digests and `j` is not
/// yet marked, mark `j` as a duplicate of `i`. Since `i` runs in increasing
/// order, `j` always ends up pointing at the first occurrence.
pub fn classify_pairwise(records: &mut [FileRecord]) {
    for record in records.iter_mut() {
        record.duplicate_of = None;
    }

    let n = records.len();
    for i in 0..n {
        if !records[i].is_hashed() || records[i].duplicate_of.is_some() {
            continue;
        }
        for j in (i + 1)..n {
            if records[j].duplicate_of.is_none()
                && records[j].is_hashed()
                && records[j].digest == records[i].digest
            {
                records[j].duplicate_of = Some(i);
            }
        }
    }
}

/// Digest-keyed classification; same result as [`classify_pairwise`].
pub fn classify_by_digest(records: &mut [FileRecord]) {
    let mut first_seen: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for (index, record) in records.iter_mut().enumerate() {
        record.duplicate_of = None;
        if !record.is_hashed() {
            continue;
        }
        match first_seen.get(&record.digest) {
            Some(&first) => record.duplicate_of = Some(first),
            None => {
                first_seen.insert(record.digest.clone(), index);
            }
        }
    }
}
