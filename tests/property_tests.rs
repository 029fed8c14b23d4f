use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use dirdedupe::duplicates::{classify_by_digest, classify_pairwise, FileRecord};
use dirdedupe::scanner::Hasher;
use proptest::prelude::*;
use tempfile::TempDir;

fn records_from(digests: &[u8]) -> Vec<FileRecord> {
    digests
        .iter()
        .enumerate()
        .map(|(i, d)| {
            if *d == 0 {
                FileRecord::failed(
                    PathBuf::from(format!("/fake/{i}")),
                    dirdedupe::scanner::HashError::NotFound(PathBuf::from(format!("/fake/{i}"))),
                )
            } else {
                FileRecord::hashed(PathBuf::from(format!("/fake/{i}")), format!("{d:02x}"), 1)
            }
        })
        .collect()
}

fn marks(records: &[FileRecord]) -> Vec<Option<usize>> {
    records.iter().map(|r| r.duplicate_of).collect()
}

proptest! {
    #[test]
    fn test_hash_determinism(content in prop::collection::vec(any::<u8>(), 0..4096)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::write(&path, &content).unwrap();

        let hasher = Hasher::new();
        let first = hasher.hash_file(&path).unwrap();
        let second = hasher.hash_file(&path).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.bytes, content.len() as u64);
        prop_assert_eq!(first.hex.len(), 64);
    }

    #[test]
    fn test_buffer_size_does_not_change_digest(
        content in prop::collection::vec(any::<u8>(), 0..2048),
        buffer in 1usize..300,
    ) {
        let small = Hasher::new().with_buffer_size(buffer);
        let large = Hasher::new();
        prop_assert_eq!(
            small.hash_reader(content.as_slice()).unwrap(),
            large.hash_reader(content.as_slice()).unwrap()
        );
    }

    #[test]
    fn test_strategies_agree(digests in prop::collection::vec(0u8..6, 0..40)) {
        let mut pairwise = records_from(&digests);
        let mut by_digest = records_from(&digests);
        classify_pairwise(&mut pairwise);
        classify_by_digest(&mut by_digest);

        prop_assert_eq!(marks(&pairwise), marks(&by_digest));
    }

    #[test]
    fn test_classification_invariants(digests in prop::collection::vec(0u8..6, 0..40)) {
        let mut records = records_from(&digests);
        classify_pairwise(&mut records);

        let mut seen = HashSet::new();
        for (i, record) in records.iter().enumerate() {
            if !record.is_hashed() {
                prop_assert!(record.duplicate_of.is_none());
                continue;
            }
            match record.duplicate_of {
                Some(first) => {
                    // Points backwards, at the first record with the same digest.
                    prop_assert!(first < i);
                    prop_assert_eq!(&records[first].digest, &record.digest);
                    prop_assert!(records[first].duplicate_of.is_none());
                    prop_assert!(seen.contains(&record.digest));
                }
                None => {
                    prop_assert!(seen.insert(record.digest.clone()));
                }
            }
        }
    }

    #[test]
    fn test_one_survivor_per_class(digests in prop::collection::vec(1u8..8, 0..40)) {
        let mut records = records_from(&digests);
        classify_by_digest(&mut records);

        let survivors = records.iter().filter(|r| r.is_unique()).count();
        let classes: HashSet<_> = digests.iter().collect();
        prop_assert_eq!(survivors, classes.len());
    }

    #[test]
    fn test_classes_independent_of_order(
        digests in prop::collection::vec(1u8..5, 1..25),
        seed in any::<u64>(),
    ) {
        let mut forward = records_from(&digests);
        classify_pairwise(&mut forward);

        // Deterministic shuffle driven by the seed.
        let mut order: Vec<usize> = (0..digests.len()).collect();
        let mut state = seed | 1;
        for i in (1..order.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            order.swap(i, (state % (i as u64 + 1)) as usize);
        }
        let shuffled: Vec<u8> = order.iter().map(|&i| digests[i]).collect();
        let mut other = records_from(&shuffled);
        classify_pairwise(&mut other);

        let class_sizes = |records: &[FileRecord]| {
            let mut sizes: HashMap<String, usize> = HashMap::new();
            for r in records {
                *sizes.entry(r.digest.clone()).or_default() += 1;
            }
            sizes
        };
        let dup_count = |records: &[FileRecord]| records.iter().filter(|r| r.is_duplicate()).count();

        prop_assert_eq!(class_sizes(&forward), class_sizes(&other));
        prop_assert_eq!(dup_count(&forward), dup_count(&other));
    }
}

#[test]
fn test_no_duplicates_in_distinct_set() {
    let digests: Vec<u8> = (1..=30).collect();
    let mut records = records_from(&digests);
    classify_pairwise(&mut records);
    assert!(records.iter().all(|r| r.duplicate_of.is_none()));
}
