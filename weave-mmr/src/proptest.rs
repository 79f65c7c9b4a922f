//! Property-based tests for index math and hash logs.

use proptest::prelude::*;

use crate::math::{children, height, parent, peaks, subtree_start};
use crate::HashLog;

// ============================================================================
// Arbitrary Implementations
// ============================================================================

/// Arbitrary entry bytes, empty entries included.
fn arb_entry() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..48)
}

fn arb_entries(max_count: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(arb_entry(), 0..max_count)
}

fn log_from(entries: &[Vec<u8>]) -> HashLog {
    let mut log = HashLog::new();
    log.append_batch(entries).expect("append should succeed");
    log
}

// ============================================================================
// Property Tests: Index Math
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Peak mountains cover the forest exactly, tallest first
    #[test]
    fn prop_peaks_partition_forest(n in 0u64..1_000_000u64) {
        let peaks = peaks(n);
        let mut covered = 0u64;
        let mut prev_height: Option<u32> = None;

        for &peak in &peaks {
            prop_assert_eq!(subtree_start(peak), covered);
            covered = peak + 1;

            let h = height(peak);
            if let Some(prev) = prev_height {
                prop_assert!(h < prev);
            }
            prev_height = Some(h);
        }
        prop_assert_eq!(covered, n);
    }

    /// Peaks strictly increase
    #[test]
    fn prop_peaks_ordered(n in 0u64..u64::MAX) {
        let peaks = peaks(n);
        for window in peaks.windows(2) {
            prop_assert!(window[0] < window[1]);
        }
        if let Some(&last) = peaks.last() {
            prop_assert!(last < n);
        }
    }

    /// Children precede their parent and sit one height below it
    #[test]
    fn prop_children_precede_parent(pos in 0u64..(1u64 << 40)) {
        let h = height(pos);
        match children(pos, h) {
            None => prop_assert_eq!(h, 0),
            Some((left, right)) => {
                prop_assert!(left < right && right < pos);
                prop_assert_eq!(height(left), h - 1);
                prop_assert_eq!(height(right), h - 1);
                prop_assert_eq!(parent(left), pos);
                prop_assert_eq!(parent(right), pos);
            }
        }
    }

    /// Parent sits one height above and lists the node as a child
    #[test]
    fn prop_parent_inverts_children(pos in 0u64..(1u64 << 40)) {
        let up = parent(pos);
        prop_assert!(up > pos);
        prop_assert_eq!(height(up), height(pos) + 1);

        let (left, right) = children(up, height(up)).expect("parent has children");
        prop_assert!(pos == left || pos == right);
    }
}

// ============================================================================
// Property Tests: Summaries
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Identical sequences give identical summaries
    #[test]
    fn prop_summary_deterministic(entries in arb_entries(64)) {
        let a = log_from(&entries).summary().expect("summary should succeed");
        let b = log_from(&entries).summary().expect("summary should succeed");
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.len, entries.len() as u64);
    }

    /// Different sequences of the same length give different summaries
    #[test]
    fn prop_summary_distinguishes_sequences(
        a in arb_entries(16),
        b in arb_entries(16)
    ) {
        prop_assume!(a != b);
        let sa = log_from(&a).summary().expect("summary should succeed");
        let sb = log_from(&b).summary().expect("summary should succeed");
        prop_assert_ne!(sa, sb);
    }

    /// Every append changes the summary
    #[test]
    fn prop_summary_changes_on_append(entries in arb_entries(32)) {
        let mut log = HashLog::new();
        let mut prev = log.summary().expect("summary should succeed");
        for entry in &entries {
            log.append(entry).expect("append should succeed");
            let next = log.summary().expect("summary should succeed");
            prop_assert_ne!(prev, next);
            prev = next;
        }
    }

    /// Entries read back exactly as written
    #[test]
    fn prop_entries_read_back(entries in arb_entries(64)) {
        let log = log_from(&entries);
        for (pos, entry) in entries.iter().enumerate() {
            prop_assert_eq!(&log.at(pos as u64).expect("read should succeed"), entry);
        }
    }
}

// ============================================================================
// Property Tests: Proofs
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every position has a verifying inclusion proof
    #[test]
    fn prop_inclusion_proofs_verify(entries in arb_entries(64)) {
        let log = log_from(&entries);
        let summary = log.summary().expect("summary should succeed");

        for (pos, entry) in entries.iter().enumerate() {
            let proof = log.inclusion_proof(pos as u64).expect("proof should succeed");
            prop_assert!(proof.verify(entry, &summary).expect("verify should not error"));
        }
    }

    /// Inclusion proofs reject any other entry
    #[test]
    fn prop_inclusion_rejects_other_entry(
        entries in arb_entries(32),
        forged in arb_entry(),
        idx in any::<prop::sample::Index>()
    ) {
        prop_assume!(!entries.is_empty());
        let pos = idx.index(entries.len());
        prop_assume!(entries[pos] != forged);

        let log = log_from(&entries);
        let summary = log.summary().expect("summary should succeed");
        let proof = log.inclusion_proof(pos as u64).expect("proof should succeed");
        prop_assert!(!proof.verify(&forged, &summary).expect("verify should not error"));
    }

    /// Any earlier summary is provably a prefix of the current one
    #[test]
    fn prop_consistency_proofs_verify(
        entries in arb_entries(64),
        cut in any::<prop::sample::Index>()
    ) {
        let from = cut.index(entries.len() + 1);
        let old = log_from(&entries[..from]).summary().expect("summary should succeed");

        let log = log_from(&entries);
        let new = log.summary().expect("summary should succeed");
        let proof = log.consistency_proof(from as u64).expect("proof should succeed");
        prop_assert!(proof.verify(&old, &new).expect("verify should not error"));
    }
}
