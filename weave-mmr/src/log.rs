//! Append-only hash log.
//!
//! Each appended entry becomes one node at the next position. Where Index
//! Math gives that position children, the children's digests are hashed in
//! ahead of the entry, so every node commits to the mountain beneath it.

use weave_core::{Digest, Error, Result};

use crate::math::{children, consistency_nodes, height, parent, peak_of, peaks};
use crate::proof::{ConsistencyProof, InclusionProof, PathStep};
use crate::store::{MemStore, NodeStore};
use crate::summary::{bag_peaks, node_digest, Summary};

/// Append-only log of entries hashed into a Merkle Mountain Range.
#[derive(Debug, Clone, Default)]
pub struct HashLog<S: NodeStore = MemStore> {
    store: S,
}

impl HashLog<MemStore> {
    /// Create a new empty in-memory log.
    pub fn new() -> Self {
        Self::from_store(MemStore::new())
    }
}

impl<S: NodeStore> HashLog<S> {
    /// Create a log over existing storage.
    pub fn from_store(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of entries.
    pub fn len(&self) -> u64 {
        self.store.len()
    }

    /// True if no entry has been appended.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Append an entry and return its position.
    pub fn append(&mut self, entry: &[u8]) -> Result<u64> {
        let pos = self.store.len();

        let digest = match children(pos, height(pos)) {
            Some((left, right)) => {
                let left = self.node(left)?;
                let right = self.node(right)?;
                node_digest(Some((&left, &right)), entry)?
            }
            None => node_digest(None, entry)?,
        };

        let stored = self.store.push(entry, digest)?;
        if stored != pos {
            return Err(Error::internal(format!(
                "store assigned position {} to node {}",
                stored, pos
            )));
        }
        Ok(pos)
    }

    /// Append several entries in order, returning their positions.
    pub fn append_batch<E: AsRef<[u8]>>(&mut self, entries: &[E]) -> Result<Vec<u64>> {
        let mut positions = Vec::with_capacity(entries.len());
        for entry in entries {
            positions.push(self.append(entry.as_ref())?);
        }
        Ok(positions)
    }

    /// Entry at a position.
    pub fn at(&self, pos: u64) -> Result<Vec<u8>> {
        self.check_bounds(pos)?;
        self.store
            .entry(pos)?
            .ok_or_else(|| Error::internal(format!("missing entry at {}", pos)))
    }

    /// Node digest at a position.
    pub fn digest_at(&self, pos: u64) -> Result<Digest> {
        self.check_bounds(pos)?;
        self.node(pos)
    }

    /// Peak positions for the current length.
    pub fn peak_positions(&self) -> Vec<u64> {
        peaks(self.len())
    }

    /// Peak digests for the current length, in peak order.
    pub fn peaks(&self) -> Result<Vec<Digest>> {
        self.peak_positions()
            .into_iter()
            .map(|pos| self.node(pos))
            .collect()
    }

    /// Summarize the log: its length and bagged peaks.
    pub fn summary(&self) -> Result<Summary> {
        Ok(Summary {
            len: self.len(),
            digest: bag_peaks(&self.peaks()?)?,
        })
    }

    /// Prove the entry at `pos` is committed to by the current summary.
    pub fn inclusion_proof(&self, pos: u64) -> Result<InclusionProof> {
        self.check_bounds(pos)?;
        let len = self.len();

        let children = match children(pos, height(pos)) {
            Some((left, right)) => Some((self.node(left)?, self.node(right)?)),
            None => None,
        };

        let peak = peak_of(len, pos)
            .ok_or_else(|| Error::internal(format!("no peak covers {} at size {}", pos, len)))?;

        let mut path = Vec::new();
        let mut current = pos;
        while current != peak {
            let up = parent(current);
            let (left, right) = self.children_of(up)?;
            let sibling = if current == left { right } else { left };
            path.push(PathStep {
                sibling: self.node(sibling)?,
                parent_entry: self.at(up)?,
            });
            current = up;
        }

        Ok(InclusionProof {
            pos,
            log_len: len,
            children,
            path,
            peaks: self.peaks()?,
        })
    }

    /// Prove the log as it was at `from` entries is a prefix of the log now.
    pub fn consistency_proof(&self, from: u64) -> Result<ConsistencyProof> {
        let to = self.len();
        if from > to {
            return Err(Error::invalid_index(format!(
                "consistency from {} exceeds log length {}",
                from, to
            )));
        }

        let nodes = consistency_nodes(from, to)?;

        let from_peaks = peaks(from)
            .into_iter()
            .map(|pos| self.node(pos))
            .collect::<Result<Vec<_>>>()?;
        let siblings = nodes
            .siblings
            .iter()
            .map(|&pos| self.node(pos).map(|digest| (pos, digest)))
            .collect::<Result<Vec<_>>>()?;
        let ancestors = nodes
            .ancestors
            .iter()
            .map(|&pos| self.at(pos).map(|entry| (pos, entry)))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConsistencyProof {
            from_len: from,
            to_len: to,
            from_peaks,
            siblings,
            ancestors,
        })
    }

    /// Generate inclusion proofs for several positions in parallel.
    pub fn proof_batch(&self, positions: &[u64]) -> Result<Vec<InclusionProof>>
    where
        S: Sync,
    {
        use rayon::prelude::*;

        // Thread handoff costs more than a handful of proofs.
        if positions.len() < 16 {
            return positions.iter().map(|&pos| self.inclusion_proof(pos)).collect();
        }

        positions
            .par_iter()
            .map(|&pos| self.inclusion_proof(pos))
            .collect()
    }

    fn check_bounds(&self, pos: u64) -> Result<()> {
        let len = self.len();
        if pos >= len {
            return Err(Error::invalid_index(format!(
                "position {} >= length {}",
                pos, len
            )));
        }
        Ok(())
    }

    fn node(&self, pos: u64) -> Result<Digest> {
        self.store
            .digest(pos)?
            .ok_or_else(|| Error::internal(format!("missing node at {}", pos)))
    }

    fn children_of(&self, pos: u64) -> Result<(u64, u64)> {
        children(pos, height(pos))
            .ok_or_else(|| Error::internal(format!("node {} has no children", pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::{hash, ErrorCode, EMPTY_LOG_DIGEST};

    fn entry(i: u64) -> Vec<u8> {
        format!("entry-{}", i).into_bytes()
    }

    fn filled(n: u64) -> HashLog {
        let mut log = HashLog::new();
        for i in 0..n {
            log.append(&entry(i)).unwrap();
        }
        log
    }

    /// 64-byte entry: 1, 2, 3, then zeros.
    fn oracle_entry() -> [u8; 64] {
        let mut e = [0u8; 64];
        e[..3].copy_from_slice(&[1, 2, 3]);
        e
    }

    #[test]
    fn test_append_assigns_sequential_positions() {
        let mut log = HashLog::new();
        assert!(log.is_empty());
        for i in 0..10 {
            assert_eq!(log.append(&entry(i)).unwrap(), i);
        }
        assert_eq!(log.len(), 10);
    }

    #[test]
    fn test_leaf_and_internal_digests() {
        let log = filled(3);

        let d0 = hash(&entry(0)).unwrap();
        let d1 = hash(&entry(1)).unwrap();
        assert_eq!(log.digest_at(0).unwrap(), d0);
        assert_eq!(log.digest_at(1).unwrap(), d1);

        // Position 2 folds in both children ahead of its own entry.
        let d2 = node_digest(Some((&d0, &d1)), &entry(2)).unwrap();
        assert_eq!(log.digest_at(2).unwrap(), d2);
    }

    #[test]
    fn test_at_returns_raw_entries() {
        let log = filled(5);
        for i in 0..5 {
            assert_eq!(log.at(i).unwrap(), entry(i));
        }
    }

    #[test]
    fn test_at_out_of_range() {
        let log = filled(2);
        let err = log.at(2).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidIndex);
        assert!(log.digest_at(100).is_err());
        assert!(HashLog::new().at(0).is_err());
    }

    #[test]
    fn test_empty_summary() {
        let log = HashLog::new();
        let summary = log.summary().unwrap();
        assert_eq!(summary, Summary::EMPTY);
        assert_eq!(summary.digest, EMPTY_LOG_DIGEST);
    }

    #[test]
    fn test_summary_is_stable() {
        let log = filled(11);
        assert_eq!(log.summary().unwrap(), log.summary().unwrap());
    }

    #[test]
    fn test_summary_changes_on_append() {
        let mut log = filled(4);
        let before = log.summary().unwrap();
        log.append(b"more").unwrap();
        let after = log.summary().unwrap();
        assert_ne!(before, after);
        assert_eq!(after.len, 5);
    }

    #[test]
    fn test_summary_bags_peaks() {
        let log = filled(5);
        assert_eq!(log.peak_positions(), vec![2, 3, 4]);
        let expected = bag_peaks(&[
            log.digest_at(2).unwrap(),
            log.digest_at(3).unwrap(),
            log.digest_at(4).unwrap(),
        ])
        .unwrap();
        assert_eq!(log.summary().unwrap().digest, expected);
    }

    #[test]
    fn test_summary_regression_single_entry() {
        let mut log = HashLog::new();
        log.append(&oracle_entry()).unwrap();

        let summary = log.summary().unwrap();
        assert_eq!(summary.len, 1);
        assert_eq!(
            summary.digest.to_hex(),
            "5e43cd4c1677a8bcf56b89c40218dbde90da2f1b25496f82eeae2659c169f089\
             0de100811385a5431ad727b9fd5872eeac01fccdb9a7569d8d95074b926be2ef"
        );
    }

    #[test]
    fn test_summary_regression_many_entries() {
        let mut log = HashLog::new();
        for _ in 0..101 {
            log.append(&oracle_entry()).unwrap();
        }

        let summary = log.summary().unwrap();
        assert_eq!(summary.len, 101);
        assert_eq!(
            summary.digest.to_hex(),
            "5c119cf4a06568c32dd2246f7278cdb523335efcbc1d2de2d101e068d21c637e\
             f27886d85ffb270c37580ccd23077b2afa5e147d9fbb2637e584f2559120aa36"
        );
    }

    #[test]
    fn test_summary_regression_single_byte_entries() {
        let mut log = HashLog::new();
        for i in 0..7u8 {
            log.append(&[i]).unwrap();
        }
        assert_eq!(
            log.summary().unwrap().digest.to_hex(),
            "21b51597a25cb5d2f0e0ec27f09a7b7ce3f7c21525e2045d90d8abe2260e93c2\
             4cc8fb461fda946b219a87caffd4edaee16d5d5098caf23eae75332d03f10f85"
        );
    }

    #[test]
    fn test_identical_sequences_identical_summaries() {
        assert_eq!(filled(9).summary().unwrap(), filled(9).summary().unwrap());
        assert_ne!(filled(9).summary().unwrap(), filled(8).summary().unwrap());
    }

    #[test]
    fn test_append_batch() {
        let mut log = HashLog::new();
        let entries: Vec<Vec<u8>> = (0..10).map(entry).collect();
        let positions = log.append_batch(&entries).unwrap();

        assert_eq!(positions, (0..10).collect::<Vec<_>>());
        assert_eq!(log.summary().unwrap(), filled(10).summary().unwrap());
    }

    #[test]
    fn test_inclusion_proof_every_position() {
        let log = filled(23);
        let summary = log.summary().unwrap();

        for pos in 0..23 {
            let proof = log.inclusion_proof(pos).unwrap();
            assert!(proof.verify(&entry(pos), &summary).unwrap(), "pos {}", pos);
        }
    }

    #[test]
    fn test_inclusion_proof_shape() {
        let log = filled(7);

        // Leaf 0 climbs 0 -> 2 -> 6.
        let proof = log.inclusion_proof(0).unwrap();
        assert!(proof.children.is_none());
        assert_eq!(proof.path.len(), 2);
        assert_eq!(proof.path[0].sibling, log.digest_at(1).unwrap());
        assert_eq!(proof.path[0].parent_entry, entry(2));
        assert_eq!(proof.path[1].sibling, log.digest_at(5).unwrap());

        // The peak itself needs no path, only its children.
        let proof = log.inclusion_proof(6).unwrap();
        assert!(proof.path.is_empty());
        assert_eq!(
            proof.children,
            Some((log.digest_at(2).unwrap(), log.digest_at(5).unwrap()))
        );
    }

    #[test]
    fn test_inclusion_proof_rejects_wrong_entry() {
        let log = filled(6);
        let summary = log.summary().unwrap();
        let proof = log.inclusion_proof(3).unwrap();
        assert!(!proof.verify(b"forged", &summary).unwrap());
    }

    #[test]
    fn test_inclusion_proof_out_of_range() {
        let log = filled(3);
        assert_eq!(
            log.inclusion_proof(3).unwrap_err().code(),
            ErrorCode::InvalidIndex
        );
    }

    #[test]
    fn test_consistency_proof_all_prefixes() {
        let mut log = HashLog::new();
        let mut summaries = vec![log.summary().unwrap()];
        for i in 0..20 {
            log.append(&entry(i)).unwrap();
            summaries.push(log.summary().unwrap());
        }

        let now = log.summary().unwrap();
        for from in 0..=20u64 {
            let proof = log.consistency_proof(from).unwrap();
            assert!(
                proof.verify(&summaries[from as usize], &now).unwrap(),
                "from {}",
                from
            );
        }
    }

    #[test]
    fn test_consistency_proof_rejects_foreign_history() {
        let log = filled(12);
        let mut other = HashLog::new();
        for i in 0..5 {
            other.append(format!("other-{}", i).as_bytes()).unwrap();
        }

        let proof = log.consistency_proof(5).unwrap();
        assert!(!proof
            .verify(&other.summary().unwrap(), &log.summary().unwrap())
            .unwrap());
    }

    #[test]
    fn test_consistency_proof_beyond_length() {
        let log = filled(4);
        assert_eq!(
            log.consistency_proof(5).unwrap_err().code(),
            ErrorCode::InvalidIndex
        );
    }

    #[test]
    fn test_proof_batch() {
        let log = filled(40);
        let summary = log.summary().unwrap();
        let positions: Vec<u64> = (0..40).collect();

        let proofs = log.proof_batch(&positions).unwrap();
        assert_eq!(proofs.len(), 40);
        for (pos, proof) in proofs.iter().enumerate() {
            assert_eq!(proof.pos, pos as u64);
            assert!(proof.verify(&entry(pos as u64), &summary).unwrap());
        }
    }
}
