//! Log summaries and the digest rules shared by logs and proof verifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use weave_core::{ChainHasher, Digest, Result, EMPTY_LOG_DIGEST};

/// Compact commitment to a whole log: entry count plus bagged peaks.
///
/// Two logs with equal summaries hold the same entry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Summary {
    /// Number of entries.
    pub len: u64,
    /// Bagged peak digests.
    pub digest: Digest,
}

impl Summary {
    /// Summary of a log with no entries.
    pub const EMPTY: Self = Self {
        len: 0,
        digest: EMPTY_LOG_DIGEST,
    };

    /// Summary of a log with no entries.
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// True if this summarizes an empty log.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.len, &self.digest.to_hex()[..16])
    }
}

/// Digest of one node: children (left, right) if internal, then the entry.
pub fn node_digest(children: Option<(&Digest, &Digest)>, entry: &[u8]) -> Result<Digest> {
    let mut hasher = ChainHasher::new();
    if let Some((left, right)) = children {
        hasher.update(left.as_bytes())?;
        hasher.update(right.as_bytes())?;
    }
    hasher.update(entry)?;
    hasher.finalize()
}

/// Bag peak digests, in peak order, into one digest.
pub fn bag_peaks(peaks: &[Digest]) -> Result<Digest> {
    let mut hasher = ChainHasher::new();
    for peak in peaks {
        hasher.update(peak.as_bytes())?;
    }
    hasher.finalize()
}
