//! Weave summaries.

use std::fmt;

use serde::{Deserialize, Serialize};
use weave_core::{Result, WeaveConfig};
use weave_mmr::Summary;

use crate::prefix::ShardId;

/// Every shard's summary, indexed by shard id.
///
/// Each component is exact for its shard. Taken while appends are in flight,
/// the components may reflect different instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaveSummary {
    prefix_bytes: usize,
    shards: Vec<Summary>,
}

impl WeaveSummary {
    /// Summary of a weave with no entries.
    pub fn empty(config: &WeaveConfig) -> Result<Self> {
        Ok(Self {
            prefix_bytes: config.prefix_bytes,
            shards: vec![Summary::EMPTY; config.num_trees()?],
        })
    }

    pub(crate) fn from_shards(prefix_bytes: usize, shards: Vec<Summary>) -> Self {
        Self {
            prefix_bytes,
            shards,
        }
    }

    /// Summary of one shard.
    pub fn get(&self, id: ShardId) -> Option<&Summary> {
        self.shards.get(id.index())
    }

    /// Number of shards.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// True if there are no shards at all.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// All shard summaries in shard order.
    pub fn as_slice(&self) -> &[Summary] {
        &self.shards
    }

    /// Shards holding at least one entry.
    pub fn non_empty(&self) -> impl Iterator<Item = (ShardId, &Summary)> {
        self.shards
            .iter()
            .enumerate()
            .filter(|(_, summary)| !summary.is_empty())
            .map(|(idx, summary)| (ShardId::new(idx as u32), summary))
    }

    /// Sum of shard lengths. Entries written to several shards count once
    /// per shard.
    pub fn total_len(&self) -> u64 {
        self.shards.iter().map(|s| s.len).sum()
    }
}

impl fmt::Display for WeaveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.prefix_bytes * 2;
        let mut first = true;
        for (id, summary) in self.non_empty() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{:0width$x}:{}", id.value(), summary, width = width)?;
            first = false;
        }
        Ok(())
    }
}
