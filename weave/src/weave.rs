//! The sharded weave.
//!
//! A weave owns one [`HashLog`] per possible prefix value, each behind its
//! own lock. An entry is written to every shard named by its own leading
//! bytes. Multi-shard writes take their locks in ascending [`ShardId`]
//! order; reads take one lock at a time. No other lock exists, so no cycle
//! of waiting callers can form.
//!
//! ```text
//!   entry: [p0 | p1 | ...payload...]
//!            |    |
//!            v    v
//!   shards: [0] [1] ... [p0] ... [p1] ... [255]
//! ```

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use weave_core::{Error, Result, WeaveConfig};
use weave_mmr::{ConsistencyProof, HashLog, InclusionProof, MemStore, NodeStore, Summary};

use crate::prefix::{shard_keys, ShardId};
use crate::summary::WeaveSummary;

/// Where one append landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendReceipt {
    shards: Vec<(ShardId, u64)>,
}

impl AppendReceipt {
    /// `(shard, position)` pairs in lock order.
    pub fn shards(&self) -> &[(ShardId, u64)] {
        &self.shards
    }

    /// Position of the entry within a shard, if written there.
    pub fn position(&self, id: ShardId) -> Option<u64> {
        self.shards
            .iter()
            .find(|(shard, _)| *shard == id)
            .map(|(_, pos)| *pos)
    }

    /// Number of shards written.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// True if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

/// Concurrently appendable set of hash logs keyed by byte prefix.
pub struct Weave<S: NodeStore = MemStore> {
    config: WeaveConfig,
    shards: Box<[Mutex<HashLog<S>>]>,
}

impl Weave<MemStore> {
    /// Create a weave with in-memory shards.
    pub fn new(config: WeaveConfig) -> Result<Self> {
        Self::with_stores(config, |_| MemStore::new())
    }
}

impl<S: NodeStore> Weave<S> {
    /// Create a weave, building each shard's store with `make_store`.
    ///
    /// Every shard is created up front; the set never changes afterwards.
    pub fn with_stores<F>(config: WeaveConfig, mut make_store: F) -> Result<Self>
    where
        F: FnMut(ShardId) -> S,
    {
        let num_trees = config.num_trees()?;
        let shards: Box<[Mutex<HashLog<S>>]> = (0..num_trees)
            .map(|idx| Mutex::new(HashLog::from_store(make_store(ShardId::new(idx as u32)))))
            .collect();

        info!(
            shards = num_trees,
            prefix_bytes = config.prefix_bytes,
            cross_trees = config.num_cross_trees,
            "weave created"
        );

        Ok(Self { config, shards })
    }

    /// Construction-time configuration.
    pub fn config(&self) -> &WeaveConfig {
        &self.config
    }

    /// Number of shards.
    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Shards an entry would be written to, in lock order.
    pub fn shard_keys(&self, entry: &[u8]) -> Result<Vec<ShardId>> {
        shard_keys(&self.config, entry)
    }

    /// Append an entry to every shard its prefixes name.
    ///
    /// Locks are taken in ascending shard order and held until every write
    /// has been attempted. If a shard write fails, the error is returned as
    /// is and shards written earlier in the call keep the entry.
    pub fn append(&self, entry: &[u8]) -> Result<AppendReceipt> {
        let keys = self.shard_keys(entry)?;

        let mut guards = Vec::with_capacity(keys.len());
        for &id in &keys {
            guards.push((id, self.shard(id)?.lock()));
        }

        let mut written = Vec::with_capacity(guards.len());
        for (id, log) in guards.iter_mut() {
            match log.append(entry) {
                Ok(pos) => written.push((*id, pos)),
                Err(e) => {
                    if !written.is_empty() {
                        warn!(
                            failed = %id,
                            written = ?written,
                            error = %e,
                            "partial weave append"
                        );
                    }
                    return Err(e);
                }
            }
        }

        debug!(shards = written.len(), "weave append");
        Ok(AppendReceipt { shards: written })
    }

    /// Sum of shard lengths, reading one shard at a time.
    ///
    /// With appends in flight an entry may be counted in some of its shards
    /// and not yet in others.
    pub fn approx_len(&self) -> u64 {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Summaries of every shard, computed in parallel.
    ///
    /// Each shard is locked only while its own summary is taken.
    pub fn summary(&self) -> Result<WeaveSummary>
    where
        S: Send,
    {
        let shards = self
            .shards
            .par_iter()
            .map(|shard| shard.lock().summary())
            .collect::<Result<Vec<_>>>()?;
        Ok(WeaveSummary::from_shards(self.config.prefix_bytes, shards))
    }

    /// Length of one shard.
    pub fn shard_len(&self, id: ShardId) -> Result<u64> {
        Ok(self.shard(id)?.lock().len())
    }

    /// Summary of one shard.
    pub fn shard_summary(&self, id: ShardId) -> Result<Summary> {
        self.shard(id)?.lock().summary()
    }

    /// Entry at a position within one shard.
    pub fn shard_entry(&self, id: ShardId, pos: u64) -> Result<Vec<u8>> {
        self.shard(id)?.lock().at(pos)
    }

    /// Inclusion proof for a position within one shard.
    pub fn shard_inclusion_proof(&self, id: ShardId, pos: u64) -> Result<InclusionProof> {
        self.shard(id)?.lock().inclusion_proof(pos)
    }

    /// Consistency proof from an earlier length of one shard to now.
    pub fn shard_consistency_proof(&self, id: ShardId, from: u64) -> Result<ConsistencyProof> {
        self.shard(id)?.lock().consistency_proof(from)
    }

    fn shard(&self, id: ShardId) -> Result<&Mutex<HashLog<S>>> {
        self.shards.get(id.index()).ok_or_else(|| {
            Error::invalid_index(format!(
                "shard {} outside {} shards",
                id,
                self.shards.len()
            ))
        })
    }
}

impl<S: NodeStore> std::fmt::Debug for Weave<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Weave")
            .field("config", &self.config)
            .field("shards", &self.shards.len())
            .finish()
    }
}
