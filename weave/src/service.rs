//! Read-only summary queries.

use weave_core::Result;
use weave_mmr::{NodeStore, Summary};

use crate::prefix::ShardId;
use crate::summary::WeaveSummary;
use crate::weave::Weave;

/// Synchronous, side-effect-free summary reads.
///
/// A transport layer serves these; framing and encoding belong to it.
pub trait SummaryService: Send + Sync {
    /// Current summary of every shard.
    fn weave_summary(&self) -> Result<WeaveSummary>;

    /// Current summary of one shard.
    fn shard_summary(&self, id: ShardId) -> Result<Summary>;
}

impl<S: NodeStore + Send> SummaryService for Weave<S> {
    fn weave_summary(&self) -> Result<WeaveSummary> {
        self.summary()
    }

    fn shard_summary(&self, id: ShardId) -> Result<Summary> {
        Weave::shard_summary(self, id)
    }
}
