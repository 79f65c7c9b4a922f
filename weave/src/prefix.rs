//! Shard identifiers and shard-key derivation.

use std::fmt;

use serde::{Deserialize, Serialize};
use weave_core::{Error, Result, WeaveConfig};

/// Identifies one shard by the numeric value of its prefix bytes.
///
/// Prefixes are read big-endian, so ordering ids numerically is the same as
/// ordering their prefixes byte by byte. That order is the lock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShardId(u32);

impl ShardId {
    /// Create a shard id from its numeric value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Read a prefix big-endian.
    pub fn from_prefix(prefix: &[u8]) -> Self {
        Self(
            prefix
                .iter()
                .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte)),
        )
    }

    /// Numeric value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Index into a weave's shard array.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Prefix bytes for a given width.
    pub fn to_prefix(self, width: usize) -> Vec<u8> {
        let bytes = self.0.to_be_bytes();
        bytes[bytes.len().saturating_sub(width)..].to_vec()
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Two hex digits per prefix byte.
        if self.0 > 0xff {
            write!(f, "{:04x}", self.0)
        } else {
            write!(f, "{:02x}", self.0)
        }
    }
}

impl From<u32> for ShardId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Derive the shards an entry is written to.
///
/// Window `i` covers bytes `[i * prefix_bytes, (i + 1) * prefix_bytes)`.
/// The result is deduplicated and sorted in lock order. Configs that
/// [`WeaveConfig::validate`] rejects are refused.
pub fn shard_keys(config: &WeaveConfig, entry: &[u8]) -> Result<Vec<ShardId>> {
    config.validate()?;

    let min_len = config.min_entry_len();
    if entry.len() < min_len {
        return Err(Error::invalid_input(format!(
            "entry of {} bytes is shorter than {} required for {} shard keys",
            entry.len(),
            min_len,
            config.num_cross_trees
        )));
    }

    let mut keys: Vec<ShardId> = entry[..min_len]
        .chunks_exact(config.prefix_bytes)
        .map(ShardId::from_prefix)
        .collect();
    keys.sort_unstable();
    keys.dedup();
    Ok(keys)
}
