//! Weave configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Widest supported shard prefix. Shards are created eagerly, so each extra
/// byte multiplies the shard count by 256.
pub const MAX_PREFIX_BYTES: usize = 2;

/// Construction-time shape of a weave.
///
/// Both values fix the shard keyspace and the lock order, so a weave copies
/// its config on construction and never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaveConfig {
    /// Width of a shard key in bytes.
    pub prefix_bytes: usize,

    /// Number of disjoint key windows taken from each entry.
    pub num_cross_trees: usize,
}

impl WeaveConfig {
    /// Create a config.
    pub fn new(prefix_bytes: usize, num_cross_trees: usize) -> Self {
        Self {
            prefix_bytes,
            num_cross_trees,
        }
    }

    /// Set the prefix width.
    pub fn with_prefix_bytes(mut self, prefix_bytes: usize) -> Self {
        self.prefix_bytes = prefix_bytes;
        self
    }

    /// Set the number of cross trees.
    pub fn with_cross_trees(mut self, num_cross_trees: usize) -> Self {
        self.num_cross_trees = num_cross_trees;
        self
    }

    /// Number of shards: one per possible prefix value.
    ///
    /// Fails for shapes [`validate`](Self::validate) rejects.
    pub fn num_trees(&self) -> Result<usize> {
        self.validate()?;
        1usize
            .checked_shl(8 * self.prefix_bytes as u32)
            .ok_or_else(|| Error::invalid_config("prefix_bytes too wide for this platform"))
    }

    /// Shortest entry that yields a full set of shard keys.
    pub fn min_entry_len(&self) -> usize {
        self.prefix_bytes * self.num_cross_trees
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.prefix_bytes == 0 || self.prefix_bytes > MAX_PREFIX_BYTES {
            return Err(Error::invalid_config(format!(
                "prefix_bytes must be in 1..={}, got {}",
                MAX_PREFIX_BYTES, self.prefix_bytes
            )));
        }

        if self.num_cross_trees == 0 {
            return Err(Error::invalid_config("num_cross_trees must be at least 1"));
        }

        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self::new(1, 2)
    }
}
