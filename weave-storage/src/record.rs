//! Durable node records and their chaining rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weave_core::{ChainHasher, Digest, Result};

/// A node digest and the time its record was written.
pub type Link = (Digest, DateTime<Utc>);

/// What a durable store keeps for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Time the driver accepted the write.
    pub timestamp: DateTime<Utc>,
    /// Digest of the raw entry.
    pub payload_digest: Digest,
    /// Chained digest linking this record to earlier ones.
    pub node_digest: Digest,
}

impl StoredRecord {
    /// Chained digest of a record.
    ///
    /// `H(payload || previous digest || previous time || left child digest
    /// || left child time)`, with times as big-endian microseconds since the
    /// epoch. A missing link contributes the zero digest and time 0.
    pub fn chain_digest(
        payload_digest: &Digest,
        previous: Option<Link>,
        left_child: Option<Link>,
    ) -> Result<Digest> {
        let mut hasher = ChainHasher::new();
        hasher.update(payload_digest.as_bytes())?;
        for (digest, timestamp) in [link_parts(previous), link_parts(left_child)] {
            hasher.update(digest.as_bytes())?;
            hasher.update(&timestamp.to_be_bytes())?;
        }
        hasher.finalize()
    }

    /// This record as a link for later records.
    pub fn link(&self) -> Link {
        (self.node_digest, self.timestamp)
    }

    /// Recompute the chained digest and compare.
    pub fn verify(&self, previous: Option<Link>, left_child: Option<Link>) -> Result<bool> {
        Ok(Self::chain_digest(&self.payload_digest, previous, left_child)? == self.node_digest)
    }
}

fn link_parts(link: Option<Link>) -> (Digest, i64) {
    match link {
        Some((digest, timestamp)) => (digest, timestamp.timestamp_micros()),
        None => (Digest::ZERO, 0),
    }
}

/// Bytes handed to a driver for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePayload {
    /// Raw entry.
    pub entry: Vec<u8>,
    /// Digest of the raw entry.
    pub payload_digest: Digest,
    /// Chained digest computed before the write.
    pub node_digest: Digest,
}

impl NodePayload {
    /// Encode for a driver.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode bytes returned by a driver.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
