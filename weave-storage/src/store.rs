//! A node store that persists every node through a storage driver.

use tracing::{debug, error};
use weave_core::{hash, Digest, Error, Result};
use weave_mmr::math::{children, height};
use weave_mmr::NodeStore;

use crate::driver::StorageDriver;
use crate::record::{Link, NodePayload, StoredRecord};

/// Node store backed by a [`StorageDriver`].
///
/// Each pushed node is written to the driver exactly once, as a chained
/// record linking it to the previous position and to its left child.
/// Entries, digests and records are also kept in memory for reads.
#[derive(Debug)]
pub struct DriverStore<D: StorageDriver> {
    driver: D,
    entries: Vec<Vec<u8>>,
    digests: Vec<Digest>,
    records: Vec<StoredRecord>,
}

impl<D: StorageDriver> DriverStore<D> {
    /// Wrap an empty driver.
    pub fn new(driver: D) -> Result<Self> {
        let existing = driver.len()?;
        if existing != 0 {
            return Err(Error::invalid_input(format!(
                "driver already holds {} nodes",
                existing
            )));
        }

        Ok(Self {
            driver,
            entries: Vec::new(),
            digests: Vec::new(),
            records: Vec::new(),
        })
    }

    /// Borrow the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Durable record at a position.
    pub fn record(&self, pos: u64) -> Option<&StoredRecord> {
        self.records.get(pos as usize)
    }

    /// Re-read every node from the driver and recheck every chained digest.
    pub fn verify_chain(&self) -> Result<bool> {
        for (idx, record) in self.records.iter().enumerate() {
            let pos = idx as u64;
            let bytes = self.driver.get(pos)?.ok_or_else(|| {
                Error::storage_corruption(format!("driver lost node {}", pos))
            })?;
            let payload = NodePayload::from_bytes(&bytes).map_err(|e| {
                Error::storage_corruption(format!("node {} does not decode: {}", pos, e))
            })?;

            if payload.entry != self.entries[idx]
                || payload.payload_digest != record.payload_digest
                || payload.node_digest != record.node_digest
                || hash(&payload.entry)? != record.payload_digest
            {
                return Ok(false);
            }

            if !record.verify(self.previous_link(pos), self.left_child_link(pos))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn previous_link(&self, pos: u64) -> Option<Link> {
        let prev = pos.checked_sub(1)?;
        self.record(prev).map(StoredRecord::link)
    }

    fn left_child_link(&self, pos: u64) -> Option<Link> {
        let (left, _) = children(pos, height(pos))?;
        self.record(left).map(StoredRecord::link)
    }
}

impl<D: StorageDriver> NodeStore for DriverStore<D> {
    fn len(&self) -> u64 {
        self.digests.len() as u64
    }

    fn entry(&self, pos: u64) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(pos as usize).cloned())
    }

    fn digest(&self, pos: u64) -> Result<Option<Digest>> {
        Ok(self.digests.get(pos as usize).copied())
    }

    fn push(&mut self, entry: &[u8], digest: Digest) -> Result<u64> {
        let pos = self.len();

        let payload_digest = hash(entry)?;
        let node_digest = StoredRecord::chain_digest(
            &payload_digest,
            self.previous_link(pos),
            self.left_child_link(pos),
        )?;
        let payload = NodePayload {
            entry: entry.to_vec(),
            payload_digest,
            node_digest,
        };

        let receipt = self.driver.write_next(&payload.to_bytes()?)?;

        if receipt.seq != pos {
            error!(pos, seq = receipt.seq, "driver assigned wrong sequence number");
            return Err(Error::storage_corruption(format!(
                "driver assigned sequence {} to node {}",
                receipt.seq, pos
            )));
        }
        match NodePayload::from_bytes(&receipt.node) {
            Ok(stored) if stored == payload => {}
            _ => {
                error!(pos, "driver returned a node that does not match the write");
                return Err(Error::storage_corruption(format!(
                    "stored node {} does not match the write",
                    pos
                )));
            }
        }

        debug!(pos, timestamp = %receipt.timestamp, "durable record written");

        self.entries.push(payload.entry);
        self.digests.push(digest);
        self.records.push(StoredRecord {
            timestamp: receipt.timestamp,
            payload_digest,
            node_digest,
        });
        Ok(pos)
    }
}
