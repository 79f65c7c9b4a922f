//! Storage driver interface and an in-memory driver.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use weave_core::{Error, Result};

/// Outcome of one durable write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Canonical stored bytes.
    pub node: Vec<u8>,
    /// Sequence number assigned to the write.
    pub seq: u64,
    /// Time the write was accepted.
    pub timestamp: DateTime<Utc>,
}

/// Append-only durable storage for one shard.
pub trait StorageDriver: Send + Sync {
    /// Persist the next node.
    fn write_next(&self, data: &[u8]) -> Result<WriteReceipt>;

    /// Stored bytes for a sequence number.
    fn get(&self, seq: u64) -> Result<Option<Vec<u8>>>;

    /// Number of writes accepted.
    fn len(&self) -> Result<u64>;
}

#[derive(Debug, Default)]
struct MemDriverState {
    nodes: Vec<Vec<u8>>,
    last_micros: Option<i64>,
}

/// In-memory driver.
///
/// Timestamps come from the system clock at microsecond resolution and
/// never repeat or go backwards.
#[derive(Debug, Default)]
pub struct MemDriver {
    state: Mutex<MemDriverState>,
    failing: AtomicBool,
}

impl MemDriver {
    /// Create an empty driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl StorageDriver for MemDriver {
    fn write_next(&self, data: &[u8]) -> Result<WriteReceipt> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::storage("memory driver set to fail"));
        }

        let mut state = self.state.lock();

        let mut micros = Utc::now().timestamp_micros();
        if let Some(last) = state.last_micros {
            micros = micros.max(last + 1);
        }
        let timestamp = Utc.timestamp_nanos(micros * 1_000);

        let seq = state.nodes.len() as u64;
        state.nodes.push(data.to_vec());
        state.last_micros = Some(micros);

        Ok(WriteReceipt {
            node: data.to_vec(),
            seq,
            timestamp,
        })
    }

    fn get(&self, seq: u64) -> Result<Option<Vec<u8>>> {
        Ok(self.state.lock().nodes.get(seq as usize).cloned())
    }

    fn len(&self) -> Result<u64> {
        Ok(self.state.lock().nodes.len() as u64)
    }
}
