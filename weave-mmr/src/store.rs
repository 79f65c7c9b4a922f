//! Storage traits and implementations for hash logs.

use weave_core::{Digest, Result};

/// Append-only node storage for one hash log.
///
/// Every position holds the raw entry and its cached node digest. Positions
/// are assigned by `push` in strict sequence; nothing is ever overwritten.
pub trait NodeStore {
    /// Number of nodes stored.
    fn len(&self) -> u64;

    /// True if nothing has been stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw entry at a position.
    fn entry(&self, pos: u64) -> Result<Option<Vec<u8>>>;

    /// Node digest at a position.
    fn digest(&self, pos: u64) -> Result<Option<Digest>>;

    /// Store the next node and return its position.
    ///
    /// On error the store must be left exactly as it was.
    fn push(&mut self, entry: &[u8], digest: Digest) -> Result<u64>;
}

/// In-memory node store.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    entries: Vec<Vec<u8>>,
    digests: Vec<Digest>,
}

impl MemStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow an entry without copying it.
    pub fn entry_ref(&self, pos: u64) -> Option<&[u8]> {
        self.entries.get(pos as usize).map(Vec::as_slice)
    }
}

impl NodeStore for MemStore {
    fn len(&self) -> u64 {
        self.digests.len() as u64
    }

    fn entry(&self, pos: u64) -> Result<Option<Vec<u8>>> {
        Ok(self.entry_ref(pos).map(<[u8]>::to_vec))
    }

    fn digest(&self, pos: u64) -> Result<Option<Digest>> {
        Ok(self.digests.get(pos as usize).copied())
    }

    fn push(&mut self, entry: &[u8], digest: Digest) -> Result<u64> {
        let pos = self.len();
        self.entries.push(entry.to_vec());
        self.digests.push(digest);
        Ok(pos)
    }
}
