//! Durable storage for weave shards.
//!
//! A [`StorageDriver`] is the consumed write-append primitive: it accepts
//! opaque bytes and returns the stored bytes, a sequence number and a
//! timestamp. [`DriverStore`] layers a hash log's [`weave_mmr::NodeStore`]
//! over a driver, writing each node as a [`StoredRecord`] chained to the
//! previous position and to its left child.
//!
//! # Example
//!
//! ```rust
//! use weave_mmr::HashLog;
//! use weave_storage::{DriverStore, MemDriver, StorageDriver};
//!
//! let store = DriverStore::new(MemDriver::new()).unwrap();
//! let mut log = HashLog::from_store(store);
//! log.append(b"first").unwrap();
//! log.append(b"second").unwrap();
//!
//! assert_eq!(log.store().driver().len().unwrap(), 2);
//! assert!(log.store().verify_chain().unwrap());
//! ```

mod driver;
mod record;
mod store;

pub use driver::{MemDriver, StorageDriver, WriteReceipt};
pub use record::{Link, NodePayload, StoredRecord};
pub use store::DriverStore;
