//! Merkle weave: many hash logs, appended to concurrently.
//!
//! A weave splits writes across a fixed set of [`weave_mmr::HashLog`]
//! shards, one per possible byte prefix. Each entry is copied into the
//! shards named by several disjoint windows of its own leading bytes, so
//! writers touching different shards never contend.
//!
//! # Example
//!
//! ```rust
//! use weave::{ShardId, Weave};
//! use weave_core::WeaveConfig;
//!
//! let weave = Weave::new(WeaveConfig::default()).unwrap();
//!
//! // Bytes 0 and 1 pick the shards.
//! let receipt = weave.append(&[0x01, 0x02, 0xaa, 0xbb]).unwrap();
//! assert_eq!(receipt.len(), 2);
//!
//! let summary = weave.summary().unwrap();
//! assert_eq!(summary.get(ShardId::new(1)).unwrap().len, 1);
//! assert_eq!(summary.get(ShardId::new(2)).unwrap().len, 1);
//! assert_eq!(weave.approx_len(), 2);
//! ```

mod prefix;
mod service;
mod summary;
mod weave;

#[cfg(test)]
mod proptest;

pub use prefix::{shard_keys, ShardId};
pub use service::SummaryService;
pub use summary::WeaveSummary;
pub use weave::{AppendReceipt, Weave};
