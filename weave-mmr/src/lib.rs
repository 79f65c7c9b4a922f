//! Merkle Mountain Range hash log.
//!
//! A hash log is an append-only sequence of entries where every entry
//! occupies one MMR position. Leaves hash their entry alone; internal
//! positions hash their two children ahead of their own entry. The log is
//! summarized by bagging the peak digests.
//!
//! - [`math`] - pure position arithmetic (heights, children, peaks)
//! - [`HashLog`] - append, read back, summarize, prove
//! - [`InclusionProof`] / [`ConsistencyProof`] - self-contained verification
//!
//! # Example
//!
//! ```rust
//! use weave_mmr::{HashLog, Summary};
//!
//! let mut log = HashLog::new();
//! let old = log.summary().unwrap();
//! assert_eq!(old, Summary::EMPTY);
//!
//! for entry in [b"alpha", b"bravo", b"gamma"] {
//!     log.append(entry).unwrap();
//! }
//! let now = log.summary().unwrap();
//!
//! let proof = log.inclusion_proof(1).unwrap();
//! assert!(proof.verify(b"bravo", &now).unwrap());
//!
//! let proof = log.consistency_proof(0).unwrap();
//! assert!(proof.verify(&old, &now).unwrap());
//! ```

pub mod math;

mod log;
mod proof;
mod store;
mod summary;

#[cfg(test)]
mod proptest;

pub use log::HashLog;
pub use proof::{ConsistencyProof, InclusionProof, PathStep};
pub use store::{MemStore, NodeStore};
pub use summary::{bag_peaks, node_digest, Summary};
