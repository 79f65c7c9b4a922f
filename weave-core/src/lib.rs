//! Weave Core - shared primitives for the merkle weave.
//!
//! - [`crypto`] - 64-byte digests and the streaming chaining hash (BLAKE3 XOF)
//! - [`error`] - Error codes and the crate-wide `Result`
//! - [`config`] - Construction-time shape of a weave
//!
//! # Example
//!
//! ```rust
//! use weave_core::{hash, ChainHasher, EMPTY_LOG_DIGEST};
//!
//! let leaf = hash(b"entry").unwrap();
//!
//! let mut hasher = ChainHasher::new();
//! hasher.update(leaf.as_bytes()).unwrap();
//! let bagged = hasher.finalize().unwrap();
//!
//! assert_ne!(bagged, EMPTY_LOG_DIGEST);
//! ```

pub mod config;
pub mod crypto;
pub mod error;

pub use config::{WeaveConfig, MAX_PREFIX_BYTES};
pub use crypto::{hash, hash_all, ChainHasher, Digest, DIGEST_LEN, EMPTY_LOG_DIGEST};
pub use error::{Error, ErrorCode, Result};
