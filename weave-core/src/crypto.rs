//! Digests and the chaining hash.
//!
//! Every node and summary digest is BLAKE3 run in extendable-output mode
//! and read out to [`DIGEST_LEN`] bytes. Inputs are streamed through the
//! hasher's `io::Write` side and the digest is pulled from the XOF reader's
//! `io::Read` side, so nothing is concatenated into an intermediate buffer.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Number of bytes read from the XOF for every digest.
pub const DIGEST_LEN: usize = 64;

/// Summary digest of a log with no entries: the XOF output for empty input.
#[rustfmt::skip]
pub const EMPTY_LOG_DIGEST: Digest = Digest([
    0xaf, 0x13, 0x49, 0xb9, 0xf5, 0xf9, 0xa1, 0xa6,
    0xa0, 0x40, 0x4d, 0xea, 0x36, 0xdc, 0xc9, 0x49,
    0x9b, 0xcb, 0x25, 0xc9, 0xad, 0xc1, 0x12, 0xb7,
    0xcc, 0x9a, 0x93, 0xca, 0xe4, 0x1f, 0x32, 0x62,
    0xe0, 0x0f, 0x03, 0xe7, 0xb6, 0x9a, 0xf2, 0x6b,
    0x7f, 0xaa, 0xf0, 0x9f, 0xcd, 0x33, 0x30, 0x50,
    0x33, 0x8d, 0xdf, 0xe0, 0x85, 0xb8, 0xcc, 0x86,
    0x9c, 0xa9, 0x8b, 0x20, 0x6c, 0x08, 0x24, 0x3a,
]);

/// A 64-byte digest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The zero digest (stands in for absent chain links).
    pub const ZERO: Self = Self([0u8; DIGEST_LEN]);

    /// Create a digest from raw bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Create a digest from a slice, which must be exactly [`DIGEST_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; DIGEST_LEN] = bytes.try_into().map_err(|_| {
            Error::invalid_digest(format!(
                "expected {} bytes, got {}",
                DIGEST_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Create from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Check if this is the zero digest.
    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Streaming chaining hasher.
///
/// One instance per node or summary; instances are never shared or reused
/// across computations.
#[derive(Clone, Default)]
pub struct ChainHasher {
    inner: blake3::Hasher,
}

impl ChainHasher {
    /// Create a fresh hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the hash.
    pub fn update(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.inner.write_all(bytes).map_err(Error::hashing)?;
        Ok(self)
    }

    /// Read [`DIGEST_LEN`] bytes of output.
    pub fn finalize(&self) -> Result<Digest> {
        let mut out = [0u8; DIGEST_LEN];
        self.inner
            .finalize_xof()
            .read_exact(&mut out)
            .map_err(Error::hashing)?;
        Ok(Digest(out))
    }
}

/// Hash arbitrary data.
pub fn hash(data: &[u8]) -> Result<Digest> {
    ChainHasher::new().update(data)?.finalize()
}

/// Hash several items in order as one stream.
pub fn hash_all<T: AsRef<[u8]>>(items: &[T]) -> Result<Digest> {
    let mut hasher = ChainHasher::new();
    for item in items {
        hasher.update(item.as_ref())?;
    }
    hasher.finalize()
}
