//! Weave benchmarks.
//!
//! Every bench binary links this crate for its mimalloc global allocator:
//! the weave allocates one small buffer per stored entry, from many threads
//! at once, which is where the system allocator falls behind.
//!
//! Also holds the workload generators shared by the bench binaries.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub use mimalloc;

/// Deterministic entries of `len` bytes whose leading bytes spread evenly
/// over every one-byte prefix.
pub fn spread_entries(count: usize, len: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut entry = vec![0u8; len.max(2)];
            // Two different odd strides so the two windows rarely coincide.
            entry[0] = (i.wrapping_mul(31) % 256) as u8;
            entry[1] = (i.wrapping_mul(97).wrapping_add(13) % 256) as u8;
            for (j, byte) in entry.iter_mut().enumerate().skip(2) {
                *byte = (i ^ j) as u8;
            }
            entry
        })
        .collect()
}

/// Entries that all route to the same two shards.
pub fn hot_entries(count: usize, len: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut entry = vec![0u8; len.max(2)];
            entry[0] = 0x01;
            entry[1] = 0x02;
            for (j, byte) in entry.iter_mut().enumerate().skip(2) {
                *byte = (i + j) as u8;
            }
            entry
        })
        .collect()
}
