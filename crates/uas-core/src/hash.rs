//! Change-detection checksum for persisted lists
//!
//! Murmur3 32-bit over the canonical JSON form of a list. This is a change
//! detector, not an integrity check: equal contents always give equal
//! checksums, different contents differ with high probability.

use log::warn;
use serde::Serialize;

// Golden ratio
const CHECKSUM_SEED: u32 = 0x9e3779b9;

/// Murmur3 32-bit hash implementation.
#[inline]
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let len = data.len();
    let mut h = seed;

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

        let k = k.wrapping_mul(0xcc9e2d51);
        let k = k.rotate_left(15);
        let k = k.wrapping_mul(0x1b873593);

        h ^= k;
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    // Process remaining bytes
    let tail = chunks.remainder();
    let mut k: u32 = 0;
    if tail.len() >= 3 {
        k ^= (tail[2] as u32) << 16;
    }
    if tail.len() >= 2 {
        k ^= (tail[1] as u32) << 8;
    }
    if !tail.is_empty() {
        k ^= tail[0] as u32;
        let k = k.wrapping_mul(0xcc9e2d51);
        let k = k.rotate_left(15);
        let k = k.wrapping_mul(0x1b873593);
        h ^= k;
    }

    // Finalization
    h ^= len as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;

    h
}

/// Checksum of raw bytes.
#[inline]
pub fn checksum_bytes(data: &[u8]) -> u32 {
    murmur3_32(data, CHECKSUM_SEED)
}

/// Checksum of a list, computed over its JSON form.
pub fn checksum<T: Serialize>(items: &[T]) -> u32 {
    match serde_json::to_vec(items) {
        Ok(bytes) => checksum_bytes(&bytes),
        Err(e) => {
            // Only reachable for types with non-string map keys.
            warn!("checksum: failed to serialize list: {e}");
            checksum_bytes(b"")
        }
    }
}
