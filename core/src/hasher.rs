//! Feature hashing: token string -> bucket id in `[0, hash_size)`.

use crate::Bucket;

/// Maps tokens into a fixed-size feature space.
///
/// Implementations must be deterministic: the same token and `hash_size`
/// always produce the same bucket. Collisions are expected and never resolved.
pub trait FeatureHasher: Send + Sync {
    fn bucket(&self, token: &str, hash_size: u32) -> Bucket;
}

/// MurmurHash3 (x86, 32-bit, seed 0) over the UTF-8 bytes, reduced modulo
/// `hash_size`. Compatible with indexes hashed by scikit-learn's
/// `murmurhash3_32(token, positive=True) % hash_size`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur3Hasher;

impl FeatureHasher for Murmur3Hasher {
    fn bucket(&self, token: &str, hash_size: u32) -> Bucket {
        debug_assert!(hash_size > 0);
        murmur3_32(token.as_bytes(), 0) % hash_size
    }
}

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline]
fn mix_k(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h ^= mix_k(k);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, b) in tail.iter().enumerate() {
            k |= (*b as u32) << (8 * i);
        }
        h ^= mix_k(k);
    }

    // finalization
    h ^= data.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
