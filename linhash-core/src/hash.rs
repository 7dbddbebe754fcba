//! Key hashing
//!
//! The table only needs a deterministic key → integer mapping; split
//! correctness does not depend on hash quality.

/// Maps a key to the integer seed used for bucket addressing
pub trait KeyHasher<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
}

/// Additive byte-sum hash
///
/// Known weaknesses: poor avalanche, every permutation of the same bytes
/// collides (`"ab"` and `"ba"`), and the `u64` accumulator wraps silently on
/// absurdly long keys. Wraparound keeps the function deterministic, it only
/// adds collisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharSum;

impl CharSum {
    #[inline]
    pub fn hash_bytes(bytes: &[u8]) -> u64 {
        bytes
            .iter()
            .fold(0u64, |acc, &b| acc.wrapping_add(u64::from(b)))
    }
}

impl<K: AsRef<[u8]> + ?Sized> KeyHasher<K> for CharSum {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        Self::hash_bytes(key.as_ref())
    }
}

/// Two-modulus linear hashing address rule
///
/// Buckets below the split pointer `p` have already split this round and are
/// addressed with the doubled modulus.
#[inline(always)]
pub fn address(hash: u64, p: usize, maxp: usize) -> usize {
    let addr = (hash % maxp as u64) as usize;
    if addr < p {
        (hash % (2 * maxp) as u64) as usize
    } else {
        addr
    }
}
