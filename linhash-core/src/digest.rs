//! Placement-independent content digests
//!
//! Provides:
//! - BLAKE3 hash per entry (key bytes, then value bytes)
//! - XOR folding, so the digest ignores which bucket or chain position an
//!   entry occupies
//! - O(1) comparison of table contents across splits

use blake3::Hasher;
use std::fmt;
use std::ops::BitXor;

/// Types that can feed their contents into an entry digest
pub trait DigestBytes {
    fn feed(&self, hasher: &mut Hasher);
}

impl DigestBytes for [u8] {
    fn feed(&self, hasher: &mut Hasher) {
        hasher.update(&(self.len() as u64).to_le_bytes());
        hasher.update(self);
    }
}

impl DigestBytes for Vec<u8> {
    fn feed(&self, hasher: &mut Hasher) {
        self.as_slice().feed(hasher);
    }
}

impl DigestBytes for str {
    fn feed(&self, hasher: &mut Hasher) {
        self.as_bytes().feed(hasher);
    }
}

impl DigestBytes for String {
    fn feed(&self, hasher: &mut Hasher) {
        self.as_bytes().feed(hasher);
    }
}

impl<T: DigestBytes + ?Sized> DigestBytes for &T {
    fn feed(&self, hasher: &mut Hasher) {
        (**self).feed(hasher);
    }
}

macro_rules! digest_int {
    ($($t:ty),*) => {
        $(
            impl DigestBytes for $t {
                fn feed(&self, hasher: &mut Hasher) {
                    hasher.update(&self.to_le_bytes());
                }
            }
        )*
    };
}

digest_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// XOR-folded BLAKE3 digest over a multiset of entries
///
/// Two identical entries cancel out of `root`; `count` still tells them apart.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    root: [u8; 32],
    count: usize,
}

impl ContentDigest {
    /// Digest of no entries
    pub fn empty() -> Self {
        ContentDigest {
            root: [0u8; 32],
            count: 0,
        }
    }

    /// Hash a single key/value pair
    pub fn entry<K, V>(key: &K, value: &V) -> Self
    where
        K: DigestBytes + ?Sized,
        V: DigestBytes + ?Sized,
    {
        let mut hasher = Hasher::new();
        key.feed(&mut hasher);
        value.feed(&mut hasher);
        ContentDigest {
            root: *hasher.finalize().as_bytes(),
            count: 1,
        }
    }

    /// Fold many digests together (order-independent)
    pub fn combine<I>(digests: I) -> Self
    where
        I: IntoIterator<Item = ContentDigest>,
    {
        digests.into_iter().fold(Self::empty(), |acc, d| acc ^ d)
    }

    pub fn root(&self) -> &[u8; 32] {
        &self.root
    }

    /// Number of entries folded in
    pub fn count(&self) -> usize {
        self.count
    }
}

impl BitXor for ContentDigest {
    type Output = ContentDigest;

    fn bitxor(mut self, rhs: ContentDigest) -> ContentDigest {
        for (byte, other) in self.root.iter_mut().zip(rhs.root.iter()) {
            *byte ^= other;
        }
        self.count += rhs.count;
        self
    }
}

impl Default for ContentDigest {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest(")?;
        for byte in &self.root[..8] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "…, count={})", self.count)
    }
}
