//! Linear hashing table
//!
//! Provides:
//! - Two-modulus addressing driven by the split pointer `p` and `maxp`
//! - Growth by one bucket split per triggering insert, in round-robin order
//! - Directory doubling only when the next split target is unallocated
//! - Placement-independent content digests for verification

use crate::bucket::{Bucket, Entry};
use crate::config::{ConfigError, SplitTrigger, TableConfig};
use crate::digest::{ContentDigest, DigestBytes};
use crate::hash::{address, CharSum, KeyHasher};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, trace};

/// Growth counters accumulated over the table's lifetime
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Splits performed
    pub splits: u64,

    /// Growth rounds completed (times `maxp` doubled)
    pub rounds: u64,

    /// Times the directory was reallocated
    pub directory_growths: u64,

    /// Entries moved to a new bucket by splits
    pub relocated: u64,
}

/// Hash table that grows by splitting one bucket at a time
pub struct LinearHashTable<K, V, H = CharSum> {
    /// Directory; its length is the allocated size, which may exceed the
    /// active bucket count after a doubling
    pub(crate) buckets: Vec<Bucket<K, V>>,

    /// Split pointer: next bucket due to split this round
    pub(crate) p: usize,

    /// Modulus for addresses at or above `p`
    pub(crate) maxp: usize,

    /// Total entries across all chains
    pub(crate) len: usize,

    pub(crate) trigger: SplitTrigger,

    pub(crate) hasher: H,

    pub(crate) stats: TableStats,
}

impl<K, V> LinearHashTable<K, V, CharSum>
where
    CharSum: KeyHasher<K>,
{
    /// Create a table with `initial_size` empty buckets and the default
    /// split threshold
    ///
    /// # Panics
    /// If `initial_size` is zero.
    pub fn new(initial_size: usize) -> Self {
        assert!(initial_size > 0, "initial size must be positive");
        Self::build(TableConfig::new(initial_size), CharSum)
    }

    /// Create a table from a validated configuration
    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, CharSum)
    }
}

impl<K, V, H> LinearHashTable<K, V, H>
where
    H: KeyHasher<K>,
{
    /// Create a table with a caller-supplied key hasher
    pub fn with_config_and_hasher(config: TableConfig, hasher: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: TableConfig, hasher: H) -> Self {
        let mut buckets = Vec::with_capacity(config.initial_size);
        buckets.resize_with(config.initial_size, Bucket::new);

        LinearHashTable {
            buckets,
            p: 0,
            maxp: config.initial_size,
            len: 0,
            trigger: config.trigger,
            hasher,
            stats: TableStats::default(),
        }
    }

    /// Bucket index `key` maps to under the current growth state
    #[inline]
    pub fn address_of(&self, key: &K) -> usize {
        address(self.hasher.hash_key(key), self.p, self.maxp)
    }

    /// Insert key-value pair
    ///
    /// Always succeeds. Duplicate keys are chained as separate entries.
    /// Splits bucket `p` at most once if the trigger fires; the overfull
    /// bucket is not necessarily the one that splits.
    pub fn insert(&mut self, key: K, value: V) {
        let addr = self.address_of(&key);

        let bucket = &mut self.buckets[addr];
        bucket.push_front(Entry::boxed(key, value));
        let count = bucket.count();
        self.len += 1;

        if self.should_split(count) {
            trace!(bucket = addr, count, "split triggered");
            self.split();
        }
    }

    fn should_split(&self, bucket_count: usize) -> bool {
        match self.trigger {
            SplitTrigger::BucketOverflow { threshold } => bucket_count > threshold,
            SplitTrigger::LoadFactor { max } => self.load_factor() > max,
        }
    }

    /// Split bucket `p` into `p` and `p + maxp`, then advance the split pointer
    ///
    /// Safe to call at any time; every entry stays addressable.
    pub fn split(&mut self) {
        let old_index = self.p;
        let new_index = self.p + self.maxp;

        if new_index >= self.buckets.len() {
            self.grow_directory();
        }

        let modulus = 2 * self.maxp as u64;
        let hasher = &self.hasher;
        let (low, high) = self.buckets.split_at_mut(new_index);
        let moved = low[old_index].migrate_into(&mut high[0], |entry| {
            (hasher.hash_key(&entry.key) % modulus) as usize == new_index
        });

        self.p += 1;
        if self.p == self.maxp {
            self.p = 0;
            self.maxp *= 2;
            self.stats.rounds += 1;
            info!(maxp = self.maxp, "growth round complete");
        }

        self.stats.splits += 1;
        self.stats.relocated += moved as u64;

        debug!(
            old = old_index,
            new = new_index,
            moved,
            p = self.p,
            maxp = self.maxp,
            "bucket split"
        );
    }

    /// Double the directory, filling new slots with empty buckets
    fn grow_directory(&mut self) {
        let old_size = self.buckets.len();
        let new_size = old_size * 2;
        self.buckets.resize_with(new_size, Bucket::new);
        self.stats.directory_growths += 1;

        debug!(old_size, new_size, "directory grown");
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Split pointer `p`
    pub fn split_pointer(&self) -> usize {
        self.p
    }

    /// Modulus in effect for addresses at or above `p`
    pub fn maxp(&self) -> usize {
        self.maxp
    }

    /// Allocated directory length (`size`)
    pub fn directory_len(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets reachable by addressing (`maxp + p`)
    pub fn active_buckets(&self) -> usize {
        self.maxp + self.p
    }

    /// Entries per active bucket
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.active_buckets() as f64
    }

    pub fn trigger(&self) -> SplitTrigger {
        self.trigger
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    /// Read-only view of one directory slot
    pub fn bucket(&self, index: usize) -> Option<&Bucket<K, V>> {
        self.buckets.get(index)
    }

    /// Entry count of one directory slot
    pub fn bucket_count(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(Bucket::count)
    }

    /// Every directory slot, including unused slack past `active_buckets()`
    pub fn buckets(&self) -> &[Bucket<K, V>] {
        &self.buckets
    }

    /// Iterate over all entries, bucket by bucket
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|entry| (&entry.key, &entry.value)))
    }

    /// Chain length distribution over active buckets
    ///
    /// Returns Vec of (chain length, number of buckets with that length)
    pub fn chain_histogram(&self) -> Vec<(usize, usize)> {
        let mut histogram = BTreeMap::new();
        for bucket in &self.buckets[..self.active_buckets()] {
            *histogram.entry(bucket.count()).or_insert(0) += 1;
        }
        histogram.into_iter().collect()
    }
}

impl<K, V, H> LinearHashTable<K, V, H>
where
    K: DigestBytes,
    V: DigestBytes,
{
    /// Digest of every entry in the table, independent of placement
    pub fn content_digest(&self) -> ContentDigest {
        ContentDigest::combine(self.buckets.iter().map(Self::digest_of))
    }

    /// Digest of one bucket's chain
    pub fn bucket_digest(&self, index: usize) -> Option<ContentDigest> {
        self.buckets.get(index).map(Self::digest_of)
    }

    fn digest_of(bucket: &Bucket<K, V>) -> ContentDigest {
        ContentDigest::combine(
            bucket
                .iter()
                .map(|entry| ContentDigest::entry(&entry.key, &entry.value)),
        )
    }
}

impl<K, V> Default for LinearHashTable<K, V, CharSum>
where
    CharSum: KeyHasher<K>,
{
    fn default() -> Self {
        Self::build(TableConfig::default(), CharSum)
    }
}

impl<K, V, H> fmt::Debug for LinearHashTable<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearHashTable")
            .field("len", &self.len)
            .field("p", &self.p)
            .field("maxp", &self.maxp)
            .field("size", &self.buckets.len())
            .field("trigger", &self.trigger)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hash is the key itself, so tests can place entries exactly
    struct Identity;

    impl KeyHasher<u64> for Identity {
        fn hash_key(&self, key: &u64) -> u64 {
            *key
        }
    }

    fn identity_table(initial_size: usize, threshold: usize) -> LinearHashTable<u64, u64, Identity> {
        let config = TableConfig::new(initial_size).with_split_threshold(threshold);
        LinearHashTable::with_config_and_hasher(config, Identity).unwrap()
    }

    #[test]
    fn test_new() {
        let ht: LinearHashTable<String, i64> = LinearHashTable::new(4);
        assert_eq!(ht.len(), 0);
        assert!(ht.is_empty());
        assert_eq!(ht.split_pointer(), 0);
        assert_eq!(ht.maxp(), 4);
        assert_eq!(ht.directory_len(), 4);
        assert_eq!(ht.active_buckets(), 4);
        assert_eq!(ht.trigger(), SplitTrigger::BucketOverflow { threshold: 100 });
    }

    #[test]
    #[should_panic(expected = "initial size must be positive")]
    fn test_new_zero_panics() {
        let _ht: LinearHashTable<String, i64> = LinearHashTable::new(0);
    }

    #[test]
    fn test_with_config_rejects_zero() {
        let result: Result<LinearHashTable<String, i64>, _> =
            LinearHashTable::with_config(TableConfig::new(0));
        assert_eq!(result.err(), Some(ConfigError::ZeroInitialSize));
    }

    #[test]
    fn test_default() {
        let ht: LinearHashTable<String, i64> = LinearHashTable::default();
        assert_eq!(ht.maxp(), 16);
        assert_eq!(ht.directory_len(), 16);
    }

    #[test]
    fn test_insert_lands_at_address() {
        let mut ht: LinearHashTable<String, i64> = LinearHashTable::new(4);

        // "a" sums to 97, 97 % 4 == 1
        ht.insert("a".to_string(), 1);
        assert_eq!(ht.len(), 1);
        assert_eq!(ht.bucket_count(1), Some(1));

        let entry = ht.bucket(1).and_then(|b| b.iter().next()).unwrap();
        assert_eq!(entry.key, "a");
        assert_eq!(entry.value, 1);
    }

    #[test]
    fn test_duplicate_keys_chain() {
        let mut ht: LinearHashTable<String, i64> = LinearHashTable::new(4);

        ht.insert("key".to_string(), 1);
        ht.insert("key".to_string(), 2);

        let addr = ht.address_of(&"key".to_string());
        let values: Vec<i64> = ht.bucket(addr).unwrap().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![2, 1]);
        assert_eq!(ht.len(), 2);
    }

    #[test]
    fn test_no_split_at_threshold() {
        let mut ht = identity_table(2, 3);

        // all even keys land in bucket 0
        for k in [0, 2, 4] {
            ht.insert(k, k);
        }
        assert_eq!(ht.bucket_count(0), Some(3));
        assert_eq!(ht.stats().splits, 0);
        assert_eq!(ht.split_pointer(), 0);
    }

    #[test]
    fn test_split_on_overflow() {
        let mut ht = identity_table(2, 3);

        for k in [0, 2, 4, 6] {
            ht.insert(k, k);
        }

        // bucket 0 split into 0 (k % 4 == 0) and 2 (k % 4 == 2)
        assert_eq!(ht.stats().splits, 1);
        assert_eq!(ht.split_pointer(), 1);
        assert_eq!(ht.maxp(), 2);
        assert_eq!(ht.directory_len(), 4);
        assert_eq!(ht.stats().directory_growths, 1);

        let mut low: Vec<u64> = ht.bucket(0).unwrap().iter().map(|e| e.key).collect();
        let mut high: Vec<u64> = ht.bucket(2).unwrap().iter().map(|e| e.key).collect();
        low.sort();
        high.sort();
        assert_eq!(low, vec![0, 4]);
        assert_eq!(high, vec![2, 6]);
        assert_eq!(ht.stats().relocated, 2);
    }

    #[test]
    fn test_overfull_bucket_need_not_split() {
        let mut ht = identity_table(4, 2);

        // overflow bucket 3; bucket 0 is the one scheduled to split
        for k in [3, 7, 11] {
            ht.insert(k, k);
        }
        assert_eq!(ht.stats().splits, 1);
        assert_eq!(ht.split_pointer(), 1);
        assert_eq!(ht.bucket_count(3), Some(3));
        assert_eq!(ht.bucket_count(4), Some(0));
    }

    #[test]
    fn test_one_split_per_insert() {
        let mut ht = identity_table(1, 1);

        // one bucket, every insert after the first overflows it
        for k in 0..10u64 {
            let before = ht.stats().splits;
            ht.insert(k * 16, k);
            let after = ht.stats().splits;
            assert!(after - before <= 1);
        }
        assert_eq!(ht.len(), 10);
    }

    #[test]
    fn test_round_completion() {
        let mut ht = identity_table(4, 100);

        for _ in 0..4 {
            ht.split();
        }
        assert_eq!(ht.split_pointer(), 0);
        assert_eq!(ht.maxp(), 8);
        assert!(ht.directory_len() >= 8);
        assert_eq!(ht.stats().rounds, 1);
    }

    #[test]
    fn test_directory_doubles_only_when_needed() {
        let mut ht = identity_table(4, 100);

        ht.split();
        assert_eq!(ht.directory_len(), 8);
        for _ in 0..3 {
            ht.split();
        }
        assert_eq!(ht.directory_len(), 8);
        assert_eq!(ht.stats().directory_growths, 1);

        // second round: new index 8 needs a slot
        ht.split();
        assert_eq!(ht.directory_len(), 16);
        assert_eq!(ht.stats().directory_growths, 2);
    }

    #[test]
    fn test_manual_split_keeps_addresses() {
        let mut ht = identity_table(3, 100);
        for k in 0..60u64 {
            ht.insert(k, k);
        }
        for _ in 0..7 {
            ht.split();
            for (index, bucket) in ht.buckets().iter().enumerate() {
                for entry in bucket {
                    assert_eq!(ht.address_of(&entry.key), index);
                }
            }
        }
        assert_eq!(ht.len(), 60);
    }

    #[test]
    fn test_load_factor_trigger() {
        let config = TableConfig::new(1).with_max_load_factor(2.0);
        let mut ht: LinearHashTable<String, i64> = LinearHashTable::with_config(config).unwrap();

        for i in 0..500 {
            ht.insert(format!("key{}", i), i);
            assert!(ht.load_factor() <= 2.0);
        }
        assert!(ht.active_buckets() >= 250);
    }

    #[test]
    fn test_iter() {
        let mut ht: LinearHashTable<String, i64> = LinearHashTable::new(4);

        let keys = vec!["a", "b", "c"];
        for (i, key) in keys.iter().enumerate() {
            ht.insert(key.to_string(), i as i64);
        }

        let collected: Vec<_> = ht.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(collected.len(), 3);
        for key in keys {
            assert!(collected.contains(&key));
        }
    }

    #[test]
    fn test_chain_histogram() {
        let mut ht = identity_table(4, 100);
        for k in [0, 4, 8, 1] {
            ht.insert(k, k);
        }

        // bucket 0: 3, bucket 1: 1, buckets 2-3: 0
        assert_eq!(ht.chain_histogram(), vec![(0, 2), (1, 1), (3, 1)]);
    }

    #[test]
    fn test_split_preserves_digest() {
        let mut ht = identity_table(2, 100);
        for k in 0..40u64 {
            ht.insert(k, k * 10);
        }

        let before = ht.content_digest();
        let old_bucket = ht.bucket_digest(0).unwrap();

        ht.split();

        let after_old = ht.bucket_digest(0).unwrap();
        let after_new = ht.bucket_digest(2).unwrap();
        assert_eq!(after_old ^ after_new, old_bucket);
        assert_eq!(ht.content_digest(), before);
        assert_eq!(before.count(), 40);
    }
}
