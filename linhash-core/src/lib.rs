//! Linear hashing table - grows one bucket split at a time
//!
//! Core library providing:
//! - Two-modulus addressing with a round-robin split pointer
//! - Owned bucket chains relinked (never copied) during splits
//! - Pluggable key hashing with an additive byte-sum reference hash
//! - Placement-independent BLAKE3 content digests

pub mod bucket;
pub mod config;
pub mod digest;
pub mod hash;
pub mod hashtable;

pub use bucket::{Bucket, Entry};
pub use config::{ConfigError, SplitTrigger, TableConfig};
pub use digest::{ContentDigest, DigestBytes};
pub use hash::{CharSum, KeyHasher};
pub use hashtable::{LinearHashTable, TableStats};
