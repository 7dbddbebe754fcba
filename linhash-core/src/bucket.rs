//! Bucket chains
//!
//! Each bucket owns a singly-linked chain of entries. Entries are boxed and
//! only ever move between chains by relinking the box, never by copying.

use std::fmt;

/// One key/value pair plus the owned link to the next entry in its chain
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
    next: Option<Box<Entry<K, V>>>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn boxed(key: K, value: V) -> Box<Self> {
        Box::new(Entry {
            key,
            value,
            next: None,
        })
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// A directory slot: the head of an entry chain and its length
pub struct Bucket<K, V> {
    head: Option<Box<Entry<K, V>>>,
    count: usize,
}

impl<K, V> Bucket<K, V> {
    /// Empty bucket
    pub const fn new() -> Self {
        Bucket {
            head: None,
            count: 0,
        }
    }

    /// Number of entries chained to this bucket
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Link an entry in as the new head of the chain
    pub(crate) fn push_front(&mut self, mut entry: Box<Entry<K, V>>) {
        entry.next = self.head.take();
        self.head = Some(entry);
        self.count += 1;
    }

    /// Move every entry matching `relocate` onto the front of `dest`
    ///
    /// Entries that stay keep their relative order. Every entry of the
    /// original chain is visited exactly once. Returns the number moved.
    pub(crate) fn migrate_into<F>(&mut self, dest: &mut Bucket<K, V>, mut relocate: F) -> usize
    where
        F: FnMut(&Entry<K, V>) -> bool,
    {
        let mut rest = self.head.take();
        let mut kept_tail = &mut self.head;
        let mut moved = 0;

        while let Some(mut entry) = rest {
            rest = entry.next.take();
            if relocate(&entry) {
                dest.push_front(entry);
                moved += 1;
            } else {
                kept_tail = &mut kept_tail.insert(entry).next;
            }
        }

        self.count -= moved;
        moved
    }

    /// Iterate over the chain, head first
    pub fn iter(&self) -> Chain<'_, K, V> {
        Chain {
            next: self.head.as_deref(),
        }
    }
}

impl<K, V> Default for Bucket<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// Boxed chains drop recursively by default; unlink one node at a time so a
// long chain of duplicate keys cannot exhaust the stack.
impl<K, V> Drop for Bucket<K, V> {
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut entry) = cursor {
            cursor = entry.next.take();
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Bucket<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("count", &self.count)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Borrowing iterator over one bucket's chain
pub struct Chain<'a, K, V> {
    next: Option<&'a Entry<K, V>>,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next?;
        self.next = entry.next.as_deref();
        Some(entry)
    }
}

impl<'a, K, V> IntoIterator for &'a Bucket<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = Chain<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
