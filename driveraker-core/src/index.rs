//! Bucketed hash index with chaining and doubling resize.
//!
//! Keys are hashed with CRC-32 so bucket placement is identical across
//! processes and platforms; a snapshot written by one run must be readable
//! by the next without rehashing.
//!
//! Persistence lives in [`crate::snapshot`].

use serde::Serialize;

use crate::error::IndexError;
use crate::types::IndexEntry;

/// Default multiplier applied to the bucket count to get the resize threshold.
pub const DEFAULT_FILL_FACTOR: usize = 10;

/// Largest accepted fill factor; larger requests are clamped to it.
pub const MAX_FILL_FACTOR: usize = 1 << 16;

/// One hash slot. Insertion order, no other meaning.
pub type Bucket = Vec<IndexEntry>;

/// CRC-32 (IEEE) of the key's UTF-8 bytes.
pub fn checksum(key: &str) -> u32 {
    crc32fast::hash(key.as_bytes())
}

/// Persistent associative store from relative document key to last-known path.
///
/// Invariants:
/// - `capacity == fill_factor * bucket_count`
/// - `buckets.len() == bucket_count >= 1`
/// - every entry lives in bucket `checksum(key) % bucket_count`
/// - no key appears twice
#[derive(Debug, Clone)]
pub struct HashIndex {
    pub(crate) size: usize,
    pub(crate) bucket_count: usize,
    pub(crate) capacity: usize,
    pub(crate) fill_factor: usize,
    pub(crate) buckets: Vec<Bucket>,
}

/// Shape summary reported by `driveraker status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub size: usize,
    pub bucket_count: usize,
    pub capacity: usize,
    pub fill_factor: usize,
    pub empty_buckets: usize,
    pub longest_chain: usize,
}

impl HashIndex {
    /// Create an empty index with `bucket_hint` buckets and the default fill factor.
    pub fn new(bucket_hint: usize) -> Self {
        Self::with_fill_factor(bucket_hint, DEFAULT_FILL_FACTOR)
    }

    /// Create an empty index with an explicit fill factor.
    ///
    /// Both arguments are clamped to at least 1, and `fill_factor` to at most
    /// [`MAX_FILL_FACTOR`].
    pub fn with_fill_factor(bucket_hint: usize, fill_factor: usize) -> Self {
        let bucket_count = bucket_hint.max(1);
        let fill_factor = fill_factor.clamp(1, MAX_FILL_FACTOR);
        Self {
            size: 0,
            bucket_count,
            capacity: fill_factor.saturating_mul(bucket_count),
            fill_factor,
            buckets: vec![Vec::new(); bucket_count],
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Entry count above which the next insert triggers a resize.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn fill_factor(&self) -> usize {
        self.fill_factor
    }

    /// Whether `key` has been inserted.
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// The value stored for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key).map(|entry| entry.value.as_str())
    }

    /// Like [`get`](Self::get), but a missing key is an [`IndexError::NotFound`].
    pub fn require(&self, key: &str) -> Result<&str, IndexError> {
        self.get(key).ok_or_else(|| IndexError::NotFound {
            key: key.to_string(),
        })
    }

    /// Insert `key` unless it is already present.
    ///
    /// An existing entry keeps its original value. Returns `true` when a new
    /// entry was added. Growing past `capacity` doubles the bucket array.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        let slot = self.slot_of(&key);
        if self.buckets[slot].iter().any(|entry| entry.key == key) {
            return false;
        }
        self.buckets[slot].push(IndexEntry {
            key,
            value: value.into(),
        });
        self.size += 1;
        if self.size > self.capacity {
            self.resize();
        }
        true
    }

    /// Double the bucket array and rehash every entry into it.
    ///
    /// Order within a bucket is not preserved.
    pub fn resize(&mut self) {
        let new_count = self.bucket_count.saturating_mul(2);
        let mut new_buckets: Vec<Bucket> = vec![Vec::new(); new_count];
        for entry in self.buckets.drain(..).flatten() {
            let slot = checksum(&entry.key) as usize % new_count;
            new_buckets[slot].push(entry);
        }
        tracing::debug!(
            "index resized: {} -> {} buckets ({} entries)",
            self.bucket_count,
            new_count,
            self.size
        );
        self.buckets = new_buckets;
        self.bucket_count = new_count;
        self.capacity = self.fill_factor.saturating_mul(new_count);
    }

    /// Iterate every entry, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.buckets.iter().flatten()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            size: self.size,
            bucket_count: self.bucket_count,
            capacity: self.capacity,
            fill_factor: self.fill_factor,
            empty_buckets: self.buckets.iter().filter(|b| b.is_empty()).count(),
            longest_chain: self.buckets.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    pub(crate) fn slot_of(&self, key: &str) -> usize {
        checksum(key) as usize % self.bucket_count
    }

    fn find(&self, key: &str) -> Option<&IndexEntry> {
        self.buckets[self.slot_of(key)]
            .iter()
            .find(|entry| entry.key == key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_matches_reference_crc32() {
        assert_eq!(checksum(""), 0);
        assert_eq!(checksum("a"), 0xE8B7_BE43);
        assert_eq!(checksum("123456789"), 0xCBF4_3926);
    }

    #[test]
    fn new_index_has_requested_shape() {
        let index = HashIndex::with_fill_factor(4, 3);
        assert_eq!(index.bucket_count(), 4);
        assert_eq!(index.capacity(), 12);
        assert_eq!(index.fill_factor(), 3);
        assert!(index.is_empty());
    }

    #[test]
    fn zero_hints_are_clamped() {
        let index = HashIndex::with_fill_factor(0, 0);
        assert_eq!(index.bucket_count(), 1);
        assert_eq!(index.capacity(), 1);
        assert!(!index.contains("anything"));
    }

    #[test]
    fn oversized_fill_factor_is_clamped() {
        let index = HashIndex::with_fill_factor(4, usize::MAX / 2);
        assert_eq!(index.fill_factor(), MAX_FILL_FACTOR);
        assert_eq!(index.capacity(), MAX_FILL_FACTOR * 4);
    }

    #[test]
    fn insert_then_get() {
        let mut index = HashIndex::new(8);
        assert!(index.insert("posts/a.docx", "posts/a.docx"));
        assert!(index.contains("posts/a.docx"));
        assert_eq!(index.get("posts/a.docx"), Some("posts/a.docx"));
        assert_eq!(index.get("posts/b.docx"), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn duplicate_insert_keeps_first_value() {
        let mut index = HashIndex::new(2);
        assert!(index.insert("k", "first"));
        assert!(!index.insert("k", "second"));
        assert_eq!(index.get("k"), Some("first"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn require_missing_key_is_not_found() {
        let index = HashIndex::new(1);
        let err = index.require("ghost").unwrap_err();
        assert!(matches!(err, IndexError::NotFound { ref key } if key == "ghost"));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn eleventh_insert_triggers_exactly_one_resize() {
        let mut index = HashIndex::with_fill_factor(1, 10);
        for i in 0..10 {
            index.insert(format!("doc-{i}.docx"), format!("doc-{i}.docx"));
        }
        assert_eq!(index.bucket_count(), 1, "no resize at size == capacity");

        index.insert("doc-10.docx", "doc-10.docx");
        assert_eq!(index.bucket_count(), 2);
        assert_eq!(index.capacity(), 20);
        assert_eq!(index.len(), 11);
        for i in 0..11 {
            let key = format!("doc-{i}.docx");
            assert_eq!(index.get(&key), Some(key.as_str()));
        }
    }

    #[test]
    fn resize_places_entries_in_their_hash_slots() {
        let mut index = HashIndex::with_fill_factor(1, 1);
        for i in 0..40 {
            index.insert(format!("k{i}"), "v");
        }
        assert!(index.bucket_count() >= 32);
        for (slot, bucket) in index.buckets.iter().enumerate() {
            for entry in bucket {
                assert_eq!(index.slot_of(&entry.key), slot);
            }
        }
        assert_eq!(index.iter().count(), 40);
    }

    #[test]
    fn stats_reflect_contents() {
        let mut index = HashIndex::with_fill_factor(4, 10);
        index.insert("a", "a");
        index.insert("b", "b");
        let stats = index.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.bucket_count, 4);
        assert_eq!(stats.capacity, 40);
        assert!(stats.longest_chain >= 1);
        assert!(stats.empty_buckets <= 3);
    }
}
