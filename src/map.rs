use std::fmt::Write as _;

use tracing::instrument;

use crate::error::MapError;
use crate::list::BucketList;

/// A concurrent, lock-free hash map keyed by `i64`.
///
/// Each bucket is an independent Harris–Michael lock-free list (see
/// [`crate::list`]); the map itself only reduces a key to a bucket index
/// and delegates. Buckets never grow or shrink after construction — see
/// the crate-level docs for the full list of non-goals.
pub struct LockFreeHashMap {
    buckets: Vec<BucketList>,
}

impl LockFreeHashMap {
    /// Allocates a map with `bucket_count` buckets.
    ///
    /// Mirrors `alloc_hashmap` in the C reference: `bucket_count` must be
    /// positive, otherwise [`MapError::NullHandle`] is returned. Unlike the
    /// C reference, Rust's global allocator aborts the process on
    /// allocation failure rather than returning null, so there is no
    /// reachable error case for allocation failure on this constructor;
    /// see DESIGN.md.
    pub fn new(bucket_count: usize) -> Result<Self, MapError> {
        if bucket_count == 0 {
            return Err(MapError::NullHandle);
        }
        let buckets = (0..bucket_count).map(|_| BucketList::new()).collect();
        Ok(LockFreeHashMap { buckets })
    }

    #[inline]
    fn bucket_index(&self, key: i64) -> usize {
        key.rem_euclid(self.buckets.len() as i64) as usize
    }

    /// Inserts `key`. Duplicates are not detected or rejected; the
    /// structure stores a multiset (see spec §9 "Duplicate keys").
    #[instrument(skip(self))]
    pub fn insert(&self, key: i64) {
        let guard = &crossbeam_epoch::pin();
        self.buckets[self.bucket_index(key)].insert(key, guard);
    }

    /// Logically (and, best-effort, physically) removes one node with key
    /// `key`. Returns [`MapError::KeyNotFound`] if no such node is live.
    #[instrument(skip(self))]
    pub fn remove(&self, key: i64) -> Result<(), MapError> {
        let guard = &crossbeam_epoch::pin();
        if self.buckets[self.bucket_index(key)].remove(key, guard) {
            Ok(())
        } else {
            Err(MapError::KeyNotFound)
        }
    }

    /// Returns `true` iff a live (unmarked) node with key `key` exists.
    ///
    /// This is a mutating read: `window`'s helping CAS may splice out
    /// marked nodes it passes over.
    #[instrument(skip(self))]
    pub fn lookup(&self, key: i64) -> bool {
        let guard = &crossbeam_epoch::pin();
        self.buckets[self.bucket_index(key)].lookup(key, guard)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Renders the diagnostic dump described in the design: one line per
    /// bucket, `Bucket <i> - <key> - <key> ...`, or `Bucket <i> -  ` when
    /// empty. Not required to be consistent under concurrent mutation.
    pub fn dump(&self) -> String {
        let guard = &crossbeam_epoch::pin();
        let mut out = String::new();
        for (i, bucket) in self.buckets.iter().enumerate() {
            write!(out, "Bucket {i} ").expect("writing to a String cannot fail");
            let keys = bucket.unmarked_keys(guard);
            if keys.is_empty() {
                out.push_str("-  ");
            } else {
                for key in keys {
                    write!(out, "- {key} ").expect("writing to a String cannot fail");
                }
            }
            out.push('\n');
        }
        out
    }
}
