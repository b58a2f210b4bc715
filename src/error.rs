use thiserror::Error;

/// Failure modes surfaced by [`crate::LockFreeHashMap`].
///
/// These mirror the C reference's non-zero return codes (see `alloc_hashmap`,
/// `insert_item`, `remove_item`, `lookup_item` in the original source): a
/// null/empty handle, or a key that wasn't found. The C reference also
/// returns a non-zero code on allocation failure, but Rust's global
/// allocator aborts the process on OOM rather than returning an error, so
/// there is no reachable path that would construct such a variant here; see
/// DESIGN.md.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map handle is invalid: bucket count must be positive")]
    NullHandle,
    #[error("key not found")]
    KeyNotFound,
}
