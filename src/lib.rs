//! A concurrent, lock-free hash map keyed by signed integers.
//!
//! The map is a fixed-size array of buckets, each an ordered Harris–Michael
//! lock-free list: logical deletion marks a node's `next` pointer, and a
//! later `window` traversal (run by any thread, on any key) physically
//! unlinks it via CAS. No operation ever blocks or takes a lock; safe
//! memory reclamation is handled by epoch-based reclamation
//! (`crossbeam-epoch`) rather than immediate `free`, so a thread that
//! glimpsed a node just before it was unlinked may keep dereferencing it
//! until its epoch guard is dropped.
//!
//! Out of scope: bucket-array resizing, snapshot iteration under
//! concurrent mutation, persistence, ordered cross-bucket iteration, and
//! generic key/value types — the key is its own value.

mod error;
mod list;
mod map;
mod node;

pub use error::MapError;
pub use map::LockFreeHashMap;
