use crossbeam_epoch::{Atomic, Owned, Shared};

/// One element of a bucket list.
///
/// `next` carries the logical-deletion mark in its tag bit rather than in a
/// separate word, so the mark and the pointer are always read and written
/// together by a single atomic operation.
pub(crate) struct Node {
    pub(crate) key: i64,
    pub(crate) next: Atomic<Node>,
}

impl Node {
    pub(crate) fn new(key: i64) -> Owned<Node> {
        Owned::new(Node {
            key,
            next: Atomic::null(),
        })
    }

    /// Builds a sentinel node carrying `key` (the list's `head` or `tail`).
    pub(crate) fn sentinel(key: i64) -> Owned<Node> {
        Self::new(key)
    }
}

#[inline]
pub(crate) fn is_marked(p: Shared<'_, Node>) -> bool {
    p.tag() == 1
}

#[inline]
pub(crate) fn with_mark(p: Shared<'_, Node>) -> Shared<'_, Node> {
    p.with_tag(1)
}

#[inline]
pub(crate) fn without_mark(p: Shared<'_, Node>) -> Shared<'_, Node> {
    p.with_tag(0)
}
