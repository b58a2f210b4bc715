use crossbeam_epoch::{Atomic, Guard, Shared};
use std::sync::atomic::Ordering;
use tracing::trace;

use crate::node::{is_marked, with_mark, without_mark, Node};

/// An ordered, sentinel-bounded Harris–Michael lock-free list.
///
/// `head` carries the minimum representable key, `tail` the maximum; both
/// are permanent and never marked. Interior nodes are reclaimed through
/// epoch-based deferral (`Guard::defer_destroy`) once `window` or `remove`
/// physically unlinks them, so a thread that read a node just before it was
/// unlinked may still dereference it safely until it drops its guard.
pub(crate) struct BucketList {
    head: Atomic<Node>,
    /// Identity of the tail sentinel, for cheap `curr == tail` checks.
    /// Never dereferenced through this field directly.
    tail: *const Node,
}

// The list is only ever touched through `Atomic`/`Guard`-mediated access;
// `tail` is an opaque identity token, not an aliasable reference.
unsafe impl Send for BucketList {}
unsafe impl Sync for BucketList {}

impl BucketList {
    pub(crate) fn new() -> Self {
        let guard = &crossbeam_epoch::pin();
        let tail_shared = Node::sentinel(i64::MAX).into_shared(guard);
        let head_shared = Node::sentinel(i64::MIN).into_shared(guard);
        unsafe { head_shared.deref() }
            .next
            .store(tail_shared, Ordering::Relaxed);

        let head = Atomic::null();
        head.store(head_shared, Ordering::Relaxed);
        BucketList {
            head,
            tail: tail_shared.as_raw(),
        }
    }

    #[inline]
    fn is_tail(&self, p: Shared<'_, Node>) -> bool {
        p.as_raw() == self.tail
    }

    /// Locates `(pred, curr)` such that `pred.key < key <= curr.key`,
    /// physically unlinking any run of marked nodes found between them.
    pub(crate) fn window<'g>(
        &self,
        key: i64,
        guard: &'g Guard,
    ) -> (Shared<'g, Node>, Shared<'g, Node>) {
        loop {
            let head = self.head.load(Ordering::Acquire, guard);
            let mut pred = head;
            let mut pred_succ = unsafe { pred.deref() }.next.load(Ordering::Acquire, guard);
            let mut curr = pred_succ;
            let mut garbage: Vec<Shared<'g, Node>> = Vec::new();

            loop {
                let curr_node = unsafe { curr.deref() };
                let curr_next = curr_node.next.load(Ordering::Acquire, guard);

                if is_marked(curr_next) {
                    garbage.push(curr);
                    curr = without_mark(curr_next);
                    continue;
                }

                if curr_node.key >= key {
                    break;
                }

                pred = curr;
                pred_succ = curr_next;
                curr = curr_next;
                garbage.clear();
            }

            if pred_succ.as_raw() == curr.as_raw() {
                if !self.is_tail(curr)
                    && is_marked(unsafe { curr.deref() }.next.load(Ordering::Acquire, guard))
                {
                    trace!(key, "window: curr freshly marked, restarting");
                    continue;
                }
                return (pred, curr);
            }

            match unsafe { pred.deref() }.next.compare_exchange(
                pred_succ,
                curr,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    for g in garbage {
                        unsafe { guard.defer_destroy(g) };
                    }
                    if !self.is_tail(curr)
                        && is_marked(unsafe { curr.deref() }.next.load(Ordering::Acquire, guard))
                    {
                        trace!(key, "window: curr freshly marked after unlink, restarting");
                        continue;
                    }
                    return (pred, curr);
                }
                Err(_) => {
                    trace!(key, "window: helping CAS lost, restarting");
                    continue;
                }
            }
        }
    }

    pub(crate) fn insert(&self, key: i64, guard: &Guard) {
        let mut new_node = Node::new(key);
        loop {
            let (pred, curr) = self.window(key, guard);
            new_node.next.store(curr, Ordering::Relaxed);
            match unsafe { pred.deref() }.next.compare_exchange(
                curr,
                new_node,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => return,
                Err(e) => new_node = e.new,
            }
        }
    }

    pub(crate) fn remove(&self, key: i64, guard: &Guard) -> bool {
        loop {
            let (pred, curr) = self.window(key, guard);
            if self.is_tail(curr) || unsafe { curr.deref() }.key != key {
                return false;
            }

            let succ = unsafe { curr.deref() }.next.load(Ordering::Acquire, guard);
            if is_marked(succ) {
                continue;
            }

            match unsafe { curr.deref() }.next.compare_exchange(
                succ,
                with_mark(succ),
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Err(_) => continue,
                Ok(_) => {
                    let unlinked = unsafe { pred.deref() }
                        .next
                        .compare_exchange(
                            curr,
                            succ,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                            guard,
                        )
                        .is_ok();
                    if unlinked {
                        unsafe { guard.defer_destroy(curr) };
                    } else {
                        // Best-effort cleanup: some later window() call (on any
                        // key, in any thread) is guaranteed to unlink `curr`.
                        let _ = self.window(key, guard);
                    }
                    return true;
                }
            }
        }
    }

    pub(crate) fn lookup(&self, key: i64, guard: &Guard) -> bool {
        let (_, curr) = self.window(key, guard);
        if self.is_tail(curr) {
            return false;
        }
        let curr_node = unsafe { curr.deref() };
        curr_node.key == key && !is_marked(curr_node.next.load(Ordering::Acquire, guard))
    }

    /// Returns the keys of every unmarked node, in order. Used only by the
    /// diagnostic dump; not required to be consistent under concurrent
    /// mutation.
    pub(crate) fn unmarked_keys(&self, guard: &Guard) -> Vec<i64> {
        let mut keys = Vec::new();
        let mut curr = unsafe { self.head.load(Ordering::Acquire, guard).deref() }
            .next
            .load(Ordering::Acquire, guard);
        while !self.is_tail(curr) {
            let node = unsafe { curr.deref() };
            let next = node.next.load(Ordering::Acquire, guard);
            if !is_marked(next) {
                keys.push(node.key);
            }
            curr = without_mark(next);
        }
        keys
    }
}

impl Drop for BucketList {
    fn drop(&mut self) {
        // Single-threaded teardown: no concurrent readers, so plain loads
        // and direct drops are sound.
        unsafe {
            let guard = crossbeam_epoch::unprotected();
            let mut curr = self.head.load(Ordering::Relaxed, guard);
            while !curr.is_null() {
                let next = without_mark(curr.deref().next.load(Ordering::Relaxed, guard));
                drop(curr.into_owned());
                curr = next;
            }
        }
    }
}
