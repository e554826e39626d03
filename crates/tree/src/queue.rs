//! Binary min-heap carried in a [`CompleteBinaryTree`].
//!
//! Items are addressed externally through [`Handle`]s: a shared slot the
//! queue keeps pointing at the item's current bfs index for as long as the
//! item is queued, enabling `decrease`/`update`/`remove` without a lookup.
//! The backing tree grows a level when the heap outgrows it and sheds one
//! when the occupancy falls back to a power of two.

use std::cell::Cell;
use std::rc::Rc;

use pmgraph_utils::is_pow2;

use crate::layout::{HeapOrder, Layout};
use crate::tree::{CompleteBinaryTree, Cursor};

/// Slot value meaning "not currently in the queue".
pub const NOT_QUEUED: u32 = u32::MAX;

/// External address of a queued item.
///
/// The queue writes the item's current bfs index into the shared slot on
/// every structural change and [`NOT_QUEUED`] when the item leaves the queue.
/// Clones share the slot. A handle may be reused for a later insertion.
#[derive(Debug, Clone)]
pub struct Handle(Rc<Cell<u32>>);

impl Handle {
    #[must_use]
    pub fn new() -> Self {
        Handle(Rc::new(Cell::new(NOT_QUEUED)))
    }

    /// Current bfs index, or [`NOT_QUEUED`].
    #[must_use]
    pub fn slot(&self) -> u32 {
        self.0.get()
    }

    fn set(&self, bfs: u32) {
        self.0.set(bfs);
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::new()
    }
}

/// One heap cell.
#[derive(Debug, Clone, Default)]
struct HeapItem<K, D> {
    key: K,
    data: D,
    handle: Option<Handle>,
}

/// Binary min-heap with external handles and a pluggable tree layout.
pub struct PriorityQueue<K, D, L: Layout = HeapOrder> {
    tree: CompleteBinaryTree<HeapItem<K, D>, L>,
    len: usize,
}

impl<K, D, L> PriorityQueue<K, D, L>
where
    K: Ord + Clone + Default,
    D: Clone + Default,
    L: Layout,
{
    #[must_use]
    pub fn new() -> Self {
        PriorityQueue {
            tree: CompleteBinaryTree::new(0, HeapItem::default()),
            len: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Detach every queued item's handle and empty the queue. Capacity is
    /// kept.
    pub fn clear(&mut self) {
        for bfs in 1..=self.len {
            let c = self.tree.at_bfs(bfs);
            if let Some(handle) = self.tree.get_mut(c).handle.take() {
                handle.set(NOT_QUEUED);
            }
        }
        self.len = 0;
    }

    /// True iff the handle currently addresses an item of this queue.
    ///
    /// Only meaningful for handles this queue wrote last; a handle recycled
    /// by the caller across queries must be gated externally (the engines do
    /// so with their timestamp check).
    #[must_use]
    pub fn contains(&self, handle: &Handle) -> bool {
        let slot = handle.slot();
        slot != NOT_QUEUED && (slot as usize) <= self.len
    }

    /// Insert an item. When `handle` is given, the queue tracks the item
    /// through it until the item is popped or removed.
    pub fn insert(&mut self, key: K, data: D, handle: Option<&Handle>) {
        self.len += 1;
        if self.len > self.tree.num_nodes() {
            self.tree.increase_height();
        }
        let c = self.tree.at_bfs(self.len);
        let item = self.tree.get_mut(c);
        item.key = key;
        item.data = data;
        item.handle = handle.cloned();
        if let Some(h) = handle {
            h.set(self.len as u32);
        }
        self.upheap(c);
    }

    /// Minimum key and its data.
    #[must_use]
    pub fn min(&self) -> Option<(&K, &D)> {
        if self.is_empty() {
            return None;
        }
        let item = self.tree.get(self.tree.root());
        Some((&item.key, &item.data))
    }

    #[must_use]
    pub fn min_key(&self) -> Option<&K> {
        self.min().map(|(k, _)| k)
    }

    #[must_use]
    pub fn min_item(&self) -> Option<&D> {
        self.min().map(|(_, d)| d)
    }

    /// Key of a queued item.
    #[must_use]
    pub fn key_of(&self, handle: &Handle) -> &K {
        debug_assert!(self.contains(handle));
        &self.tree.get(self.tree.at_bfs(handle.slot() as usize)).key
    }

    /// Data of a queued item.
    #[must_use]
    pub fn item_of(&self, handle: &Handle) -> &D {
        debug_assert!(self.contains(handle));
        &self.tree.get(self.tree.at_bfs(handle.slot() as usize)).data
    }

    /// Pop the minimum. Its handle, if any, is set to [`NOT_QUEUED`].
    pub fn pop_min(&mut self) -> Option<(K, D)> {
        if self.is_empty() {
            return None;
        }
        let root = self.tree.root();
        let out = {
            let item = self.tree.get(root);
            (item.key.clone(), item.data.clone())
        };
        self.evict(root);
        Some(out)
    }

    /// Remove an arbitrary queued item through its handle.
    pub fn remove(&mut self, handle: &Handle) {
        if handle.slot() == NOT_QUEUED {
            return;
        }
        debug_assert!(self.contains(handle));
        let c = self.tree.at_bfs(handle.slot() as usize);
        self.evict(c);
    }

    /// Lower the key of a queued item. `key` must not exceed the current key.
    pub fn decrease(&mut self, key: K, handle: &Handle) {
        debug_assert!(self.contains(handle));
        let c = self.tree.at_bfs(handle.slot() as usize);
        debug_assert!(key <= self.tree.get(c).key);
        self.tree.get_mut(c).key = key;
        self.upheap(c);
    }

    /// Re-key a queued item, bubbling in whichever direction is needed.
    pub fn update(&mut self, key: K, handle: &Handle) {
        debug_assert!(self.contains(handle));
        let c = self.tree.at_bfs(handle.slot() as usize);
        let current = self.tree.get(c).key.clone();
        if key < current {
            self.tree.get_mut(c).key = key;
            self.upheap(c);
        } else if key > current {
            self.tree.get_mut(c).key = key;
            self.downheap(c);
        }
    }

    /// Pre-order traversal of every queued item.
    pub fn visit(&self, mut f: impl FnMut(&K, &D)) {
        if self.is_empty() {
            return;
        }
        let mut stack = vec![self.tree.root()];
        while let Some(c) = stack.pop() {
            if !self.in_heap(c) {
                continue;
            }
            let item = self.tree.get(c);
            f(&item.key, &item.data);
            if !self.tree.is_leaf(c) {
                stack.push(self.tree.right(c));
                stack.push(self.tree.left(c));
            }
        }
    }

    /// Remove the item at `c`: sink the hole to the heap fringe, backfill
    /// with the last item, restore order, detach the handle.
    fn evict(&mut self, mut c: Cursor) {
        self.certain_downheap(&mut c);
        let last = self.tree.at_bfs(self.len);
        if c != last {
            self.swap_items(c, last);
            self.upheap(c);
        }
        if let Some(handle) = self.tree.get_mut(last).handle.take() {
            handle.set(NOT_QUEUED);
        }
        self.shrink_after_pop();
    }

    fn in_heap(&self, c: Cursor) -> bool {
        c.bfs_index() <= self.len
    }

    fn shrink_after_pop(&mut self) {
        if self.len >= 9 && is_pow2(self.len) {
            self.tree.decrease_height();
        }
        self.len -= 1;
    }

    /// Swap two items and re-point their handles.
    fn swap_items(&mut self, a: Cursor, b: Cursor) {
        self.tree.swap(a, b);
        if let Some(h) = &self.tree.get(a).handle {
            h.set(a.bfs_index() as u32);
        }
        if let Some(h) = &self.tree.get(b).handle {
            h.set(b.bfs_index() as u32);
        }
    }

    fn upheap(&mut self, mut c: Cursor) {
        while !c.is_root() {
            let parent = self.tree.parent(c);
            if self.tree.get(parent).key > self.tree.get(c).key {
                self.swap_items(c, parent);
                c = parent;
            } else {
                return;
            }
        }
    }

    /// Sink the item at `c` all the way along the min-child path until it
    /// leaves the occupied region or reaches a leaf.
    fn certain_downheap(&mut self, c: &mut Cursor) {
        while !self.tree.is_leaf(*c) {
            let left = self.tree.left(*c);
            if !self.in_heap(left) {
                return;
            }
            let right = self.tree.right(*c);
            let next = if !self.in_heap(right) || self.tree.get(left).key < self.tree.get(right).key
            {
                left
            } else {
                right
            };
            self.swap_items(*c, next);
            *c = next;
        }
    }

    /// Standard sift-down: stop as soon as the heap order holds locally.
    fn downheap(&mut self, mut c: Cursor) {
        while !self.tree.is_leaf(c) {
            let mut min = c;
            let left = self.tree.left(c);
            if self.in_heap(left) && self.tree.get(left).key < self.tree.get(min).key {
                min = left;
            }
            let right = self.tree.right(c);
            if self.in_heap(right) && self.tree.get(right).key < self.tree.get(min).key {
                min = right;
            }
            if min == c {
                return;
            }
            self.swap_items(c, min);
            c = min;
        }
    }
}

impl<K, D, L> Default for PriorityQueue<K, D, L>
where
    K: Ord + Clone + Default,
    D: Clone + Default,
    L: Layout,
{
    fn default() -> Self {
        Self::new()
    }
}
