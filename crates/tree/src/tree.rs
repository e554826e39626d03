//! A fixed-height complete binary tree over a flat pool.

use pmgraph_utils::{floor_log2, pow2};

use crate::layout::Layout;

/// Position of a tree node: its pool slot plus the bfs coordinates needed to
/// navigate from it. Cursors are plain data; all navigation goes through the
/// owning [`CompleteBinaryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    slot: usize,
    bfs: usize,
    depth: usize,
}

impl Cursor {
    /// Slot in the backing pool.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Bfs index; the root has bfs index 1.
    #[must_use]
    pub fn bfs_index(&self) -> usize {
        self.bfs
    }

    /// Distance from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Index among the nodes of the same level, counted from the left.
    #[must_use]
    pub fn horizontal_index(&self) -> usize {
        self.bfs - pow2(self.depth as u32)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    #[must_use]
    pub fn is_right_child(&self) -> bool {
        self.bfs & 1 == 1
    }
}

/// A complete binary tree of `2^(height+1) - 1` nodes whose physical order is
/// a [`Layout`] policy.
pub struct CompleteBinaryTree<T, L> {
    pool: Vec<T>,
    layout: L,
    height: usize,
    default: T,
}

impl<T: Clone, L: Layout> CompleteBinaryTree<T, L> {
    /// A tree of the given height with every node set to `default`. Height 0
    /// is a single node.
    pub fn new(height: usize, default: T) -> Self {
        let num_nodes = pow2(height as u32 + 1) - 1;
        CompleteBinaryTree {
            pool: vec![default.clone(); num_nodes],
            layout: L::new(height),
            height,
            default,
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.pool.len()
    }

    #[must_use]
    pub fn root(&self) -> Cursor {
        Cursor {
            slot: self.layout.root(),
            bfs: 1,
            depth: 0,
        }
    }

    #[must_use]
    pub fn at_bfs(&self, bfs: usize) -> Cursor {
        debug_assert!(bfs >= 1 && bfs <= self.num_nodes());
        Cursor {
            slot: self.layout.slot_of_bfs(bfs),
            bfs,
            depth: floor_log2(bfs) as usize,
        }
    }

    /// Node at the given height with the given horizontal index.
    #[must_use]
    pub fn at_pos(&self, height: usize, horizontal: usize) -> Cursor {
        self.at_bfs(pow2((self.height - height) as u32) + horizontal)
    }

    /// Height of the node above the leaves; leaves have height 0.
    #[must_use]
    pub fn node_height(&self, c: Cursor) -> usize {
        self.height - c.depth
    }

    #[must_use]
    pub fn is_leaf(&self, c: Cursor) -> bool {
        c.depth == self.height
    }

    pub fn go_left(&self, c: &mut Cursor) {
        c.slot = self
            .layout
            .left_child(c.slot, c.bfs, self.node_height(*c));
        c.bfs <<= 1;
        c.depth += 1;
    }

    pub fn go_right(&self, c: &mut Cursor) {
        c.slot = self
            .layout
            .right_child(c.slot, c.bfs, self.node_height(*c));
        c.bfs = (c.bfs << 1) + 1;
        c.depth += 1;
    }

    pub fn go_up(&self, c: &mut Cursor) {
        c.slot = self.layout.parent(c.slot, c.bfs, self.node_height(*c));
        c.bfs >>= 1;
        c.depth -= 1;
    }

    #[must_use]
    pub fn left(&self, mut c: Cursor) -> Cursor {
        self.go_left(&mut c);
        c
    }

    #[must_use]
    pub fn right(&self, mut c: Cursor) -> Cursor {
        self.go_right(&mut c);
        c
    }

    #[must_use]
    pub fn parent(&self, mut c: Cursor) -> Cursor {
        self.go_up(&mut c);
        c
    }

    /// True iff `leaf`'s ancestor at `other`'s level lies strictly to the
    /// left of `other`.
    #[must_use]
    pub fn is_to_the_left_of(&self, leaf: Cursor, other: Cursor) -> bool {
        debug_assert!(self.is_leaf(leaf));
        (leaf.bfs >> self.node_height(other)) < other.bfs
    }

    #[must_use]
    pub fn get(&self, c: Cursor) -> &T {
        &self.pool[c.slot]
    }

    pub fn get_mut(&mut self, c: Cursor) -> &mut T {
        &mut self.pool[c.slot]
    }

    /// Swap the payloads of two nodes.
    pub fn swap(&mut self, a: Cursor, b: Cursor) {
        self.pool.swap(a.slot, b.slot);
    }

    /// Add one level, preserving every existing node's logical position.
    pub fn increase_height(&mut self) {
        self.rebuild(self.height + 1);
    }

    /// Drop the last level, preserving the remaining nodes.
    pub fn decrease_height(&mut self) {
        debug_assert!(self.height > 0);
        self.rebuild(self.height - 1);
    }

    fn rebuild(&mut self, new_height: usize) {
        let new_len = pow2(new_height as u32 + 1) - 1;
        let new_layout = L::new(new_height);
        let mut new_pool = vec![self.default.clone(); new_len];

        // DFS over the bfs indices common to both shapes, translating slots
        // through each layout independently.
        let copied = self.pool.len().min(new_len);
        let mut stack = vec![1usize];
        while let Some(bfs) = stack.pop() {
            new_pool[new_layout.slot_of_bfs(bfs)] =
                self.pool[self.layout.slot_of_bfs(bfs)].clone();
            if (bfs << 1) <= copied {
                stack.push((bfs << 1) + 1);
                stack.push(bfs << 1);
            }
        }

        self.pool = new_pool;
        self.layout = new_layout;
        self.height = new_height;
    }
}
