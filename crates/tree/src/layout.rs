//! Physical layouts for a complete binary tree.
//!
//! A layout maps a node identified by its bfs index (root = 1) to a slot in
//! the backing pool, and answers child/parent steps from a known slot. The
//! logical tree is identical across layouts; only the memory order differs:
//!
//! * [`HeapOrder`]: classic breadth-first order, `slot = bfs - 1`.
//! * [`Veb`]: van Emde Boas order, computed per step from the recursive
//!   middle-level split. Root-to-leaf walks touch O(log_B n) cache blocks.
//! * [`ExplicitHeap`] / [`ExplicitVeb`]: the same orders with all steps
//!   precomputed into per-slot tables, trading memory for arithmetic.
//!
//! `height` arguments always refer to the height of the node being stepped
//! from (leaves have height 0), mirroring how the tree cursor tracks depth.

use pmgraph_utils::{floor_log2, pow2};

const NO_SLOT: usize = usize::MAX;

/// Maps bfs positions to pool slots for one fixed tree height.
pub trait Layout {
    fn new(height: usize) -> Self;

    /// Pool slot of the root.
    fn root(&self) -> usize;

    /// Pool slot of the node with the given bfs index.
    fn slot_of_bfs(&self, bfs: usize) -> usize;

    /// Pool slot of the left child of the node at `slot` with bfs index
    /// `bfs` and height `height` (> 0).
    fn left_child(&self, slot: usize, bfs: usize, height: usize) -> usize;

    /// Pool slot of the right child. Same preconditions as [`Self::left_child`].
    fn right_child(&self, slot: usize, bfs: usize, height: usize) -> usize;

    /// Pool slot of the parent of a non-root node.
    fn parent(&self, slot: usize, bfs: usize, height: usize) -> usize;
}

/// Breadth-first (binary heap) order.
pub struct HeapOrder;

impl Layout for HeapOrder {
    fn new(_height: usize) -> Self {
        HeapOrder
    }

    fn root(&self) -> usize {
        0
    }

    fn slot_of_bfs(&self, bfs: usize) -> usize {
        bfs - 1
    }

    fn left_child(&self, slot: usize, bfs: usize, _height: usize) -> usize {
        slot + bfs
    }

    fn right_child(&self, slot: usize, bfs: usize, _height: usize) -> usize {
        slot + bfs + 1
    }

    fn parent(&self, slot: usize, bfs: usize, _height: usize) -> usize {
        if bfs & 1 == 1 {
            slot - ((bfs >> 1) + 1)
        } else {
            slot - (bfs >> 1)
        }
    }
}

/// Shared level-split tables for the van Emde Boas orders.
///
/// `upper[h]` / `lower[h]` give, for a node at height `h` that roots a
/// recursion unit, the number of levels in the unit above respectively below
/// its middle cut. `tree_size[k] == 2^k - 1`.
struct VebShape {
    upper: Vec<usize>,
    lower: Vec<usize>,
    tree_size: Vec<usize>,
    height: usize,
}

impl VebShape {
    /// `round_up` selects where an odd level range is cut: the on-the-fly
    /// order cuts below the middle, the precomputed order above it.
    fn new(height: usize, round_up: bool) -> Self {
        let mut upper = vec![0usize; height + 1];
        let mut lower = vec![0usize; height + 1];
        let tree_size: Vec<usize> = (0..=height).map(|h| pow2(h as u32) - 1).collect();

        let mut ranges = vec![(0usize, height + 1)];
        while let Some((first, last)) = ranges.pop() {
            let levels = last - first;
            if levels > 1 {
                let middle = if round_up {
                    first + (levels >> 1) + (levels & 1)
                } else {
                    first + (levels >> 1)
                };
                lower[middle] = middle - first;
                upper[middle] = last - middle;
                ranges.push((middle, last));
                ranges.push((first, middle));
            }
        }
        upper[height] = 1;
        lower[0] = 0;
        upper[0] = 1;

        VebShape {
            upper,
            lower,
            tree_size,
            height,
        }
    }

    /// Offset of a right-child step from a node at `height` with bfs `bfs`.
    fn right_step(&self, bfs: usize, height: usize) -> usize {
        let mut levels = self.upper[height];
        let child_index = bfs << 1;
        let siblings = (child_index & self.tree_size[levels]) + 1;
        let mut sum = pow2(levels as u32) as i64 + ((siblings << self.lower[height]) as i64)
            - ((siblings << 1) as i64);

        while levels > 1 {
            let upper = (levels >> 1) + (levels & 1);
            levels >>= 1;
            let father = bfs >> (levels - 1);
            sum += (father & self.tree_size[upper]) as i64;
            sum -= self.tree_size[upper] as i64;
        }
        debug_assert!(sum > 0);
        sum as usize
    }

    /// Offset of a left-child step from a node at `height` with bfs `bfs`.
    fn left_step(&self, bfs: usize, height: usize) -> usize {
        let mut levels = self.upper[height];
        let child_index = bfs << 1;
        let siblings = child_index & self.tree_size[levels];
        let mut sum = pow2(levels as u32) as i64 - 1 + ((siblings << self.lower[height]) as i64)
            - ((siblings << 1) as i64);

        while levels > 1 {
            let upper = (levels >> 1) + (levels & 1);
            levels >>= 1;
            let father = bfs >> (levels - 1);
            sum += (father & self.tree_size[upper]) as i64;
            sum -= self.tree_size[upper] as i64;
        }
        debug_assert!(sum > 0);
        sum as usize
    }

    /// Pool slot of a node given its bfs index, by unrolling the recursion
    /// unit containing it at each scale.
    fn slot_of_bfs(&self, bfs: usize) -> usize {
        if bfs == 1 {
            return 0;
        }
        let mut sum = 0usize;
        let mut child = bfs;
        let mut height = self.height - floor_log2(child) as usize;

        while child != 1 {
            let upper = self.upper[height + 1];
            sum += (child & (pow2(upper as u32) - 1)) * self.tree_size[self.lower[height + 1]];
            sum += self.tree_size[upper];
            child >>= upper;
            height += upper;
        }
        sum
    }
}

/// On-the-fly van Emde Boas order.
pub struct Veb {
    shape: VebShape,
}

impl Layout for Veb {
    fn new(height: usize) -> Self {
        Veb {
            shape: VebShape::new(height, false),
        }
    }

    fn root(&self) -> usize {
        0
    }

    fn slot_of_bfs(&self, bfs: usize) -> usize {
        self.shape.slot_of_bfs(bfs)
    }

    fn left_child(&self, slot: usize, bfs: usize, height: usize) -> usize {
        if self.shape.upper[height] == 1 {
            slot + 1
        } else {
            slot + self.shape.left_step(bfs, height)
        }
    }

    fn right_child(&self, slot: usize, bfs: usize, height: usize) -> usize {
        if self.shape.upper[height] == 1 {
            slot + 2
        } else {
            slot + self.shape.right_step(bfs, height)
        }
    }

    fn parent(&self, slot: usize, bfs: usize, height: usize) -> usize {
        if self.shape.upper[height + 1] == 1 {
            slot - (1 + (bfs & 1))
        } else if bfs & 1 == 1 {
            slot - self.shape.right_step(bfs >> 1, height + 1)
        } else {
            slot - self.shape.left_step(bfs >> 1, height + 1)
        }
    }
}

/// Heap order with precomputed parent/child slot tables.
pub struct ExplicitHeap {
    left: Vec<usize>,
    right: Vec<usize>,
    up: Vec<usize>,
}

impl Layout for ExplicitHeap {
    fn new(height: usize) -> Self {
        let num_nodes = pow2(height as u32 + 1) - 1;
        let mut left = vec![NO_SLOT; num_nodes];
        let mut right = vec![NO_SLOT; num_nodes];
        let mut up = vec![NO_SLOT; num_nodes];

        for bfs in 1..=num_nodes {
            if bfs != 1 {
                up[bfs - 1] = (bfs >> 1) - 1;
            }
            if floor_log2(bfs) as usize != height {
                left[bfs - 1] = (bfs << 1) - 1;
                right[bfs - 1] = bfs << 1;
            }
        }
        ExplicitHeap { left, right, up }
    }

    fn root(&self) -> usize {
        0
    }

    fn slot_of_bfs(&self, bfs: usize) -> usize {
        bfs - 1
    }

    fn left_child(&self, slot: usize, _bfs: usize, _height: usize) -> usize {
        self.left[slot]
    }

    fn right_child(&self, slot: usize, _bfs: usize, _height: usize) -> usize {
        self.right[slot]
    }

    fn parent(&self, slot: usize, _bfs: usize, _height: usize) -> usize {
        self.up[slot]
    }
}

/// van Emde Boas order with precomputed slot tables.
pub struct ExplicitVeb {
    bfs_to_slot: Vec<usize>,
    left: Vec<usize>,
    right: Vec<usize>,
    up: Vec<usize>,
}

impl Layout for ExplicitVeb {
    fn new(height: usize) -> Self {
        let shape = VebShape::new(height, true);
        let num_nodes = pow2(height as u32 + 1) - 1;
        let mut bfs_to_slot = vec![NO_SLOT; num_nodes + 1];
        let mut left = vec![NO_SLOT; num_nodes];
        let mut right = vec![NO_SLOT; num_nodes];
        let mut up = vec![NO_SLOT; num_nodes];

        for bfs in 1..=num_nodes {
            let slot = shape.slot_of_bfs(bfs);
            bfs_to_slot[bfs] = slot;
            if bfs != 1 {
                up[slot] = shape.slot_of_bfs(bfs >> 1);
            }
            if floor_log2(bfs) as usize != height {
                left[slot] = shape.slot_of_bfs(bfs << 1);
                right[slot] = shape.slot_of_bfs((bfs << 1) + 1);
            }
        }
        ExplicitVeb {
            bfs_to_slot,
            left,
            right,
            up,
        }
    }

    fn root(&self) -> usize {
        0
    }

    fn slot_of_bfs(&self, bfs: usize) -> usize {
        self.bfs_to_slot[bfs]
    }

    fn left_child(&self, slot: usize, _bfs: usize, _height: usize) -> usize {
        self.left[slot]
    }

    fn right_child(&self, slot: usize, _bfs: usize, _height: usize) -> usize {
        self.right[slot]
    }

    fn parent(&self, slot: usize, _bfs: usize, _height: usize) -> usize {
        self.up[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_all<L: Layout>(height: usize) {
        let layout = L::new(height);
        let num_nodes = pow2(height as u32 + 1) - 1;
        let mut seen = vec![false; num_nodes];

        for bfs in 1..=num_nodes {
            let slot = layout.slot_of_bfs(bfs);
            assert!(slot < num_nodes, "bfs {bfs} mapped out of pool");
            assert!(!seen[slot], "bfs {bfs} collided at slot {slot}");
            seen[slot] = true;

            let depth = floor_log2(bfs) as usize;
            let node_height = height - depth;
            if node_height > 0 {
                assert_eq!(
                    layout.left_child(slot, bfs, node_height),
                    layout.slot_of_bfs(bfs << 1)
                );
                assert_eq!(
                    layout.right_child(slot, bfs, node_height),
                    layout.slot_of_bfs((bfs << 1) + 1)
                );
            }
            if bfs != 1 {
                assert_eq!(
                    layout.parent(slot, bfs, node_height),
                    layout.slot_of_bfs(bfs >> 1)
                );
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn heap_order_is_consistent() {
        for h in 0..10 {
            walk_all::<HeapOrder>(h);
        }
    }

    #[test]
    fn veb_is_consistent() {
        for h in 0..10 {
            walk_all::<Veb>(h);
        }
    }

    #[test]
    fn explicit_heap_is_consistent() {
        for h in 0..10 {
            walk_all::<ExplicitHeap>(h);
        }
    }

    #[test]
    fn explicit_veb_is_consistent() {
        for h in 0..10 {
            walk_all::<ExplicitVeb>(h);
        }
    }

    #[test]
    fn veb_height_three_matches_known_order() {
        // Height 3, 15 nodes. The middle cut puts the root and its two
        // children in the top unit (slots 0..3); the four bottom subtrees
        // of three nodes each follow in left-to-right order.
        let layout = Veb::new(3);
        assert_eq!(layout.slot_of_bfs(1), 0);
        assert_eq!(layout.slot_of_bfs(2), 1);
        assert_eq!(layout.slot_of_bfs(3), 2);
        assert_eq!(layout.slot_of_bfs(4), 3);
        assert_eq!(layout.slot_of_bfs(8), 4);
        assert_eq!(layout.slot_of_bfs(9), 5);
        assert_eq!(layout.slot_of_bfs(5), 6);
    }
}
