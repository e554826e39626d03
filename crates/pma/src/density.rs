//! Occupancy bookkeeping for the packed memory array.
//!
//! A complete binary tree (in the explicit van Emde Boas order, so root-path
//! walks stay cache-friendly) covers the pool: each leaf owns one bucket,
//! each internal node the union of its children. Nodes carry their live-cell
//! count and the count of the left subtree, which makes rank queries and
//! emptiest-leaf descents O(log n).
//!
//! Density bounds are interpolated per level between the leaf bounds and the
//! root bounds (0.1, 0.9): the deeper the node, the tighter the band. The
//! bounds steer when a subtree is rebalanced and when the pool is resized;
//! they are not re-checked on every mutation.

use pmgraph_tree::{CompleteBinaryTree, Cursor, ExplicitVeb};

pub(crate) const ROOT_MIN_DENSITY: f64 = 0.1;
pub(crate) const ROOT_MAX_DENSITY: f64 = 0.9;

#[derive(Debug, Clone, Default)]
struct DensityNode {
    cardinality: usize,
    left_count: usize,
}

pub struct DensityIndex {
    tree: CompleteBinaryTree<DensityNode, ExplicitVeb>,
    leaf_size: usize,
    /// Allowed occupancy fractions indexed by node height (0 = leaf).
    max_density: Vec<f64>,
    min_density: Vec<f64>,
}

impl DensityIndex {
    pub fn new(
        tree_height: usize,
        leaf_size: usize,
        cardinality: usize,
        leaf_min: f64,
        leaf_max: f64,
    ) -> Self {
        let mut index = DensityIndex {
            tree: CompleteBinaryTree::new(tree_height, DensityNode::default()),
            leaf_size,
            max_density: Vec::new(),
            min_density: Vec::new(),
        };
        index.reset(tree_height, leaf_size, cardinality, leaf_min, leaf_max);
        index
    }

    /// Rebuild for a new pool shape. Only the root cardinality is seeded;
    /// the caller redistributes immediately afterwards, which fills in the
    /// rest of the tree.
    pub fn reset(
        &mut self,
        tree_height: usize,
        leaf_size: usize,
        cardinality: usize,
        leaf_min: f64,
        leaf_max: f64,
    ) {
        self.tree = CompleteBinaryTree::new(tree_height, DensityNode::default());
        self.leaf_size = leaf_size;
        self.tree.get_mut(self.tree.root()).cardinality = cardinality;

        // A reservation-raised leaf bound lifts the root bound with it, so a
        // bulk load close to capacity does not immediately re-trigger a
        // resize.
        let root_max = ROOT_MAX_DENSITY.max(leaf_max);
        let h = tree_height;
        self.max_density = (0..=h)
            .map(|k| {
                if h == 0 {
                    root_max
                } else {
                    leaf_max + (root_max - leaf_max) * k as f64 / h as f64
                }
            })
            .collect();
        self.min_density = (0..=h)
            .map(|k| {
                if h == 0 {
                    ROOT_MIN_DENSITY
                } else {
                    leaf_min - (leaf_min - ROOT_MIN_DENSITY) * k as f64 / h as f64
                }
            })
            .collect();
    }

    pub fn tree_height(&self) -> usize {
        self.tree.height()
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn root(&self) -> Cursor {
        self.tree.root()
    }

    /// Leaf whose bucket contains the pool index.
    pub fn leaf_over(&self, pool_index: usize) -> Cursor {
        self.tree.at_pos(0, pool_index / self.leaf_size)
    }

    /// Number of pool cells under the node.
    pub fn capacity(&self, c: Cursor) -> usize {
        self.leaf_size << self.tree.node_height(c)
    }

    pub fn cardinality(&self, c: Cursor) -> usize {
        self.tree.get(c).cardinality
    }

    /// First pool index covered by the node.
    pub fn start_index(&self, c: Cursor) -> usize {
        c.horizontal_index() * self.capacity(c)
    }

    pub fn affords_insertion_at(&self, c: Cursor) -> bool {
        let node = self.tree.get(c);
        (node.cardinality + 1) as f64
            <= self.max_density[self.tree.node_height(c)] * self.capacity(c) as f64
    }

    pub fn affords_erasure_at(&self, c: Cursor) -> bool {
        let node = self.tree.get(c);
        if node.cardinality == 0 {
            return false;
        }
        (node.cardinality - 1) as f64
            >= self.min_density[self.tree.node_height(c)] * self.capacity(c) as f64
    }

    /// Whether one more element fits the whole pool's density bound.
    pub fn affords_insertion(&self) -> bool {
        self.affords_insertion_at(self.root())
    }

    /// Node occupancy has fallen under its lower density bound.
    pub fn below_min(&self, c: Cursor) -> bool {
        (self.tree.get(c).cardinality as f64)
            < self.min_density[self.tree.node_height(c)] * self.capacity(c) as f64
    }

    /// Smallest ancestor (possibly `from` itself) that can absorb one more
    /// element. The caller must have ensured the root affords insertion.
    pub fn parent_for_insertion(&self, from: Cursor) -> Cursor {
        let mut c = from;
        while !self.affords_insertion_at(c) {
            debug_assert!(!c.is_root());
            self.tree.go_up(&mut c);
        }
        c
    }

    /// Smallest ancestor still above its lower bound after one erasure.
    pub fn parent_for_erasure(&self, from: Cursor) -> Cursor {
        let mut c = from;
        while !c.is_root() && !self.affords_erasure_at(c) {
            self.tree.go_up(&mut c);
        }
        c
    }

    /// Record one insertion under `leaf`: bump cardinalities up the root
    /// path, and left-subtree counts wherever the path arrives from a left
    /// child.
    pub fn increase_cardinality(&mut self, leaf: Cursor) {
        self.adjust_cardinality(leaf, true);
    }

    pub fn decrease_cardinality(&mut self, leaf: Cursor) {
        self.adjust_cardinality(leaf, false);
    }

    fn adjust_cardinality(&mut self, leaf: Cursor, up: bool) {
        let mut c = leaf;
        let mut from_left_child = false;
        loop {
            let node = self.tree.get_mut(c);
            if up {
                node.cardinality += 1;
                if from_left_child {
                    node.left_count += 1;
                }
            } else {
                node.cardinality -= 1;
                if from_left_child {
                    node.left_count -= 1;
                }
            }
            if c.is_root() {
                break;
            }
            from_left_child = !c.is_right_child();
            self.tree.go_up(&mut c);
        }
    }

    /// Leaf reached by always following the sparser child.
    pub fn find_emptiest_leaf(&self) -> Cursor {
        let mut c = self.tree.root();
        while !self.tree.is_leaf(c) {
            let node = self.tree.get(c);
            if node.left_count <= node.cardinality >> 1 {
                self.tree.go_left(&mut c);
            } else {
                self.tree.go_right(&mut c);
            }
        }
        c
    }

    /// Pool index of the element with the given rank (0-based position in
    /// iteration order). Requires `rank < cardinality(root)`.
    pub fn index_of_rank(&self, rank: usize) -> usize {
        let mut c = self.tree.root();
        let mut skipped_elements = 0;
        let mut skipped_capacity = 0;
        while !self.tree.is_leaf(c) {
            let node = self.tree.get(c);
            if rank < skipped_elements + node.left_count {
                self.tree.go_left(&mut c);
            } else {
                skipped_elements += node.left_count;
                skipped_capacity += self.capacity(c) >> 1;
                self.tree.go_right(&mut c);
            }
        }
        skipped_capacity + (rank - skipped_elements)
    }

    /// Number of live elements in buckets strictly before the one holding
    /// `pool_index`.
    pub fn rank_before_bucket(&self, pool_index: usize) -> usize {
        let mut c = self.leaf_over(pool_index);
        let mut rank = 0;
        while !c.is_root() {
            let from_right = c.is_right_child();
            self.tree.go_up(&mut c);
            if from_right {
                rank += self.tree.get(c).left_count;
            }
        }
        rank
    }

    /// Split the subtree's cardinality evenly over its leaves, updating the
    /// per-node statistics on the way down, and return `(start_index,
    /// per-leaf quotas left to right)`.
    ///
    /// When `sparse` names the overflowing leaf, odd remainders go to the
    /// side away from it, leaving that side slightly emptier.
    pub fn redistribute_quotas(
        &mut self,
        from: Cursor,
        sparse: Option<Cursor>,
    ) -> (usize, Vec<usize>) {
        let start = self.start_index(from);
        let mut quotas = Vec::with_capacity(self.capacity(from) / self.leaf_size);
        let mut stack = vec![from];
        while let Some(c) = stack.pop() {
            if self.tree.is_leaf(c) {
                let node = self.tree.get_mut(c);
                node.left_count = 0;
                quotas.push(node.cardinality);
                continue;
            }
            let card = self.tree.get(c).cardinality;
            let base = card >> 1;
            let remainder = card & 1;
            let right = self.tree.right(c);
            let (left_card, right_card) = match sparse {
                Some(s) if self.tree.is_to_the_left_of(s, right) => (base, base + remainder),
                _ => (base + remainder, base),
            };
            self.tree.get_mut(c).left_count = left_card;
            let left = self.tree.left(c);
            self.tree.get_mut(left).cardinality = left_card;
            self.tree.get_mut(right).cardinality = right_card;
            stack.push(right);
            stack.push(left);
        }
        (start, quotas)
    }

    /// Like [`Self::redistribute_quotas`] but packing every element as far
    /// left as capacities allow.
    pub fn compress_quotas(&mut self, from: Cursor) -> (usize, Vec<usize>) {
        let start = self.start_index(from);
        let mut quotas = Vec::with_capacity(self.capacity(from) / self.leaf_size);
        let mut stack = vec![from];
        while let Some(c) = stack.pop() {
            if self.tree.is_leaf(c) {
                let node = self.tree.get_mut(c);
                node.left_count = 0;
                quotas.push(node.cardinality);
                continue;
            }
            let card = self.tree.get(c).cardinality;
            let child_capacity = self.capacity(c) >> 1;
            let left_card = card.min(child_capacity);
            let right_card = card - left_card;
            self.tree.get_mut(c).left_count = left_card;
            let left = self.tree.left(c);
            let right = self.tree.right(c);
            self.tree.get_mut(left).cardinality = left_card;
            self.tree.get_mut(right).cardinality = right_card;
            stack.push(right);
            stack.push(left);
        }
        (start, quotas)
    }

    pub fn is_leaf(&self, c: Cursor) -> bool {
        self.tree.is_leaf(c)
    }

    pub fn left(&self, c: Cursor) -> Cursor {
        self.tree.left(c)
    }

    pub fn right(&self, c: Cursor) -> Cursor {
        self.tree.right(c)
    }
}
