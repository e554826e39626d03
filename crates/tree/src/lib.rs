//! Complete binary trees with swappable physical layout, and the binary
//! min-heap built on top of them.
//!
//! The tree is the shared chassis for two very different clients: the packed
//! memory array's density index (which wants the cache behavior of the van
//! Emde Boas order) and the shortest-path engines' priority queues (which
//! want cheap index arithmetic and external item handles).

pub mod layout;
mod queue;
mod tree;

pub use layout::{ExplicitHeap, ExplicitVeb, HeapOrder, Layout, Veb};
pub use queue::{Handle, PriorityQueue, NOT_QUEUED};
pub use tree::{CompleteBinaryTree, Cursor};
