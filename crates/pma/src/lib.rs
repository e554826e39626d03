//! Packed memory array: a sorted sequence kept in a gap array whose density
//! is rebalanced through an implicit tree.
//!
//! Insertion costs O(log² n) amortized, lookup O(log n), and iteration walks
//! contiguous memory with O(1)-amortized skips over the gaps. The price is
//! that elements move; anything that remembers where an element lives
//! registers a [`PmaObserver`] on the mutating calls and repairs itself as
//! the moves are reported.

pub mod density;
mod map;
mod observer;
mod pma;

pub use density::DensityIndex;
pub use map::{MapItem, PmaMap};
pub use observer::{MoveEvent, PmaObserver};
pub use pma::{Indices, Iter, Pma};
