//! Stable node handles.
//!
//! Graph storage moves nodes around; a [`NodeDescriptor`] is the one
//! reference that survives. It is a generational index into a table owned by
//! the graph, whose entries hold the node's current storage position. The
//! storage-side observers rewrite the entry on every move, so resolution
//! stays O(1) at all times. A freed entry bumps its generation, making any
//! descriptor that still names it resolve to nothing instead of to whatever
//! node reuses the entry.

/// Sentinel for "position not assigned yet".
const UNSET: usize = usize::MAX;

/// Stable external handle to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeDescriptor {
    index: u32,
    generation: u32,
}

impl NodeDescriptor {
    /// Dense table index; stable for the node's whole lifetime, reused (with
    /// a new generation) after the node is erased. Algorithm engines key
    /// their per-node scratch off this.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Directed edge handle: the descriptors of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeDescriptor {
    pub source: NodeDescriptor,
    pub target: NodeDescriptor,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    position: usize,
    live: bool,
}

/// Table mapping descriptors to current storage positions.
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    entries: Vec<Entry>,
    free: Vec<u32>,
}

impl DescriptorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a descriptor with no position yet; the caller assigns one
    /// with [`Self::set_position`] once the node lands in storage.
    pub fn allocate(&mut self) -> NodeDescriptor {
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.position = UNSET;
            entry.live = true;
            NodeDescriptor {
                index,
                generation: entry.generation,
            }
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                position: UNSET,
                live: true,
            });
            NodeDescriptor {
                index,
                generation: 0,
            }
        }
    }

    /// Free the entry; the descriptor (and all its copies) go stale.
    pub fn release(&mut self, d: NodeDescriptor) {
        debug_assert!(self.contains(d));
        let entry = &mut self.entries[d.index()];
        entry.generation = entry.generation.wrapping_add(1);
        entry.live = false;
        self.free.push(d.index);
    }

    #[must_use]
    pub fn contains(&self, d: NodeDescriptor) -> bool {
        self.entries
            .get(d.index())
            .is_some_and(|e| e.live && e.generation == d.generation)
    }

    /// Current position of the node, or `None` for a stale descriptor.
    #[must_use]
    pub fn position(&self, d: NodeDescriptor) -> Option<usize> {
        let entry = self.entries.get(d.index())?;
        if entry.live && entry.generation == d.generation && entry.position != UNSET {
            Some(entry.position)
        } else {
            None
        }
    }

    /// Repoint a descriptor after its node moved. Addressed by table index
    /// because that is what the storage keeps in each node's linkage.
    pub fn set_position(&mut self, table_index: u32, position: usize) {
        self.entries[table_index as usize].position = position;
    }

    /// The live descriptor currently occupying a table index. Storage keeps
    /// only the index in each node; this restores the full handle.
    #[must_use]
    pub fn current_descriptor(&self, table_index: u32) -> NodeDescriptor {
        let entry = &self.entries[table_index as usize];
        debug_assert!(entry.live);
        NodeDescriptor {
            index: table_index,
            generation: entry.generation,
        }
    }

    /// Number of entries ever allocated; upper bound for descriptor indices.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
    }

    /// Swap the nodes two descriptors refer to, leaving both descriptors
    /// valid. Used by the graph-level move operation.
    pub fn swap_positions(&mut self, a: NodeDescriptor, b: NodeDescriptor) {
        debug_assert!(self.contains(a) && self.contains(b));
        let pa = self.entries[a.index()].position;
        let pb = self.entries[b.index()].position;
        self.entries[a.index()].position = pb;
        self.entries[b.index()].position = pa;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_descriptor_resolves_to_nothing() {
        let mut table = DescriptorTable::new();
        let d = table.allocate();
        table.set_position(d.index() as u32, 7);
        assert_eq!(table.position(d), Some(7));

        table.release(d);
        assert!(!table.contains(d));
        assert_eq!(table.position(d), None);

        // Reusing the entry does not resurrect the old descriptor.
        let d2 = table.allocate();
        table.set_position(d2.index() as u32, 3);
        assert_eq!(d2.index(), d.index());
        assert!(!table.contains(d));
        assert_eq!(table.position(d), None);
        assert_eq!(table.position(d2), Some(3));
    }

    #[test]
    fn positions_follow_moves() {
        let mut table = DescriptorTable::new();
        let d = table.allocate();
        table.set_position(d.index() as u32, 0);
        table.set_position(d.index() as u32, 42);
        assert_eq!(table.position(d), Some(42));
    }
}
