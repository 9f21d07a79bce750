//! Node arena and unique table.
//!
//! Every node of a [`Bdd`][crate::bdd::Bdd] lives in a single `Vec<Node>`,
//! addressed by [`Ref`]. A hash map from `(ordinal, one, zero)` to the node's
//! index guarantees that structurally identical nodes are allocated once
//! (hash consing). Nodes are never removed: the arena grows for the whole
//! lifetime of its manager.

use std::collections::HashMap;

use log::debug;

use crate::node::{Node, FALSE_ORDINAL, TRUE_ORDINAL};
use crate::reference::Ref;

pub struct Storage {
    nodes: Vec<Node>,
    unique: HashMap<Node, Ref>,
}

impl Storage {
    /// Create a storage with room for `capacity` nodes.
    ///
    /// The two Boolean leaves are allocated first, at indices 0 (`FALSE`) and 1 (`TRUE`).
    pub fn new(capacity: usize) -> Self {
        let mut storage = Self {
            nodes: Vec::with_capacity(capacity.max(2)),
            unique: HashMap::with_capacity(capacity.max(2)),
        };
        let f = storage.get_or_create(Node::leaf(FALSE_ORDINAL));
        let t = storage.get_or_create(Node::leaf(TRUE_ORDINAL));
        assert_eq!(f, Ref::FALSE);
        assert_eq!(t, Ref::TRUE);
        storage
    }

    /// Number of allocated nodes, including both Boolean leaves.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, r: Ref) -> Node {
        self.nodes[r.index()]
    }

    /// The node behind `r`, or `None` if `r` was not allocated here.
    pub fn get(&self, r: Ref) -> Option<Node> {
        self.nodes.get(r.index()).copied()
    }

    /// Return the canonical reference for `node`, allocating it on first use.
    ///
    /// This is the only place where nodes are created.
    pub fn get_or_create(&mut self, node: Node) -> Ref {
        if let Some(&r) = self.unique.get(&node) {
            return r;
        }
        let r = Ref::new(self.nodes.len() as u32);
        debug!(
            "new node {} = (ordinal = {}, one = {}, zero = {})",
            r, node.ordinal, node.one, node.zero
        );
        self.nodes.push(node);
        self.unique.insert(node, r);
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals_preallocated() {
        let storage = Storage::new(0);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.node(Ref::FALSE).ordinal, FALSE_ORDINAL);
        assert_eq!(storage.node(Ref::TRUE).ordinal, TRUE_ORDINAL);
        assert!(storage.node(Ref::FALSE).is_leaf());
        assert!(storage.node(Ref::TRUE).is_leaf());
    }

    #[test]
    fn test_hash_consing() {
        let mut storage = Storage::new(16);
        let a = storage.get_or_create(Node::new(0, Ref::TRUE, Ref::FALSE));
        let b = storage.get_or_create(Node::new(0, Ref::TRUE, Ref::FALSE));
        assert_eq!(a, b);
        assert_eq!(storage.len(), 3);

        let c = storage.get_or_create(Node::new(0, Ref::FALSE, Ref::TRUE));
        assert_ne!(a, c);
        assert_eq!(storage.len(), 4);
    }

    #[test]
    fn test_get_checks_bounds() {
        let mut storage = Storage::new(16);
        let node = Node::new(2, Ref::TRUE, Ref::FALSE);
        let r = storage.get_or_create(node);
        assert_eq!(storage.get(r), Some(node));
        assert_eq!(storage.get(Ref::new(r.index() as u32 + 1)), None);
        assert_eq!(storage.get(Ref::NONE), None);
    }
}
