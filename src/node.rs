use crate::reference::Ref;

/// Ordinal of the `FALSE` leaf.
pub const FALSE_ORDINAL: i32 = -1;

/// Ordinal of the `TRUE` leaf.
pub const TRUE_ORDINAL: i32 = -2;

/// A BDD node as stored in the arena.
///
/// Internal nodes test bit `ordinal` and have two real children; leaves have
/// both children set to [`Ref::NONE`]. The two Boolean leaves use the negative
/// ordinals [`FALSE_ORDINAL`] and [`TRUE_ORDINAL`], while multi-terminal leaves
/// carry a non-negative tag in `ordinal`.
///
/// # Invariants
///
/// - `one != zero` for internal nodes (reduced form)
/// - an internal node's ordinal is strictly greater than the ordinal of any internal child
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub ordinal: i32,
    pub one: Ref,
    pub zero: Ref,
}

impl Node {
    pub const fn new(ordinal: i32, one: Ref, zero: Ref) -> Self {
        Self { ordinal, one, zero }
    }

    pub const fn leaf(ordinal: i32) -> Self {
        Self {
            ordinal,
            one: Ref::NONE,
            zero: Ref::NONE,
        }
    }

    pub const fn is_leaf(&self) -> bool {
        self.one.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf() {
        let leaf = Node::leaf(3);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.ordinal, 3);
        assert!(!Node::new(3, Ref::TRUE, Ref::FALSE).is_leaf());
    }

    #[test]
    fn test_leaf_differs_from_internal() {
        // A tag-3 leaf and an internal node at ordinal 3 are distinct keys.
        assert_ne!(Node::leaf(3), Node::new(3, Ref::TRUE, Ref::FALSE));
    }
}
