use std::fmt::{Display, Formatter};

/// A reference to a canonical BDD node.
///
/// A `Ref` is an index into the node arena of the [`Bdd`][crate::bdd::Bdd] that created it.
/// Since nodes are hash-consed, two `Ref`s from the same manager are equal
/// if and only if they denote structurally identical nodes.
///
/// # Reserved Values
///
/// - `Ref::FALSE`: the empty set (index 0)
/// - `Ref::TRUE`: the full set (index 1)
/// - `Ref::NONE`: the absent child of a leaf; never returned by any operation
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Ref(u32);

impl Ref {
    /// The empty set.
    pub const FALSE: Ref = Ref(0);

    /// The full set.
    pub const TRUE: Ref = Ref(1);

    /// Sentinel for the missing children of a leaf.
    pub const NONE: Ref = Ref(u32::MAX);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index for arena access.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_false(self) -> bool {
        self.0 == Self::FALSE.0
    }

    pub const fn is_true(self) -> bool {
        self.0 == Self::TRUE.0
    }

    /// Returns true for the two Boolean constants.
    ///
    /// Multi-terminal leaves are *not* constants; use
    /// [`Bdd::is_leaf`][crate::bdd::Bdd::is_leaf] to detect any leaf.
    pub const fn is_constant(self) -> bool {
        self.0 <= 1
    }

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Ref::FALSE => write!(f, "⊥"),
            Ref::TRUE => write!(f, "⊤"),
            Ref::NONE => write!(f, "∅"),
            Ref(i) => write!(f, "@{}", i),
        }
    }
}
