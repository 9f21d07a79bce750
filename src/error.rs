//! Errors reported by the BDD and bit-vector algebras.

use crate::terminal::BoolOp;

/// Error type for algebra operations.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BddError {
    /// An argument was rejected before any work was done.
    InvalidArgument {
        name: &'static str,
        reason: String,
    },
    /// The configured terminal policy cannot combine multi-terminal leaves under `op`,
    /// or a Boolean-only query reached a multi-terminal leaf.
    Unsupported { op: &'static str },
    /// Two distinct classification tags met under a Boolean combination.
    ConflictingTerminals { op: BoolOp, left: i32, right: i32 },
    /// The query requires a non-empty set.
    EmptySet,
}

impl BddError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        BddError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for BddError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BddError::InvalidArgument { name, reason } => {
                write!(f, "invalid argument `{}`: {}", name, reason)
            }
            BddError::Unsupported { op } => write!(f, "not supported: {}", op),
            BddError::ConflictingTerminals { op, left, right } => {
                write!(f, "conflicting terminals {} and {} under {:?}", left, right, op)
            }
            BddError::EmptySet => write!(f, "set is empty"),
        }
    }
}

impl std::error::Error for BddError {}

pub type Result<T> = std::result::Result<T, BddError>;
