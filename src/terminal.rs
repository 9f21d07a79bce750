//! Boolean operators and the multi-terminal extension point.
//!
//! When both operands of a Boolean operation are leaves that are not the
//! Boolean constants, the manager asks its [`TerminalPolicy`] what the
//! combined leaf should be. The returned tag becomes the ordinal of a new
//! (or existing) leaf.

use crate::error::{BddError, Result};

/// Boolean operations over BDDs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BoolOp {
    Or,
    And,
    Xor,
    Not,
}

impl BoolOp {
    pub(crate) fn name(self) -> &'static str {
        match self {
            BoolOp::Or => "CombineTerminals(Or)",
            BoolOp::And => "CombineTerminals(And)",
            BoolOp::Xor => "CombineTerminals(Xor)",
            BoolOp::Not => "CombineTerminals(Not)",
        }
    }
}

/// Strategy assigning meaning to non-Boolean leaves.
///
/// For `BoolOp::Not`, `right` is always 0. The returned tag must be
/// non-negative.
pub trait TerminalPolicy: Send + Sync {
    fn combine(&self, op: BoolOp, left: i32, right: i32) -> Result<i32>;
}

/// Plain Boolean algebra: every multi-terminal combination is rejected.
#[derive(Debug, Default, Copy, Clone)]
pub struct BooleanOnly;

impl TerminalPolicy for BooleanOnly {
    fn combine(&self, op: BoolOp, _left: i32, _right: i32) -> Result<i32> {
        Err(BddError::Unsupported { op: op.name() })
    }
}

/// Leaves are classification ids of disjoint blocks.
///
/// Combining a tag with itself under `And`/`Or` yields the tag. Two different
/// tags can only meet if the blocks overlap, which is reported as
/// [`BddError::ConflictingTerminals`]. `Not` and `Xor` have no meaning on
/// classification ids.
#[derive(Debug, Default, Copy, Clone)]
pub struct ClassTags;

impl TerminalPolicy for ClassTags {
    fn combine(&self, op: BoolOp, left: i32, right: i32) -> Result<i32> {
        match op {
            BoolOp::And | BoolOp::Or if left == right => Ok(left),
            BoolOp::And | BoolOp::Or => Err(BddError::ConflictingTerminals { op, left, right }),
            BoolOp::Xor | BoolOp::Not => Err(BddError::Unsupported { op: op.name() }),
        }
    }
}
