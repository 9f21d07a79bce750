//! Set expressions built with operators, and point evaluation.
//!
//! `bdd.eval(a & !b | c)` computes the same set as the corresponding chain of
//! `apply_*` calls; the operators only build an [`Expr`] tree.

use std::collections::{HashMap, HashSet};
use std::ops::{BitAnd, BitOr, BitXor, Not};

use log::debug;

use crate::bdd::{Bdd, State};
use crate::error::Result;
use crate::reference::Ref;
use crate::terminal::BoolOp;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr {
    Set(Ref),
    Not(Box<Expr>),
    Apply(BoolOp, Box<Expr>, Box<Expr>),
}

impl From<Ref> for Expr {
    fn from(r: Ref) -> Self {
        Expr::Set(r)
    }
}

macro_rules! impl_binary {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Expr>> $trait<R> for Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::Apply($op, Box::new(self), Box::new(rhs.into()))
            }
        }

        impl<R: Into<Expr>> $trait<R> for Ref {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::from(self).$method(rhs)
            }
        }
    };
}

impl_binary!(BitAnd, bitand, BoolOp::And);
impl_binary!(BitOr, bitor, BoolOp::Or);
impl_binary!(BitXor, bitxor, BoolOp::Xor);

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl Not for Ref {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(Expr::Set(self)))
    }
}

pub trait Eval {
    fn eval(&self, bdd: &Bdd) -> Result<Ref>;
}

impl Eval for Ref {
    fn eval(&self, _bdd: &Bdd) -> Result<Ref> {
        Ok(*self)
    }
}

impl Eval for Expr {
    fn eval(&self, bdd: &Bdd) -> Result<Ref> {
        match self {
            Expr::Set(r) => Ok(*r),
            Expr::Not(e) => bdd.apply_not(e.eval(bdd)?),
            Expr::Apply(op, l, r) => {
                let l = l.eval(bdd)?;
                let r = r.eval(bdd)?;
                match op {
                    BoolOp::And => bdd.apply_and(l, r),
                    BoolOp::Or => bdd.apply_or(l, r),
                    BoolOp::Xor => bdd.apply_xor(l, r),
                    BoolOp::Not => bdd.apply_not(l),
                }
            }
        }
    }
}

impl Bdd {
    pub fn eval(&self, value: impl Eval) -> Result<Ref> {
        value.eval(self)
    }

    /// Follow the bits of `value` from the root and return the leaf reached.
    ///
    /// Bits above 63 read as 0.
    pub fn find(&self, set: Ref, value: u64) -> Ref {
        let state = self.read();
        let mut current = set;
        loop {
            let node = state.storage.node(current);
            if node.is_leaf() {
                return current;
            }
            let bit = node.ordinal < 64 && (value >> node.ordinal) & 1 == 1;
            current = if bit { node.one } else { node.zero };
        }
    }

    pub fn contains(&self, set: Ref, value: u64) -> bool {
        self.find(set, value).is_true()
    }

    /// Replace the `⊤` leaf by a multi-terminal leaf with the given tag.
    pub fn replace_true(&self, set: Ref, tag: i32) -> Result<Ref> {
        debug!("replace_true(set = {}, tag = {})", set, tag);
        let mut state = self.write();
        let leaf = state.leaf(tag)?;
        Ok(state.replace_true_rec(&mut HashMap::new(), set, leaf))
    }

    /// Returns true if every leaf reachable from `set` is `⊤` or `⊥`.
    pub fn is_essentially_boolean(&self, set: Ref) -> bool {
        let state = self.read();
        let mut visited = HashSet::new();
        let mut stack = vec![set];
        while let Some(r) = stack.pop() {
            if r.is_constant() || !visited.insert(r) {
                continue;
            }
            let node = state.storage.node(r);
            if node.is_leaf() {
                return false;
            }
            stack.push(node.one);
            stack.push(node.zero);
        }
        true
    }
}

impl State {
    fn replace_true_rec(&mut self, memo: &mut HashMap<Ref, Ref>, set: Ref, leaf: Ref) -> Ref {
        if set.is_true() {
            return leaf;
        }
        let node = self.storage.node(set);
        if node.is_leaf() {
            return set;
        }
        if let Some(&res) = memo.get(&set) {
            return res;
        }
        let one = self.replace_true_rec(memo, node.one, leaf);
        let zero = self.replace_true_rec(memo, node.zero, leaf);
        let res = self.mk(node.ordinal, one, zero);
        memo.insert(set, res);
        res
    }
}
