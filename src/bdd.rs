//! The BDD algebra manager.
//!
//! A [`Bdd`] owns a hash-consed node arena and an operation cache, both guarded by
//! one reader-writer lock. It can be shared between threads (`&Bdd` is `Sync`):
//!
//! - identity and absorbing cases (`x ∨ ⊥`, `x ∧ ⊥`, `x ∨ x`, ...) are answered without locking;
//! - cache hits only take the shared lock;
//! - a miss passes an *upgrade gate* (at most one would-be writer at a time), re-checks the
//!   cache under the shared lock, and only then takes the exclusive lock to build the result.
//!
//! The gate plays the role of an upgradeable read lock: readers are never blocked by it,
//! and since every writer of the operation cache goes through it, the re-check guarantees
//! that each key is computed by exactly one thread.
//!
//! # Variable order
//!
//! Bits are numbered from 0 (least significant). A node tests bit `ordinal`, and the root
//! tests the *highest* bit: every internal child has a strictly smaller ordinal than its
//! parent. The two Boolean leaves use negative ordinals, while multi-terminal leaves carry
//! a non-negative tag (see [`TerminalPolicy`]).

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

use crate::cache::{CacheStats, OpCache, OpKey};
use crate::error::{BddError, Result};
use crate::node::Node;
use crate::reference::Ref;
use crate::storage::Storage;
use crate::terminal::{BoolOp, BooleanOnly, TerminalPolicy};

/// Configuration of a [`Bdd`] manager.
#[derive(Clone)]
pub struct BddConfig {
    /// Initial capacity of the node arena.
    pub initial_nodes: usize,
    /// Initial capacity of the operation cache.
    pub cache_capacity: usize,
    policy: Arc<dyn TerminalPolicy>,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            initial_nodes: 1 << 12,
            cache_capacity: 1 << 12,
            policy: Arc::new(BooleanOnly),
        }
    }
}

impl Debug for BddConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BddConfig")
            .field("initial_nodes", &self.initial_nodes)
            .field("cache_capacity", &self.cache_capacity)
            .finish_non_exhaustive()
    }
}

impl BddConfig {
    pub fn with_initial_nodes(mut self, initial_nodes: usize) -> Self {
        self.initial_nodes = initial_nodes;
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    /// Set the strategy used to combine multi-terminal leaves.
    pub fn with_terminal_policy<P>(mut self, policy: P) -> Self
    where
        P: TerminalPolicy + 'static,
    {
        self.policy = Arc::new(policy);
        self
    }
}

/// Mutable part of the manager, only touched under the lock.
pub(crate) struct State {
    pub(crate) storage: Storage,
    pub(crate) cache: OpCache,
}

pub struct Bdd {
    state: RwLock<State>,
    upgrade: Mutex<()>,
    policy: Arc<dyn TerminalPolicy>,
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::with_config(BddConfig::default())
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Bdd")
            .field("nodes", &state.storage.len())
            .field("cache", &state.cache.stats())
            .finish()
    }
}

impl Bdd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BddConfig) -> Self {
        debug!("Bdd::with_config({:?})", config);
        Self {
            state: RwLock::new(State {
                storage: Storage::new(config.initial_nodes),
                cache: OpCache::with_capacity(config.cache_capacity),
            }),
            upgrade: Mutex::new(()),
            policy: config.policy,
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, State> {
        // Results are published only after they are complete, so a poisoned lock still
        // guards a consistent state.
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of nodes in the arena, including both Boolean leaves.
    pub fn num_nodes(&self) -> usize {
        self.read().storage.len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.read().cache.stats()
    }

    /// Look up a cached operation result without computing it.
    ///
    /// For `BoolOp::Not`, `b` is ignored.
    pub fn cached(&self, op: BoolOp, a: Ref, b: Ref) -> Option<Ref> {
        let key = match op {
            BoolOp::Not => OpKey::not(a),
            _ => OpKey::binary(op, a, b),
        };
        self.read().cache.peek(&key)
    }

    pub fn node(&self, f: Ref) -> Node {
        self.read().storage.node(f)
    }

    pub fn ordinal(&self, f: Ref) -> i32 {
        self.node(f).ordinal
    }

    /// Returns true for both Boolean constants and for multi-terminal leaves.
    pub fn is_leaf(&self, f: Ref) -> bool {
        f.is_constant() || self.node(f).is_leaf()
    }

    pub fn is_satisfiable(&self, f: Ref) -> bool {
        !f.is_false()
    }

    /// Get or create the node `(ordinal, one, zero)`.
    ///
    /// If `one == zero` the node is redundant and the shared child is returned.
    /// The ordinal must be non-negative and greater than the ordinal of any internal child.
    pub fn mk_node(&self, ordinal: i32, one: Ref, zero: Ref) -> Result<Ref> {
        debug!("mk_node(ordinal = {}, one = {}, zero = {})", ordinal, one, zero);
        if ordinal < 0 {
            return Err(BddError::invalid("ordinal", format!("must be non-negative, got {}", ordinal)));
        }
        if one.is_none() || zero.is_none() {
            return Err(BddError::invalid("one/zero", "internal nodes need two children"));
        }
        let mut state = self.write();
        for child in [one, zero] {
            let node = state.storage.get(child).ok_or_else(|| {
                BddError::invalid("one/zero", format!("{} is not a node of this manager", child))
            })?;
            if !node.is_leaf() && node.ordinal >= ordinal {
                return Err(BddError::invalid(
                    "ordinal",
                    format!("child {} tests bit {}, not below {}", child, node.ordinal, ordinal),
                ));
            }
        }
        Ok(state.mk(ordinal, one, zero))
    }

    /// Node testing only bit `bit`: the set of all values with that bit set.
    pub fn mk_bit(&self, bit: i32) -> Result<Ref> {
        self.mk_node(bit, Ref::TRUE, Ref::FALSE)
    }

    /// Get or create a multi-terminal leaf carrying `tag`.
    pub fn mk_leaf(&self, tag: i32) -> Result<Ref> {
        self.write().leaf(tag)
    }

    pub fn apply_or(&self, a: Ref, b: Ref) -> Result<Ref> {
        debug!("apply_or(a = {}, b = {})", a, b);
        if let Some(res) = shortcut(BoolOp::Or, a, b) {
            return Ok(res);
        }
        self.apply(BoolOp::Or, a, b)
    }

    pub fn apply_and(&self, a: Ref, b: Ref) -> Result<Ref> {
        debug!("apply_and(a = {}, b = {})", a, b);
        if let Some(res) = shortcut(BoolOp::And, a, b) {
            return Ok(res);
        }
        self.apply(BoolOp::And, a, b)
    }

    pub fn apply_xor(&self, a: Ref, b: Ref) -> Result<Ref> {
        debug!("apply_xor(a = {}, b = {})", a, b);
        if a.is_true() {
            return self.apply_not(b);
        }
        if b.is_true() {
            return self.apply_not(a);
        }
        if let Some(res) = shortcut(BoolOp::Xor, a, b) {
            return Ok(res);
        }
        self.apply(BoolOp::Xor, a, b)
    }

    pub fn apply_not(&self, a: Ref) -> Result<Ref> {
        debug!("apply_not(a = {})", a);
        if a.is_false() {
            return Ok(Ref::TRUE);
        }
        if a.is_true() {
            return Ok(Ref::FALSE);
        }
        self.apply(BoolOp::Not, a, Ref::NONE)
    }

    pub fn apply_and_many(&self, sets: impl IntoIterator<Item = Ref>) -> Result<Ref> {
        debug!("apply_and_many(...)");
        let mut res = Ref::TRUE;
        for set in sets {
            res = self.apply_and(res, set)?;
        }
        Ok(res)
    }

    pub fn apply_or_many(&self, sets: impl IntoIterator<Item = Ref>) -> Result<Ref> {
        debug!("apply_or_many(...)");
        let mut res = Ref::FALSE;
        for set in sets {
            res = self.apply_or(res, set)?;
        }
        Ok(res)
    }

    /// Returns true if `a` and `b` denote the same set, i.e. `a ⊕ b = ⊥`.
    pub fn are_equivalent(&self, a: Ref, b: Ref) -> Result<bool> {
        Ok(self.apply_xor(a, b)?.is_false())
    }

    /// Non-constant nodes reachable from `f`, children before parents.
    pub fn descendants(&self, f: Ref) -> Vec<(Ref, Node)> {
        let state = self.read();
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(f, false)];
        while let Some((r, expanded)) = stack.pop() {
            if r.is_constant() {
                continue;
            }
            let node = state.storage.node(r);
            if expanded {
                order.push((r, node));
                continue;
            }
            if !visited.insert(r) {
                continue;
            }
            stack.push((r, true));
            if !node.is_leaf() {
                stack.push((node.zero, false));
                stack.push((node.one, false));
            }
        }
        order
    }

    /// Copy the set `f` of another manager into this one.
    pub fn import(&self, source: &Bdd, f: Ref) -> Result<Ref> {
        let nodes = source.descendants(f);
        debug!("import(f = {}): {} nodes", f, nodes.len());

        let mut state = self.write();
        let mut map = HashMap::with_capacity(nodes.len() + 2);
        map.insert(Ref::FALSE, Ref::FALSE);
        map.insert(Ref::TRUE, Ref::TRUE);
        for (r, node) in nodes {
            let res = if node.is_leaf() {
                state.leaf(node.ordinal)?
            } else {
                state.mk(node.ordinal, map[&node.one], map[&node.zero])
            };
            map.insert(r, res);
        }
        Ok(map[&f])
    }

    /// Cached, thread-safe entry point shared by all Boolean operations.
    fn apply(&self, op: BoolOp, a: Ref, b: Ref) -> Result<Ref> {
        let key = match op {
            BoolOp::Not => OpKey::not(a),
            _ => OpKey::binary(op, a, b),
        };

        let hit = self.read().cache.get(&key);
        if let Some(res) = hit {
            trace!("cache: {:?}({}, {}) -> {}", op, a, b, res);
            return Ok(res);
        }

        let _gate = self.upgrade.lock().unwrap_or_else(PoisonError::into_inner);
        let hit = self.read().cache.peek(&key);
        if let Some(res) = hit {
            trace!("cache (after gate): {:?}({}, {}) -> {}", op, a, b, res);
            return Ok(res);
        }

        let mut state = self.write();
        let res = match op {
            BoolOp::Not => state.not_node(&*self.policy, key, a)?,
            _ => state.apply_node(&*self.policy, key, op, a, b)?,
        };
        debug!("computed: {:?}({}, {}) -> {}", op, a, b, res);
        Ok(res)
    }
}

/// Identity, absorbing and idempotence cases of binary operations.
fn shortcut(op: BoolOp, a: Ref, b: Ref) -> Option<Ref> {
    match op {
        BoolOp::Or => {
            if a.is_false() {
                Some(b)
            } else if b.is_false() {
                Some(a)
            } else if a.is_true() || b.is_true() {
                Some(Ref::TRUE)
            } else if a == b {
                Some(a)
            } else {
                None
            }
        }
        BoolOp::And => {
            if a.is_true() {
                Some(b)
            } else if b.is_true() {
                Some(a)
            } else if a.is_false() || b.is_false() {
                Some(Ref::FALSE)
            } else if a == b {
                Some(a)
            } else {
                None
            }
        }
        BoolOp::Xor => {
            if a.is_false() {
                Some(b)
            } else if b.is_false() {
                Some(a)
            } else if a == b {
                Some(Ref::FALSE)
            } else {
                None
            }
        }
        BoolOp::Not => None,
    }
}

impl State {
    /// Reduced node creation: a node whose children coincide collapses into that child.
    pub(crate) fn mk(&mut self, ordinal: i32, one: Ref, zero: Ref) -> Ref {
        if one == zero {
            return one;
        }
        self.storage.get_or_create(Node::new(ordinal, one, zero))
    }

    pub(crate) fn leaf(&mut self, tag: i32) -> Result<Ref> {
        if tag < 0 {
            return Err(BddError::invalid("tag", format!("leaf tags must be non-negative, got {}", tag)));
        }
        Ok(self.storage.get_or_create(Node::leaf(tag)))
    }

    /// Shannon expansion of a binary operation. Must run under the write lock.
    ///
    /// Results are inserted into the cache only once fully built, so an error
    /// leaves no entry for the failing key.
    fn apply_rec(&mut self, policy: &dyn TerminalPolicy, op: BoolOp, a: Ref, b: Ref) -> Result<Ref> {
        if op == BoolOp::Xor {
            if a.is_true() {
                return self.not_rec(policy, b);
            }
            if b.is_true() {
                return self.not_rec(policy, a);
            }
        }
        if let Some(res) = shortcut(op, a, b) {
            return Ok(res);
        }

        let key = OpKey::binary(op, a, b);
        if let Some(res) = self.cache.get(&key) {
            return Ok(res);
        }
        self.apply_node(policy, key, op, a, b)
    }

    /// Expand one node pair whose `key` has already missed the cache.
    fn apply_node(&mut self, policy: &dyn TerminalPolicy, key: OpKey, op: BoolOp, a: Ref, b: Ref) -> Result<Ref> {
        let na = self.storage.node(a);
        let nb = self.storage.node(b);
        let res = if na.is_leaf() && nb.is_leaf() {
            let tag = policy.combine(op, na.ordinal, nb.ordinal)?;
            self.leaf(tag)?
        } else if na.is_leaf() || (!nb.is_leaf() && nb.ordinal > na.ordinal) {
            let t = self.apply_rec(policy, op, a, nb.one)?;
            let f = self.apply_rec(policy, op, a, nb.zero)?;
            self.mk(nb.ordinal, t, f)
        } else if nb.is_leaf() || na.ordinal > nb.ordinal {
            let t = self.apply_rec(policy, op, na.one, b)?;
            let f = self.apply_rec(policy, op, na.zero, b)?;
            self.mk(na.ordinal, t, f)
        } else {
            let t = self.apply_rec(policy, op, na.one, nb.one)?;
            let f = self.apply_rec(policy, op, na.zero, nb.zero)?;
            self.mk(na.ordinal, t, f)
        };

        self.cache.insert(key, res);
        Ok(res)
    }

    fn not_rec(&mut self, policy: &dyn TerminalPolicy, a: Ref) -> Result<Ref> {
        if a.is_false() {
            return Ok(Ref::TRUE);
        }
        if a.is_true() {
            return Ok(Ref::FALSE);
        }

        let key = OpKey::not(a);
        if let Some(res) = self.cache.get(&key) {
            return Ok(res);
        }
        self.not_node(policy, key, a)
    }

    fn not_node(&mut self, policy: &dyn TerminalPolicy, key: OpKey, a: Ref) -> Result<Ref> {
        let na = self.storage.node(a);
        let res = if na.is_leaf() {
            let tag = policy.combine(BoolOp::Not, na.ordinal, 0)?;
            self.leaf(tag)?
        } else {
            let t = self.not_rec(policy, na.one)?;
            let f = self.not_rec(policy, na.zero)?;
            self.mk(na.ordinal, t, f)
        };

        self.cache.insert(key, res);
        Ok(res)
    }
}
