//! Operation cache (computed table) for Boolean operations.
//!
//! Keys are normalized so that commutative operations hit the same entry
//! regardless of operand order. The cache is read through `&self` under a
//! shared lock, so hit/miss counters are atomic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::reference::Ref;
use crate::terminal::BoolOp;

/// Key of a cached Boolean operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OpKey {
    op: BoolOp,
    left: Ref,
    right: Ref,
}

impl OpKey {
    /// Key for a binary commutative operation: `(a, b)` and `(b, a)` map to the same key.
    pub fn binary(op: BoolOp, a: Ref, b: Ref) -> Self {
        debug_assert_ne!(op, BoolOp::Not);
        let (left, right) = if a <= b { (a, b) } else { (b, a) };
        Self { op, left, right }
    }

    /// Key for complementation.
    pub fn not(a: Ref) -> Self {
        Self {
            op: BoolOp::Not,
            left: a,
            right: Ref::NONE,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

pub struct OpCache {
    map: HashMap<OpKey, Ref>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl OpCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits(),
            misses: self.misses(),
        }
    }

    /// Look up a key, counting the hit or miss.
    #[inline]
    pub fn get(&self, key: &OpKey) -> Option<Ref> {
        match self.map.get(key) {
            Some(&r) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(r)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Look up a key without touching the counters.
    pub fn peek(&self, key: &OpKey) -> Option<Ref> {
        self.map.get(key).copied()
    }

    #[inline]
    pub fn insert(&mut self, key: OpKey, value: Ref) {
        self.map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        let a = Ref::new(7);
        let b = Ref::new(3);
        assert_eq!(OpKey::binary(BoolOp::And, a, b), OpKey::binary(BoolOp::And, b, a));
        assert_ne!(OpKey::binary(BoolOp::And, a, b), OpKey::binary(BoolOp::Or, a, b));
        assert_ne!(OpKey::not(a), OpKey::binary(BoolOp::Xor, a, Ref::NONE));
    }

    #[test]
    fn test_counters() {
        let mut cache = OpCache::with_capacity(4);
        let key = OpKey::binary(BoolOp::Or, Ref::new(2), Ref::new(3));

        assert_eq!(cache.get(&key), None);
        cache.insert(key, Ref::new(4));
        assert_eq!(cache.get(&key), Some(Ref::new(4)));
        assert_eq!(cache.peek(&key), Some(Ref::new(4)));

        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
    }
}
