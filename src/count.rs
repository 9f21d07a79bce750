use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::{Bdd, State};
use crate::error::{BddError, Result};
use crate::range::{check_max_bit, MAX_BIT};
use crate::reference::Ref;

impl Bdd {
    /// Number of values over bits `0..=max_bit` in the set.
    ///
    /// Bits not tested between a node and its child are free and double the count.
    pub fn domain_size(&self, set: Ref, max_bit: i32) -> Result<BigUint> {
        check_max_bit(max_bit)?;

        let state = self.read();
        let root = state.storage.node(set);
        if !root.is_leaf() && max_bit < root.ordinal {
            return Err(BddError::invalid(
                "max_bit",
                format!("set tests bit {}, above {}", root.ordinal, max_bit),
            ));
        }

        if set.is_false() {
            return Ok(BigUint::ZERO);
        }
        if set.is_true() {
            return Ok(BigUint::from(1u8) << (max_bit + 1) as u32);
        }
        if root.is_leaf() {
            return Err(BddError::Unsupported { op: "domain_size of a multi-terminal leaf" });
        }

        let count = state.count_rec(&mut HashMap::new(), set)?;
        Ok(count << (max_bit - root.ordinal) as u32)
    }

    /// Smallest value in a non-empty set, reading free bits as 0.
    pub fn get_min(&self, set: Ref) -> Result<u64> {
        if set.is_false() {
            return Err(BddError::EmptySet);
        }

        let state = self.read();
        let root = state.storage.node(set);
        if !root.is_leaf() && root.ordinal > MAX_BIT {
            return Err(BddError::invalid(
                "set",
                format!("tests bit {}, above {}", root.ordinal, MAX_BIT),
            ));
        }

        let mut res = 0u64;
        let mut current = set;
        while !current.is_true() {
            let node = state.storage.node(current);
            if node.is_leaf() {
                return Err(BddError::Unsupported { op: "get_min on a multi-terminal set" });
            }
            if node.zero.is_false() {
                res |= 1u64 << node.ordinal;
                current = node.one;
            } else {
                current = node.zero;
            }
        }
        Ok(res)
    }

    /// Returns true if the set holds exactly one value over bits `0..=max_bit`.
    pub fn is_singleton(&self, set: Ref, max_bit: i32) -> Result<bool> {
        Ok(self.domain_size(set, max_bit)? == BigUint::from(1u32))
    }
}

impl State {
    /// Number of values over bits `0..=ordinal` of an internal node.
    fn count_rec(&self, memo: &mut HashMap<Ref, BigUint>, set: Ref) -> Result<BigUint> {
        if let Some(count) = memo.get(&set) {
            return Ok(count.clone());
        }

        let node = self.storage.node(set);
        let count = self.child_count(memo, node.ordinal, node.zero)? + self.child_count(memo, node.ordinal, node.one)?;

        memo.insert(set, count.clone());
        Ok(count)
    }

    /// Contribution of one child of a node at `ordinal`, over bits `0..ordinal`.
    fn child_count(&self, memo: &mut HashMap<Ref, BigUint>, ordinal: i32, child: Ref) -> Result<BigUint> {
        if child.is_false() {
            return Ok(BigUint::ZERO);
        }
        if child.is_true() {
            return Ok(BigUint::from(1u8) << ordinal as u32);
        }
        let node = self.storage.node(child);
        if node.is_leaf() {
            return Err(BddError::Unsupported { op: "domain_size of a multi-terminal set" });
        }
        let count = self.count_rec(memo, child)?;
        Ok(count << (ordinal - 1 - node.ordinal) as u32)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_domain_size_constants() {
        let bdd = Bdd::default();

        assert_eq!(bdd.domain_size(Ref::FALSE, 7).unwrap(), BigUint::ZERO);
        assert_eq!(bdd.domain_size(Ref::TRUE, 7).unwrap(), BigUint::from(256u32));
        assert_eq!(bdd.domain_size(Ref::TRUE, 63).unwrap(), BigUint::from(1u8) << 64u32);
    }

    #[test]
    fn test_domain_size_skipped_bits() {
        let bdd = Bdd::default();

        // bit 5 set, everything else free
        let x5 = bdd.mk_bit(5).unwrap();
        assert_eq!(bdd.domain_size(x5, 5).unwrap(), BigUint::from(32u32));
        assert_eq!(bdd.domain_size(x5, 7).unwrap(), BigUint::from(128u32));

        // bit 5 set and bit 1 clear: the child skips bits 4..2
        let x1 = bdd.mk_bit(1).unwrap();
        let f = bdd.apply_and(x5, bdd.apply_not(x1).unwrap()).unwrap();
        assert_eq!(bdd.domain_size(f, 5).unwrap(), BigUint::from(16u32));
    }

    #[test]
    fn test_domain_size_of_range() {
        let bdd = Bdd::default();

        for (m, n) in [(0, 0), (3, 9), (17, 200), (0, 254), (128, 255)] {
            let r = bdd.mk_range(m, n, 7).unwrap();
            assert_eq!(bdd.domain_size(r, 7).unwrap(), BigUint::from(n - m + 1));
        }
    }

    #[test]
    fn test_domain_size_invalid() {
        let bdd = Bdd::default();

        let x5 = bdd.mk_bit(5).unwrap();
        assert!(matches!(
            bdd.domain_size(x5, 4),
            Err(BddError::InvalidArgument { name: "max_bit", .. })
        ));
        assert!(matches!(
            bdd.domain_size(x5, 64),
            Err(BddError::InvalidArgument { name: "max_bit", .. })
        ));

        let t = bdd.mk_leaf(3).unwrap();
        assert!(matches!(bdd.domain_size(t, 4), Err(BddError::Unsupported { .. })));
        let g = bdd.mk_node(2, t, Ref::FALSE).unwrap();
        assert!(matches!(bdd.domain_size(g, 4), Err(BddError::Unsupported { .. })));
    }

    #[test]
    fn test_get_min() {
        let bdd = Bdd::default();

        assert_eq!(bdd.get_min(Ref::TRUE).unwrap(), 0);
        assert_eq!(bdd.get_min(bdd.mk_range(37, 90, 7).unwrap()).unwrap(), 37);
        assert_eq!(bdd.get_min(bdd.mk_value(255, 7).unwrap()).unwrap(), 255);
        assert_eq!(bdd.get_min(bdd.mk_bit(4).unwrap()).unwrap(), 16);

        let top = bdd.mk_value(1 << 63, 63).unwrap();
        assert_eq!(bdd.get_min(top).unwrap(), 1 << 63);
    }

    #[test]
    fn test_get_min_empty() {
        let bdd = Bdd::default();
        assert_eq!(bdd.get_min(Ref::FALSE), Err(BddError::EmptySet));
    }

    #[test]
    fn test_get_min_beyond_u64() {
        let bdd = Bdd::default();
        let x = bdd.mk_bit(64).unwrap();
        assert!(matches!(bdd.get_min(x), Err(BddError::InvalidArgument { .. })));
    }

    #[test]
    fn test_is_singleton() {
        let bdd = Bdd::default();

        let five = bdd.mk_value(5, 7).unwrap();
        assert!(bdd.is_singleton(five, 7).unwrap());
        // bit 8 is free
        assert!(!bdd.is_singleton(five, 8).unwrap());
        assert!(!bdd.is_singleton(bdd.mk_range(5, 6, 7).unwrap(), 7).unwrap());
        assert!(!bdd.is_singleton(Ref::FALSE, 7).unwrap());
        assert!(!bdd.is_singleton(Ref::TRUE, 0).unwrap());
    }
}
