//! Interval sets and bit shifts.
//!
//! An element is an unsigned integer whose bit `i` is tested by nodes with
//! ordinal `i`. Bits above `max_bit` are left unconstrained by [`Bdd::mk_range`],
//! and ignored by [`Bdd::to_ranges`] and [`Bdd::elements`].

use std::collections::HashMap;

use log::debug;

use crate::bdd::{Bdd, State};
use crate::error::{BddError, Result};
use crate::reference::Ref;

/// Largest supported bit position.
pub const MAX_BIT: i32 = 63;

/// Mask of bits `0..=bit`. Empty for negative `bit`.
pub(crate) fn low_mask(bit: i32) -> u64 {
    if bit < 0 {
        0
    } else if bit >= 63 {
        u64::MAX
    } else {
        (1u64 << (bit + 1)) - 1
    }
}

pub(crate) fn check_max_bit(max_bit: i32) -> Result<()> {
    if (0..=MAX_BIT).contains(&max_bit) {
        Ok(())
    } else {
        Err(BddError::invalid(
            "max_bit",
            format!("must be in 0..={}, got {}", MAX_BIT, max_bit),
        ))
    }
}

impl Bdd {
    /// Set of all values `x` with `m <= x <= n`, looking only at bits `0..=max_bit`.
    ///
    /// Both bounds are truncated to `max_bit + 1` bits first; an empty interval gives `⊥`.
    pub fn mk_range(&self, m: u64, n: u64, max_bit: i32) -> Result<Ref> {
        debug!("mk_range(m = {}, n = {}, max_bit = {})", m, n, max_bit);
        check_max_bit(max_bit)?;
        let filter = low_mask(max_bit);
        let (m, n) = (m & filter, n & filter);
        if n < m {
            return Ok(Ref::FALSE);
        }
        let mut state = self.write();
        Ok(state.interval_rec(max_bit, m, n))
    }

    /// Set of all values whose bits `0..=max_bit` equal those of `n`.
    pub fn mk_value(&self, n: u64, max_bit: i32) -> Result<Ref> {
        self.mk_range(n, n, max_bit)
    }

    /// Shift every element `k` bits to the left. The `k` lowest bits become unconstrained.
    pub fn shift_left(&self, set: Ref, k: i32) -> Result<Ref> {
        debug!("shift_left(set = {}, k = {})", set, k);
        if k < 0 {
            return Err(BddError::invalid("k", format!("shift amount must be non-negative, got {}", k)));
        }
        self.shift(set, k)
    }

    /// Shift every element `k` bits to the right, dropping the `k` lowest bits.
    ///
    /// Dropping bits is existential: a value is in the result if some value with the
    /// same upper bits was in `set`.
    pub fn shift_right(&self, set: Ref, k: i32) -> Result<Ref> {
        debug!("shift_right(set = {}, k = {})", set, k);
        if k < 0 {
            return Err(BddError::invalid("k", format!("shift amount must be non-negative, got {}", k)));
        }
        self.shift(set, -k)
    }

    fn shift(&self, set: Ref, k: i32) -> Result<Ref> {
        if k == 0 || self.is_leaf(set) {
            return Ok(set);
        }
        let mut state = self.write();
        state.shift_rec(&mut HashMap::new(), set, k)
    }

    /// Disjoint, ascending, maximal ranges `[lo, hi]` covering the set restricted to bits `0..=max_bit`.
    ///
    /// A set leaving upper bits free repeats its pattern for every value of those bits,
    /// so the output can be exponential in `max_bit`; see [`Bdd::to_ranges_limited`].
    pub fn to_ranges(&self, set: Ref, max_bit: i32) -> Result<Vec<(u64, u64)>> {
        self.collect_ranges(set, max_bit, usize::MAX)
    }

    /// Like [`Bdd::to_ranges`], but gives up with `None` once there are more than `limit` ranges.
    pub fn to_ranges_limited(&self, set: Ref, max_bit: i32, limit: usize) -> Result<Option<Vec<(u64, u64)>>> {
        let ranges = self.collect_ranges(set, max_bit, limit)?;
        Ok((ranges.len() <= limit).then_some(ranges))
    }

    /// The first ranges of `set`, stopping after `limit + 1` of them.
    ///
    /// All but the last returned range are complete.
    pub(crate) fn collect_ranges(&self, set: Ref, max_bit: i32, limit: usize) -> Result<Vec<(u64, u64)>> {
        check_max_bit(max_bit)?;
        let state = self.read();
        state.check_root(set, max_bit)?;
        let mut ranges = Vec::new();
        state.ranges_rec(set, max_bit, 0, limit, &mut ranges)?;
        Ok(ranges)
    }

    /// Elements of the set over bits `0..=max_bit`, in ascending order.
    ///
    /// The iterator is lazy and double-ended: `.rev()` yields the elements in descending order.
    pub fn elements(&self, set: Ref, max_bit: i32) -> Result<Elements<'_>> {
        check_max_bit(max_bit)?;
        self.read().check_root(set, max_bit)?;
        if !self.is_essentially_boolean(set) {
            return Err(BddError::Unsupported { op: "elements of a multi-terminal set" });
        }
        Ok(Elements {
            bdd: self,
            set,
            max_bit,
            lo: 0,
            hi: low_mask(max_bit),
            done: set.is_false(),
        })
    }
}

/// Iterator over the elements of a set, created by [`Bdd::elements`].
///
/// Each step looks up the next element in the diagram, taking the shared lock.
pub struct Elements<'a> {
    bdd: &'a Bdd,
    set: Ref,
    max_bit: i32,
    lo: u64,
    hi: u64,
    done: bool,
}

impl Iterator for Elements<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.done {
            return None;
        }
        match self.bdd.read().ceil_rec(self.set, self.max_bit, self.lo) {
            Some(x) if x <= self.hi => {
                if x == self.hi {
                    self.done = true;
                } else {
                    self.lo = x + 1;
                }
                Some(x)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

impl DoubleEndedIterator for Elements<'_> {
    fn next_back(&mut self) -> Option<u64> {
        if self.done {
            return None;
        }
        match self.bdd.read().floor_rec(self.set, self.max_bit, self.hi) {
            Some(x) if x >= self.lo => {
                if x == self.lo {
                    self.done = true;
                } else {
                    self.hi = x - 1;
                }
                Some(x)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

impl State {
    /// Build `[m, n]` over bits `0..=bit`, assuming `m <= n <= low_mask(bit)`.
    fn interval_rec(&mut self, bit: i32, m: u64, n: u64) -> Ref {
        if bit == 0 {
            return if n == 0 {
                self.mk(0, Ref::FALSE, Ref::TRUE)
            } else if m == 1 {
                self.mk(0, Ref::TRUE, Ref::FALSE)
            } else {
                Ref::TRUE
            };
        }

        if m == 0 && n == low_mask(bit) {
            return Ref::TRUE;
        }

        let mask = 1u64 << bit;
        if n & mask == 0 {
            // upper half is empty
            let zero = self.interval_rec(bit - 1, m, n);
            self.mk(bit, Ref::FALSE, zero)
        } else if m & mask != 0 {
            // lower half is empty
            let one = self.interval_rec(bit - 1, m & !mask, n & !mask);
            self.mk(bit, one, Ref::FALSE)
        } else {
            let zero = self.interval_rec(bit - 1, m, mask - 1);
            let one = self.interval_rec(bit - 1, 0, n & !mask);
            self.mk(bit, one, zero)
        }
    }

    /// Move every node by `k` positions; nodes falling below bit 0 become `⊤`.
    fn shift_rec(&mut self, memo: &mut HashMap<Ref, Ref>, set: Ref, k: i32) -> Result<Ref> {
        let node = self.storage.node(set);
        if node.is_leaf() {
            return Ok(set);
        }

        let ordinal = node
            .ordinal
            .checked_add(k)
            .ok_or_else(|| BddError::invalid("k", format!("shifting bit {} by {} overflows", node.ordinal, k)))?;
        if ordinal < 0 {
            return Ok(Ref::TRUE);
        }

        if let Some(&res) = memo.get(&set) {
            return Ok(res);
        }

        let zero = self.shift_rec(memo, node.zero, k)?;
        let one = self.shift_rec(memo, node.one, k)?;
        let res = self.mk(ordinal, one, zero);
        memo.insert(set, res);
        Ok(res)
    }

    pub(crate) fn check_root(&self, set: Ref, max_bit: i32) -> Result<()> {
        let root = self.storage.node(set);
        if !root.is_leaf() && root.ordinal > max_bit {
            return Err(BddError::invalid(
                "max_bit",
                format!("set tests bit {}, above {}", root.ordinal, max_bit),
            ));
        }
        Ok(())
    }

    /// Enumerate ranges below `bit`, with the bits above `bit` fixed to `prefix`.
    fn ranges_rec(&self, set: Ref, bit: i32, prefix: u64, limit: usize, out: &mut Vec<(u64, u64)>) -> Result<()> {
        if set.is_false() || out.len() > limit {
            return Ok(());
        }
        if set.is_true() {
            push_range(out, prefix, prefix | low_mask(bit));
            return Ok(());
        }

        let node = self.storage.node(set);
        if node.is_leaf() {
            return Err(BddError::Unsupported { op: "to_ranges on a multi-terminal leaf" });
        }

        let high = 1u64 << bit;
        if node.ordinal < bit {
            // bit is not tested: both values
            self.ranges_rec(set, bit - 1, prefix, limit, out)?;
            self.ranges_rec(set, bit - 1, prefix | high, limit, out)
        } else {
            self.ranges_rec(node.zero, bit - 1, prefix, limit, out)?;
            self.ranges_rec(node.one, bit - 1, prefix | high, limit, out)
        }
    }

    /// Smallest element `>= value` over bits `0..=bit`. Multi-terminal leaves count as empty.
    fn ceil_rec(&self, set: Ref, bit: i32, value: u64) -> Option<u64> {
        if set.is_true() {
            return Some(value);
        }
        if set.is_false() || bit < 0 {
            return None;
        }
        let node = self.storage.node(set);
        if node.is_leaf() {
            return None;
        }

        let (one, zero) = if node.ordinal == bit { (node.one, node.zero) } else { (set, set) };
        let high = 1u64 << bit;
        let low = value & low_mask(bit - 1);
        if value & high == 0 {
            self.ceil_rec(zero, bit - 1, low)
                .or_else(|| self.ceil_rec(one, bit - 1, 0).map(|x| high | x))
        } else {
            self.ceil_rec(one, bit - 1, low).map(|x| high | x)
        }
    }

    /// Largest element `<= value` over bits `0..=bit`. Multi-terminal leaves count as empty.
    fn floor_rec(&self, set: Ref, bit: i32, value: u64) -> Option<u64> {
        if set.is_true() {
            return Some(value);
        }
        if set.is_false() || bit < 0 {
            return None;
        }
        let node = self.storage.node(set);
        if node.is_leaf() {
            return None;
        }

        let (one, zero) = if node.ordinal == bit { (node.one, node.zero) } else { (set, set) };
        let high = 1u64 << bit;
        let low = value & low_mask(bit - 1);
        if value & high != 0 {
            self.floor_rec(one, bit - 1, low)
                .map(|x| high | x)
                .or_else(|| self.floor_rec(zero, bit - 1, low_mask(bit - 1)))
        } else {
            self.floor_rec(zero, bit - 1, low)
        }
    }
}

fn push_range(out: &mut Vec<(u64, u64)>, lo: u64, hi: u64) {
    if let Some(last) = out.last_mut() {
        if last.1.checked_add(1) == Some(lo) {
            last.1 = hi;
            return;
        }
    }
    out.push((lo, hi));
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_low_mask() {
        assert_eq!(low_mask(-1), 0);
        assert_eq!(low_mask(0), 1);
        assert_eq!(low_mask(7), 0xFF);
        assert_eq!(low_mask(62), u64::MAX >> 1);
        assert_eq!(low_mask(63), u64::MAX);
    }

    #[test]
    fn test_range_single_values() {
        let bdd = Bdd::default();

        let zero = bdd.mk_value(0, 0).unwrap();
        assert_eq!(bdd.node(zero).ordinal, 0);
        assert_eq!(bdd.node(zero).one, Ref::FALSE);
        assert_eq!(bdd.node(zero).zero, Ref::TRUE);

        let one = bdd.mk_value(1, 0).unwrap();
        assert_eq!(bdd.apply_not(zero).unwrap(), one);
        assert_eq!(bdd.mk_range(0, 1, 0).unwrap(), Ref::TRUE);
    }

    #[test]
    fn test_range_empty_and_full() {
        let bdd = Bdd::default();

        assert_eq!(bdd.mk_range(5, 4, 7).unwrap(), Ref::FALSE);
        assert_eq!(bdd.mk_range(0, 255, 7).unwrap(), Ref::TRUE);
        assert_eq!(bdd.mk_range(0, u64::MAX, 63).unwrap(), Ref::TRUE);
    }

    #[test]
    fn test_range_truncates_bounds() {
        let bdd = Bdd::default();

        // 0x1_05 and 0x2_07 are 5 and 7 on 8 bits
        let a = bdd.mk_range(0x105, 0x207, 7).unwrap();
        let b = bdd.mk_range(5, 7, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_range_invalid_max_bit() {
        let bdd = Bdd::default();

        assert!(matches!(
            bdd.mk_range(0, 1, 64),
            Err(BddError::InvalidArgument { name: "max_bit", .. })
        ));
        assert!(matches!(
            bdd.mk_range(0, 1, -1),
            Err(BddError::InvalidArgument { name: "max_bit", .. })
        ));
    }

    #[test]
    fn test_to_ranges() {
        let bdd = Bdd::default();

        let a = bdd.mk_range(3, 9, 7).unwrap();
        let b = bdd.mk_range(20, 40, 7).unwrap();
        let c = bdd.mk_range(41, 50, 7).unwrap();
        let f = bdd.apply_or_many([a, b, c]).unwrap();
        assert_eq!(bdd.to_ranges(f, 7).unwrap(), vec![(3, 9), (20, 50)]);

        assert_eq!(bdd.to_ranges(Ref::FALSE, 7).unwrap(), vec![]);
        assert_eq!(bdd.to_ranges(Ref::TRUE, 3).unwrap(), vec![(0, 15)]);
        assert_eq!(bdd.to_ranges(Ref::TRUE, 63).unwrap(), vec![(0, u64::MAX)]);
    }

    #[test]
    fn test_to_ranges_free_upper_bits() {
        let bdd = Bdd::default();

        // Only bit 0 is tested: the odd numbers.
        let odd = bdd.mk_bit(0).unwrap();
        assert_eq!(bdd.to_ranges(odd, 2).unwrap(), vec![(1, 1), (3, 3), (5, 5), (7, 7)]);

        let small = bdd.mk_range(0, 3, 1).unwrap();
        assert_eq!(small, Ref::TRUE);
        let low = bdd.mk_range(2, 3, 1).unwrap();
        assert_eq!(bdd.to_ranges(low, 3).unwrap(), vec![(2, 3), (6, 7), (10, 11), (14, 15)]);
    }

    #[test]
    fn test_to_ranges_limited() {
        let bdd = Bdd::default();

        let odd = bdd.mk_bit(0).unwrap();
        assert_eq!(
            bdd.to_ranges_limited(odd, 2, 4).unwrap(),
            Some(vec![(1, 1), (3, 3), (5, 5), (7, 7)])
        );
        assert_eq!(bdd.to_ranges_limited(odd, 2, 3).unwrap(), None);
        // 2^40 ranges: the walk stops right after the limit.
        assert_eq!(bdd.to_ranges_limited(odd, 40, 16).unwrap(), None);
        assert_eq!(bdd.collect_ranges(odd, 40, 16).unwrap().len(), 17);

        assert_eq!(bdd.to_ranges_limited(Ref::FALSE, 7, 0).unwrap(), Some(vec![]));
        assert_eq!(bdd.to_ranges_limited(Ref::TRUE, 7, 0).unwrap(), None);
        assert_eq!(bdd.to_ranges_limited(Ref::TRUE, 7, 1).unwrap(), Some(vec![(0, 255)]));
    }

    #[test]
    fn test_elements() {
        let bdd = Bdd::default();

        let a = bdd.mk_range(3, 5, 7).unwrap();
        let b = bdd.mk_range(250, 255, 7).unwrap();
        let f = bdd.apply_or(a, b).unwrap();
        let expected: Vec<u64> = (3..=5).chain(250..=255).collect();
        assert_eq!(bdd.elements(f, 7).unwrap().collect::<Vec<_>>(), expected);

        let reversed: Vec<u64> = bdd.elements(f, 7).unwrap().rev().collect();
        assert_eq!(reversed, expected.iter().rev().copied().collect::<Vec<_>>());

        // Both ends meet in the middle without repeating an element.
        let mut it = bdd.elements(f, 7).unwrap();
        let mut seen = Vec::new();
        while let (Some(x), y) = (it.next(), it.next_back()) {
            seen.push(x);
            seen.extend(y);
        }
        seen.sort_unstable();
        assert_eq!(seen, expected);

        assert_eq!(bdd.elements(Ref::FALSE, 7).unwrap().next(), None);
        assert_eq!(bdd.elements(Ref::TRUE, 1).unwrap().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_elements_free_and_wide_bits() {
        let bdd = Bdd::default();

        let odd = bdd.mk_bit(0).unwrap();
        let first: Vec<u64> = bdd.elements(odd, 63).unwrap().take(3).collect();
        assert_eq!(first, vec![1, 3, 5]);
        let last: Vec<u64> = bdd.elements(odd, 63).unwrap().rev().take(2).collect();
        assert_eq!(last, vec![u64::MAX, u64::MAX - 2]);

        let top = bdd.mk_value(u64::MAX, 63).unwrap();
        assert_eq!(bdd.elements(top, 63).unwrap().collect::<Vec<_>>(), vec![u64::MAX]);

        let t = bdd.mk_leaf(0).unwrap();
        let g = bdd.mk_node(2, t, Ref::FALSE).unwrap();
        assert!(matches!(bdd.elements(g, 7), Err(BddError::Unsupported { .. })));
    }

    #[test]
    fn test_to_ranges_rejects_low_max_bit() {
        let bdd = Bdd::default();

        let f = bdd.mk_bit(5).unwrap();
        assert!(bdd.to_ranges(f, 4).is_err());
        assert!(bdd.to_ranges(f, 5).is_ok());
    }

    #[test]
    fn test_shift_left() {
        let bdd = Bdd::default();

        let x0 = bdd.mk_bit(0).unwrap();
        let x2 = bdd.mk_bit(2).unwrap();
        assert_eq!(bdd.shift_left(x0, 2).unwrap(), x2);

        // {0, 1} on 2 bits = "bit 1 is zero"; shifted by 1: "bit 2 is zero"
        let s = bdd.mk_range(0, 1, 1).unwrap();
        let t = bdd.shift_left(s, 1).unwrap();
        assert_eq!(bdd.to_ranges(t, 2).unwrap(), vec![(0, 3)]);
    }

    #[test]
    fn test_shift_right() {
        let bdd = Bdd::default();

        let x3 = bdd.mk_bit(3).unwrap();
        let x1 = bdd.mk_bit(1).unwrap();
        assert_eq!(bdd.shift_right(x3, 2).unwrap(), x1);

        // Dropping all tested bits saturates to the full set.
        let v = bdd.mk_value(5, 3).unwrap();
        assert_eq!(bdd.shift_right(v, 4).unwrap(), Ref::TRUE);

        // {4, 5} on 3 bits shifted right by 1 is {2} on 2 bits
        let s = bdd.mk_range(4, 5, 2).unwrap();
        let t = bdd.shift_right(s, 1).unwrap();
        assert_eq!(t, bdd.mk_value(2, 1).unwrap());
    }

    #[test]
    fn test_shift_trivial() {
        let bdd = Bdd::default();

        let x = bdd.mk_range(3, 11, 4).unwrap();
        assert_eq!(bdd.shift_left(x, 0).unwrap(), x);
        assert_eq!(bdd.shift_right(x, 0).unwrap(), x);
        assert_eq!(bdd.shift_left(Ref::TRUE, 5).unwrap(), Ref::TRUE);
        assert_eq!(bdd.shift_right(Ref::FALSE, 5).unwrap(), Ref::FALSE);

        assert!(matches!(
            bdd.shift_left(x, -1),
            Err(BddError::InvalidArgument { name: "k", .. })
        ));
        assert!(matches!(
            bdd.shift_right(x, -2),
            Err(BddError::InvalidArgument { name: "k", .. })
        ));
    }
}
