//! Fixed-width bit vectors.
//!
//! A [`BitVector`] is an immutable value: operators return new vectors.
//! Bits past the width are always zero, so structural equality is set equality.

use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, BitOr, BitXor, Not};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct BitVector {
    width: usize,
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
}

impl BitVector {
    const BITS_PER_WORD: usize = 64;

    #[inline]
    fn num_words(width: usize) -> usize {
        (width + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// The empty vector of the given width.
    pub fn zeros(width: usize) -> Self {
        Self {
            width,
            words: vec![0; Self::num_words(width)],
        }
    }

    /// The vector with all `width` bits set.
    pub fn ones(width: usize) -> Self {
        !Self::zeros(width)
    }

    /// The vector with exactly bit `index` set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= width`.
    pub fn atom(width: usize, index: usize) -> Self {
        assert!(index < width, "bit {} out of range for width {}", index, width);
        let mut bv = Self::zeros(width);
        let (word, bit) = Self::word_and_bit(index);
        bv.words[word] |= 1u64 << bit;
        bv
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.width {
            return false;
        }
        let (word, bit) = Self::word_and_bit(index);
        (self.words[word] >> bit) & 1 == 1
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_full(&self) -> bool {
        *self == Self::ones(self.width)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the indices of set bits, in increasing order.
    pub fn iter_ones(&self) -> IterOnes<'_> {
        IterOnes {
            bv: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Zero the bits past the width in the last word.
    fn mask_tail(mut self) -> Self {
        let rem = self.width % Self::BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
        self
    }

    fn zip_with(&self, other: &Self, f: impl Fn(u64, u64) -> u64) -> Self {
        assert_eq!(self.width, other.width, "bit vectors of different widths");
        Self {
            width: self.width,
            words: self.words.iter().zip(&other.words).map(|(&a, &b)| f(a, b)).collect(),
        }
    }
}

/// Iterator over set bits in a BitVector.
pub struct IterOnes<'a> {
    bv: &'a BitVector,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for IterOnes<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitVector::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bv.words.len() {
                return None;
            }
            self.current_word = self.bv.words[self.word_idx];
        }
    }
}

impl BitAnd for &BitVector {
    type Output = BitVector;

    fn bitand(self, rhs: Self) -> BitVector {
        self.zip_with(rhs, |a, b| a & b)
    }
}

impl BitOr for &BitVector {
    type Output = BitVector;

    fn bitor(self, rhs: Self) -> BitVector {
        self.zip_with(rhs, |a, b| a | b)
    }
}

impl BitXor for &BitVector {
    type Output = BitVector;

    fn bitxor(self, rhs: Self) -> BitVector {
        self.zip_with(rhs, |a, b| a ^ b)
    }
}

impl Not for &BitVector {
    type Output = BitVector;

    fn not(self) -> BitVector {
        BitVector {
            width: self.width,
            words: self.words.iter().map(|w| !w).collect(),
        }
        .mask_tail()
    }
}

impl Not for BitVector {
    type Output = BitVector;

    fn not(self) -> BitVector {
        !&self
    }
}

impl Display for BitVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, index) in self.iter_ones().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_ones() {
        let z = BitVector::zeros(70);
        assert!(z.is_empty());
        assert_eq!(z.count_ones(), 0);

        let o = BitVector::ones(70);
        assert!(o.is_full());
        assert_eq!(o.count_ones(), 70);
        assert!(o.contains(69));
        assert!(!o.contains(70));
    }

    #[test]
    fn test_not_masks_tail() {
        let a = BitVector::atom(3, 1);
        let na = !&a;
        assert_eq!(na.iter_ones().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(!na, a);

        // exact multiple of the word size
        assert_eq!(BitVector::ones(128).count_ones(), 128);
    }

    #[test]
    fn test_operators() {
        let a = &BitVector::atom(100, 3) | &BitVector::atom(100, 70);
        let b = &BitVector::atom(100, 70) | &BitVector::atom(100, 99);

        assert_eq!((&a & &b).iter_ones().collect::<Vec<_>>(), vec![70]);
        assert_eq!((&a | &b).iter_ones().collect::<Vec<_>>(), vec![3, 70, 99]);
        assert_eq!((&a ^ &b).iter_ones().collect::<Vec<_>>(), vec![3, 99]);
    }

    #[test]
    fn test_zero_width() {
        let z = BitVector::zeros(0);
        assert!(z.is_empty());
        assert!(z.is_full());
        assert_eq!(!&z, z);
        assert_eq!(z.iter_ones().count(), 0);
    }

    #[test]
    fn test_display() {
        let a = &BitVector::atom(8, 0) | &BitVector::atom(8, 5);
        assert_eq!(a.to_string(), "{0,5}");
        assert_eq!(BitVector::zeros(4).to_string(), "{}");
    }

    #[test]
    #[should_panic]
    fn test_atom_out_of_range() {
        BitVector::atom(4, 4);
    }
}
