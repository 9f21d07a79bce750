//! The compiled bit-vector algebra.
//!
//! Once the minterms of all predicates of interest are known, every such
//! predicate is a union of minterms, and can be stored as a bit vector with
//! one bit per minterm. Boolean operations become word-wise bit operations.
//!
//! Each bit stands for a whole block of the original domain, so the size of a
//! vector is the sum of the sizes of its blocks, not its number of set bits.

use std::convert::Infallible;

use log::debug;
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::bitvec::BitVector;
use crate::classifier::{Classifier, PartitionClassifier};
use crate::error::{BddError, Result};
use crate::minterm::{generate_minterms, BooleanAlgebra, Minterm};
use crate::reference::Ref;

pub struct BvAlgebra {
    classifier: Box<dyn Classifier>,
    cardinalities: Vec<BigUint>,
    partition: Vec<Ref>,
    atoms: Vec<BitVector>,
}

impl BvAlgebra {
    /// Compile the partition `minterms` of the domain of `bdd`, whose elements have `max_bit + 1` bits.
    pub fn new(bdd: &Bdd, minterms: &[Ref], max_bit: i32) -> Result<Self> {
        let classifier = PartitionClassifier::new(bdd, minterms)?;
        let cardinalities = minterms
            .iter()
            .map(|&m| bdd.domain_size(m, max_bit))
            .collect::<Result<Vec<_>>>()?;
        Self::with_classifier(Box::new(classifier), cardinalities, minterms.to_vec())
    }

    /// Assemble an algebra from its parts. Block `i` is `partition[i]` and has `cardinalities[i]` elements.
    pub fn with_classifier(
        classifier: Box<dyn Classifier>,
        cardinalities: Vec<BigUint>,
        partition: Vec<Ref>,
    ) -> Result<Self> {
        if partition.is_empty() {
            return Err(BddError::invalid("partition", "must have at least one block"));
        }
        if cardinalities.len() != partition.len() {
            return Err(BddError::invalid(
                "cardinalities",
                format!("{} entries for {} blocks", cardinalities.len(), partition.len()),
            ));
        }
        let width = partition.len();
        let atoms = (0..width).map(|i| BitVector::atom(width, i)).collect();
        debug!("BvAlgebra: {} bits", width);
        Ok(Self {
            classifier,
            cardinalities,
            partition,
            atoms,
        })
    }

    /// Number of bits, i.e. of partition blocks.
    pub fn width(&self) -> usize {
        self.atoms.len()
    }

    /// Single-bit vectors, one per block.
    pub fn atoms(&self) -> &[BitVector] {
        &self.atoms
    }

    pub fn partition(&self) -> &[Ref] {
        &self.partition
    }

    pub fn cardinalities(&self) -> &[BigUint] {
        &self.cardinalities
    }

    pub fn full(&self) -> BitVector {
        BitVector::ones(self.width())
    }

    pub fn empty(&self) -> BitVector {
        BitVector::zeros(self.width())
    }

    pub fn apply_and(&self, a: &BitVector, b: &BitVector) -> BitVector {
        a & b
    }

    pub fn apply_or(&self, a: &BitVector, b: &BitVector) -> BitVector {
        a | b
    }

    pub fn apply_xor(&self, a: &BitVector, b: &BitVector) -> BitVector {
        a ^ b
    }

    pub fn apply_not(&self, a: &BitVector) -> BitVector {
        !a
    }

    pub fn apply_and_many<'a>(&self, sets: impl IntoIterator<Item = &'a BitVector>) -> BitVector {
        debug!("apply_and_many(...)");
        sets.into_iter().fold(self.full(), |acc, s| &acc & s)
    }

    pub fn apply_or_many<'a>(&self, sets: impl IntoIterator<Item = &'a BitVector>) -> BitVector {
        debug!("apply_or_many(...)");
        sets.into_iter().fold(self.empty(), |acc, s| &acc | s)
    }

    /// Number of domain elements in the blocks selected by `set`.
    pub fn domain_size(&self, set: &BitVector) -> BigUint {
        set.iter_ones().map(|i| &self.cardinalities[i]).sum()
    }

    /// The block containing `element`, as a single-bit vector.
    pub fn char_constraint(&self, element: u64) -> BitVector {
        self.atoms[self.classifier.classify(element)].clone()
    }

    /// The blocks that intersect `set`.
    ///
    /// Exact when `set` is a union of blocks; otherwise an over-approximation.
    pub fn convert_from_charset(&self, bdd: &Bdd, set: Ref) -> Result<BitVector> {
        let mut res = self.empty();
        for (block, atom) in self.partition.iter().zip(&self.atoms) {
            let common = bdd.apply_and(*block, set)?;
            if bdd.is_satisfiable(common) {
                res = &res | atom;
            }
        }
        Ok(res)
    }

    /// Union of the blocks selected by `set`.
    pub fn convert_to_charset(&self, bdd: &Bdd, set: &BitVector) -> Result<Ref> {
        bdd.apply_or_many(set.iter_ones().map(|i| self.partition[i]))
    }

    pub fn generate_minterms(&self, preds: &[BitVector]) -> Vec<Minterm<BitVector>> {
        match generate_minterms(self, preds) {
            Ok(minterms) => minterms,
            Err(never) => match never {},
        }
    }
}

impl BooleanAlgebra for BvAlgebra {
    type Pred = BitVector;
    type Error = Infallible;

    fn top(&self) -> BitVector {
        self.full()
    }

    fn bottom(&self) -> BitVector {
        self.empty()
    }

    fn and(&self, a: &BitVector, b: &BitVector) -> std::result::Result<BitVector, Infallible> {
        Ok(a & b)
    }

    fn or(&self, a: &BitVector, b: &BitVector) -> std::result::Result<BitVector, Infallible> {
        Ok(a | b)
    }

    fn not(&self, a: &BitVector) -> std::result::Result<BitVector, Infallible> {
        Ok(!a)
    }

    fn is_satisfiable(&self, a: &BitVector) -> bool {
        !a.is_empty()
    }

    fn are_equivalent(&self, a: &BitVector, b: &BitVector) -> std::result::Result<bool, Infallible> {
        Ok(a == b)
    }
}
