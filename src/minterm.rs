//! Minterm generation over any Boolean algebra.
//!
//! Given predicates `p_1, ..., p_n`, the minterms are the satisfiable
//! conjunctions `q_1 ∧ ... ∧ q_n` where each `q_i` is either `p_i` or `¬p_i`.
//! They are pairwise disjoint, cover the whole domain, and every `p_i` is the
//! union of the minterms whose characteristic vector has `true` at `i`.

use log::debug;

use crate::bdd::Bdd;
use crate::error::{BddError, Result};
use crate::reference::Ref;

/// The operations minterm generation needs from an algebra.
pub trait BooleanAlgebra {
    type Pred: Clone;
    type Error;

    fn top(&self) -> Self::Pred;
    fn bottom(&self) -> Self::Pred;
    fn and(&self, a: &Self::Pred, b: &Self::Pred) -> std::result::Result<Self::Pred, Self::Error>;
    fn or(&self, a: &Self::Pred, b: &Self::Pred) -> std::result::Result<Self::Pred, Self::Error>;
    fn not(&self, a: &Self::Pred) -> std::result::Result<Self::Pred, Self::Error>;
    fn is_satisfiable(&self, a: &Self::Pred) -> bool;
    fn are_equivalent(&self, a: &Self::Pred, b: &Self::Pred) -> std::result::Result<bool, Self::Error>;
}

/// One block of the partition induced by a list of predicates.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Minterm<P> {
    /// `characteristic[i]` is true iff the minterm is included in the `i`-th predicate.
    pub characteristic: Vec<bool>,
    pub pred: P,
}

/// Compute the minterms of `preds`.
///
/// With no predicates, the single minterm is `top` with an empty characteristic vector.
/// The order of the returned minterms is unspecified.
pub fn generate_minterms<A>(algebra: &A, preds: &[A::Pred]) -> std::result::Result<Vec<Minterm<A::Pred>>, A::Error>
where
    A: BooleanAlgebra + ?Sized,
{
    // Work with one representative per equivalence class.
    let mut distinct: Vec<A::Pred> = Vec::new();
    let mut members: Vec<Vec<usize>> = Vec::new();
    'outer: for (i, p) in preds.iter().enumerate() {
        for (k, q) in distinct.iter().enumerate() {
            if algebra.are_equivalent(p, q)? {
                members[k].push(i);
                continue 'outer;
            }
        }
        distinct.push(p.clone());
        members.push(vec![i]);
    }

    // Blocks with their characteristic over `distinct`.
    let mut blocks: Vec<(A::Pred, Vec<bool>)> = vec![(algebra.top(), Vec::new())];
    for psi in &distinct {
        let not_psi = algebra.not(psi)?;
        let mut refined = Vec::with_capacity(blocks.len() * 2);
        for (phi, path) in blocks {
            let inside = algebra.and(&phi, psi)?;
            let outside = algebra.and(&phi, &not_psi)?;
            match (algebra.is_satisfiable(&inside), algebra.is_satisfiable(&outside)) {
                (true, true) => {
                    refined.push((inside, extend(&path, true)));
                    refined.push((outside, extend(&path, false)));
                }
                (true, false) => refined.push((phi, extend(&path, true))),
                (false, _) => refined.push((phi, extend(&path, false))),
            }
        }
        blocks = refined;
    }

    let minterms = blocks
        .into_iter()
        .map(|(pred, path)| {
            let mut characteristic = vec![false; preds.len()];
            for (k, &included) in path.iter().enumerate() {
                if included {
                    for &i in &members[k] {
                        characteristic[i] = true;
                    }
                }
            }
            Minterm { characteristic, pred }
        })
        .collect();
    Ok(minterms)
}

fn extend(path: &[bool], bit: bool) -> Vec<bool> {
    let mut path = path.to_vec();
    path.push(bit);
    path
}

impl BooleanAlgebra for Bdd {
    type Pred = Ref;
    type Error = BddError;

    fn top(&self) -> Ref {
        Ref::TRUE
    }

    fn bottom(&self) -> Ref {
        Ref::FALSE
    }

    fn and(&self, a: &Ref, b: &Ref) -> Result<Ref> {
        self.apply_and(*a, *b)
    }

    fn or(&self, a: &Ref, b: &Ref) -> Result<Ref> {
        self.apply_or(*a, *b)
    }

    fn not(&self, a: &Ref) -> Result<Ref> {
        self.apply_not(*a)
    }

    fn is_satisfiable(&self, a: &Ref) -> bool {
        Bdd::is_satisfiable(self, *a)
    }

    fn are_equivalent(&self, a: &Ref, b: &Ref) -> Result<bool> {
        Bdd::are_equivalent(self, *a, *b)
    }
}

impl Bdd {
    pub fn generate_minterms(&self, preds: &[Ref]) -> Result<Vec<Minterm<Ref>>> {
        let minterms = generate_minterms(self, preds)?;
        debug!("generate_minterms: {} predicates -> {} minterms", preds.len(), minterms.len());
        Ok(minterms)
    }
}
