//! Mapping domain elements to partition blocks.
//!
//! A [`PartitionClassifier`] is built once from a list of pairwise disjoint
//! sets covering the whole domain. Every minterm `i` becomes a multi-terminal
//! set with leaf `i`, and their union is a single decision diagram whose leaf
//! for an element is the block containing it. The first [`PRECOMPUTE`]
//! elements are tabulated; the others walk a flattened copy of the diagram, so
//! lookups never touch a lock.

use std::collections::HashMap;

use log::debug;

use crate::bdd::{Bdd, BddConfig};
use crate::error::{BddError, Result};
use crate::reference::Ref;
use crate::terminal::ClassTags;

/// Number of leading elements whose block is tabulated.
pub const PRECOMPUTE: usize = 128;

/// Maps a domain element to the index of its partition block.
pub trait Classifier: Send + Sync {
    fn classify(&self, element: u64) -> usize;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum FlatNode {
    Leaf(usize),
    Test { bit: i32, one: usize, zero: usize },
}

#[derive(Debug, Clone)]
pub struct PartitionClassifier {
    precomputed: Vec<usize>,
    nodes: Vec<FlatNode>,
    root: usize,
}

impl PartitionClassifier {
    /// Build a classifier for `partition`, whose sets live in `source`.
    ///
    /// The sets must be pairwise disjoint and cover the domain.
    pub fn new(source: &Bdd, partition: &[Ref]) -> Result<Self> {
        if partition.is_empty() {
            return Err(BddError::invalid("partition", "must have at least one block"));
        }
        if partition.len() == 1 {
            return Ok(Self {
                precomputed: Vec::new(),
                nodes: vec![FlatNode::Leaf(0)],
                root: 0,
            });
        }

        let mt = Bdd::with_config(BddConfig::default().with_terminal_policy(ClassTags));
        let mut union = Ref::FALSE;
        for (i, &block) in partition.iter().enumerate() {
            let tag = i32::try_from(i).map_err(|_| BddError::invalid("partition", "too many blocks"))?;
            let block = mt.import(source, block)?;
            let block = mt.replace_true(block, tag)?;
            union = mt.apply_or(union, block)?;
        }

        let (nodes, root) = flatten(&mt, union)?;
        let mut classifier = Self {
            precomputed: Vec::new(),
            nodes,
            root,
        };
        classifier.precomputed = (0..PRECOMPUTE as u64).map(|c| classifier.walk(c)).collect();
        debug!(
            "PartitionClassifier: {} blocks, {} nodes",
            partition.len(),
            classifier.nodes.len()
        );
        Ok(classifier)
    }

    fn walk(&self, element: u64) -> usize {
        let mut current = self.root;
        loop {
            match self.nodes[current] {
                FlatNode::Leaf(block) => return block,
                FlatNode::Test { bit, one, zero } => {
                    let set = bit < 64 && (element >> bit) & 1 == 1;
                    current = if set { one } else { zero };
                }
            }
        }
    }
}

impl Classifier for PartitionClassifier {
    #[inline]
    fn classify(&self, element: u64) -> usize {
        match self.precomputed.get(element as usize) {
            Some(&block) if element < PRECOMPUTE as u64 => block,
            _ => self.walk(element),
        }
    }
}

/// Copy the diagram into a plain vector; fails if some element maps to no block.
fn flatten(bdd: &Bdd, root: Ref) -> Result<(Vec<FlatNode>, usize)> {
    let uncovered = || BddError::invalid("partition", "blocks do not cover the domain");
    if root.is_constant() {
        return Err(uncovered());
    }

    let mut index = HashMap::new();
    let mut nodes = Vec::new();
    for (r, node) in bdd.descendants(root) {
        let flat = if node.is_leaf() {
            let block = usize::try_from(node.ordinal).map_err(|_| uncovered())?;
            FlatNode::Leaf(block)
        } else {
            let one = *index.get(&node.one).ok_or_else(uncovered)?;
            let zero = *index.get(&node.zero).ok_or_else(uncovered)?;
            FlatNode::Test {
                bit: node.ordinal,
                one,
                zero,
            }
        };
        index.insert(r, nodes.len());
        nodes.push(flat);
    }
    let root = *index.get(&root).ok_or_else(uncovered)?;
    Ok((nodes, root))
}
