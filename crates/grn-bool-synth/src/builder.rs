//! Per-node equation trees.
//!
//! Each predecessor contributes its leaf shifted by the gene delay. Forward
//! predecessors are joined with AND and feedback predecessors with OR, both
//! as left-associated chains in [`NodeId`] order, and the two chains are
//! joined with OR when both exist.

use std::collections::{BTreeMap, BTreeSet};

use grn_bool_core::NodeId;

use crate::config::GENE_DELAY;
use crate::equation::EquationNode;
use crate::error::{SynthError, SynthResult};

/// Builds rule equations from classified predecessor sets.
#[derive(Debug, Clone)]
pub struct EquationTreeBuilder {
    leaves: BTreeMap<NodeId, EquationNode>,
    delay: i64,
}

impl Default for EquationTreeBuilder {
    fn default() -> Self {
        Self::new(GENE_DELAY)
    }
}

impl EquationTreeBuilder {
    pub fn new(delay: i64) -> Self {
        Self {
            leaves: BTreeMap::new(),
            delay,
        }
    }

    /// Register the equation a node contributes as a predecessor.
    pub fn insert_leaf(&mut self, id: NodeId, leaf: EquationNode) {
        self.leaves.insert(id, leaf);
    }

    /// Builder-style [`insert_leaf`](Self::insert_leaf).
    pub fn with_leaf(mut self, id: impl Into<NodeId>, leaf: EquationNode) -> Self {
        self.insert_leaf(id.into(), leaf);
        self
    }

    pub fn leaf(&self, id: &NodeId) -> Option<&EquationNode> {
        self.leaves.get(id)
    }

    pub fn delay(&self) -> i64 {
        self.delay
    }

    fn term(&self, id: &NodeId) -> SynthResult<EquationNode> {
        let leaf = self
            .leaves
            .get(id)
            .ok_or_else(|| SynthError::UnresolvedNode { id: id.clone() })?;
        Ok(EquationNode::time_shift(leaf.clone(), self.delay))
    }

    fn chain(
        &self,
        predecessors: &BTreeSet<NodeId>,
        join: fn(EquationNode, EquationNode) -> EquationNode,
    ) -> SynthResult<Option<EquationNode>> {
        let mut tree = None;
        for id in predecessors {
            let term = self.term(id)?;
            tree = Some(match tree {
                None => term,
                Some(acc) => join(acc, term),
            });
        }
        Ok(tree)
    }

    /// Build the equation for a node.
    ///
    /// Returns `Ok(None)` for a node without predecessors, and an
    /// [`SynthError::UnresolvedNode`] error when a predecessor has no leaf.
    pub fn build(
        &self,
        forward: &BTreeSet<NodeId>,
        feedback: &BTreeSet<NodeId>,
    ) -> SynthResult<Option<EquationNode>> {
        let and_tree = self.chain(forward, EquationNode::and)?;
        let or_tree = self.chain(feedback, EquationNode::or)?;
        Ok(match (and_tree, or_tree) {
            (Some(and_tree), Some(or_tree)) => Some(EquationNode::or(and_tree, or_tree)),
            (tree, None) | (None, tree) => tree,
        })
    }
}
