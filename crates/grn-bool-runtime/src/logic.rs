//! Native logic nodes and the arena that owns them.
//!
//! Rules are stored as trees of [`LogicNode`]s addressed by [`LogicId`]. Every
//! node lives in the model's [`LogicArena`]; children are referenced by id, so a
//! lowered rule is just the id of its root.

use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};
use crate::model::GeneHandle;

/// Index of a node inside a [`LogicArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicId(pub(crate) u32);

impl LogicId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Next `u32` index for a storage currently holding `len` items.
pub(crate) fn checked_index(len: usize, what: &'static str) -> RuntimeResult<u32> {
    u32::try_from(len).map_err(|_| RuntimeError::CapacityExceeded { what })
}

/// One node of a native logic tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicNode {
    /// Holds when `gene` has the given value.
    Gene { gene: GeneHandle, value: bool },
    /// Negation.
    Not(LogicId),
    /// Conjunction.
    And(LogicId, LogicId),
    /// Disjunction.
    Or(LogicId, LogicId),
    /// Evaluates `child` at `current time + step`.
    At { step: i64, child: LogicId },
    /// Holds when the current time is strictly greater than the bound.
    After(i64),
    /// Holds when the current time is strictly less than the bound.
    Before(i64),
    /// Holds when the evaluated domain descends from the named region.
    InRegion(String),
}

/// Append-only storage for logic nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogicArena {
    nodes: Vec<LogicNode>,
}

impl LogicArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fetch a node.
    pub fn get(&self, id: LogicId) -> RuntimeResult<&LogicNode> {
        self.nodes
            .get(id.index())
            .ok_or(RuntimeError::UnknownLogic { id })
    }

    fn push(&mut self, node: LogicNode) -> RuntimeResult<LogicId> {
        let id = LogicId(checked_index(self.nodes.len(), "logic arena")?);
        self.nodes.push(node);
        Ok(id)
    }

    pub fn gene(&mut self, gene: GeneHandle, value: bool) -> RuntimeResult<LogicId> {
        self.push(LogicNode::Gene { gene, value })
    }

    pub fn not(&mut self, child: LogicId) -> RuntimeResult<LogicId> {
        self.push(LogicNode::Not(child))
    }

    pub fn and(&mut self, left: LogicId, right: LogicId) -> RuntimeResult<LogicId> {
        self.push(LogicNode::And(left, right))
    }

    pub fn or(&mut self, left: LogicId, right: LogicId) -> RuntimeResult<LogicId> {
        self.push(LogicNode::Or(left, right))
    }

    pub fn at(&mut self, step: i64, child: LogicId) -> RuntimeResult<LogicId> {
        self.push(LogicNode::At { step, child })
    }

    pub fn after(&mut self, time: i64) -> RuntimeResult<LogicId> {
        self.push(LogicNode::After(time))
    }

    pub fn before(&mut self, time: i64) -> RuntimeResult<LogicId> {
        self.push(LogicNode::Before(time))
    }

    pub fn in_region(&mut self, region: impl Into<String>) -> RuntimeResult<LogicId> {
        self.push(LogicNode::InRegion(region.into()))
    }

    /// Structural equality of the trees rooted at `a` and `b`.
    ///
    /// Ids that do not belong to the arena compare unequal.
    pub fn same_structure(&self, a: LogicId, b: LogicId) -> bool {
        let (Ok(left), Ok(right)) = (self.get(a), self.get(b)) else {
            return false;
        };
        match (left, right) {
            (LogicNode::Not(x), LogicNode::Not(y)) => self.same_structure(*x, *y),
            (LogicNode::And(l1, r1), LogicNode::And(l2, r2))
            | (LogicNode::Or(l1, r1), LogicNode::Or(l2, r2)) => {
                self.same_structure(*l1, *l2) && self.same_structure(*r1, *r2)
            }
            (
                LogicNode::At { step: s1, child: c1 },
                LogicNode::At { step: s2, child: c2 },
            ) => s1 == s2 && self.same_structure(*c1, *c2),
            (l, r) => l == r,
        }
    }

    /// Every gene referenced by the tree rooted at `root`, with its `At` offset.
    pub fn gene_references(&self, root: LogicId) -> RuntimeResult<Vec<(GeneHandle, i64)>> {
        let mut refs = Vec::new();
        let mut stack = vec![(root, 0i64)];
        while let Some((id, offset)) = stack.pop() {
            match self.get(id)? {
                LogicNode::Gene { gene, .. } => refs.push((*gene, offset)),
                LogicNode::Not(child) => stack.push((*child, offset)),
                LogicNode::And(l, r) | LogicNode::Or(l, r) => {
                    stack.push((*r, offset));
                    stack.push((*l, offset));
                }
                LogicNode::At { step, child } => stack.push((*child, offset + step)),
                LogicNode::After(_) | LogicNode::Before(_) | LogicNode::InRegion(_) => {}
            }
        }
        Ok(refs)
    }
}
