//! Equation syntax trees.
//!
//! An [`EquationNode`] is an immutable tree that owns its children. Renderers
//! implement [`EquationRenderer`] and match exhaustively on the node kind, so a
//! new renderer never touches the node types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A node of a synthesized rule equation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationNode {
    /// Truth value of a named gene.
    GeneValue { name: String, value: bool, time: i64 },
    /// `child` evaluated at current time + `delta`.
    TimeShift { child: Box<EquationNode>, delta: i64 },
    And(Box<EquationNode>, Box<EquationNode>),
    Or(Box<EquationNode>, Box<EquationNode>),
    Not(Box<EquationNode>),
    /// Current time strictly greater than the bound.
    GreaterThanTime(i64),
    /// Current time strictly less than the bound.
    LessThanTime(i64),
    /// Evaluated inside the named region.
    InRegion(String),
    /// Evaluated in the cells immediately contacting the named region.
    ImmediateCellContact(String),
    /// A base predicate qualified by a spatial predicate. Not a connective.
    Modifier(Box<EquationNode>, Box<EquationNode>),
}

/// Discriminant of an [`EquationNode`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationKind {
    GeneValue,
    TimeShift,
    And,
    Or,
    Not,
    GreaterThanTime,
    LessThanTime,
    InRegion,
    ImmediateCellContact,
    Modifier,
}

impl fmt::Display for EquationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquationKind::GeneValue => "GeneValue",
            EquationKind::TimeShift => "TimeShift",
            EquationKind::And => "And",
            EquationKind::Or => "Or",
            EquationKind::Not => "Not",
            EquationKind::GreaterThanTime => "GreaterThanTime",
            EquationKind::LessThanTime => "LessThanTime",
            EquationKind::InRegion => "InRegion",
            EquationKind::ImmediateCellContact => "ImmediateCellContact",
            EquationKind::Modifier => "Modifier",
        };
        f.write_str(name)
    }
}

/// A renderer over equation trees.
pub trait EquationRenderer {
    /// What rendering one tree produces.
    type Output;

    /// Render the tree rooted at `node`.
    fn render(&mut self, node: &EquationNode) -> Self::Output;
}

impl EquationNode {
    /// `name` is on, at the current time.
    pub fn gene(name: impl Into<String>) -> Self {
        Self::gene_value(name, true, 0)
    }

    pub fn gene_value(name: impl Into<String>, value: bool, time: i64) -> Self {
        EquationNode::GeneValue {
            name: name.into(),
            value,
            time,
        }
    }

    pub fn time_shift(child: EquationNode, delta: i64) -> Self {
        EquationNode::TimeShift {
            child: Box::new(child),
            delta,
        }
    }

    pub fn and(left: EquationNode, right: EquationNode) -> Self {
        EquationNode::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: EquationNode, right: EquationNode) -> Self {
        EquationNode::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: EquationNode) -> Self {
        EquationNode::Not(Box::new(child))
    }

    pub fn greater_than_time(time: i64) -> Self {
        EquationNode::GreaterThanTime(time)
    }

    pub fn less_than_time(time: i64) -> Self {
        EquationNode::LessThanTime(time)
    }

    pub fn in_region(region: impl Into<String>) -> Self {
        EquationNode::InRegion(region.into())
    }

    pub fn cell_contact(region: impl Into<String>) -> Self {
        EquationNode::ImmediateCellContact(region.into())
    }

    pub fn modifier(base: EquationNode, qualifier: EquationNode) -> Self {
        EquationNode::Modifier(Box::new(base), Box::new(qualifier))
    }

    /// The node's kind.
    pub fn kind(&self) -> EquationKind {
        match self {
            EquationNode::GeneValue { .. } => EquationKind::GeneValue,
            EquationNode::TimeShift { .. } => EquationKind::TimeShift,
            EquationNode::And(..) => EquationKind::And,
            EquationNode::Or(..) => EquationKind::Or,
            EquationNode::Not(_) => EquationKind::Not,
            EquationNode::GreaterThanTime(_) => EquationKind::GreaterThanTime,
            EquationNode::LessThanTime(_) => EquationKind::LessThanTime,
            EquationNode::InRegion(_) => EquationKind::InRegion,
            EquationNode::ImmediateCellContact(_) => EquationKind::ImmediateCellContact,
            EquationNode::Modifier(..) => EquationKind::Modifier,
        }
    }

    /// Hand this tree to a renderer.
    pub fn accept<R: EquationRenderer>(&self, renderer: &mut R) -> R::Output {
        renderer.render(self)
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            EquationNode::TimeShift { child, .. } | EquationNode::Not(child) => {
                1 + child.node_count()
            }
            EquationNode::And(l, r) | EquationNode::Or(l, r) | EquationNode::Modifier(l, r) => {
                1 + l.node_count() + r.node_count()
            }
            _ => 1,
        }
    }
}
