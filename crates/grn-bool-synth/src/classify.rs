//! Forward/feedback partition of a regulatory graph's edges.
//!
//! A depth-first search runs from every root in [`NodeId`] order, visiting
//! successors in [`NodeId`] order as well. An edge into a vertex on the active
//! search path closes a cycle and is Feedback; every other edge, cross edges
//! into finished vertices included, is Forward. Removing the Feedback edges
//! leaves the reachable part of the graph acyclic.
//!
//! Only ordered containers are used, so the result depends on the vertex and
//! edge *sets* alone, never on input order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::iter::Flatten;
use std::option;

use grn_bool_core::{ModelLink, ModelNode, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::UnreachablePolicy;

// =============================================================================
// Classification
// =============================================================================

/// Class of a regulatory edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeClass {
    Forward,
    Feedback,
}

impl fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeClass::Forward => f.write_str("forward"),
            EdgeClass::Feedback => f.write_str("feedback"),
        }
    }
}

/// One classified edge, as serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub class: EdgeClass,
}

/// Mapping from every classified edge to its class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeClassification {
    classes: BTreeMap<ModelLink, EdgeClass>,
    unreachable: BTreeSet<NodeId>,
}

impl EdgeClassification {
    /// Class of an edge, `None` when it was never classified.
    pub fn class_of(&self, link: &ModelLink) -> Option<EdgeClass> {
        self.classes.get(link).copied()
    }

    pub fn is_feedback(&self, link: &ModelLink) -> bool {
        self.class_of(link) == Some(EdgeClass::Feedback)
    }

    pub fn forward_edges(&self) -> impl Iterator<Item = &ModelLink> {
        self.edges_of(EdgeClass::Forward)
    }

    pub fn feedback_edges(&self) -> impl Iterator<Item = &ModelLink> {
        self.edges_of(EdgeClass::Feedback)
    }

    fn edges_of(&self, class: EdgeClass) -> impl Iterator<Item = &ModelLink> {
        self.classes
            .iter()
            .filter(move |(_, c)| **c == class)
            .map(|(link, _)| link)
    }

    /// All classified edges, in link order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModelLink, EdgeClass)> {
        self.classes.iter().map(|(link, class)| (link, *class))
    }

    /// Vertices no root reaches.
    pub fn unreachable(&self) -> &BTreeSet<NodeId> {
        &self.unreachable
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Serializable listing of every classified edge.
    pub fn to_edges(&self) -> Vec<ClassifiedEdge> {
        self.iter()
            .map(|(link, class)| ClassifiedEdge {
                source: link.source.clone(),
                target: link.target.clone(),
                class,
            })
            .collect()
    }
}

impl Serialize for EdgeClassification {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_edges().serialize(serializer)
    }
}

// =============================================================================
// Search
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    OnPath,
    Done,
}

type Adjacency<'a> = BTreeMap<&'a NodeId, BTreeSet<&'a NodeId>>;
type Successors<'a> = Flatten<option::IntoIter<&'a BTreeSet<&'a NodeId>>>;

fn successors<'a>(adjacency: &'a Adjacency<'a>, node: &NodeId) -> Successors<'a> {
    adjacency.get(node).into_iter().flatten()
}

/// Partition `links` into Forward and Feedback edges.
///
/// Vertices are `nodes`, the endpoints of `links` and `roots`. Edges among
/// vertices no root reaches are handled per `policy`. With an empty root set,
/// `Forward` classifies nothing and `BreakCycles` searches from every vertex.
pub fn classify(
    nodes: &[ModelNode],
    links: &[ModelLink],
    roots: &BTreeSet<NodeId>,
    policy: UnreachablePolicy,
) -> EdgeClassification {
    let mut adjacency: Adjacency<'_> = BTreeMap::new();
    for node in nodes {
        adjacency.entry(&node.id).or_default();
    }
    for root in roots {
        adjacency.entry(root).or_default();
    }
    for link in links {
        adjacency.entry(&link.target).or_default();
        adjacency.entry(&link.source).or_default().insert(&link.target);
    }

    let mut classification = EdgeClassification::default();
    let mut state: BTreeMap<&NodeId, VisitState> = BTreeMap::new();
    if roots.is_empty() {
        warn!(
            vertices = adjacency.len(),
            edges = links.len(),
            ?policy,
            "No root vertices"
        );
        if policy == UnreachablePolicy::BreakCycles {
            for vertex in adjacency.keys() {
                search(*vertex, &adjacency, &mut state, &mut classification.classes);
            }
        }
        return classification;
    }

    for root in roots {
        search(root, &adjacency, &mut state, &mut classification.classes);
    }

    classification.unreachable = adjacency
        .keys()
        .filter(|v| !state.contains_key(*v))
        .map(|v| (*v).clone())
        .collect();

    if !classification.unreachable.is_empty() {
        warn!(
            count = classification.unreachable.len(),
            ?policy,
            "Vertices unreachable from any root"
        );
        match policy {
            UnreachablePolicy::BreakCycles => {
                for vertex in adjacency.keys() {
                    search(*vertex, &adjacency, &mut state, &mut classification.classes);
                }
            }
            UnreachablePolicy::Forward => {
                for (source, targets) in &adjacency {
                    for target in targets {
                        classification
                            .classes
                            .entry(ModelLink::new((*source).clone(), (*target).clone()))
                            .or_insert(EdgeClass::Forward);
                    }
                }
            }
        }
    }

    debug!(
        edges = classification.len(),
        feedback = classification.feedback_edges().count(),
        "Classified edges"
    );
    classification
}

fn search<'a>(
    start: &'a NodeId,
    adjacency: &'a Adjacency<'a>,
    state: &mut BTreeMap<&'a NodeId, VisitState>,
    classes: &mut BTreeMap<ModelLink, EdgeClass>,
) {
    if state.contains_key(start) {
        return;
    }
    state.insert(start, VisitState::OnPath);
    let mut stack: Vec<(&'a NodeId, Successors<'a>)> = vec![(start, successors(adjacency, start))];

    while let Some((node, next)) = stack.last_mut() {
        let node = *node;
        let Some(&target) = next.next() else {
            state.insert(node, VisitState::Done);
            stack.pop();
            continue;
        };

        let link = ModelLink::new(node.clone(), target.clone());
        match state.get(target) {
            Some(VisitState::OnPath) => {
                classes.insert(link, EdgeClass::Feedback);
            }
            Some(VisitState::Done) => {
                classes.insert(link, EdgeClass::Forward);
            }
            None => {
                classes.insert(link, EdgeClass::Forward);
                state.insert(target, VisitState::OnPath);
                stack.push((target, successors(adjacency, target)));
            }
        }
    }
}
