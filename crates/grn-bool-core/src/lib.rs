//! Core domain types shared across the grn-bool workspace.
//!
//! These types describe the upstream side of a conversion: the regulatory
//! graph (genes and other entities linked by directed interactions), the
//! embryonic regions with their lineage and contact topology, and the
//! discretized expression observations recorded per gene, region and time.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

// =============================================================================
// Graph Types
// =============================================================================

/// Identifier for vertices of the regulatory graph.
///
/// Ids are ordered so every traversal over them can be made reproducible.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Enumerates the kinds of vertices that can populate the regulatory graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A gene with its own expression.
    #[default]
    Gene,
    /// A signal that acts between neighboring cells.
    Intercell,
    /// Any other non-gene entity (boxes, bubbles, external inputs).
    Other,
}

impl NodeKind {
    /// Whether the vertex is a gene.
    pub fn is_gene(&self) -> bool {
        matches!(self, NodeKind::Gene)
    }

    /// Get a display label for the kind.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Gene => "gene",
            NodeKind::Intercell => "intercell",
            NodeKind::Other => "other",
        }
    }
}

/// A vertex of the regulatory graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelNode {
    /// Unique, stable identifier.
    pub id: NodeId,
    /// Display name, also used to key expression data.
    pub name: String,
    /// Category of the vertex.
    #[serde(default)]
    pub kind: NodeKind,
}

impl ModelNode {
    /// Create a node.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }

    /// The name the target runtime knows this vertex by.
    pub fn unique_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// A directed regulatory interaction. Identity is the (source, target) pair.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ModelLink {
    /// Regulator.
    pub source: NodeId,
    /// Regulated vertex.
    pub target: NodeId,
}

impl ModelLink {
    /// Create a link.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for ModelLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Strip all whitespace from a name.
///
/// The rule text handed to the target runtime is whitespace-delimited, so
/// gene names must not contain any.
pub fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

// =============================================================================
// Regions and Lineage
// =============================================================================

/// An embryonic region (progenitor) alive over `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region name.
    pub name: String,
    /// First timepoint the region exists.
    pub start: i64,
    /// Last timepoint the region exists.
    pub end: i64,
    /// Ancestor region names, ending with this region itself.
    #[serde(default)]
    pub lineage: Vec<String>,
}

impl Region {
    /// Create a region without recorded ancestors.
    pub fn new(name: impl Into<String>, start: i64, end: i64) -> Self {
        let name = name.into();
        Self {
            lineage: vec![name.clone()],
            name,
            start,
            end,
        }
    }

    /// Set the lineage, which should end with this region's name.
    pub fn with_lineage<I, S>(mut self, lineage: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lineage = lineage.into_iter().map(Into::into).collect();
        self
    }

    /// Full lineage; a region with no recorded lineage is its own lineage.
    pub fn lineage(&self) -> Vec<String> {
        if self.lineage.is_empty() {
            vec![self.name.clone()]
        } else {
            self.lineage.clone()
        }
    }

    /// Ancestors only (the lineage without its final entry).
    pub fn ancestors(&self) -> &[String] {
        match self.lineage.split_last() {
            Some((_, ancestors)) => ancestors,
            None => &[],
        }
    }
}

/// Two regions in immediate cell contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLink {
    pub region1: String,
    pub region2: String,
}

/// Region adjacency valid over `[min_time, max_time]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTopology {
    pub min_time: i64,
    pub max_time: i64,
    #[serde(default)]
    pub links: Vec<ContactLink>,
}

// =============================================================================
// Expression Data
// =============================================================================

/// Where an observed expression comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionSource {
    /// Maternally supplied transcript.
    Maternal,
    /// Zygotic expression explicitly recorded.
    Explicit,
    /// No source recorded.
    #[default]
    Unspecified,
}

/// Discretized expression level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionLevel {
    #[default]
    NoData,
    NotExpressed,
    Weak,
    Expressed,
    /// Quantitative level; matches other `Variable` levels regardless of value.
    Variable(f64),
}

impl ExpressionLevel {
    /// Compare levels by kind, ignoring any `Variable` payload.
    pub fn same_kind(&self, other: &ExpressionLevel) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Get a display label for the level.
    pub fn label(&self) -> &'static str {
        match self {
            ExpressionLevel::NoData => "no_data",
            ExpressionLevel::NotExpressed => "not_expressed",
            ExpressionLevel::Weak => "weak",
            ExpressionLevel::Expressed => "expressed",
            ExpressionLevel::Variable(_) => "variable",
        }
    }
}

impl fmt::Display for ExpressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cell of the (gene x region x timepoint) observation grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionObservation {
    pub gene: String,
    pub region: String,
    pub time: i64,
    #[serde(default)]
    pub source: ExpressionSource,
    #[serde(default)]
    pub level: ExpressionLevel,
}

impl ExpressionObservation {
    /// Create an observation.
    pub fn new(
        gene: impl Into<String>,
        region: impl Into<String>,
        time: i64,
        source: ExpressionSource,
        level: ExpressionLevel,
    ) -> Self {
        Self {
            gene: gene.into(),
            region: region.into(),
            time,
            source,
            level,
        }
    }
}

/// The (source, level) pair stored for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExpressionEntry {
    pub source: ExpressionSource,
    pub level: ExpressionLevel,
}

impl ExpressionEntry {
    /// Whether this entry carries exactly the given source and level kind.
    pub fn is(&self, source: ExpressionSource, level: ExpressionLevel) -> bool {
        self.source == source && self.level.same_kind(&level)
    }
}

/// Ordered observation grid keyed by (gene, region, time).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(
    from = "Vec<ExpressionObservation>",
    into = "Vec<ExpressionObservation>"
)]
pub struct ExpressionTable {
    entries: BTreeMap<(String, String, i64), ExpressionEntry>,
}

impl ExpressionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation, replacing any earlier one for the same cell.
    pub fn insert(&mut self, obs: ExpressionObservation) {
        self.entries.insert(
            (obs.gene, obs.region, obs.time),
            ExpressionEntry {
                source: obs.source,
                level: obs.level,
            },
        );
    }

    /// Number of recorded cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Genes under observation, sorted.
    pub fn genes(&self) -> BTreeSet<&str> {
        self.entries.keys().map(|(g, _, _)| g.as_str()).collect()
    }

    /// Observed timepoints, ascending and deduplicated.
    pub fn times(&self) -> Vec<i64> {
        let times: BTreeSet<i64> = self.entries.keys().map(|(_, _, t)| *t).collect();
        times.into_iter().collect()
    }

    /// Latest observed timepoint.
    pub fn max_time(&self) -> Option<i64> {
        self.entries.keys().map(|(_, _, t)| *t).max()
    }

    /// Entry for one cell; unrecorded cells read as (Unspecified, NoData).
    pub fn entry(&self, gene: &str, region: &str, time: i64) -> ExpressionEntry {
        self.entries
            .get(&(gene.to_string(), region.to_string(), time))
            .copied()
            .unwrap_or_default()
    }

    /// The time series for one gene in one region, over every observed timepoint.
    pub fn series(&self, gene: &str, region: &str) -> Vec<(i64, ExpressionEntry)> {
        self.times()
            .into_iter()
            .map(|t| (t, self.entry(gene, region, t)))
            .collect()
    }

    /// All recorded observations in key order.
    pub fn observations(&self) -> impl Iterator<Item = ExpressionObservation> + '_ {
        self.entries
            .iter()
            .map(|((gene, region, time), entry)| ExpressionObservation {
                gene: gene.clone(),
                region: region.clone(),
                time: *time,
                source: entry.source,
                level: entry.level,
            })
    }
}

impl From<Vec<ExpressionObservation>> for ExpressionTable {
    fn from(observations: Vec<ExpressionObservation>) -> Self {
        let mut table = Self::new();
        for obs in observations {
            table.insert(obs);
        }
        table
    }
}

impl From<ExpressionTable> for Vec<ExpressionObservation> {
    fn from(table: ExpressionTable) -> Self {
        table.observations().collect()
    }
}

impl FromIterator<ExpressionObservation> for ExpressionTable {
    fn from_iter<I: IntoIterator<Item = ExpressionObservation>>(iter: I) -> Self {
        let mut table = Self::new();
        for obs in iter {
            table.insert(obs);
        }
        table
    }
}

// =============================================================================
// Model Source
// =============================================================================

/// Read access to an originating model.
///
/// Implementors must return vertices with unique ids. Order of the returned
/// slices does not matter; consumers sort whatever they iterate.
pub trait ModelSource {
    /// All vertices.
    fn nodes(&self) -> &[ModelNode];

    /// All interaction links. Duplicate pairs are allowed and collapse.
    fn links(&self) -> &[ModelLink];

    /// All regions with their lineage.
    fn regions(&self) -> &[Region];

    /// Region contact topology per time span.
    fn region_topology(&self) -> &[RegionTopology];

    /// Expression observations.
    fn expression(&self) -> &ExpressionTable;

    /// Vertices without inbound links, sorted.
    fn root_node_ids(&self) -> BTreeSet<NodeId> {
        let mut roots: BTreeSet<NodeId> = self.nodes().iter().map(|n| n.id.clone()).collect();
        for link in self.links() {
            roots.remove(&link.target);
        }
        roots
    }
}

/// In-memory, serde-backed regulatory model.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegulatoryModel {
    /// Model name.
    #[serde(default)]
    pub name: String,
    /// All vertices.
    pub nodes: Vec<ModelNode>,
    /// All interaction links.
    #[serde(default)]
    pub links: Vec<ModelLink>,
    /// Regions and lineage.
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Region contact topology.
    #[serde(default)]
    pub topology: Vec<RegionTopology>,
    /// Expression observations.
    #[serde(default)]
    pub expression: ExpressionTable,
}

impl RegulatoryModel {
    /// Creates an empty model.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a model from its JSON document form.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns the number of vertices.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Look up a vertex by id.
    pub fn node(&self, id: &NodeId) -> Option<&ModelNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Look up a vertex by display name.
    pub fn node_by_name(&self, name: &str) -> Option<&ModelNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Convert to a petgraph `StableDiGraph` for analysis.
    /// Returns the graph and a mapping from NodeId to NodeIndex.
    pub fn to_petgraph(&self) -> (StableDiGraph<ModelNode, ()>, HashMap<NodeId, NodeIndex>) {
        let mut graph = StableDiGraph::new();
        let mut id_to_index = HashMap::new();

        for node in &self.nodes {
            let idx = graph.add_node(node.clone());
            id_to_index.insert(node.id.clone(), idx);
        }

        let unique: BTreeSet<&ModelLink> = self.links.iter().collect();
        for link in unique {
            if let (Some(&from_idx), Some(&to_idx)) =
                (id_to_index.get(&link.source), id_to_index.get(&link.target))
            {
                graph.add_edge(from_idx, to_idx, ());
            }
        }

        (graph, id_to_index)
    }
}

impl ModelSource for RegulatoryModel {
    fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    fn links(&self) -> &[ModelLink] {
        &self.links
    }

    fn regions(&self) -> &[Region] {
        &self.regions
    }

    fn region_topology(&self) -> &[RegionTopology] {
        &self.topology
    }

    fn expression(&self) -> &ExpressionTable {
        &self.expression
    }
}
