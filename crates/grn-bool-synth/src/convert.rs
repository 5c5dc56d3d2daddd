//! Conversion of a regulatory model into a populated [`TargetModel`].
//!
//! One [`ModelConverter::convert`] call runs the whole pipeline: names,
//! regions, domains and their contacts, genes, the expression grid, one
//! synthesized equation per regulated node, and activation windows for
//! source nodes. Problems with single nodes or observations are collected as
//! [`Diagnostic`]s; only inconsistencies inside the target model abort.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use grn_bool_core::{ExpressionLevel, ModelLink, ModelSource, NodeId, NodeKind};
use grn_bool_runtime::{Domain, ExpressionCode, Simulator, TargetModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::EquationTreeBuilder;
use crate::classify::{classify, EdgeClass, EdgeClassification};
use crate::config::{SynthesisConfig, UnreachablePolicy, UBIQUITOUS_MARKER};
use crate::equation::{EquationNode, EquationRenderer};
use crate::error::{SynthError, SynthResult};
use crate::render::{to_text, TargetRenderer};
use crate::window::find_window;

// =============================================================================
// Report
// =============================================================================

/// What went wrong with one part of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A node's equation references a node that cannot be resolved.
    UnresolvedNode,
    /// Expression data names a gene no node maps to.
    UnknownExpressionGene,
    /// An observation level has no target code.
    InvalidExpressionLevel,
    /// An equation was attached as text only.
    UnsupportedLowering,
    /// No vertex lacks inbound links.
    EmptyRootSet,
    /// A vertex no root reaches.
    UnreachableVertices,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::UnresolvedNode => "unresolved node",
            DiagnosticKind::UnknownExpressionGene => "unknown expression gene",
            DiagnosticKind::InvalidExpressionLevel => "invalid expression level",
            DiagnosticKind::UnsupportedLowering => "unsupported lowering",
            DiagnosticKind::EmptyRootSet => "empty root set",
            DiagnosticKind::UnreachableVertices => "unreachable vertex",
        };
        f.write_str(name)
    }
}

/// A non-fatal conversion problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Node or expression gene concerned, if any.
    pub node: Option<String>,
    pub kind: DiagnosticKind,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Some(node) => write!(f, "{} ({}): {}", self.kind, node, self.detail),
            None => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}

/// Everything a conversion decided besides the target model itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub classification: EdgeClassification,
    /// Rendered rules keyed by target gene name.
    pub equations: BTreeMap<String, Vec<String>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionReport {
    fn diagnose(&mut self, node: Option<String>, kind: DiagnosticKind, detail: impl Into<String>) {
        let diagnostic = Diagnostic {
            node,
            kind,
            detail: detail.into(),
        };
        warn!(%diagnostic, "Conversion diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Number of rules across all genes.
    pub fn equation_count(&self) -> usize {
        self.equations.values().map(Vec::len).sum()
    }
}

/// One simulated observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedRow {
    pub domain: String,
    pub gene: String,
    pub time: i64,
    pub level: ExpressionLevel,
}

/// Result of a conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub model: TargetModel,
    pub report: ConversionReport,
    /// Target gene name to the source display name.
    display_names: BTreeMap<String, String>,
    /// Latest timepoint of the source expression data.
    expression_max_time: Option<i64>,
}

impl Conversion {
    /// Simulate the target model and tabulate every gene per domain.
    ///
    /// Rows run over `0..=max_time`; times past the model's own horizon read
    /// as `NoData`. Keys are source display names.
    pub fn simulated_expression_table(
        &self,
        max_time: i64,
    ) -> SynthResult<BTreeMap<String, Vec<SimulatedRow>>> {
        let trace = Simulator::new(&self.model)?.run()?;
        let mut table = BTreeMap::new();

        for (handle, gene) in self.model.genes() {
            let display = self
                .display_names
                .get(&gene.name)
                .cloned()
                .unwrap_or_else(|| gene.name.clone());
            let mut rows = Vec::new();
            for time in 0..=max_time {
                for (d, domain) in trace.domains().iter().enumerate() {
                    let level = match trace.value(handle, d, time) {
                        Some(true) => ExpressionLevel::Expressed,
                        Some(false) => ExpressionLevel::NotExpressed,
                        None => ExpressionLevel::NoData,
                    };
                    rows.push(SimulatedRow {
                        domain: domain.clone(),
                        gene: display.clone(),
                        time,
                        level,
                    });
                }
            }
            table.insert(display, rows);
        }

        debug!(genes = table.len(), max_time, "Tabulated simulation");
        Ok(table)
    }

    /// Horizon a simulation is compared against: the latest expression
    /// timepoint, or the model's own horizon without expression data.
    pub fn default_horizon(&self) -> i64 {
        self.expression_max_time.unwrap_or_else(|| self.model.max_time())
    }

    /// Source display name of a target gene.
    pub fn display_name(&self, target: &str) -> Option<&str> {
        self.display_names.get(target).map(String::as_str)
    }
}

// =============================================================================
// Converter
// =============================================================================

#[derive(Default)]
struct NameMap {
    by_id: BTreeMap<NodeId, String>,
    kinds: BTreeMap<NodeId, NodeKind>,
    ids_by_target: BTreeMap<String, NodeId>,
    gene_names: BTreeMap<String, String>,
    non_gene_names: BTreeMap<String, String>,
    display_names: BTreeMap<String, String>,
}

impl NameMap {
    fn target_for_expression(&self, name: &str) -> Option<&String> {
        self.gene_names
            .get(name)
            .or_else(|| self.non_gene_names.get(name))
    }
}

/// Converts one [`ModelSource`] into a [`TargetModel`].
pub struct ModelConverter<'s, S: ModelSource + ?Sized> {
    source: &'s S,
    config: SynthesisConfig,
}

impl<'s, S: ModelSource + ?Sized> ModelConverter<'s, S> {
    pub fn new(source: &'s S, config: SynthesisConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Run the full conversion.
    pub fn convert(&self) -> SynthResult<Conversion> {
        info!(
            nodes = self.source.nodes().len(),
            links = self.source.links().len(),
            regions = self.source.regions().len(),
            "Converting model"
        );

        let mut model = TargetModel::new();
        let mut report = ConversionReport::default();

        let names = self.map_names();
        self.build_regions(&mut model);
        self.build_domains(&mut model);
        self.build_domain_topology(&mut model)?;
        self.build_genes(&mut model, &names)?;
        let expression_genes = self.build_expression(&mut model, &names, &mut report)?;
        self.build_gene_equations(&mut model, &names, &mut report)?;
        self.build_input_equations(&mut model, &names, &expression_genes, &mut report)?;

        info!(
            genes = model.gene_count(),
            domains = model.domains().len(),
            rules = report.equation_count(),
            diagnostics = report.diagnostics.len(),
            "Converted model"
        );

        Ok(Conversion {
            model,
            report,
            display_names: names.display_names,
            expression_max_time: self.source.expression().max_time(),
        })
    }

    fn map_names(&self) -> NameMap {
        let mut names = NameMap::default();
        let mut nodes: Vec<_> = self.source.nodes().iter().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        for node in nodes {
            let target = node.unique_name();
            if let Some(other) = names.ids_by_target.get(&target) {
                warn!(node = %node.id, other = %other, name = %target, "Target name already taken");
            }
            names.by_id.insert(node.id.clone(), target.clone());
            names.kinds.insert(node.id.clone(), node.kind);
            names.ids_by_target.insert(target.clone(), node.id.clone());
            names
                .display_names
                .insert(target.clone(), node.name.clone());
            if node.kind.is_gene() {
                names.gene_names.insert(node.name.clone(), target);
            } else {
                names.non_gene_names.insert(node.name.clone(), target);
            }
        }
        names
    }

    fn build_regions(&self, model: &mut TargetModel) {
        let max_time = self
            .source
            .regions()
            .iter()
            .map(|r| r.end)
            .max()
            .unwrap_or(0);
        model.set_max_time(max_time);

        for region in self.source.regions() {
            let number = model.add_region(region.name.clone(), region.start, region.end);
            debug!(region = %region.name, number, start = region.start, end = region.end, "Added region");
        }
    }

    /// Domains are the regions that are nobody's ancestor.
    fn build_domains(&self, model: &mut TargetModel) {
        let with_descendants: BTreeSet<&str> = self
            .source
            .regions()
            .iter()
            .flat_map(|r| r.ancestors().iter().map(String::as_str))
            .collect();

        for region in self.source.regions() {
            if !with_descendants.contains(region.name.as_str()) {
                model.add_domain(Domain::new(region.name.clone(), region.lineage()));
            }
        }
    }

    fn build_domain_topology(&self, model: &mut TargetModel) -> SynthResult<()> {
        for topology in self.source.region_topology() {
            for link in &topology.links {
                let (a, b) = (&link.region1, &link.region2);
                if let Some(missing) = [a, b].into_iter().find(|r| model.domain(r).is_none()) {
                    debug!(region = %missing, "Region is not a domain, skipping contact");
                    continue;
                }
                model.add_contact(a, b, topology.min_time, topology.max_time)?;
                model.add_contact(b, a, topology.min_time, topology.max_time)?;
            }
        }
        Ok(())
    }

    fn build_genes(&self, model: &mut TargetModel, names: &NameMap) -> SynthResult<()> {
        for (id, target) in &names.by_id {
            let is_gene = names.kinds.get(id).is_some_and(NodeKind::is_gene);
            let handle = model.add_gene(target.clone(), is_gene)?;
            if self.config.ubiquitous_detection
                && target.to_uppercase().contains(UBIQUITOUS_MARKER)
            {
                model.gene_mut(handle)?.is_ubiquitous = true;
            }
        }
        Ok(())
    }

    /// Copy the expression grid. Returns node id to expression gene name.
    fn build_expression(
        &self,
        model: &mut TargetModel,
        names: &NameMap,
        report: &mut ConversionReport,
    ) -> SynthResult<BTreeMap<NodeId, String>> {
        let table = self.source.expression();
        let times = table.times();
        let mut expression_genes = BTreeMap::new();

        for gene in table.genes() {
            let Some(target) = names.target_for_expression(gene) else {
                report.diagnose(
                    Some(gene.to_string()),
                    DiagnosticKind::UnknownExpressionGene,
                    "no node has this name",
                );
                continue;
            };
            let handle = model
                .gene(target)
                .ok_or_else(|| SynthError::UnknownGene {
                    name: target.clone(),
                })?;
            if let Some(id) = names.ids_by_target.get(target) {
                expression_genes.insert(id.clone(), gene.to_string());
            }

            for region in self.source.regions() {
                for &time in &times {
                    let entry = table.entry(gene, &region.name, time);
                    match ExpressionCode::from_observation(entry.source, entry.level) {
                        Some(code) => model.set_expression(handle, &region.name, time, code)?,
                        None => report.diagnose(
                            Some(gene.to_string()),
                            DiagnosticKind::InvalidExpressionLevel,
                            format!("{} in {} at {}", entry.level, region.name, time),
                        ),
                    }
                }
            }
        }
        Ok(expression_genes)
    }

    fn build_gene_equations(
        &self,
        model: &mut TargetModel,
        names: &NameMap,
        report: &mut ConversionReport,
    ) -> SynthResult<()> {
        let roots = self.source.root_node_ids();
        if roots.is_empty() {
            let handling = match self.config.unreachable_policy {
                UnreachablePolicy::Forward => "all edges treated as forward",
                UnreachablePolicy::BreakCycles => "cycles broken from every vertex",
            };
            report.diagnose(
                None,
                DiagnosticKind::EmptyRootSet,
                format!("every vertex has inbound links; {handling}"),
            );
        }
        let classification = classify(
            self.source.nodes(),
            self.source.links(),
            &roots,
            self.config.unreachable_policy,
        );
        for vertex in classification.unreachable() {
            report.diagnose(
                Some(vertex.to_string()),
                DiagnosticKind::UnreachableVertices,
                format!("edges handled as {:?}", self.config.unreachable_policy),
            );
        }

        let mut builder = EquationTreeBuilder::new(self.config.gene_delay);
        for (id, target) in &names.by_id {
            let leaf = EquationNode::gene(target.clone());
            let leaf = match names.kinds.get(id) {
                Some(NodeKind::Intercell) => EquationNode::modifier(
                    leaf,
                    EquationNode::cell_contact(self.config.intercell_contact_domain.clone()),
                ),
                _ => leaf,
            };
            builder.insert_leaf(id.clone(), leaf);
        }

        let mut predecessors: BTreeMap<&NodeId, (BTreeSet<NodeId>, BTreeSet<NodeId>)> =
            BTreeMap::new();
        let links: BTreeSet<&ModelLink> = self.source.links().iter().collect();
        for link in links {
            let (forward, feedback) = predecessors.entry(&link.target).or_default();
            match classification.class_of(link).unwrap_or(EdgeClass::Forward) {
                EdgeClass::Forward => forward.insert(link.source.clone()),
                EdgeClass::Feedback => feedback.insert(link.source.clone()),
            };
        }

        for (id, (forward, feedback)) in &predecessors {
            if !names.by_id.contains_key(*id) {
                report.diagnose(
                    Some(id.to_string()),
                    DiagnosticKind::UnresolvedNode,
                    "link target is not a model node",
                );
                continue;
            }
            match builder.build(forward, feedback) {
                Ok(Some(equation)) => self.attach(model, names, report, id, &equation)?,
                Ok(None) => {}
                Err(SynthError::UnresolvedNode { id: missing }) => report.diagnose(
                    Some(id.to_string()),
                    DiagnosticKind::UnresolvedNode,
                    format!("regulator {missing} is not a model node"),
                ),
                Err(e) => return Err(e),
            }
        }

        report.classification = classification;
        Ok(())
    }

    fn build_input_equations(
        &self,
        model: &mut TargetModel,
        names: &NameMap,
        expression_genes: &BTreeMap<NodeId, String>,
        report: &mut ConversionReport,
    ) -> SynthResult<()> {
        let table = self.source.expression();
        let regions: BTreeSet<&str> = self
            .source
            .regions()
            .iter()
            .map(|r| r.name.as_str())
            .collect();

        for root in self.source.root_node_ids() {
            let Some(gene) = expression_genes.get(&root) else {
                continue;
            };
            for region in &regions {
                let series = table.series(gene, region);
                if let Some(window) = find_window(region, &series, &self.config.input_predicate) {
                    debug!(node = %root, ?window, "Found activation window");
                    self.attach(model, names, report, &root, &window.to_equation())?;
                }
            }
        }
        Ok(())
    }

    /// Attach an equation as text, lowered when the target supports it.
    fn attach(
        &self,
        model: &mut TargetModel,
        names: &NameMap,
        report: &mut ConversionReport,
        id: &NodeId,
        equation: &EquationNode,
    ) -> SynthResult<()> {
        let target = names
            .by_id
            .get(id)
            .ok_or_else(|| SynthError::UnresolvedNode { id: id.clone() })?;
        let handle = model.gene(target).ok_or_else(|| SynthError::UnknownGene {
            name: target.clone(),
        })?;
        let text = to_text(equation);

        let logic = match TargetRenderer::new(model).render(equation) {
            Ok(root) => Some(root),
            Err(SynthError::UnsupportedLowering { kind }) => {
                report.diagnose(
                    Some(target.clone()),
                    DiagnosticKind::UnsupportedLowering,
                    format!("{kind} in `{text}`"),
                );
                None
            }
            Err(e) => return Err(e),
        };

        debug!(gene = %target, rule = %text, lowered = logic.is_some(), "Attached rule");
        model.attach_rule(handle, text.clone(), logic)?;
        report
            .equations
            .entry(target.clone())
            .or_default()
            .push(text);
        Ok(())
    }
}
