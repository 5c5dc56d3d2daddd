//! Integration tests for grn-bool-synth using in-memory regulatory models.

use std::collections::BTreeSet;

use grn_bool_core::{
    ExpressionEntry, ExpressionLevel, ExpressionObservation, ExpressionSource, ModelLink,
    ModelNode, NodeId, NodeKind, Region, RegulatoryModel,
};
use grn_bool_runtime::parse_rule;
use grn_bool_synth::{
    find_window, ActivationPredicate, DiagnosticKind, EquationNode, EquationTreeBuilder,
    ModelConverter, SynthesisConfig, TimeWindow, UnreachablePolicy,
};

// ============================================================================
// Test Model Builder (isolated, no filesystem)
// ============================================================================

#[derive(Default)]
struct TestModelBuilder {
    model: RegulatoryModel,
}

impl TestModelBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn add_gene(&mut self, id: &str) -> NodeId {
        self.add_node(id, NodeKind::Gene)
    }

    fn add_node(&mut self, id: &str, kind: NodeKind) -> NodeId {
        self.model.nodes.push(ModelNode::new(id, id, kind));
        NodeId::new(id)
    }

    fn add_link(&mut self, source: &NodeId, target: &NodeId) {
        self.model
            .links
            .push(ModelLink::new(source.clone(), target.clone()));
    }

    fn add_region(&mut self, name: &str, start: i64, end: i64, lineage: &[&str]) {
        self.model
            .regions
            .push(Region::new(name, start, end).with_lineage(lineage.iter().copied()));
    }

    fn add_series(&mut self, gene: &str, region: &str, until: i64, on: &[i64]) {
        for time in 0..=until {
            let level = if on.contains(&time) {
                ExpressionLevel::Expressed
            } else {
                ExpressionLevel::NotExpressed
            };
            self.model.expression.insert(ExpressionObservation::new(
                gene,
                region,
                time,
                ExpressionSource::Unspecified,
                level,
            ));
        }
    }

    fn build(self) -> RegulatoryModel {
        self.model
    }
}

/// signal -> relay -> target, with target <-> partner and signal observed
/// in `veg1` at 2..=3.
fn relay_model() -> RegulatoryModel {
    let mut b = TestModelBuilder::new();
    let signal = b.add_gene("signal");
    let relay = b.add_gene("relay");
    let target = b.add_gene("target");
    let partner = b.add_gene("partner");
    b.add_link(&signal, &relay);
    b.add_link(&relay, &target);
    b.add_link(&target, &partner);
    b.add_link(&partner, &target);
    b.add_region("embryo", 0, 2, &["embryo"]);
    b.add_region("veg1", 2, 8, &["embryo", "veg1"]);
    b.add_region("mes", 2, 8, &["embryo", "mes"]);
    b.add_series("signal", "veg1", 8, &[2, 3]);
    b.build()
}

// ============================================================================
// Rendering Scenarios
// ============================================================================

#[test]
fn test_rendering_scenarios() {
    let ets = || EquationNode::gene_value("Ets1", true, 0);
    assert_eq!(ets().to_string(), "G:Ets1=1");
    assert_eq!(EquationNode::not(ets()).to_string(), "NOT G:Ets1=1");
    assert_eq!(
        EquationNode::time_shift(EquationNode::not(ets()), -3).to_string(),
        "AT-3 NOT G:Ets1=1"
    );
    let or = EquationNode::or(
        EquationNode::time_shift(EquationNode::gene("geneA"), 0),
        EquationNode::time_shift(EquationNode::gene("geneB"), 0),
    );
    assert_eq!(or.to_string(), "AT0 G:geneA=1 OR AT0 G:geneB=1");
}

#[test]
fn test_two_forward_predecessors_have_no_enclosing_or() {
    let builder = EquationTreeBuilder::default()
        .with_leaf("X", EquationNode::gene("X"))
        .with_leaf("Y", EquationNode::gene("Y"));
    let forward: BTreeSet<NodeId> = ["X", "Y"].into_iter().map(NodeId::new).collect();
    let eq = builder.build(&forward, &BTreeSet::new()).unwrap().unwrap();
    assert_eq!(
        eq,
        EquationNode::and(
            EquationNode::time_shift(EquationNode::gene("X"), -1),
            EquationNode::time_shift(EquationNode::gene("Y"), -1),
        )
    );
}

#[test]
fn test_window_from_series() {
    let on = ExpressionEntry {
        source: ExpressionSource::Unspecified,
        level: ExpressionLevel::Expressed,
    };
    let off = ExpressionEntry {
        source: ExpressionSource::Unspecified,
        level: ExpressionLevel::NotExpressed,
    };
    let series = vec![(0, off), (1, off), (2, on), (3, on), (4, on), (5, off)];
    assert_eq!(
        find_window("R1", &series, &ActivationPredicate::default()),
        Some(TimeWindow::new("R1", 2, 5))
    );
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_relay_conversion_equations() {
    let model = relay_model();
    let conversion = ModelConverter::new(&model, SynthesisConfig::default())
        .convert()
        .unwrap();
    let eqs = &conversion.report.equations;

    assert_eq!(eqs["signal"], vec!["IN D:veg1 AND >2 AND <4".to_string()]);
    assert_eq!(eqs["relay"], vec!["AT-1 G:signal=1".to_string()]);
    assert_eq!(
        eqs["target"],
        vec!["AT-1 G:relay=1 OR AT-1 G:partner=1".to_string()]
    );
    assert_eq!(eqs["partner"], vec!["AT-1 G:target=1".to_string()]);
    assert!(conversion.report.diagnostics.is_empty());
}

#[test]
fn test_lowered_rules_match_runtime_parse() {
    let model = relay_model();
    let mut conversion = ModelConverter::new(&model, SynthesisConfig::default())
        .convert()
        .unwrap();

    let rules: Vec<(String, _)> = conversion
        .model
        .genes()
        .flat_map(|(_, g)| g.rules.iter().map(|r| (r.text.clone(), r.logic)))
        .collect();
    assert_eq!(rules.len(), 4);
    assert!(rules.iter().all(|(_, logic)| logic.is_some()));

    // Window rules nest their time bounds on the right while the parser
    // associates to the left, so only regulator rules compare node for node.
    let rules = rules.into_iter().filter(|(text, _)| !text.starts_with("IN "));

    for (text, lowered) in rules {
        let lowered = lowered.unwrap();
        let parsed = parse_rule(&mut conversion.model, &text).unwrap();
        assert!(
            conversion.model.logic().same_structure(parsed, lowered),
            "lowering of `{text}` differs from its parse"
        );
    }
}

#[test]
fn test_relay_simulation() {
    let model = relay_model();
    let conversion = ModelConverter::new(&model, SynthesisConfig::default())
        .convert()
        .unwrap();
    let table = conversion.simulated_expression_table(8).unwrap();

    let levels = |gene: &str, domain: &str| -> Vec<ExpressionLevel> {
        table[gene]
            .iter()
            .filter(|r| r.domain == domain)
            .map(|r| r.level)
            .collect()
    };
    use grn_bool_core::ExpressionLevel::{Expressed as On, NotExpressed as Off};

    // signal holds over 3..=3 (>2 and <4), relay follows one step later.
    assert_eq!(levels("signal", "veg1"), vec![Off, Off, Off, On, Off, Off, Off, Off, Off]);
    assert_eq!(levels("relay", "veg1"), vec![Off, Off, Off, Off, On, Off, Off, Off, Off]);
    // target fires again two steps later through its loop with partner.
    let target = levels("target", "veg1");
    assert_eq!(target[5], On);
    assert_eq!(target[6], Off);
    assert_eq!(target[7], On);
    assert!(levels("target", "mes").iter().all(|l| *l == Off));
}

#[test]
fn test_unreachable_cycle_policy_from_config() {
    let mut b = TestModelBuilder::new();
    let root = b.add_gene("root");
    let leaf = b.add_gene("leaf");
    let u = b.add_gene("u");
    let v = b.add_gene("v");
    b.add_link(&root, &leaf);
    b.add_link(&u, &v);
    b.add_link(&v, &u);
    let model = b.build();

    let forward = ModelConverter::new(&model, SynthesisConfig::default())
        .convert()
        .unwrap();
    assert_eq!(forward.report.classification.feedback_edges().count(), 0);
    assert_eq!(
        forward
            .report
            .diagnostics_of(DiagnosticKind::UnreachableVertices)
            .count(),
        2
    );

    let config = SynthesisConfig::from_json_str(r#"{"unreachable_policy": "break_cycles"}"#).unwrap();
    assert_eq!(config.unreachable_policy, UnreachablePolicy::BreakCycles);
    let broken = ModelConverter::new(&model, config).convert().unwrap();
    let feedback: Vec<String> = broken
        .report
        .classification
        .feedback_edges()
        .map(|l| l.to_string())
        .collect();
    assert_eq!(feedback, vec!["v -> u".to_string()]);
}

#[test]
fn test_break_cycles_without_roots() {
    let mut b = TestModelBuilder::new();
    let u = b.add_gene("u");
    let v = b.add_gene("v");
    b.add_link(&u, &v);
    b.add_link(&v, &u);
    let model = b.build();

    let config = SynthesisConfig::from_json_str(r#"{"unreachable_policy": "break_cycles"}"#).unwrap();
    let conversion = ModelConverter::new(&model, config).convert().unwrap();

    let feedback: Vec<String> = conversion
        .report
        .classification
        .feedback_edges()
        .map(|l| l.to_string())
        .collect();
    assert_eq!(feedback, vec!["v -> u".to_string()]);
    assert_eq!(conversion.report.classification.len(), 2);
    assert_eq!(
        conversion
            .report
            .diagnostics_of(DiagnosticKind::EmptyRootSet)
            .count(),
        1
    );
    assert_eq!(conversion.report.equations["v"], vec!["AT-1 G:u=1".to_string()]);
    assert_eq!(conversion.report.equations["u"], vec!["AT-1 G:v=1".to_string()]);
}

#[test]
fn test_missing_regulator_keeps_other_equations() {
    let mut b = TestModelBuilder::new();
    let a = b.add_gene("a");
    let bee = b.add_gene("b");
    let c = b.add_gene("c");
    b.add_link(&a, &bee);
    b.add_link(&NodeId::new("ghost"), &c);
    let model = b.build();

    let conversion = ModelConverter::new(&model, SynthesisConfig::default())
        .convert()
        .unwrap();

    let unresolved: Vec<_> = conversion
        .report
        .diagnostics_of(DiagnosticKind::UnresolvedNode)
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].node.as_deref(), Some("c"));
    assert_eq!(conversion.report.equations["b"], vec!["AT-1 G:a=1".to_string()]);
    assert!(!conversion.report.equations.contains_key("c"));
    assert!(conversion.model.gene("b").is_some());
    assert!(conversion.model.gene("c").is_some());
}

#[test]
fn test_conversion_is_deterministic() {
    let model = relay_model();
    let mut shuffled = model.clone();
    shuffled.nodes.reverse();
    shuffled.links.reverse();

    let a = ModelConverter::new(&model, SynthesisConfig::default())
        .convert()
        .unwrap();
    let b = ModelConverter::new(&shuffled, SynthesisConfig::default())
        .convert()
        .unwrap();
    assert_eq!(a.report.equations, b.report.equations);
    assert_eq!(a.report.classification, b.report.classification);
}

#[test]
fn test_custom_delay_is_applied() {
    let model = relay_model();
    let config = SynthesisConfig {
        gene_delay: -2,
        ..Default::default()
    };
    let conversion = ModelConverter::new(&model, config).convert().unwrap();
    assert_eq!(
        conversion.report.equations["relay"],
        vec!["AT-2 G:signal=1".to_string()]
    );
}

#[test]
fn test_report_serializes() {
    let model = relay_model();
    let conversion = ModelConverter::new(&model, SynthesisConfig::default())
        .convert()
        .unwrap();
    let json = serde_json::to_value(&conversion.report).unwrap();
    assert_eq!(json["equations"]["relay"][0], "AT-1 G:signal=1");
    assert_eq!(json["classification"].as_array().unwrap().len(), 4);
    assert!(json["diagnostics"].as_array().unwrap().is_empty());
}
