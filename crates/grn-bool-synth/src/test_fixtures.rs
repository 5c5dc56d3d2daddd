//! Minimal test fixtures for conversion testing.
//!
//! Provides small in-memory regulatory models, without files or external
//! dependencies.

use grn_bool_core::{
    ContactLink, ExpressionLevel, ExpressionObservation, ExpressionSource, ModelLink, ModelNode,
    NodeKind, Region, RegionTopology, RegulatoryModel,
};

/// Builder for creating test regulatory models.
#[derive(Default)]
pub struct TestModelBuilder {
    model: RegulatoryModel,
}

impl TestModelBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gene node.
    pub fn gene(self, id: &str, name: &str) -> Self {
        self.node(id, name, NodeKind::Gene)
    }

    /// Add an intercell signal node.
    pub fn intercell(self, id: &str, name: &str) -> Self {
        self.node(id, name, NodeKind::Intercell)
    }

    pub fn node(mut self, id: &str, name: &str, kind: NodeKind) -> Self {
        self.model.nodes.push(ModelNode::new(id, name, kind));
        self
    }

    /// Add a regulatory link (source regulates target).
    pub fn link(mut self, source: &str, target: &str) -> Self {
        self.model.links.push(ModelLink::new(source, target));
        self
    }

    /// Add a region with its full lineage.
    pub fn region(mut self, name: &str, start: i64, end: i64, lineage: &[&str]) -> Self {
        self.model
            .regions
            .push(Region::new(name, start, end).with_lineage(lineage.iter().copied()));
        self
    }

    /// Add a contact between two regions over `[min_time, max_time]`.
    pub fn contact(mut self, min_time: i64, max_time: i64, region1: &str, region2: &str) -> Self {
        self.model.topology.push(RegionTopology {
            min_time,
            max_time,
            links: vec![ContactLink {
                region1: region1.to_string(),
                region2: region2.to_string(),
            }],
        });
        self
    }

    /// Record one observation.
    pub fn observe(
        mut self,
        gene: &str,
        region: &str,
        time: i64,
        source: ExpressionSource,
        level: ExpressionLevel,
    ) -> Self {
        self.model.expression.insert(ExpressionObservation::new(
            gene, region, time, source, level,
        ));
        self
    }

    /// Record `gene` as Expressed at `on` and NotExpressed at every other
    /// time in `0..=until`.
    pub fn series(mut self, gene: &str, region: &str, until: i64, on: &[i64]) -> Self {
        for time in 0..=until {
            let level = if on.contains(&time) {
                ExpressionLevel::Expressed
            } else {
                ExpressionLevel::NotExpressed
            };
            self = self.observe(gene, region, time, ExpressionSource::Unspecified, level);
        }
        self
    }

    /// Build the model.
    pub fn build(self) -> RegulatoryModel {
        self.model
    }
}

/// Two sibling domains under one embryo region, in contact over `[2, 6]`.
fn with_regions(builder: TestModelBuilder) -> TestModelBuilder {
    builder
        .region("embryo", 0, 2, &["embryo"])
        .region("veg1", 2, 6, &["embryo", "veg1"])
        .region("mes", 2, 6, &["embryo", "mes"])
        .contact(2, 6, "veg1", "mes")
}

/// A -> B, A -> C, B -> C, with A expressed in veg1 at 1..=3.
pub fn cascade_model() -> RegulatoryModel {
    let builder = TestModelBuilder::new()
        .gene("a", "A")
        .gene("b", "B")
        .gene("c", "C")
        .link("a", "b")
        .link("a", "c")
        .link("b", "c");
    with_regions(builder)
        .series("A", "veg1", 6, &[1, 2, 3])
        .build()
}

/// in -> x -> y -> x.
pub fn feedback_loop_model() -> RegulatoryModel {
    let builder = TestModelBuilder::new()
        .gene("in", "in")
        .gene("x", "x")
        .gene("y", "y")
        .link("in", "x")
        .link("x", "y")
        .link("y", "x");
    with_regions(builder).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grn_bool_core::ModelSource;

    #[test]
    fn test_cascade_model() {
        let model = cascade_model();
        assert_eq!(model.node_count(), 3);
        assert_eq!(model.link_count(), 3);
        assert_eq!(model.root_node_ids().len(), 1);
        assert_eq!(model.expression.times(), (0..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_feedback_loop_model() {
        let model = feedback_loop_model();
        let roots: Vec<String> = model
            .root_node_ids()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(roots, vec!["in".to_string()]);
        assert_eq!(model.regions.len(), 3);
    }
}
