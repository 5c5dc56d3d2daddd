//! Lowering of equations into the target runtime's native logic.
//!
//! Connectives, negation, gene values, time shifts, strict time comparisons and
//! region membership all have native counterparts. Cell-contact qualifiers
//! (`ImmediateCellContact` and the `Modifier` that carries them) do not, and
//! lowering them fails with [`SynthError::UnsupportedLowering`].
//!
//! The tree is checked in full before anything is allocated, so a failed
//! lowering leaves the model's arena untouched.

use grn_bool_runtime::{LogicId, RuntimeError, TargetModel};

use crate::equation::{EquationNode, EquationRenderer};
use crate::error::{SynthError, SynthResult};

/// Lowers equations into a [`TargetModel`]'s logic arena.
pub struct TargetRenderer<'m> {
    model: &'m mut TargetModel,
}

impl<'m> TargetRenderer<'m> {
    pub fn new(model: &'m mut TargetModel) -> Self {
        Self { model }
    }

    /// Check that every node of the tree can be lowered.
    pub fn check(&self, node: &EquationNode) -> SynthResult<()> {
        match node {
            EquationNode::GeneValue { name, .. } => {
                if self.model.gene(name).is_none() {
                    return Err(SynthError::UnknownGene { name: name.clone() });
                }
                Ok(())
            }
            EquationNode::Not(child) | EquationNode::TimeShift { child, .. } => self.check(child),
            EquationNode::And(l, r) | EquationNode::Or(l, r) => {
                self.check(l)?;
                self.check(r)
            }
            EquationNode::GreaterThanTime(_) | EquationNode::LessThanTime(_) => Ok(()),
            EquationNode::InRegion(region) => {
                if self.model.region(region).is_none() {
                    return Err(RuntimeError::UnknownRegion {
                        name: region.clone(),
                    }
                    .into());
                }
                Ok(())
            }
            EquationNode::ImmediateCellContact(_) | EquationNode::Modifier(..) => {
                Err(SynthError::UnsupportedLowering { kind: node.kind() })
            }
        }
    }

    fn build(&mut self, node: &EquationNode) -> SynthResult<LogicId> {
        let id = match node {
            EquationNode::GeneValue { name, value, .. } => {
                let gene = self
                    .model
                    .gene(name)
                    .ok_or_else(|| SynthError::UnknownGene { name: name.clone() })?;
                self.model.logic_mut().gene(gene, *value)?
            }
            EquationNode::Not(child) => {
                let child = self.build(child)?;
                self.model.logic_mut().not(child)?
            }
            EquationNode::And(l, r) => {
                let (l, r) = (self.build(l)?, self.build(r)?);
                self.model.logic_mut().and(l, r)?
            }
            EquationNode::Or(l, r) => {
                let (l, r) = (self.build(l)?, self.build(r)?);
                self.model.logic_mut().or(l, r)?
            }
            EquationNode::TimeShift { child, delta } => {
                let child = self.build(child)?;
                self.model.logic_mut().at(*delta, child)?
            }
            EquationNode::GreaterThanTime(t) => self.model.logic_mut().after(*t)?,
            EquationNode::LessThanTime(t) => self.model.logic_mut().before(*t)?,
            EquationNode::InRegion(region) => {
                self.model.logic_mut().in_region(region.clone())?
            }
            EquationNode::ImmediateCellContact(_) | EquationNode::Modifier(..) => {
                return Err(SynthError::UnsupportedLowering { kind: node.kind() })
            }
        };
        Ok(id)
    }
}

impl EquationRenderer for TargetRenderer<'_> {
    type Output = SynthResult<LogicId>;

    fn render(&mut self, node: &EquationNode) -> SynthResult<LogicId> {
        self.check(node)?;
        self.build(node)
    }
}
