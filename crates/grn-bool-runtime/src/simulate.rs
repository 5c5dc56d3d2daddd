//! Synchronous discrete-time simulation of a target model.
//!
//! Every domain is simulated independently over `0..=max_time`. At each step a
//! gene is on when any of its lowered rules holds; genes without lowered rules
//! stay off. Gene reads must point strictly into the past, which the
//! simulator checks once before running.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};
use crate::logic::{LogicId, LogicNode};
use crate::model::{Domain, GeneHandle, TargetModel};

/// Gene values per (gene, domain, time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationTrace {
    genes: Vec<String>,
    domains: Vec<String>,
    max_time: i64,
    values: Vec<bool>,
}

impl SimulationTrace {
    fn new(genes: Vec<String>, domains: Vec<String>, max_time: i64) -> RuntimeResult<Self> {
        let values = vec![false; trace_len(genes.len(), domains.len(), max_time)?];
        Ok(Self {
            genes,
            domains,
            max_time,
            values,
        })
    }

    fn offset(&self, gene: usize, domain: usize, time: i64) -> Option<usize> {
        if time < 0 || time > self.max_time || gene >= self.genes.len() {
            return None;
        }
        if domain >= self.domains.len() {
            return None;
        }
        let steps = (self.max_time + 1) as usize;
        Some((gene * self.domains.len() + domain) * steps + time as usize)
    }

    fn set(&mut self, gene: usize, domain: usize, time: i64, value: bool) {
        if let Some(i) = self.offset(gene, domain, time) {
            self.values[i] = value;
        }
    }

    /// Last simulated time.
    pub fn max_time(&self) -> i64 {
        self.max_time
    }

    /// Domain names in simulation order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Value of a gene in a domain at a time.
    pub fn value(&self, gene: GeneHandle, domain: usize, time: i64) -> Option<bool> {
        self.offset(gene.index(), domain, time).map(|i| self.values[i])
    }

    /// Value looked up by gene and domain names.
    pub fn value_by_name(&self, gene: &str, domain: &str, time: i64) -> Option<bool> {
        let g = self.genes.iter().position(|n| n == gene)?;
        let d = self.domains.iter().position(|n| n == domain)?;
        self.offset(g, d, time).map(|i| self.values[i])
    }
}

/// Cells needed for `genes` x `domains` x `0..=max_time`.
fn trace_len(genes: usize, domains: usize, max_time: i64) -> RuntimeResult<usize> {
    let overflow = || RuntimeError::CapacityExceeded {
        what: "simulation trace",
    };
    let steps = max_time.checked_add(1).ok_or_else(overflow)?.max(0);
    let steps = usize::try_from(steps).map_err(|_| overflow())?;
    genes
        .checked_mul(domains)
        .and_then(|cells| cells.checked_mul(steps))
        .ok_or_else(overflow)
}

/// Runs a [`TargetModel`].
pub struct Simulator<'m> {
    model: &'m TargetModel,
}

impl<'m> Simulator<'m> {
    /// Prepare a simulation, rejecting rules that read a gene at the current
    /// step or later.
    pub fn new(model: &'m TargetModel) -> RuntimeResult<Self> {
        for (_, gene) in model.genes() {
            for root in gene.lowered_rules() {
                for (referenced, offset) in model.logic().gene_references(root)? {
                    if offset >= 0 {
                        return Err(RuntimeError::NonCausalReference {
                            gene: model.gene_data(referenced)?.name.clone(),
                            time: offset,
                            step: 0,
                        });
                    }
                }
            }
        }
        Ok(Self { model })
    }

    /// Simulate every domain over `0..=max_time`.
    pub fn run(&self) -> RuntimeResult<SimulationTrace> {
        let genes: Vec<String> = self.model.genes().map(|(_, g)| g.name.clone()).collect();
        let domains: Vec<String> = self.model.domains().iter().map(|d| d.name.clone()).collect();
        let max_time = self.model.max_time();
        let mut trace = SimulationTrace::new(genes, domains, max_time)?;

        for (d, domain) in self.model.domains().iter().enumerate() {
            for t in 0..=max_time {
                let mut step = Vec::with_capacity(self.model.gene_count());
                for (handle, gene) in self.model.genes() {
                    let mut on = false;
                    for root in gene.lowered_rules() {
                        if self.eval(root, domain, d, t, &trace)? {
                            on = true;
                            break;
                        }
                    }
                    step.push((handle, on));
                }
                for (handle, on) in step {
                    trace.set(handle.index(), d, t, on);
                }
            }
            debug!(domain = %domain.name, steps = max_time + 1, "Simulated domain");
        }

        Ok(trace)
    }

    fn eval(
        &self,
        id: LogicId,
        domain: &Domain,
        d: usize,
        time: i64,
        trace: &SimulationTrace,
    ) -> RuntimeResult<bool> {
        Ok(match self.model.logic().get(id)? {
            LogicNode::Gene { gene, value } => {
                let current = trace.value(*gene, d, time).unwrap_or(false);
                current == *value
            }
            LogicNode::Not(child) => !self.eval(*child, domain, d, time, trace)?,
            LogicNode::And(l, r) => {
                self.eval(*l, domain, d, time, trace)? && self.eval(*r, domain, d, time, trace)?
            }
            LogicNode::Or(l, r) => {
                self.eval(*l, domain, d, time, trace)? || self.eval(*r, domain, d, time, trace)?
            }
            LogicNode::At { step, child } => self.eval(*child, domain, d, time + step, trace)?,
            LogicNode::After(bound) => time > *bound,
            LogicNode::Before(bound) => time < *bound,
            LogicNode::InRegion(region) => domain.descends_from(region),
        })
    }
}
