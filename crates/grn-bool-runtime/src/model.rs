//! The target model: genes, regions, domains and the rules attached to genes.

use std::collections::{BTreeMap, HashMap};

use grn_bool_core::{ExpressionLevel, ExpressionSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};
use crate::logic::{checked_index, LogicArena, LogicId};

/// Handle to a gene inside a [`TargetModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GeneHandle(pub(crate) u32);

impl GeneHandle {
    /// Raw index into the model's gene table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Integer expression code stored in the runtime's expression grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExpressionCode {
    NoData = 0,
    NotExpressed = 1,
    Weak = 2,
    Expressed = 3,
    Maternal = 4,
}

impl ExpressionCode {
    /// Map an observation to its code.
    ///
    /// A maternal source wins over the level. Quantitative (`Variable`) levels
    /// have no code and return `None`.
    pub fn from_observation(source: ExpressionSource, level: ExpressionLevel) -> Option<Self> {
        if source == ExpressionSource::Maternal {
            return Some(ExpressionCode::Maternal);
        }
        match level {
            ExpressionLevel::NoData => Some(ExpressionCode::NoData),
            ExpressionLevel::NotExpressed => Some(ExpressionCode::NotExpressed),
            ExpressionLevel::Weak => Some(ExpressionCode::Weak),
            ExpressionLevel::Expressed => Some(ExpressionCode::Expressed),
            ExpressionLevel::Variable(_) => None,
        }
    }

    /// Numeric code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A rule attached to a gene: its text encoding and, when lowering succeeded,
/// the root of its native logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRule {
    pub text: String,
    pub logic: Option<LogicId>,
}

/// A gene (or non-gene network entity) of the target model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gene {
    pub name: String,
    pub is_gene: bool,
    pub is_ubiquitous: bool,
    pub rules: Vec<GeneRule>,
    expression: BTreeMap<(usize, i64), ExpressionCode>,
}

impl Gene {
    fn new(name: String, is_gene: bool) -> Self {
        Self {
            name,
            is_gene,
            is_ubiquitous: false,
            rules: Vec::new(),
            expression: BTreeMap::new(),
        }
    }

    /// Expression code for a region number and time, if one was recorded.
    pub fn expression(&self, region: usize, time: i64) -> Option<ExpressionCode> {
        self.expression.get(&(region, time)).copied()
    }

    /// Rule roots that were lowered to native logic.
    pub fn lowered_rules(&self) -> impl Iterator<Item = LogicId> + '_ {
        self.rules.iter().filter_map(|r| r.logic)
    }
}

/// A progenitor region, numbered in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRegion {
    pub name: String,
    pub number: usize,
    pub start: i64,
    pub end: i64,
}

/// Immediate cell contact with another domain over `[min_time, max_time]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainContact {
    pub domain: String,
    pub min_time: i64,
    pub max_time: i64,
}

/// A terminal leaf of the lineage tree; simulation runs once per domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub lineage: Vec<String>,
    pub contacts: Vec<DomainContact>,
}

impl Domain {
    /// Create a domain from its lineage.
    pub fn new(name: impl Into<String>, lineage: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lineage,
            contacts: Vec::new(),
        }
    }

    /// Whether the domain is, or descends from, `region`.
    pub fn descends_from(&self, region: &str) -> bool {
        self.lineage.iter().any(|r| r == region)
    }
}

/// The full target model a conversion populates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetModel {
    genes: Vec<Gene>,
    gene_index: HashMap<String, GeneHandle>,
    regions: Vec<TargetRegion>,
    domains: Vec<Domain>,
    max_time: i64,
    logic: LogicArena,
}

impl TargetModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Time ---

    pub fn max_time(&self) -> i64 {
        self.max_time
    }

    pub fn set_max_time(&mut self, max_time: i64) {
        self.max_time = max_time;
    }

    // --- Regions ---

    /// Add a region and return its number.
    pub fn add_region(&mut self, name: impl Into<String>, start: i64, end: i64) -> usize {
        let number = self.regions.len();
        let name = name.into();
        debug!(region = %name, number, start, end, "Added region");
        self.regions.push(TargetRegion {
            name,
            number,
            start,
            end,
        });
        number
    }

    pub fn region(&self, name: &str) -> Option<&TargetRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn regions(&self) -> &[TargetRegion] {
        &self.regions
    }

    // --- Domains ---

    pub fn add_domain(&mut self, domain: Domain) {
        self.domains.push(domain);
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Record that `from` is in contact with `to` over a time span.
    pub fn add_contact(
        &mut self,
        from: &str,
        to: &str,
        min_time: i64,
        max_time: i64,
    ) -> RuntimeResult<()> {
        if self.domain(to).is_none() {
            return Err(RuntimeError::UnknownRegion { name: to.to_string() });
        }
        let domain = self
            .domains
            .iter_mut()
            .find(|d| d.name == from)
            .ok_or_else(|| RuntimeError::UnknownRegion {
                name: from.to_string(),
            })?;
        domain.contacts.push(DomainContact {
            domain: to.to_string(),
            min_time,
            max_time,
        });
        Ok(())
    }

    // --- Genes ---

    /// Add a gene, or return the existing handle when the name is taken.
    pub fn add_gene(
        &mut self,
        name: impl Into<String>,
        is_gene: bool,
    ) -> RuntimeResult<GeneHandle> {
        let name = name.into();
        if let Some(&handle) = self.gene_index.get(&name) {
            debug!(gene = %name, "Gene already present");
            return Ok(handle);
        }
        let handle = GeneHandle(checked_index(self.genes.len(), "gene table")?);
        self.gene_index.insert(name.clone(), handle);
        self.genes.push(Gene::new(name, is_gene));
        Ok(handle)
    }

    /// Look up a gene by name.
    pub fn gene(&self, name: &str) -> Option<GeneHandle> {
        self.gene_index.get(name).copied()
    }

    /// Look up a gene by name, failing when it is missing.
    pub fn require_gene(&self, name: &str) -> RuntimeResult<GeneHandle> {
        self.gene(name).ok_or_else(|| RuntimeError::UnknownGene {
            name: name.to_string(),
        })
    }

    pub fn gene_data(&self, handle: GeneHandle) -> RuntimeResult<&Gene> {
        self.genes
            .get(handle.index())
            .ok_or_else(|| RuntimeError::UnknownGene {
                name: format!("#{}", handle.index()),
            })
    }

    pub fn gene_mut(&mut self, handle: GeneHandle) -> RuntimeResult<&mut Gene> {
        self.genes
            .get_mut(handle.index())
            .ok_or_else(|| RuntimeError::UnknownGene {
                name: format!("#{}", handle.index()),
            })
    }

    /// All genes with their handles, in insertion order.
    pub fn genes(&self) -> impl Iterator<Item = (GeneHandle, &Gene)> {
        (0u32..).zip(&self.genes).map(|(i, g)| (GeneHandle(i), g))
    }

    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    /// Record an expression code for a gene in a region at a time.
    pub fn set_expression(
        &mut self,
        handle: GeneHandle,
        region: &str,
        time: i64,
        code: ExpressionCode,
    ) -> RuntimeResult<()> {
        let number = self
            .region(region)
            .map(|r| r.number)
            .ok_or_else(|| RuntimeError::UnknownRegion {
                name: region.to_string(),
            })?;
        self.gene_mut(handle)?.expression.insert((number, time), code);
        Ok(())
    }

    // --- Rules ---

    /// Attach a rule to a gene. `text` is stored verbatim.
    pub fn attach_rule(
        &mut self,
        handle: GeneHandle,
        text: impl Into<String>,
        logic: Option<LogicId>,
    ) -> RuntimeResult<()> {
        if let Some(root) = logic {
            self.logic.get(root)?;
        }
        let gene = self.gene_mut(handle)?;
        gene.rules.push(GeneRule {
            text: text.into(),
            logic,
        });
        Ok(())
    }

    pub fn logic(&self) -> &LogicArena {
        &self.logic
    }

    pub fn logic_mut(&mut self) -> &mut LogicArena {
        &mut self.logic
    }
}
