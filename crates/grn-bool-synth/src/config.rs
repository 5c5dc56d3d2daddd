//! Synthesis configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all) is a
//! valid configuration.

use std::path::Path;

use grn_bool_core::{ExpressionEntry, ExpressionLevel, ExpressionSource};
use serde::{Deserialize, Serialize};

use crate::error::SynthResult;

/// Delay, in simulation steps, between a regulator's state and its effect.
///
/// A node's value at `t` depends on its regulators at `t + GENE_DELAY`
/// (synchronous update).
pub const GENE_DELAY: i64 = -1;

/// Domain named in the cell-contact qualifier of intercell signals.
pub const DEFAULT_CONTACT_DOMAIN: &str = "R";

/// Normalized-name marker of ubiquitous entities.
pub const UBIQUITOUS_MARKER: &str = "UBIQ";

/// The (source, level) an observation must carry for a source node to be
/// considered active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationPredicate {
    #[serde(default)]
    pub source: ExpressionSource,
    #[serde(default = "default_level")]
    pub level: ExpressionLevel,
}

fn default_level() -> ExpressionLevel {
    ExpressionLevel::Expressed
}

impl Default for ActivationPredicate {
    fn default() -> Self {
        Self {
            source: ExpressionSource::Unspecified,
            level: default_level(),
        }
    }
}

impl ActivationPredicate {
    pub fn new(source: ExpressionSource, level: ExpressionLevel) -> Self {
        Self { source, level }
    }

    /// Whether an observed entry satisfies the predicate.
    pub fn matches(&self, entry: &ExpressionEntry) -> bool {
        entry.is(self.source, self.level)
    }
}

/// What to do with edges among vertices no root can reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachablePolicy {
    /// Leave their edges Forward.
    #[default]
    Forward,
    /// Keep searching from each unvisited vertex in id order, so cycles among
    /// unreachable vertices are broken as well.
    BreakCycles,
}

impl UnreachablePolicy {
    /// Parse the snake_case name used in configuration files.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "forward" => Some(UnreachablePolicy::Forward),
            "break_cycles" => Some(UnreachablePolicy::BreakCycles),
            _ => None,
        }
    }
}

/// Configuration for a model conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Time shift applied to every regulator reference.
    #[serde(default = "default_gene_delay")]
    pub gene_delay: i64,
    /// Predicate defining activation windows of source nodes.
    #[serde(default)]
    pub input_predicate: ActivationPredicate,
    /// Handling of vertices unreachable from the roots.
    #[serde(default)]
    pub unreachable_policy: UnreachablePolicy,
    /// Flag entities whose name contains the ubiquitous marker.
    #[serde(default)]
    pub ubiquitous_detection: bool,
    /// Domain used in the cell-contact qualifier of intercell signals.
    #[serde(default = "default_contact_domain")]
    pub intercell_contact_domain: String,
}

fn default_gene_delay() -> i64 {
    GENE_DELAY
}

fn default_contact_domain() -> String {
    DEFAULT_CONTACT_DOMAIN.to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            gene_delay: default_gene_delay(),
            input_predicate: ActivationPredicate::default(),
            unreachable_policy: UnreachablePolicy::default(),
            ubiquitous_detection: false,
            intercell_contact_domain: default_contact_domain(),
        }
    }
}

impl SynthesisConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SynthResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> SynthResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
