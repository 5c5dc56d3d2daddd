//! Boolean rule synthesis for gene regulatory networks.
//!
//! This crate turns a regulatory graph plus discretized expression time series
//! into rule equations for a discrete-time boolean simulator.
//!
//! ## Pipeline
//!
//! - **Edge classification**: a deterministic depth-first search partitions
//!   the edges into Forward and Feedback so that the Forward subgraph is
//!   acyclic ([`classify`]).
//! - **Equation trees**: every regulated node gets its forward regulators
//!   joined with AND and its feedback regulators joined with OR, each read one
//!   step in the past ([`EquationTreeBuilder`]).
//! - **Activation windows**: source nodes with expression data get a rule that
//!   holds in the region and time span they were observed on
//!   ([`find_window`]).
//! - **Rendering**: an [`EquationNode`] tree renders to the canonical text
//!   encoding ([`TextRenderer`]) or lowers into the runtime's native logic
//!   ([`TargetRenderer`]).
//!
//! ```text
//! forward {X, Y}, feedback {Z}
//!   => AT-1 G:X=1 AND AT-1 G:Y=1 OR AT-1 G:Z=1
//! ```
//!
//! [`ModelConverter`] runs all of it against a [`grn_bool_core::ModelSource`]
//! and fills a [`grn_bool_runtime::TargetModel`].

mod builder;
mod classify;
pub mod config;
mod convert;
mod equation;
mod error;
pub mod render;
mod window;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use builder::EquationTreeBuilder;
pub use classify::{classify, ClassifiedEdge, EdgeClass, EdgeClassification};
pub use config::{
    ActivationPredicate, SynthesisConfig, UnreachablePolicy, DEFAULT_CONTACT_DOMAIN, GENE_DELAY,
};
pub use convert::{
    Conversion, ConversionReport, Diagnostic, DiagnosticKind, ModelConverter, SimulatedRow,
};
pub use equation::{EquationKind, EquationNode, EquationRenderer};
pub use error::{SynthError, SynthResult};
pub use render::{to_text, TargetRenderer, TextRenderer};
pub use window::{find_window, TimeWindow};
