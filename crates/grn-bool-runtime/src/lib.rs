//! Discrete-time boolean target runtime.
//!
//! This crate is the downstream side of a conversion. A [`TargetModel`] holds
//! genes, progenitor regions, lineage domains and their contact topology, an
//! expression grid, and the rules attached to each gene. Rules arrive both as
//! text (the interchange encoding) and, when available, as native
//! [`LogicNode`] trees allocated in the model's [`LogicArena`].
//!
//! ## Rule text
//!
//! ```text
//! G:<name>=<0|1>    gene value
//! NOT x             negation
//! x AND y, x OR y   connectives
//! AT<step> x        x evaluated at time + step
//! >t, <t            strict time comparisons
//! IN D:<region>     domain descends from region
//! ```
//!
//! [`parse_rule`] turns that text back into native logic, and [`Simulator`]
//! runs the model synchronously over every domain.

mod error;
mod logic;
mod model;
mod parser;
mod simulate;

pub use error::{RuntimeError, RuntimeResult};
pub use logic::{LogicArena, LogicId, LogicNode};
pub use model::{
    Domain, DomainContact, ExpressionCode, Gene, GeneHandle, GeneRule, TargetModel, TargetRegion,
};
pub use parser::parse_rule;
pub use simulate::{SimulationTrace, Simulator};
