//! Error types for the target runtime.

use thiserror::Error;

use crate::logic::LogicId;

/// Result type alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur while building or running a target model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A gene referenced by name is not part of the model.
    #[error("gene not found: {name}")]
    UnknownGene { name: String },

    /// A region referenced by name is not part of the model.
    #[error("region not found: {name}")]
    UnknownRegion { name: String },

    /// A logic id does not belong to this model's arena.
    #[error("logic node not found: {id:?}")]
    UnknownLogic { id: LogicId },

    /// Rule text could not be parsed.
    #[error("rule parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    /// A rule token is valid text encoding but has no runtime meaning.
    #[error("unsupported rule token: {token}")]
    UnsupportedToken { token: String },

    /// A count or index outgrew the runtime's storage.
    #[error("capacity exceeded: {what}")]
    CapacityExceeded { what: &'static str },

    /// A gene value was read at a time not strictly before the current step.
    #[error("gene {gene} read at time {time}, which is not before step {step}")]
    NonCausalReference { gene: String, time: i64, step: i64 },
}
