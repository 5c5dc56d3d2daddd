//! Error types for equation synthesis.

use grn_bool_core::NodeId;
use grn_bool_runtime::RuntimeError;
use thiserror::Error;

use crate::equation::EquationKind;

/// Result type alias for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur during synthesis and lowering.
#[derive(Debug, Error)]
pub enum SynthError {
    /// The equation contains a node the target runtime cannot represent.
    #[error("unsupported AST node for target lowering: {kind}")]
    UnsupportedLowering { kind: EquationKind },

    /// A gene referenced by an equation is missing from the target model.
    #[error("gene not found in target model: {name}")]
    UnknownGene { name: String },

    /// A predecessor has no leaf equation (not a gene or intercell node).
    #[error("node has no equation leaf: {id}")]
    UnresolvedNode { id: NodeId },

    /// The target runtime rejected an operation.
    #[error("target runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Configuration or model (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
