//! Renderers over [`EquationNode`](crate::EquationNode) trees.
//!
//! - [`TextRenderer`] produces the canonical text encoding.
//! - [`TargetRenderer`] lowers into the target runtime's native logic.

mod target;
mod text;

pub use target::TargetRenderer;
pub use text::{to_text, TextRenderer};
