//! Shared models

mod span;
pub mod syntax;
mod variable;

pub use span::{Location, Span};
pub use syntax::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree, SyntaxTreeBuilder};
pub use variable::VariableId;
