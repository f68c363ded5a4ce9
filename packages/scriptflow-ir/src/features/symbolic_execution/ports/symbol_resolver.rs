use crate::shared::models::{NodeId, SyntaxTree, VariableId};

/// Variable identity supplied by the host's scope analysis.
///
/// Only variables whose every read and write is visible in the analyzed
/// function should be reported; anything else (globals, variables captured
/// by nested functions) must resolve to `None` so the engine leaves it
/// unknown.
pub trait SymbolResolver: Send + Sync {
    /// Tracked variable an identifier node (reference or binding) refers to
    fn tracked_variable(&self, tree: &SyntaxTree, node: NodeId) -> Option<VariableId>;
}

/// Resolver that tracks nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrackedVariables;

impl SymbolResolver for NoTrackedVariables {
    fn tracked_variable(&self, _tree: &SyntaxTree, _node: NodeId) -> Option<VariableId> {
        None
    }
}
