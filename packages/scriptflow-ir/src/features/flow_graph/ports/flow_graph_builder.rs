use crate::features::flow_graph::domain::{CfgResult, ControlFlowGraph};
use crate::shared::models::{NodeId, SyntaxTree};

/// Builds the control-flow graph rooted at a syntax node (script, function
/// body block or single statement).
pub trait FlowGraphBuilder: Send + Sync {
    fn build(&self, tree: &SyntaxTree, root: NodeId) -> CfgResult<ControlFlowGraph>;
}
