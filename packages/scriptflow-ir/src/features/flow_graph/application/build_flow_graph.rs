use crate::features::flow_graph::domain::{BlockKind, CfgResult, ControlFlowGraph};
use crate::features::flow_graph::ports::FlowGraphBuilder;
use crate::shared::models::{NodeId, SyntaxTree};
use serde::Serialize;

/// Block and edge counts of a built graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowGraphSummary {
    pub blocks: usize,
    pub branching_blocks: usize,
    pub edges: usize,
    pub unreachable_blocks: usize,
}

impl FlowGraphSummary {
    pub fn of(cfg: &ControlFlowGraph) -> Self {
        Self {
            blocks: cfg.len(),
            branching_blocks: cfg
                .blocks()
                .iter()
                .filter(|b| b.kind() == BlockKind::Branching)
                .count(),
            edges: cfg.edges().len(),
            unreachable_blocks: cfg.unreachable_blocks().len(),
        }
    }
}

pub struct BuildFlowGraphUseCase<A: FlowGraphBuilder> {
    builder: A,
}

impl<A: FlowGraphBuilder> BuildFlowGraphUseCase<A> {
    pub fn new(builder: A) -> Self {
        Self { builder }
    }

    pub fn execute(&self, tree: &SyntaxTree, root: NodeId) -> CfgResult<ControlFlowGraph> {
        self.builder.build(tree, root)
    }

    /// Build every root independently; the first structural error wins.
    pub fn execute_all(&self, tree: &SyntaxTree, roots: &[NodeId]) -> CfgResult<Vec<ControlFlowGraph>> {
        roots.iter().map(|root| self.builder.build(tree, *root)).collect()
    }
}
