use super::cfg_builder::ControlFlowGraphBuilder;
use crate::config::FlowGraphConfig;
use crate::features::flow_graph::domain::{CfgResult, ControlFlowGraph};
use crate::features::flow_graph::ports::FlowGraphBuilder;
use crate::shared::models::{NodeId, SyntaxTree};

/// Default [`FlowGraphBuilder`] for script syntax trees
#[derive(Debug, Clone, Default)]
pub struct ScriptFlowGraphBuilder {
    config: FlowGraphConfig,
}

impl ScriptFlowGraphBuilder {
    pub fn new(config: FlowGraphConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlowGraphConfig {
        &self.config
    }
}

impl FlowGraphBuilder for ScriptFlowGraphBuilder {
    fn build(&self, tree: &SyntaxTree, root: NodeId) -> CfgResult<ControlFlowGraph> {
        ControlFlowGraphBuilder::new(tree, &self.config).build(root)
    }
}
