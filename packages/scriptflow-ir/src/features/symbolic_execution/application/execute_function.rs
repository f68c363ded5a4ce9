use crate::config::SymbolicExecutionConfig;
use crate::features::flow_graph::{CfgResult, ControlFlowGraph, FlowGraphBuilder};
use crate::features::symbolic_execution::domain::{ExecutionResult, FunctionScope};
use crate::features::symbolic_execution::infrastructure::SymbolicExecutionEngine;
use crate::features::symbolic_execution::ports::{ExecutionListener, SymbolResolver};
use crate::shared::models::{NodeId, SyntaxTree};
use crate::shared::CancellationToken;

/// Graph and exploration result of one function body
#[derive(Debug, Clone)]
pub struct FunctionExecution {
    pub cfg: ControlFlowGraph,
    pub result: ExecutionResult,
}

/// Build the CFG of a function body and explore it from the scope's
/// initial state.
pub struct ExecuteFunctionUseCase<B: FlowGraphBuilder> {
    builder: B,
    config: SymbolicExecutionConfig,
}

impl<B: FlowGraphBuilder> ExecuteFunctionUseCase<B> {
    pub fn new(builder: B, config: SymbolicExecutionConfig) -> Self {
        Self { builder, config }
    }

    pub fn config(&self) -> &SymbolicExecutionConfig {
        &self.config
    }

    /// Only graph construction can fail; execution problems end up in
    /// the result's status.
    pub fn execute(
        &self,
        tree: &SyntaxTree,
        body: NodeId,
        scope: &FunctionScope,
        resolver: &dyn SymbolResolver,
        cancellation: &CancellationToken,
        listener: &mut dyn ExecutionListener,
    ) -> CfgResult<FunctionExecution> {
        let cfg = self.builder.build(tree, body)?;
        let result = SymbolicExecutionEngine::new(&cfg, tree, resolver, self.config.clone())
            .with_cancellation(cancellation.clone())
            .execute(scope.initial_state(), listener);
        Ok(FunctionExecution { cfg, result })
    }
}
