//! Pipeline input and result types

use crate::errors::Result;
use crate::features::flow_graph::{ControlFlowGraph, FlowGraphSummary};
use crate::features::symbolic_execution::{ExecutionResult, ExecutionStatus, FunctionScope, SymbolResolver};
use crate::shared::models::{NodeId, SyntaxTree};

/// One function body to analyze, with what the host knows about its scope
#[derive(Clone, Copy)]
pub struct AnalysisUnit<'a> {
    /// Name used in log lines
    pub name: &'a str,
    pub tree: &'a SyntaxTree,
    /// Body block (or script root)
    pub root: NodeId,
    pub scope: &'a FunctionScope,
    pub resolver: &'a dyn SymbolResolver,
}

impl<'a> AnalysisUnit<'a> {
    pub fn new(
        name: &'a str,
        tree: &'a SyntaxTree,
        root: NodeId,
        scope: &'a FunctionScope,
        resolver: &'a dyn SymbolResolver,
    ) -> Self {
        Self {
            name,
            tree,
            root,
            scope,
            resolver,
        }
    }
}

impl std::fmt::Debug for AnalysisUnit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisUnit")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct FunctionAnalysis {
    pub name: String,
    pub cfg: ControlFlowGraph,
    pub summary: FlowGraphSummary,
    /// `None` when the symbolic execution stage is disabled
    pub execution: Option<ExecutionResult>,
}

impl FunctionAnalysis {
    pub fn status(&self) -> Option<ExecutionStatus> {
        self.execution.as_ref().map(|r| r.status)
    }
}

/// Aggregate over a batch of units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub units: usize,
    pub failed: usize,
    pub blocks: usize,
    pub block_executions: usize,
    pub incomplete: usize,
}

impl BatchSummary {
    pub fn of(results: &[Result<FunctionAnalysis>]) -> Self {
        results.iter().fold(
            Self {
                units: results.len(),
                ..Self::default()
            },
            |mut acc, result| {
                match result {
                    Ok(analysis) => {
                        acc.blocks += analysis.summary.blocks;
                        if let Some(execution) = &analysis.execution {
                            acc.block_executions += execution.stats.block_executions;
                            if !execution.status.is_complete() {
                                acc.incomplete += 1;
                            }
                        }
                    }
                    Err(_) => acc.failed += 1,
                }
                acc
            },
        )
    }
}
