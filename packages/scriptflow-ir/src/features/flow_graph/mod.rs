/*
 * Flow Graph Feature
 *
 * Control-flow graphs of function bodies and scripts.
 *
 * Architecture:
 * - Domain: frozen ControlFlowGraph, blocks, edges, structural errors
 * - Ports: FlowGraphBuilder trait
 * - Infrastructure: arena-based backward builder
 * - Application: BuildFlowGraphUseCase
 *
 * Loops are plain cycles of block indices; the graph is immutable once
 * built and can be shared across threads.
 */

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{BuildFlowGraphUseCase, FlowGraphSummary};
pub use domain::{
    BlockId, BlockKind, BranchLabel, CfgBlock, CfgEdge, CfgError, CfgResult, ControlFlowGraph,
    JumpKind,
};
pub use infrastructure::ScriptFlowGraphBuilder;
pub use ports::FlowGraphBuilder;
