use crate::features::flow_graph::{BlockId, ControlFlowGraph};
use crate::features::symbolic_execution::domain::{ExecutionStats, ExecutionStatus, ProgramState};
use crate::shared::models::NodeId;

/// Observer of a symbolic execution run (rule checks hook in here)
///
/// Every hook has an empty default body.
pub trait ExecutionListener {
    fn on_start(&mut self, _cfg: &ControlFlowGraph, _initial: &ProgramState) {}

    fn before_element(&mut self, _block: BlockId, _node: NodeId, _state: &ProgramState) {}

    fn after_element(&mut self, _block: BlockId, _node: NodeId, _state: &ProgramState) {}

    /// A path reached the end block
    fn on_end_of_path(&mut self, _state: &ProgramState) {}

    fn on_end_of_execution(&mut self, _status: ExecutionStatus, _stats: &ExecutionStats) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ExecutionListener for NoopListener {}
