pub mod cfg;
pub mod error;

pub use cfg::{BlockId, BlockKind, BranchLabel, CfgBlock, CfgEdge, ControlFlowGraph};
pub use error::{CfgError, CfgResult, JumpKind};
