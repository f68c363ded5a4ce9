//! Symbolic execution infrastructure

mod branching;
mod builtin_properties;
pub mod engine;
pub mod liveness;
mod program_points;

pub use engine::SymbolicExecutionEngine;
pub use liveness::LiveVariables;
