//! Flow Graph infrastructure

mod cfg_builder;
pub mod script_builder;

pub use script_builder::ScriptFlowGraphBuilder;
