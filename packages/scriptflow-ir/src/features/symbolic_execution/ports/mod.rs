pub mod execution_listener;
pub mod symbol_resolver;

pub use execution_listener::{ExecutionListener, NoopListener};
pub use symbol_resolver::{NoTrackedVariables, SymbolResolver};
