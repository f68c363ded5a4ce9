pub mod execute_function;

pub use execute_function::{ExecuteFunctionUseCase, FunctionExecution};
