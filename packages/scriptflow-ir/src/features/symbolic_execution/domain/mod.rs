pub mod constraint;
pub mod facts;
pub mod program_state;
pub mod scope;
pub mod symbolic_value;

pub use constraint::{Constraint, Nullability, Truthiness, Type};
pub use facts::{ConditionOutcome, ExecutionResult, ExecutionStats, ExecutionStatus, Fact};
pub use program_state::ProgramState;
pub use scope::{FunctionScope, ParameterSeed, VariableKind};
pub use symbolic_value::{
    LiteralValue, ObjectShape, PropertyResolution, RelationalOp, SymbolicValue,
};
