/*
 * Symbolic Execution Feature
 *
 * Path-sensitive exploration of a frozen control-flow graph over an
 * abstract domain of value constraints.
 *
 * Architecture:
 * - Domain: Constraint lattice, symbolic values, ProgramState, facts
 * - Ports: SymbolResolver (host scope analysis), ExecutionListener (rules)
 * - Infrastructure: program points, branch narrowing, built-in property
 *   tables, live-variable analysis, worklist engine
 * - Application: ExecuteFunctionUseCase
 *
 * Algorithm:
 * - Forward exploration of (block, state) pairs, FIFO
 * - Branch edges narrow the condition by TRUTHY / FALSY; bottom prunes
 * - Structural memo plus a per-block state cap guarantee termination
 *
 * States are plain values (stack + sorted constraint map), so exploring
 * different branches never shares mutable data.
 */

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{ExecuteFunctionUseCase, FunctionExecution};
pub use domain::{
    ConditionOutcome, Constraint, ExecutionResult, ExecutionStats, ExecutionStatus, Fact,
    FunctionScope, LiteralValue, Nullability, ObjectShape, ParameterSeed, ProgramState,
    PropertyResolution, RelationalOp, SymbolicValue, Truthiness, Type, VariableKind,
};
pub use infrastructure::{LiveVariables, SymbolicExecutionEngine};
pub use ports::{ExecutionListener, NoTrackedVariables, NoopListener, SymbolResolver};
