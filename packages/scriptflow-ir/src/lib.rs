/*
 * Scriptflow IR - Control-flow and symbolic analysis for scripts
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Syntax tree, spans, variable ids, cancellation
 * - features/    : Vertical slices (flow_graph → symbolic_execution)
 * - pipeline/    : Orchestration over function units
 * - config/      : Presets, stage overrides, YAML
 *
 * Performance:
 * - Frozen graphs and value-type states, shareable across threads
 * - Rayon work-stealing over independent functions
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Builder entry points take the whole context
#![allow(clippy::type_complexity)] // Worklist entries are tuples
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::match_like_matches_macro)] // Match for readability

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (flow graphs, symbolic execution)
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system (presets, overrides, YAML)
pub mod config;

/// Crate-level error type
pub mod errors;

pub use config::{PipelineConfig, Preset, ValidatedConfig};
pub use errors::{Result, ScriptflowError};
pub use features::flow_graph::{ControlFlowGraph, FlowGraphBuilder, ScriptFlowGraphBuilder};
pub use features::symbolic_execution::{
    Constraint, ExecutionListener, ExecutionResult, FunctionScope, ProgramState, SymbolResolver,
    SymbolicExecutionEngine,
};
pub use pipeline::{AnalysisUnit, FunctionAnalysis, Orchestrator};
pub use shared::CancellationToken;
