//! Custom assertions for test verification

use scriptflow_ir::features::flow_graph::{BlockId, ControlFlowGraph};
use scriptflow_ir::features::symbolic_execution::{Constraint, ExecutionResult, ExecutionStatus};
use scriptflow_ir::shared::models::NodeId;
use std::collections::{BTreeSet, VecDeque};

/// Union of the constraints observed for `node` must equal `expected`
pub fn assert_constraint(result: &ExecutionResult, node: NodeId, expected: Constraint) {
    assert_eq!(
        result.constraint_of(node),
        Some(expected),
        "constraint of {node}; facts: {:?}",
        result.facts_for(node).collect::<Vec<_>>()
    );
}

pub fn assert_always_true(result: &ExecutionResult, condition: NodeId) {
    let outcome = result
        .condition_outcome(condition)
        .unwrap_or_else(|| panic!("no outcome recorded for {condition}"));
    assert!(outcome.always_true(), "{condition} outcome {outcome:?}");
}

pub fn assert_always_false(result: &ExecutionResult, condition: NodeId) {
    let outcome = result
        .condition_outcome(condition)
        .unwrap_or_else(|| panic!("no outcome recorded for {condition}"));
    assert!(outcome.always_false(), "{condition} outcome {outcome:?}");
}

pub fn assert_both_outcomes(result: &ExecutionResult, condition: NodeId) {
    let outcome = result
        .condition_outcome(condition)
        .unwrap_or_else(|| panic!("no outcome recorded for {condition}"));
    assert!(outcome.truthy && outcome.falsy, "{condition} outcome {outcome:?}");
}

pub fn assert_completed(result: &ExecutionResult) {
    assert_eq!(result.status, ExecutionStatus::Completed, "stats: {:?}", result.stats);
}

/// Blocks reachable from the start block
pub fn reachable(cfg: &ControlFlowGraph) -> BTreeSet<BlockId> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([cfg.start()]);
    while let Some(block) = queue.pop_front() {
        if seen.insert(block) {
            queue.extend(cfg.block(block).successors().iter().copied());
        }
    }
    seen
}

/// Every successor edge has a matching predecessor entry and vice versa
pub fn assert_edges_consistent(cfg: &ControlFlowGraph) {
    for block in cfg.blocks() {
        for successor in block.successors() {
            assert!(
                cfg.block(*successor).predecessors().contains(&block.id()),
                "{:?} -> {:?} missing from predecessors",
                block.id(),
                successor
            );
        }
        for predecessor in block.predecessors() {
            assert!(
                cfg.block(*predecessor).successors().contains(&block.id()),
                "{:?} <- {:?} missing from successors",
                block.id(),
                predecessor
            );
        }
    }
}
