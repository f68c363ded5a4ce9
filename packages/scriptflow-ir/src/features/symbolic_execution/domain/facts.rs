//! Execution output
//!
//! What a run of the engine hands to the rule layer: per-node facts, terminal
//! states, observed condition outcomes and run statistics.

use super::constraint::Constraint;
use super::program_state::ProgramState;
use crate::features::flow_graph::BlockId;
use crate::shared::models::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Constraint of the value a node produced on one explored path. Every
/// executed element yields one; statements leave no value and report
/// `ANY_VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub block: BlockId,
    pub node: NodeId,
    pub constraint: Constraint,
    /// Operand constraints captured before the node consumed them
    pub operands: Vec<Constraint>,
}

/// Which outcomes of a condition were observed over all paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionOutcome {
    pub truthy: bool,
    pub falsy: bool,
}

impl ConditionOutcome {
    pub fn always_true(&self) -> bool {
        self.truthy && !self.falsy
    }

    pub fn always_false(&self) -> bool {
        self.falsy && !self.truthy
    }

    pub(crate) fn record(&mut self, truthy: bool) {
        if truthy {
            self.truthy = true;
        } else {
            self.falsy = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Every reachable `(block, state)` pair was explored or capped
    Completed,
    /// The cancellation token was set between block visits
    Cancelled,
    /// The global block-execution budget ran out
    BudgetExhausted,
    /// The function contains a construct the engine does not model (`try`)
    Abandoned,
}

impl ExecutionStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, ExecutionStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Cancelled => "cancelled",
            ExecutionStatus::BudgetExhausted => "budget_exhausted",
            ExecutionStatus::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Number of `(block, state)` pairs executed
    pub block_executions: usize,
    /// Pairs skipped because they were already explored
    pub memo_hits: usize,
    /// States dropped by the per-block cap
    pub truncated_states: usize,
    /// Edges or elements that produced no feasible state
    pub pruned_paths: usize,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub facts: Vec<Fact>,
    /// States that reached the end block
    pub terminal_states: Vec<ProgramState>,
    pub condition_outcomes: BTreeMap<NodeId, ConditionOutcome>,
    pub status: ExecutionStatus,
    pub stats: ExecutionStats,
}

impl ExecutionResult {
    pub(crate) fn empty(status: ExecutionStatus) -> Self {
        Self {
            facts: Vec::new(),
            terminal_states: Vec::new(),
            condition_outcomes: BTreeMap::new(),
            status,
            stats: ExecutionStats::default(),
        }
    }

    /// Union of the constraints observed for `node` over every path
    pub fn constraint_of(&self, node: NodeId) -> Option<Constraint> {
        self.facts_for(node)
            .map(|fact| fact.constraint)
            .reduce(Constraint::or)
    }

    pub fn facts_for(&self, node: NodeId) -> impl Iterator<Item = &Fact> {
        self.facts.iter().filter(move |fact| fact.node == node)
    }

    pub fn condition_outcome(&self, node: NodeId) -> Option<ConditionOutcome> {
        self.condition_outcomes.get(&node).copied()
    }
}
