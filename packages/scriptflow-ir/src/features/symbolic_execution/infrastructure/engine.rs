//! Symbolic execution engine
//!
//! Explores `(block, ProgramState)` pairs of one frozen CFG with a FIFO
//! worklist.
//!
//! Termination:
//! - memo of every `(block, state)` pair already queued (structural equality)
//! - at most `max_states_per_block` distinct states per block; extra states
//!   are dropped and counted as truncated
//! - global budget of `max_block_executions` block visits
//!
//! Cancellation is polled between block visits. Every stop condition returns
//! the facts gathered so far.

use super::branching;
use super::liveness::LiveVariables;
use super::program_points::{self, PointContext};
use crate::config::SymbolicExecutionConfig;
use crate::features::flow_graph::{BlockId, ControlFlowGraph};
use crate::features::symbolic_execution::domain::{
    ExecutionResult, ExecutionStatus, Fact, ProgramState,
};
use crate::features::symbolic_execution::ports::{ExecutionListener, SymbolResolver};
use crate::shared::models::{NodeId, SyntaxKind, SyntaxTree};
use crate::shared::CancellationToken;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

pub struct SymbolicExecutionEngine<'a> {
    cfg: &'a ControlFlowGraph,
    tree: &'a SyntaxTree,
    resolver: &'a dyn SymbolResolver,
    config: SymbolicExecutionConfig,
    cancellation: CancellationToken,
}

/// Mutable bookkeeping of one run
struct Exploration<'l> {
    worklist: VecDeque<(BlockId, ProgramState)>,
    memo: FxHashSet<(BlockId, ProgramState)>,
    states_per_block: Vec<usize>,
    liveness: Option<LiveVariables>,
    result: ExecutionResult,
    listener: &'l mut dyn ExecutionListener,
}

impl<'a> SymbolicExecutionEngine<'a> {
    pub fn new(
        cfg: &'a ControlFlowGraph,
        tree: &'a SyntaxTree,
        resolver: &'a dyn SymbolResolver,
        config: SymbolicExecutionConfig,
    ) -> Self {
        Self {
            cfg,
            tree,
            resolver,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn config(&self) -> &SymbolicExecutionConfig {
        &self.config
    }

    /// Explore every feasible path from the start block with `initial` as
    /// the entry state.
    pub fn execute(&self, initial: ProgramState, listener: &mut dyn ExecutionListener) -> ExecutionResult {
        listener.on_start(self.cfg, &initial);

        if self.config.abandon_on_try && self.contains_try() {
            debug!("symbolic execution abandoned: try statements are not modeled");
            let result = ExecutionResult::empty(ExecutionStatus::Abandoned);
            listener.on_end_of_execution(result.status, &result.stats);
            return result;
        }

        let liveness = self
            .config
            .prune_dead_variables
            .then(|| LiveVariables::analyze(self.cfg, self.tree, self.resolver));

        let mut run = Exploration {
            worklist: VecDeque::new(),
            memo: FxHashSet::default(),
            states_per_block: vec![0; self.cfg.len()],
            liveness,
            result: ExecutionResult::empty(ExecutionStatus::Completed),
            listener,
        };
        self.enqueue(&mut run, self.cfg.start(), initial);

        let mut status = ExecutionStatus::Completed;
        while let Some((block, state)) = run.worklist.pop_front() {
            if self.cancellation.is_cancelled() {
                status = ExecutionStatus::Cancelled;
                break;
            }
            if run.result.stats.block_executions >= self.config.max_block_executions {
                warn!(
                    budget = self.config.max_block_executions,
                    pending = run.worklist.len() + 1,
                    "symbolic execution budget exhausted"
                );
                status = ExecutionStatus::BudgetExhausted;
                break;
            }
            run.result.stats.block_executions += 1;
            self.execute_block(&mut run, block, state);
        }

        let Exploration {
            mut result,
            listener,
            ..
        } = run;
        result.status = status;

        debug!(
            blocks = self.cfg.len(),
            block_executions = result.stats.block_executions,
            memo_hits = result.stats.memo_hits,
            truncated_states = result.stats.truncated_states,
            pruned_paths = result.stats.pruned_paths,
            facts = result.facts.len(),
            status = %result.status,
            "symbolic execution finished"
        );
        listener.on_end_of_execution(result.status, &result.stats);
        result
    }

    fn contains_try(&self) -> bool {
        self.cfg.blocks().iter().any(|block| {
            block
                .branching_node()
                .is_some_and(|node| self.tree.is(node, SyntaxKind::Try))
        })
    }

    fn enqueue(&self, run: &mut Exploration<'_>, block: BlockId, mut state: ProgramState) {
        let is_end = block == self.cfg.end();
        if !is_end {
            if let Some(liveness) = &run.liveness {
                state.retain_variables(liveness.live_in(block));
            }
        }

        if is_end {
            if run.memo.insert((block, state.clone())) {
                run.listener.on_end_of_path(&state);
                run.result.terminal_states.push(state);
            } else {
                run.result.stats.memo_hits += 1;
            }
            return;
        }

        let key = (block, state);
        if run.memo.contains(&key) {
            run.result.stats.memo_hits += 1;
            return;
        }
        let visits = &mut run.states_per_block[block.index()];
        if *visits >= self.config.max_states_per_block {
            trace!(block = %block, "state cap reached, dropping state");
            run.result.stats.truncated_states += 1;
            return;
        }
        *visits += 1;
        run.memo.insert(key.clone());
        run.worklist.push_back(key);
    }

    fn execute_block(&self, run: &mut Exploration<'_>, id: BlockId, mut state: ProgramState) {
        let ctx = PointContext {
            tree: self.tree,
            resolver: self.resolver,
            property_resolution: self.config.property_resolution,
        };
        let block = self.cfg.block(id);

        for element in block.elements() {
            run.listener.before_element(id, *element, &state);
            let Some(outcome) = program_points::execute(&ctx, *element, &state) else {
                trace!(block = %id, node = %element, "infeasible program point");
                run.result.stats.pruned_paths += 1;
                return;
            };
            state = outcome.state;

            run.result.facts.push(Fact {
                block: id,
                node: *element,
                constraint: state.peek_constraint(),
                operands: outcome.operands,
            });
            if self.is_for_clause(*element) {
                state.clear_stack();
            }
            run.listener.after_element(id, *element, &state);
        }

        let branch = block
            .branching_node()
            .zip(block.true_successor())
            .zip(block.false_successor());
        match branch {
            Some(((node, on_true), on_false)) => {
                let decided = branching::decided_expression(self.tree, self.cfg, node);
                for (truthy, target) in [(true, on_true), (false, on_false)] {
                    match branching::follow_edge(&ctx, self.cfg, node, &state, truthy) {
                        Some(next) => {
                            if let Some(condition) = decided {
                                run.result
                                    .condition_outcomes
                                    .entry(condition)
                                    .or_default()
                                    .record(truthy);
                            }
                            self.enqueue(run, target, next);
                        }
                        None => run.result.stats.pruned_paths += 1,
                    }
                }
            }
            None => {
                for successor in block.successors() {
                    self.enqueue(run, *successor, state.clone());
                }
            }
        }
    }

    /// Init and update clauses of a `for` run as expression statements
    fn is_for_clause(&self, node: NodeId) -> bool {
        let mut clause = node;
        while let Some(parent) = self.tree.parent(clause) {
            match self.tree.kind(parent) {
                SyntaxKind::Parenthesised => clause = parent,
                SyntaxKind::For => {
                    return self.tree.child(parent, 0) == Some(clause)
                        || self.tree.child(parent, 2) == Some(clause);
                }
                _ => return false,
            }
        }
        false
    }
}
