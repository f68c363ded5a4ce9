//! Live-variable analysis
//!
//! Backward may-analysis over the CFG. A variable is live at a block entry
//! when some path from there reads it before writing it. The engine drops
//! dead variables from states so that paths differing only in values nobody
//! reads again hit the same memo entry.

use crate::features::flow_graph::{BlockId, ControlFlowGraph};
use crate::features::symbolic_execution::ports::SymbolResolver;
use crate::shared::models::{NodeId, SyntaxKind, SyntaxTree, VariableId};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Read,
    Write,
}

/// Plain `=` targets and initialized bindings are writes; compound
/// assignments and `++`/`--` read first.
fn usage(tree: &SyntaxTree, node: NodeId) -> Option<Usage> {
    let parent = tree.parent(node);
    let is_first_child = |parent: NodeId| tree.child(parent, 0) == Some(node);
    match parent.map(|p| (p, tree.kind(p))) {
        Some((p, SyntaxKind::Assignment | SyntaxKind::InitializedBinding)) if is_first_child(p) => {
            Some(Usage::Write)
        }
        Some((p, SyntaxKind::ForIn | SyntaxKind::ForOf)) if is_first_child(p) => Some(Usage::Write),
        Some((_, SyntaxKind::CatchClause)) => Some(Usage::Write),
        Some((p, SyntaxKind::VariableDeclaration))
            if tree.kind(node) == SyntaxKind::BindingIdentifier =>
        {
            let in_loop_head = tree
                .parent(p)
                .is_some_and(|g| matches!(tree.kind(g), SyntaxKind::ForIn | SyntaxKind::ForOf));
            // `var x;` leaves x as it was
            in_loop_head.then_some(Usage::Write)
        }
        _ => Some(Usage::Read),
    }
}

#[derive(Debug, Clone, Default)]
struct BlockUsage {
    gen: FxHashSet<VariableId>,
    kill: FxHashSet<VariableId>,
}

#[derive(Debug, Clone)]
pub struct LiveVariables {
    live_in: Vec<FxHashSet<VariableId>>,
    live_out: Vec<FxHashSet<VariableId>>,
}

impl LiveVariables {
    pub fn analyze(cfg: &ControlFlowGraph, tree: &SyntaxTree, resolver: &dyn SymbolResolver) -> Self {
        let usages: Vec<BlockUsage> = cfg
            .blocks()
            .iter()
            .map(|block| {
                let mut usage_of_block = BlockUsage::default();
                for element in block.elements().iter().rev() {
                    if !tree.kind(*element).is_identifier() {
                        continue;
                    }
                    let Some(variable) = resolver.tracked_variable(tree, *element) else {
                        continue;
                    };
                    match usage(tree, *element) {
                        Some(Usage::Write) => {
                            usage_of_block.gen.remove(&variable);
                            usage_of_block.kill.insert(variable);
                        }
                        Some(Usage::Read) => {
                            usage_of_block.gen.insert(variable);
                        }
                        None => {}
                    }
                }
                usage_of_block
            })
            .collect();

        let count = cfg.len();
        let mut live_in = vec![FxHashSet::default(); count];
        let mut live_out = vec![FxHashSet::default(); count];
        let mut worklist: VecDeque<BlockId> = cfg.blocks().iter().rev().map(|b| b.id()).collect();
        let mut queued = vec![true; count];

        while let Some(id) = worklist.pop_front() {
            let index = id.index();
            queued[index] = false;
            let block = cfg.block(id);

            let out: FxHashSet<VariableId> = block
                .successors()
                .iter()
                .flat_map(|s| live_in[s.index()].iter().copied())
                .collect();
            let mut entry: FxHashSet<VariableId> = out
                .iter()
                .copied()
                .filter(|v| !usages[index].kill.contains(v))
                .collect();
            entry.extend(usages[index].gen.iter().copied());
            live_out[index] = out;

            if entry != live_in[index] {
                live_in[index] = entry;
                for predecessor in block.predecessors() {
                    if !queued[predecessor.index()] {
                        queued[predecessor.index()] = true;
                        worklist.push_back(*predecessor);
                    }
                }
            }
        }

        Self { live_in, live_out }
    }

    pub fn live_in(&self, block: BlockId) -> &FxHashSet<VariableId> {
        &self.live_in[block.index()]
    }

    pub fn live_out(&self, block: BlockId) -> &FxHashSet<VariableId> {
        &self.live_out[block.index()]
    }
}
