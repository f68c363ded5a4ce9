//! Control Flow Graph blocks and edges (frozen form)
//!
//! Produced once per function or script by the builder and read-only
//! afterwards. Blocks are addressed by [`BlockId`]; successor lists hold ids,
//! never owning pointers, so loops are plain cycles of indices.

use crate::shared::models::NodeId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Straight-line block with one successor
    Simple,
    /// Ends with a condition; exactly two successors (true, false)
    Branching,
    /// Element-less block kept only to close a cycle of empty blocks
    Forwarding,
    /// Unique exit block
    End,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Simple => "simple",
            BlockKind::Branching => "branching",
            BlockKind::Forwarding => "forwarding",
            BlockKind::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchLabel {
    Unconditional,
    True,
    False,
}

impl BranchLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchLabel::Unconditional => "unconditional",
            BranchLabel::True => "true",
            BranchLabel::False => "false",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CfgEdge {
    pub source: BlockId,
    pub target: BlockId,
    pub label: BranchLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgBlock {
    pub(crate) id: BlockId,
    pub(crate) kind: BlockKind,
    /// Syntax nodes in evaluation order
    pub(crate) elements: Vec<NodeId>,
    /// `[true, false]` for branching blocks
    pub(crate) successors: Vec<BlockId>,
    pub(crate) predecessors: Vec<BlockId>,
    /// Statement or expression whose condition decides a branching block
    pub(crate) branching_node: Option<NodeId>,
}

impl CfgBlock {
    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    pub fn first_element(&self) -> Option<NodeId> {
        self.elements.first().copied()
    }

    pub fn last_element(&self) -> Option<NodeId> {
        self.elements.last().copied()
    }

    pub fn successors(&self) -> &[BlockId] {
        &self.successors
    }

    pub fn predecessors(&self) -> &[BlockId] {
        &self.predecessors
    }

    pub fn branching_node(&self) -> Option<NodeId> {
        self.branching_node
    }

    pub fn is_branching(&self) -> bool {
        self.kind == BlockKind::Branching
    }

    pub fn is_end(&self) -> bool {
        self.kind == BlockKind::End
    }

    pub fn true_successor(&self) -> Option<BlockId> {
        self.is_branching().then(|| self.successors[0])
    }

    pub fn false_successor(&self) -> Option<BlockId> {
        self.is_branching().then(|| self.successors[1])
    }

    /// Successor of a simple or forwarding block
    pub fn single_successor(&self) -> Option<BlockId> {
        match self.kind {
            BlockKind::Simple | BlockKind::Forwarding => self.successors.first().copied(),
            _ => None,
        }
    }

    /// Outgoing edges with their branch labels
    pub fn edges(&self) -> impl Iterator<Item = CfgEdge> + '_ {
        let branching = self.is_branching();
        self.successors
            .iter()
            .enumerate()
            .map(move |(position, target)| CfgEdge {
                source: self.id,
                target: *target,
                label: match (branching, position) {
                    (false, _) => BranchLabel::Unconditional,
                    (true, 0) => BranchLabel::True,
                    (true, _) => BranchLabel::False,
                },
            })
    }
}

/// Immutable control-flow graph of one function body or script
#[derive(Debug, Clone, Serialize)]
pub struct ControlFlowGraph {
    blocks: Vec<CfgBlock>,
    start: BlockId,
    end: BlockId,
    unreachable: BTreeSet<BlockId>,
    disconnecting_jumps: BTreeMap<BlockId, Vec<NodeId>>,
    #[serde(skip)]
    element_blocks: FxHashMap<NodeId, BlockId>,
}

impl ControlFlowGraph {
    /// Assemble a graph from frozen blocks. Predecessor lists, the element
    /// index and the unreachable set are derived here.
    pub(crate) fn new(
        mut blocks: Vec<CfgBlock>,
        start: BlockId,
        end: BlockId,
        disconnecting_jumps: BTreeMap<BlockId, Vec<NodeId>>,
    ) -> Self {
        let mut predecessors: Vec<Vec<BlockId>> = vec![Vec::new(); blocks.len()];
        for block in &blocks {
            for successor in &block.successors {
                let list = &mut predecessors[successor.index()];
                if !list.contains(&block.id) {
                    list.push(block.id);
                }
            }
        }
        for (block, mut preds) in blocks.iter_mut().zip(predecessors) {
            preds.sort();
            block.predecessors = preds;
        }

        let mut element_blocks = FxHashMap::default();
        for block in &blocks {
            for element in &block.elements {
                element_blocks.insert(*element, block.id);
            }
        }

        let mut graph = Self {
            blocks,
            start,
            end,
            unreachable: BTreeSet::new(),
            disconnecting_jumps,
            element_blocks,
        };
        graph.unreachable = graph.compute_unreachable();
        graph
    }

    fn compute_unreachable(&self) -> BTreeSet<BlockId> {
        let (graph, indices) = self.to_petgraph_with_indices();
        let mut reached = vec![false; self.blocks.len()];
        let mut dfs = Dfs::new(&graph, indices[self.start.index()]);
        while let Some(index) = dfs.next(&graph) {
            reached[graph[index].index()] = true;
        }
        self.blocks
            .iter()
            .filter(|block| !block.is_end() && !reached[block.id.index()])
            .map(|block| block.id)
            .collect()
    }

    fn to_petgraph_with_indices(&self) -> (DiGraph<BlockId, BranchLabel>, Vec<NodeIndex>) {
        let mut graph = DiGraph::with_capacity(self.blocks.len(), self.blocks.len() * 2);
        let indices: Vec<NodeIndex> = self.blocks.iter().map(|b| graph.add_node(b.id)).collect();
        for block in &self.blocks {
            for edge in block.edges() {
                graph.add_edge(
                    indices[edge.source.index()],
                    indices[edge.target.index()],
                    edge.label,
                );
            }
        }
        (graph, indices)
    }

    /// Export as a petgraph graph (node weights are block ids, edge weights
    /// branch labels). Node indices match block indices.
    pub fn to_petgraph(&self) -> DiGraph<BlockId, BranchLabel> {
        self.to_petgraph_with_indices().0
    }

    /// All blocks, ordered by the source position of their first element;
    /// the end block is last.
    pub fn blocks(&self) -> &[CfgBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> &CfgBlock {
        &self.blocks[id.index()]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn start(&self) -> BlockId {
        self.start
    }

    pub fn end(&self) -> BlockId {
        self.end
    }

    /// Blocks other than the end block
    pub fn body_blocks(&self) -> impl Iterator<Item = &CfgBlock> {
        self.blocks.iter().filter(|b| !b.is_end())
    }

    pub fn edges(&self) -> Vec<CfgEdge> {
        self.blocks.iter().flat_map(|b| b.edges()).collect()
    }

    pub fn unreachable_blocks(&self) -> &BTreeSet<BlockId> {
        &self.unreachable
    }

    pub fn is_unreachable(&self, id: BlockId) -> bool {
        self.unreachable.contains(&id)
    }

    /// Jump nodes (`return`, `throw`, `break`, `continue`) that cut control
    /// flow right before the given block, in source order.
    pub fn disconnecting_jumps(&self, id: BlockId) -> &[NodeId] {
        self.disconnecting_jumps
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_disconnecting_jumps(&self) -> &BTreeMap<BlockId, Vec<NodeId>> {
        &self.disconnecting_jumps
    }

    /// Block holding the given syntax node as an element
    pub fn block_of(&self, node: NodeId) -> Option<BlockId> {
        self.element_blocks.get(&node).copied()
    }
}
