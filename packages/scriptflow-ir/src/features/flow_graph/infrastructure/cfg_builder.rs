//! Control-flow graph builder
//!
//! Statements are visited last-to-first: when a block is created its
//! successor already exists, so every link is known up front. Blocks live in
//! an index-addressed arena while they are mutable; [`freeze`] collapses the
//! empty ones, renumbers the rest in source order and hands back an immutable
//! [`ControlFlowGraph`].
//!
//! [`freeze`]: ControlFlowGraphBuilder::freeze

use crate::config::FlowGraphConfig;
use crate::features::flow_graph::domain::{
    BlockId, BlockKind, CfgBlock, CfgError, CfgResult, ControlFlowGraph, JumpKind,
};
use crate::shared::models::{NodeId, SyntaxKind, SyntaxTree};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Arena index of the end block
const END: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    End,
    Simple {
        successor: usize,
    },
    Branching {
        node: NodeId,
        on_true: usize,
        on_false: usize,
    },
    Forwarding {
        successor: Option<usize>,
    },
}

#[derive(Debug, Clone)]
struct MutableBlock {
    shape: Shape,
    /// Reverse evaluation order (elements are prepended while building backwards)
    elements: Vec<NodeId>,
    jumps: Vec<NodeId>,
}

impl MutableBlock {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            elements: Vec::new(),
            jumps: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakableKind {
    Loop,
    Switch,
    Labelled,
}

#[derive(Debug, Clone)]
struct Breakable {
    kind: BreakableKind,
    break_target: usize,
    continue_target: Option<usize>,
    label: Option<String>,
}

pub(crate) struct ControlFlowGraphBuilder<'t> {
    tree: &'t SyntaxTree,
    config: &'t FlowGraphConfig,
    blocks: Vec<MutableBlock>,
    current: usize,
    breakables: Vec<Breakable>,
    throw_targets: Vec<usize>,
    pending_label: Option<String>,
}

impl<'t> ControlFlowGraphBuilder<'t> {
    pub(crate) fn new(tree: &'t SyntaxTree, config: &'t FlowGraphConfig) -> Self {
        Self {
            tree,
            config,
            blocks: vec![MutableBlock::new(Shape::End)],
            current: END,
            breakables: Vec::new(),
            throw_targets: Vec::new(),
            pending_label: None,
        }
    }

    /// Build the graph of a script, a function body block, a single statement
    /// or a lone expression.
    pub(crate) fn build(mut self, root: NodeId) -> CfgResult<ControlFlowGraph> {
        let tree = self.tree;
        self.throw_targets.push(END);
        self.current = self.create_simple(END);

        match tree.kind(root) {
            SyntaxKind::Script | SyntaxKind::Block => self.build_statements(tree.children(root))?,
            kind if kind.is_statement() => self.build_statement(root)?,
            _ => self.build_expression(root)?,
        }

        let start = self.current;
        self.freeze(start)
    }

    // ------------------------------------------------------------------
    // Arena
    // ------------------------------------------------------------------

    fn push_block(&mut self, shape: Shape) -> usize {
        self.blocks.push(MutableBlock::new(shape));
        self.blocks.len() - 1
    }

    fn create_simple(&mut self, successor: usize) -> usize {
        self.push_block(Shape::Simple { successor })
    }

    fn create_branching(&mut self, node: NodeId, on_true: usize, on_false: usize) -> usize {
        self.push_block(Shape::Branching {
            node,
            on_true,
            on_false,
        })
    }

    fn create_forwarding(&mut self, successor: Option<usize>) -> usize {
        self.push_block(Shape::Forwarding { successor })
    }

    fn link_forwarding(&mut self, block: usize, successor: usize) {
        if let Shape::Forwarding { successor: slot } = &mut self.blocks[block].shape {
            *slot = Some(successor);
        }
    }

    fn add_element(&mut self, node: NodeId) -> CfgResult<()> {
        let block = &mut self.blocks[self.current];
        match block.shape {
            Shape::End => Err(CfgError::ElementInEndBlock { node }),
            Shape::Forwarding { .. } => Err(CfgError::ElementInForwardingBlock { node }),
            _ => {
                block.elements.push(node);
                Ok(())
            }
        }
    }

    fn add_disconnecting_jump(&mut self, node: NodeId) {
        self.blocks[self.current].jumps.push(node);
    }

    /// Targets of the current block when it is an empty branching block whose
    /// decision is the truthiness of the expression about to be built into it.
    fn condition_targets(&self) -> Option<(usize, usize)> {
        let block = &self.blocks[self.current];
        match block.shape {
            Shape::Branching {
                node,
                on_true,
                on_false,
            } if block.is_empty()
                && matches!(
                    self.tree.kind(node),
                    SyntaxKind::If
                        | SyntaxKind::While
                        | SyntaxKind::DoWhile
                        | SyntaxKind::For
                        | SyntaxKind::Conditional
                        | SyntaxKind::LogicalAnd
                        | SyntaxKind::LogicalOr
                ) =>
            {
                Some((on_true, on_false))
            }
            _ => None,
        }
    }

    fn required_child(&self, node: NodeId, index: usize, reason: &'static str) -> CfgResult<NodeId> {
        self.tree
            .child(node, index)
            .ok_or_else(|| CfgError::MalformedNode {
                kind: self.tree.kind(node),
                node,
                reason,
            })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn build_statements(&mut self, statements: &[NodeId]) -> CfgResult<()> {
        for statement in statements.iter().rev() {
            self.build_statement(*statement)?;
        }
        Ok(())
    }

    fn build_statement(&mut self, node: NodeId) -> CfgResult<()> {
        let tree = self.tree;
        match tree.kind(node) {
            SyntaxKind::ExpressionStatement => {
                self.add_element(node)?;
                let expression = self.required_child(node, 0, "missing expression")?;
                self.build_expression(expression)
            }
            SyntaxKind::VariableStatement => {
                for declaration in tree.children(node).iter().rev() {
                    self.build_expression(*declaration)?;
                }
                Ok(())
            }
            SyntaxKind::VariableDeclaration => self.build_expression(node),
            SyntaxKind::Block => self.build_statements(tree.children(node)),
            SyntaxKind::If => self.build_if(node),
            SyntaxKind::While => self.build_while(node),
            SyntaxKind::DoWhile => self.build_do_while(node),
            SyntaxKind::For => self.build_for(node),
            SyntaxKind::ForIn | SyntaxKind::ForOf => self.build_for_object(node),
            SyntaxKind::Break => self.build_break_or_continue(node, JumpKind::Break),
            SyntaxKind::Continue => self.build_break_or_continue(node, JumpKind::Continue),
            SyntaxKind::Return => self.build_return(node),
            SyntaxKind::Throw => self.build_throw(node),
            SyntaxKind::Labelled => self.build_labelled(node),
            SyntaxKind::Try => self.build_try(node),
            SyntaxKind::Switch => self.build_switch(node),
            SyntaxKind::With => {
                let object = self.required_child(node, 0, "missing object")?;
                let body = self.required_child(node, 1, "missing body")?;
                self.build_statement(body)?;
                self.build_expression(object)
            }
            SyntaxKind::FunctionDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::ImportDeclaration
            | SyntaxKind::ExportDeclaration
            | SyntaxKind::Debugger => self.add_element(node),
            SyntaxKind::Empty => Ok(()),
            kind => Err(CfgError::UnexpectedStatement { kind, node }),
        }
    }

    /// Start a fresh block flowing into `successor` and build `statement` in it
    fn build_sub_flow(&mut self, statement: NodeId, successor: usize) -> CfgResult<()> {
        self.current = self.create_simple(successor);
        self.build_statement(statement)
    }

    fn build_if(&mut self, node: NodeId) -> CfgResult<()> {
        let condition = self.required_child(node, 0, "missing condition")?;
        let then_branch = self.required_child(node, 1, "missing then branch")?;
        let successor = self.current;

        let else_entry = match self.tree.present_child(node, 2) {
            Some(else_branch) => {
                self.build_sub_flow(else_branch, successor)?;
                self.current
            }
            None => successor,
        };
        self.build_sub_flow(then_branch, successor)?;
        let then_entry = self.current;

        self.current = self.create_branching(node, then_entry, else_entry);
        self.build_expression(condition)
    }

    /// Build a loop body and return its entry block. An empty body receives the
    /// body statement as a marker so the loop never branches onto itself.
    fn build_loop_body(
        &mut self,
        body: NodeId,
        continue_target: usize,
        break_target: usize,
    ) -> CfgResult<usize> {
        let label = self.pending_label.take();
        self.breakables.push(Breakable {
            kind: BreakableKind::Loop,
            break_target,
            continue_target: Some(continue_target),
            label,
        });
        self.build_sub_flow(body, continue_target)?;
        self.breakables.pop();

        let entry = self.current;
        if matches!(self.blocks[entry].shape, Shape::Simple { .. }) && self.blocks[entry].is_empty() {
            self.add_element(body)?;
        }
        Ok(entry)
    }

    fn build_while(&mut self, node: NodeId) -> CfgResult<()> {
        let condition = self.required_child(node, 0, "missing condition")?;
        let body = self.required_child(node, 1, "missing body")?;
        let successor = self.current;

        let link_to_condition = self.create_forwarding(None);
        let body_entry = self.build_loop_body(body, link_to_condition, successor)?;

        self.current = self.create_branching(node, body_entry, successor);
        self.build_expression(condition)?;
        let condition_entry = self.current;
        self.link_forwarding(link_to_condition, condition_entry);

        self.current = self.create_simple(condition_entry);
        Ok(())
    }

    fn build_do_while(&mut self, node: NodeId) -> CfgResult<()> {
        let body = self.required_child(node, 0, "missing body")?;
        let condition = self.required_child(node, 1, "missing condition")?;
        let successor = self.current;

        let link_to_body = self.create_forwarding(None);
        self.current = self.create_branching(node, link_to_body, successor);
        self.build_expression(condition)?;
        let condition_entry = self.current;

        let body_entry = self.build_loop_body(body, condition_entry, successor)?;
        self.link_forwarding(link_to_body, body_entry);

        self.current = self.create_simple(body_entry);
        Ok(())
    }

    fn build_for(&mut self, node: NodeId) -> CfgResult<()> {
        let tree = self.tree;
        let body = self.required_child(node, 3, "missing body")?;
        let successor = self.current;

        let link_to_condition = self.create_forwarding(None);
        let link_to_update = self.create_forwarding(None);
        let body_entry = self.build_loop_body(body, link_to_update, successor)?;

        match tree.present_child(node, 2) {
            Some(update) => {
                self.current = self.create_simple(link_to_condition);
                self.build_expression(update)?;
                self.link_forwarding(link_to_update, self.current);
            }
            None => self.link_forwarding(link_to_update, link_to_condition),
        }

        match tree.present_child(node, 1) {
            Some(condition) => {
                self.current = self.create_branching(node, body_entry, successor);
                self.build_expression(condition)?;
                self.link_forwarding(link_to_condition, self.current);
            }
            None => {
                // A body opening with a decision gets the loop node as its
                // entry, or the back edge would land on that decision itself.
                let loop_entry = if matches!(self.blocks[body_entry].shape, Shape::Branching { .. }) {
                    self.current = self.create_simple(body_entry);
                    self.add_element(node)?;
                    self.current
                } else {
                    body_entry
                };
                self.link_forwarding(link_to_condition, loop_entry);
            }
        }

        self.current = self.create_simple(link_to_condition);
        if let Some(init) = tree.present_child(node, 0) {
            self.build_expression(init)?;
        }
        Ok(())
    }

    /// `for-in` / `for-of`: the branching block binds the loop variable and
    /// evaluates the iterated object last, so its value is the decision.
    fn build_for_object(&mut self, node: NodeId) -> CfgResult<()> {
        let binding = self.required_child(node, 0, "missing binding")?;
        let iterated = self.required_child(node, 1, "missing iterated expression")?;
        let body = self.required_child(node, 2, "missing body")?;
        let successor = self.current;

        let link_to_next = self.create_forwarding(None);
        let body_entry = self.build_loop_body(body, link_to_next, successor)?;

        self.current = self.create_branching(node, body_entry, successor);
        self.build_expression(iterated)?;
        self.build_expression(binding)?;
        self.link_forwarding(link_to_next, self.current);

        self.current = self.create_simple(self.current);
        Ok(())
    }

    fn build_labelled(&mut self, node: NodeId) -> CfgResult<()> {
        let tree = self.tree;
        let body = self.required_child(node, 0, "missing labelled statement")?;
        let label = tree.text(node).map(str::to_string);

        if tree.kind(body).is_loop() || tree.is(body, SyntaxKind::Switch) {
            self.pending_label = label;
            return self.build_statement(body);
        }

        self.breakables.push(Breakable {
            kind: BreakableKind::Labelled,
            break_target: self.current,
            continue_target: None,
            label,
        });
        self.current = self.create_simple(self.current);
        let result = self.build_statement(body);
        self.breakables.pop();
        result
    }

    fn resolve_jump(&self, node: NodeId, jump: JumpKind) -> CfgResult<usize> {
        let label = self.tree.text(node);
        let breakable = self.breakables.iter().rev().find(|b| match label {
            Some(label) => b.label.as_deref() == Some(label),
            None => match jump {
                JumpKind::Break => b.kind != BreakableKind::Labelled,
                JumpKind::Continue => b.kind == BreakableKind::Loop,
            },
        });

        let target = breakable.and_then(|b| match jump {
            JumpKind::Break => Some(b.break_target),
            JumpKind::Continue => b.continue_target,
        });

        target.ok_or_else(|| CfgError::UnresolvedJumpTarget {
            jump,
            label: label.map(str::to_string),
            node,
            line: self.tree.span(node).start_line,
        })
    }

    fn build_break_or_continue(&mut self, node: NodeId, jump: JumpKind) -> CfgResult<()> {
        let target = self.resolve_jump(node, jump)?;
        self.add_disconnecting_jump(node);
        self.current = self.create_simple(target);
        self.add_element(node)
    }

    fn build_return(&mut self, node: NodeId) -> CfgResult<()> {
        self.add_disconnecting_jump(node);
        self.current = self.create_simple(END);
        self.add_element(node)?;
        if let Some(expression) = self.tree.present_child(node, 0) {
            self.build_expression(expression)?;
        }
        Ok(())
    }

    fn build_throw(&mut self, node: NodeId) -> CfgResult<()> {
        let expression = self.required_child(node, 0, "missing thrown expression")?;
        let target = self.throw_targets.last().copied().unwrap_or(END);
        self.add_disconnecting_jump(node);
        self.current = self.create_simple(target);
        self.build_expression(expression)
    }

    fn build_try(&mut self, node: NodeId) -> CfgResult<()> {
        let tree = self.tree;
        let body = self.required_child(node, 0, "missing try block")?;
        let catch = tree.child_of_kind(node, SyntaxKind::CatchClause);
        let finally = tree.child_of_kind(node, SyntaxKind::FinallyClause);
        let mut catch_or_finally = None;

        if let Some(finally) = finally {
            let finally_block = self.required_child(finally, 0, "missing finally block")?;
            self.build_sub_flow(finally_block, self.current)?;
            self.throw_targets.push(self.current);
            catch_or_finally = Some(self.current);
        }

        if let Some(catch) = catch {
            let handler = tree
                .child_of_kind(catch, SyntaxKind::Block)
                .ok_or(CfgError::MalformedNode {
                    kind: SyntaxKind::CatchClause,
                    node: catch,
                    reason: "missing catch block",
                })?;
            let parameter = tree
                .children(catch)
                .iter()
                .copied()
                .find(|child| *child != handler);

            let catch_successor = self.current;
            self.build_sub_flow(handler, catch_successor)?;
            let handler_entry = self.current;
            self.current = self.create_branching(catch, handler_entry, catch_successor);
            self.add_element(parameter.unwrap_or(catch))?;
            catch_or_finally = Some(self.current);
        }

        if finally.is_some() {
            self.throw_targets.pop();
        }

        self.throw_targets.push(self.current);
        let result = self.build_sub_flow(body, self.current);
        self.throw_targets.pop();
        result?;

        if let Some(target) = catch_or_finally {
            let body_entry = self.current;
            self.current = self.create_branching(node, body_entry, target);
            self.add_element(node)?;
        }
        Ok(())
    }

    fn build_switch(&mut self, node: NodeId) -> CfgResult<()> {
        let tree = self.tree;
        let discriminant = self.required_child(node, 0, "missing discriminant")?;
        let after_switch = self.current;

        let label = self.pending_label.take();
        self.breakables.push(Breakable {
            kind: BreakableKind::Switch,
            break_target: after_switch,
            continue_target: None,
            label,
        });

        let mut next_statement_block = after_switch;
        let default_link = self.create_forwarding(Some(after_switch));
        let mut next_case = default_link;

        for clause in tree.children(node)[1..].iter().rev().copied() {
            match tree.kind(clause) {
                SyntaxKind::CaseClause => {
                    let test = self.required_child(clause, 0, "missing case test")?;
                    let statements = &tree.children(clause)[1..];
                    self.current = self.create_simple(next_statement_block);
                    self.build_statements(statements)?;
                    if !statements.is_empty() {
                        next_statement_block = self.current;
                    }

                    self.current = self.create_branching(clause, next_statement_block, next_case);
                    self.build_expression(test)?;
                    next_case = self.current;
                }
                SyntaxKind::DefaultClause => {
                    let statements = tree.children(clause);
                    self.current = self.create_simple(next_statement_block);
                    self.build_statements(statements)?;
                    self.link_forwarding(default_link, self.current);
                    if !statements.is_empty() {
                        next_statement_block = self.current;
                    }
                }
                kind => return Err(CfgError::UnexpectedStatement { kind, node: clause }),
            }
        }

        self.breakables.pop();
        self.current = self.create_simple(next_case);
        self.build_expression(discriminant)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn build_expression(&mut self, node: NodeId) -> CfgResult<()> {
        let tree = self.tree;
        match tree.kind(node) {
            SyntaxKind::Parenthesised => {
                let inner = self.required_child(node, 0, "missing expression")?;
                self.build_expression(inner)
            }
            kind @ (SyntaxKind::LogicalAnd | SyntaxKind::LogicalOr) => self.build_logical(node, kind),
            SyntaxKind::NullishCoalescing => self.build_nullish(node),
            SyntaxKind::Conditional => self.build_conditional(node),
            SyntaxKind::FunctionExpression
            | SyntaxKind::ArrowFunction
            | SyntaxKind::ClassExpression => self.add_element(node),
            SyntaxKind::DotMember => {
                self.add_element(node)?;
                let object = self.required_child(node, 0, "missing object")?;
                self.build_expression(object)
            }
            SyntaxKind::InitializedBinding => {
                self.add_element(node)?;
                let target = self.required_child(node, 0, "missing binding target")?;
                let initializer = self.required_child(node, 1, "missing initializer")?;
                self.build_expression(target)?;
                self.build_expression(initializer)
            }
            _ => {
                self.add_element(node)?;
                for child in tree.children(node).iter().rev() {
                    self.build_expression(*child)?;
                }
                Ok(())
            }
        }
    }

    fn build_logical(&mut self, node: NodeId, kind: SyntaxKind) -> CfgResult<()> {
        let left = self.required_child(node, 0, "missing left operand")?;
        let right = self.required_child(node, 1, "missing right operand")?;
        let is_and = kind == SyntaxKind::LogicalAnd;

        if let Some((on_true, on_false)) = self.condition_targets() {
            // Short-circuit straight to the enclosing decision's targets
            self.build_expression(right)?;
            let right_entry = self.current;
            self.current = if is_and {
                self.create_branching(node, right_entry, on_false)
            } else {
                self.create_branching(node, on_true, right_entry)
            };
            return self.build_expression(left);
        }

        let join = self.current;
        self.add_element(node)?;
        self.current = self.create_simple(join);
        self.build_expression(right)?;
        let right_entry = self.current;
        self.current = if is_and {
            self.create_branching(node, right_entry, join)
        } else {
            self.create_branching(node, join, right_entry)
        };
        self.build_expression(left)
    }

    /// `a ?? b`: true edge (left is nullish) evaluates the right operand
    fn build_nullish(&mut self, node: NodeId) -> CfgResult<()> {
        let left = self.required_child(node, 0, "missing left operand")?;
        let right = self.required_child(node, 1, "missing right operand")?;

        let join = self.current;
        self.add_element(node)?;
        self.current = self.create_simple(join);
        self.build_expression(right)?;
        let right_entry = self.current;
        self.current = self.create_branching(node, right_entry, join);
        self.build_expression(left)
    }

    fn build_conditional(&mut self, node: NodeId) -> CfgResult<()> {
        let condition = self.required_child(node, 0, "missing condition")?;
        let consequent = self.required_child(node, 1, "missing consequent")?;
        let alternate = self.required_child(node, 2, "missing alternate")?;

        let join = self.current;
        self.add_element(node)?;

        self.current = self.create_simple(join);
        self.build_expression(alternate)?;
        let false_entry = self.current;

        self.current = self.create_simple(join);
        self.build_expression(consequent)?;
        let true_entry = self.current;

        self.current = self.create_branching(node, true_entry, false_entry);
        self.build_expression(condition)
    }

    // ------------------------------------------------------------------
    // Freeze
    // ------------------------------------------------------------------

    fn is_collapsible(&self, block: usize) -> bool {
        match self.blocks[block].shape {
            Shape::Simple { .. } => self.blocks[block].is_empty(),
            Shape::Forwarding { .. } => true,
            _ => false,
        }
    }

    fn single_successor(&self, block: usize) -> Option<usize> {
        match self.blocks[block].shape {
            Shape::Simple { successor } => Some(successor),
            Shape::Forwarding { successor } => successor,
            _ => None,
        }
    }

    /// First block reached from `block` that holds elements (or is the end
    /// block). A cycle made only of empty blocks resolves to its lowest arena
    /// index, which is then kept as a forwarding block.
    fn skip_empty_blocks(&self, block: usize) -> usize {
        let mut path = Vec::new();
        let mut visited = FxHashSet::default();
        let mut cursor = block;

        while self.is_collapsible(cursor) {
            if !visited.insert(cursor) {
                let cycle_start = path.iter().position(|b| *b == cursor).unwrap_or(0);
                let anchor = path[cycle_start..].iter().copied().min().unwrap_or(cursor);
                trace!("Empty block cycle through {} anchored at {}", cursor, anchor);
                return anchor;
            }
            path.push(cursor);
            match self.single_successor(cursor) {
                Some(successor) => cursor = successor,
                None => break,
            }
        }
        cursor
    }

    fn first_element(&self, block: usize) -> Option<NodeId> {
        self.blocks[block].elements.last().copied()
    }

    fn freeze(self, start: usize) -> CfgResult<ControlFlowGraph> {
        let tree = self.tree;

        if let Some(block) = self
            .blocks
            .iter()
            .position(|b| b.shape == Shape::Forwarding { successor: None })
        {
            return Err(CfgError::DanglingForwardingBlock { block });
        }

        let replacement: Vec<usize> = (0..self.blocks.len())
            .map(|block| {
                if self.is_collapsible(block) {
                    self.skip_empty_blocks(block)
                } else {
                    block
                }
            })
            .collect();

        let mut kept: Vec<usize> = (0..self.blocks.len())
            .filter(|block| *block != END && replacement[*block] == *block)
            .collect();
        kept.sort_by(|a, b| match (self.first_element(*a), self.first_element(*b)) {
            (Some(x), Some(y)) => tree
                .span(x)
                .source_order(&tree.span(y))
                .then_with(|| x.cmp(&y)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.cmp(b),
        });

        let end_id = BlockId(kept.len() as u32);
        let mut ids = vec![end_id; self.blocks.len()];
        for (position, block) in kept.iter().enumerate() {
            ids[*block] = BlockId(position as u32);
        }
        let resolve = |block: usize| ids[replacement[block]];

        let mut frozen = Vec::with_capacity(kept.len() + 1);
        for block in &kept {
            let id = ids[*block];
            let source = &self.blocks[*block];
            let elements: Vec<NodeId> = source.elements.iter().rev().copied().collect();

            let (kind, successors, branching_node) = match source.shape {
                Shape::Branching {
                    node,
                    on_true,
                    on_false,
                } => {
                    let (on_true, on_false) = (resolve(on_true), resolve(on_false));
                    if on_true == id || on_false == id {
                        return Err(CfgError::SelfReferentialBranch { node });
                    }
                    if on_true == on_false {
                        if !self.config.demote_degenerate_branches {
                            return Err(CfgError::DegenerateBranch { node });
                        }
                        trace!("Demoting degenerate branch of {} in {}", node, id);
                        (BlockKind::Simple, vec![on_true], None)
                    } else {
                        (BlockKind::Branching, vec![on_true, on_false], Some(node))
                    }
                }
                Shape::Simple { successor } | Shape::Forwarding {
                    successor: Some(successor),
                } => {
                    let kind = if elements.is_empty() {
                        BlockKind::Forwarding
                    } else {
                        BlockKind::Simple
                    };
                    (kind, vec![resolve(successor)], None)
                }
                Shape::End | Shape::Forwarding { successor: None } => {
                    return Err(CfgError::DanglingForwardingBlock { block: *block });
                }
            };

            frozen.push(CfgBlock {
                id,
                kind,
                elements,
                successors,
                predecessors: Vec::new(),
                branching_node,
            });
        }
        frozen.push(CfgBlock {
            id: end_id,
            kind: BlockKind::End,
            elements: Vec::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
            branching_node: None,
        });

        let mut disconnecting_jumps: BTreeMap<BlockId, Vec<NodeId>> = BTreeMap::new();
        for (block, source) in self.blocks.iter().enumerate() {
            if source.jumps.is_empty() {
                continue;
            }
            let target = resolve(block);
            if target == end_id {
                continue;
            }
            disconnecting_jumps
                .entry(target)
                .or_default()
                .extend(source.jumps.iter().copied());
        }
        for jumps in disconnecting_jumps.values_mut() {
            jumps.sort_by(|a, b| tree.span(*a).source_order(&tree.span(*b)).then_with(|| a.cmp(b)));
        }

        let start_id = resolve(start);
        debug!(
            "Built control flow graph: {} blocks ({} arena blocks collapsed)",
            frozen.len(),
            self.blocks.len() - frozen.len()
        );
        Ok(ControlFlowGraph::new(frozen, start_id, end_id, disconnecting_jumps))
    }
}
