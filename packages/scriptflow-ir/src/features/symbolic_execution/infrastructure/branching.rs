//! Branch edges
//!
//! Following the true or false edge of a branching block narrows the state
//! by the condition on top of the stack, then adjusts the stack for the
//! target block.

use super::program_points::PointContext;
use crate::features::flow_graph::ControlFlowGraph;
use crate::features::symbolic_execution::domain::{
    Constraint, ProgramState, RelationalOp, SymbolicValue,
};
use crate::shared::models::{NodeId, SyntaxKind, SyntaxTree, VariableId};

/// What happens to the evaluation stack when leaving a branching block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StackEffect {
    /// Statement-level branch: nothing survives
    Clear,
    /// The condition was only needed for the decision
    Pop,
    /// The condition is also the value of the enclosing expression
    Keep,
}

/// Stack effect of the `truthy` edge of `branch`.
///
/// A short-circuit operator that is not itself an element of the graph sits
/// in condition position; the edge that leaves the operator behaves like
/// the same edge of the enclosing condition.
pub(crate) fn stack_effect(
    tree: &SyntaxTree,
    cfg: &ControlFlowGraph,
    branch: NodeId,
    truthy: bool,
) -> StackEffect {
    let value_context = || cfg.block_of(branch).is_some();
    match tree.kind(branch) {
        // The discriminant stays for the next case test only
        SyntaxKind::CaseClause if !truthy && has_later_case(tree, branch) => StackEffect::Pop,
        SyntaxKind::CaseClause => StackEffect::Clear,
        SyntaxKind::Conditional => StackEffect::Pop,
        SyntaxKind::NullishCoalescing if truthy => StackEffect::Pop,
        SyntaxKind::NullishCoalescing => StackEffect::Keep,
        SyntaxKind::LogicalAnd if truthy => StackEffect::Pop,
        SyntaxKind::LogicalOr if !truthy => StackEffect::Pop,
        SyntaxKind::LogicalAnd | SyntaxKind::LogicalOr if value_context() => StackEffect::Keep,
        SyntaxKind::LogicalAnd | SyntaxKind::LogicalOr => enclosing_condition(tree, branch)
            .map(|parent| stack_effect(tree, cfg, parent, truthy))
            .unwrap_or(StackEffect::Clear),
        _ => StackEffect::Clear,
    }
}

fn has_later_case(tree: &SyntaxTree, clause: NodeId) -> bool {
    let Some(switch) = tree.parent(clause) else {
        return false;
    };
    tree.children(switch)
        .iter()
        .skip_while(|sibling| **sibling != clause)
        .skip(1)
        .any(|sibling| tree.is(*sibling, SyntaxKind::CaseClause))
}

fn enclosing_condition(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let mut parent = tree.parent(node)?;
    while tree.is(parent, SyntaxKind::Parenthesised) {
        parent = tree.parent(parent)?;
    }
    Some(parent)
}

/// State at the start of the `truthy` successor of `branch`, or `None` when
/// the edge is infeasible.
pub(crate) fn follow_edge(
    ctx: &PointContext<'_>,
    cfg: &ControlFlowGraph,
    branch: NodeId,
    state: &ProgramState,
    truthy: bool,
) -> Option<ProgramState> {
    let tree = ctx.tree;
    let top = state.peek().cloned().unwrap_or(SymbolicValue::Unknown);

    let mut next = match tree.kind(branch) {
        SyntaxKind::NullishCoalescing => {
            let constraint = if truthy {
                Constraint::NULL_OR_UNDEFINED
            } else {
                Constraint::NOT_NULLY
            };
            state.constrain(&top, constraint)?
        }
        SyntaxKind::CaseClause => {
            let stack = state.stack();
            let discriminant = stack
                .len()
                .checked_sub(2)
                .and_then(|i| stack.get(i))
                .cloned()
                .unwrap_or(SymbolicValue::Unknown);
            let matches = SymbolicValue::relational(RelationalOp::StrictEqual, discriminant, top);
            state.constrain(&matches, truthiness(truthy))?
        }
        SyntaxKind::ForIn | SyntaxKind::ForOf => {
            if !truthy {
                state.clone()
            } else if top
                .constraint_in(state)
                .is_stricter_or_equal_to(Constraint::NULL_OR_UNDEFINED)
            {
                // Nothing to iterate; `for-of` would throw
                return None;
            } else {
                let mut entered = state.clone();
                if let Some(variable) = loop_binding(ctx, branch) {
                    entered.store(variable, Constraint::ANY_VALUE, None);
                }
                entered
            }
        }
        SyntaxKind::CatchClause => {
            let mut caught = state.clone();
            if truthy {
                if let Some(variable) = catch_parameter(ctx, branch) {
                    caught.store(variable, Constraint::ANY_VALUE, None);
                }
            }
            caught
        }
        SyntaxKind::Try => state.clone(),
        _ => state.constrain(&top, truthiness(truthy))?,
    };

    match stack_effect(tree, cfg, branch, truthy) {
        StackEffect::Clear => next.clear_stack(),
        StackEffect::Pop => {
            next.pop();
        }
        StackEffect::Keep => {}
    }
    Some(next)
}

fn truthiness(truthy: bool) -> Constraint {
    if truthy {
        Constraint::TRUTHY
    } else {
        Constraint::FALSY
    }
}

fn loop_binding(ctx: &PointContext<'_>, branch: NodeId) -> Option<VariableId> {
    let tree = ctx.tree;
    let binding = tree.skip_parentheses(tree.child(branch, 0)?);
    let identifier = if tree.is(binding, SyntaxKind::VariableDeclaration) {
        let first = tree.child(binding, 0)?;
        if tree.is(first, SyntaxKind::InitializedBinding) {
            tree.child(first, 0)?
        } else {
            first
        }
    } else {
        binding
    };
    tree.kind(identifier)
        .is_identifier()
        .then(|| ctx.resolver.tracked_variable(tree, identifier))
        .flatten()
}

fn catch_parameter(ctx: &PointContext<'_>, clause: NodeId) -> Option<VariableId> {
    let tree = ctx.tree;
    let parameter = tree
        .children(clause)
        .iter()
        .copied()
        .find(|child| tree.kind(*child).is_identifier())?;
    ctx.resolver.tracked_variable(tree, parameter)
}

/// Expression whose truthiness the `branch` decides, for condition
/// outcomes. `None` for branches that are not plain truthiness tests.
pub(crate) fn decided_expression(
    tree: &SyntaxTree,
    cfg: &ControlFlowGraph,
    branch: NodeId,
) -> Option<NodeId> {
    let condition = match tree.kind(branch) {
        SyntaxKind::If | SyntaxKind::While | SyntaxKind::Conditional => tree.child(branch, 0)?,
        SyntaxKind::DoWhile => tree.child(branch, 1)?,
        SyntaxKind::For => tree.present_child(branch, 1)?,
        SyntaxKind::LogicalAnd | SyntaxKind::LogicalOr => tree.child(branch, 0)?,
        _ => return None,
    };

    // `if (a && b)` in condition position branches on `b` last
    let mut decided = tree.skip_parentheses(condition);
    while matches!(tree.kind(decided), SyntaxKind::LogicalAnd | SyntaxKind::LogicalOr)
        && cfg.block_of(decided).is_none()
    {
        decided = tree.skip_parentheses(tree.child(decided, 1)?);
    }

    if tree.kind(branch).is_loop() && tree.kind(decided).is_literal() {
        return None;
    }
    Some(decided)
}
