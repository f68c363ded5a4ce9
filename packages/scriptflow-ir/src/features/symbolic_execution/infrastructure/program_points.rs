//! Program points
//!
//! One pure transformation per syntax-node category. Each takes the state
//! before the node and returns the state after it, or `None` when the node
//! cannot complete on this path (member access on a value known to be null
//! or undefined). Operands are popped right-to-left and every
//! value-producing node pushes exactly one value; statements clear the stack.
//! Categories without a dedicated rule pop their evaluated children and push
//! `Unknown`.

use super::builtin_properties::builtin_property;
use crate::features::symbolic_execution::domain::symbolic_value::{plus_constraint, step};
use crate::features::symbolic_execution::domain::{
    Constraint, ObjectShape, ProgramState, PropertyResolution, RelationalOp, SymbolicValue,
};
use crate::features::symbolic_execution::ports::SymbolResolver;
use crate::shared::models::{NodeId, SyntaxKind, SyntaxTree, VariableId};
use std::sync::Arc;

/// Any number except NaN (results of bitwise operators)
const INT32: Constraint =
    Constraint::from_bits_retain(Constraint::ZERO.bits() | Constraint::TRUTHY_NUMBER.bits());

pub(crate) struct PointContext<'a> {
    pub tree: &'a SyntaxTree,
    pub resolver: &'a dyn SymbolResolver,
    pub property_resolution: PropertyResolution,
}

impl PointContext<'_> {
    /// Tracked variable behind an identifier (parentheses skipped)
    fn variable_of(&self, node: NodeId) -> Option<VariableId> {
        let node = self.tree.skip_parentheses(node);
        if self.tree.kind(node).is_identifier() {
            self.resolver.tracked_variable(self.tree, node)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PointOutcome {
    pub state: ProgramState,
    /// Operand constraints, left to right, as seen before the node ran
    pub operands: Vec<Constraint>,
}

pub(crate) fn execute(
    ctx: &PointContext<'_>,
    node: NodeId,
    state: &ProgramState,
) -> Option<PointOutcome> {
    let tree = ctx.tree;
    let kind = tree.kind(node);
    let mut next = state.clone();
    let mut operands = Vec::new();

    match kind {
        SyntaxKind::DotMember | SyntaxKind::BracketMember => {
            next = member_access(ctx, node, next, &mut operands)?;
        }
        SyntaxKind::Plus => {
            let (left, right) = pop_operands(&mut next, &mut operands);
            next.push(SymbolicValue::plus(left, right));
        }
        k if k.is_arithmetic() => {
            pop_operands(&mut next, &mut operands);
            let result = arithmetic(operands[0], operands[1]);
            next.push(SymbolicValue::Constrained(result));
        }
        k if k.is_bitwise() => {
            pop_operands(&mut next, &mut operands);
            next.push(SymbolicValue::Constrained(bitwise(k)));
        }
        k if k.is_relational() => {
            let (left, right) = pop_operands(&mut next, &mut operands);
            match relational_op(k) {
                Some(op) => next.push(SymbolicValue::relational(op, left, right)),
                None => next.push(SymbolicValue::Constrained(Constraint::BOOLEAN_PRIMITIVE)),
            }
        }
        SyntaxKind::Comma => {
            let (_, right) = pop_operands(&mut next, &mut operands);
            next.push(right);
        }
        SyntaxKind::UnaryPlus => {
            let operand = pop_operand(&mut next, &mut operands);
            let number = operand.constraint_in(&next).to_number();
            next.push(SymbolicValue::Constrained(number));
        }
        SyntaxKind::UnaryMinus => {
            let operand = pop_operand(&mut next, &mut operands);
            next.push(SymbolicValue::UnaryMinus(Arc::new(operand)));
        }
        SyntaxKind::BitwiseComplement => {
            pop_operand(&mut next, &mut operands);
            next.push(SymbolicValue::Constrained(INT32));
        }
        k if k.is_increment_or_decrement() => inc_dec(ctx, node, k, &mut next, &mut operands),
        SyntaxKind::LogicalNot => {
            let operand = pop_operand(&mut next, &mut operands);
            next.push(SymbolicValue::LogicalNot(Arc::new(operand)));
        }
        SyntaxKind::TypeOf => {
            let operand = pop_operand(&mut next, &mut operands);
            next.push(SymbolicValue::TypeOf(Arc::new(operand)));
        }
        SyntaxKind::Void => {
            pop_operand(&mut next, &mut operands);
            next.push(SymbolicValue::Undefined);
        }
        SyntaxKind::Delete => {
            pop_operand(&mut next, &mut operands);
            next.push(SymbolicValue::Constrained(Constraint::BOOLEAN_PRIMITIVE));
        }
        SyntaxKind::IdentifierReference | SyntaxKind::BindingIdentifier => {
            next.push(identifier(ctx, node));
        }
        SyntaxKind::NullLiteral => next.push(SymbolicValue::Null),
        SyntaxKind::BooleanLiteral => next.push(SymbolicValue::boolean(tree.text(node) == Some("true"))),
        SyntaxKind::NumericLiteral => next.push(numeric_literal(tree.text(node))),
        SyntaxKind::StringLiteral => next.push(SymbolicValue::string(tree.text(node).unwrap_or(""))),
        SyntaxKind::RegExpLiteral => next.push(SymbolicValue::Constrained(Constraint::REGEXP)),
        SyntaxKind::TemplateLiteral => {
            let substitutions = tree.children(node).len();
            next.pop_n(substitutions);
            let value = match (substitutions, tree.text(node)) {
                (0, Some(text)) => SymbolicValue::string(text),
                _ => SymbolicValue::Constrained(Constraint::STRING_PRIMITIVE),
            };
            next.push(value);
        }
        SyntaxKind::ArrayLiteral => {
            for value in next.pop_n(tree.children(node).len()) {
                escape(&mut next, &value);
            }
            next.push(SymbolicValue::Constrained(Constraint::ARRAY));
        }
        SyntaxKind::ObjectLiteral => object_literal(tree, node, &mut next),
        SyntaxKind::PairProperty => {
            let value = next.pop();
            next.pop();
            next.push(value);
        }
        SyntaxKind::ComputedPropertyName | SyntaxKind::SpreadElement => {
            let value = next.pop();
            escape(&mut next, &value);
            next.push(SymbolicValue::Unknown);
        }
        SyntaxKind::Assignment => {
            let value = next.pop();
            let target = next.pop();
            store(ctx, node, &mut next, target, value, &mut operands);
        }
        SyntaxKind::InitializedBinding => {
            let target = next.pop();
            let value = next.pop();
            store(ctx, node, &mut next, target, value, &mut operands);
        }
        k if k.is_compound_assignment() => compound_assignment(ctx, node, k, &mut next, &mut operands),
        SyntaxKind::Call | SyntaxKind::New => {
            let values = next.pop_n(tree.children(node).len());
            for argument in values.iter().skip(1) {
                escape(&mut next, argument);
            }
            // A method call may mutate its receiver
            if let Some(receiver) = tree
                .child(node, 0)
                .map(|callee| tree.skip_parentheses(callee))
                .filter(|callee| tree.kind(*callee).is_member_access())
                .and_then(|callee| tree.child(callee, 0))
                .and_then(|object| ctx.variable_of(object))
            {
                next.forget_shape(receiver);
            }
            next.push(if kind == SyntaxKind::New {
                SymbolicValue::Constrained(Constraint::OBJECT)
            } else {
                SymbolicValue::Unknown
            });
        }
        SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction | SyntaxKind::ClassExpression => {
            next.push(SymbolicValue::Constrained(Constraint::FUNCTION));
        }
        // The chosen operand is already on top of the stack
        SyntaxKind::LogicalAnd
        | SyntaxKind::LogicalOr
        | SyntaxKind::NullishCoalescing
        | SyntaxKind::Conditional
        | SyntaxKind::Parenthesised => {}
        k if k.is_statement() => next.clear_stack(),
        _ => {
            next.pop_n(tree.children(node).len());
            next.push(SymbolicValue::Unknown);
        }
    }

    Some(PointOutcome {
        state: next,
        operands,
    })
}

fn pop_operand(state: &mut ProgramState, operands: &mut Vec<Constraint>) -> SymbolicValue {
    let value = state.pop();
    operands.push(value.constraint_in(state));
    value
}

fn pop_operands(
    state: &mut ProgramState,
    operands: &mut Vec<Constraint>,
) -> (SymbolicValue, SymbolicValue) {
    let right = state.pop();
    let left = state.pop();
    operands.push(left.constraint_in(state));
    operands.push(right.constraint_in(state));
    (left, right)
}

/// `- * / % **`
fn arithmetic(left: Constraint, right: Constraint) -> Constraint {
    let yields_nan = |c: Constraint| {
        !c.is_bottom()
            && (c.is_stricter_or_equal_to(Constraint::UNDEFINED)
                || c.is_stricter_or_equal_to(
                    Constraint::OTHER_OBJECT
                        .or(Constraint::FUNCTION)
                        .or(Constraint::REGEXP),
                ))
    };
    if yields_nan(left) || yields_nan(right) {
        Constraint::NAN
    } else {
        Constraint::NUMBER_PRIMITIVE
    }
}

fn bitwise(kind: SyntaxKind) -> Constraint {
    match kind {
        SyntaxKind::UnsignedRightShift | SyntaxKind::UnsignedRightShiftAssignment => {
            Constraint::NON_NEGATIVE_NUMBER
        }
        _ => INT32,
    }
}

fn relational_op(kind: SyntaxKind) -> Option<RelationalOp> {
    Some(match kind {
        SyntaxKind::Equal => RelationalOp::Equal,
        SyntaxKind::NotEqual => RelationalOp::NotEqual,
        SyntaxKind::StrictEqual => RelationalOp::StrictEqual,
        SyntaxKind::StrictNotEqual => RelationalOp::StrictNotEqual,
        SyntaxKind::Less => RelationalOp::Less,
        SyntaxKind::Greater => RelationalOp::Greater,
        SyntaxKind::LessOrEqual => RelationalOp::LessOrEqual,
        SyntaxKind::GreaterOrEqual => RelationalOp::GreaterOrEqual,
        SyntaxKind::In => RelationalOp::In,
        SyntaxKind::InstanceOf => RelationalOp::InstanceOf,
        _ => return None,
    })
}

fn identifier(ctx: &PointContext<'_>, node: NodeId) -> SymbolicValue {
    if let Some(variable) = ctx.resolver.tracked_variable(ctx.tree, node) {
        return SymbolicValue::Variable(variable);
    }
    match ctx.tree.text(node) {
        Some("undefined") => SymbolicValue::Undefined,
        Some("NaN") => SymbolicValue::number(f64::NAN),
        Some("Infinity") => SymbolicValue::number(f64::INFINITY),
        _ => SymbolicValue::Unknown,
    }
}

fn numeric_literal(raw: Option<&str>) -> SymbolicValue {
    let Some(raw) = raw else {
        return SymbolicValue::Constrained(Constraint::NUMBER_PRIMITIVE);
    };
    // BigInt
    if raw.ends_with('n') {
        return SymbolicValue::Unknown;
    }
    match parse_number(raw) {
        Some(value) => SymbolicValue::number(value),
        None => SymbolicValue::Constrained(Constraint::NUMBER_PRIMITIVE),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| lower.strip_prefix(prefix).map(|digits| (digits, radix)));
    match radix {
        Some((digits, radix)) => u64::from_str_radix(digits, radix).ok().map(|v| v as f64),
        None => lower.parse::<f64>().ok(),
    }
}

/// The value is now reachable through another name; its shape can no longer
/// be trusted.
fn escape(state: &mut ProgramState, value: &SymbolicValue) {
    if let Some(variable) = value.as_variable() {
        state.forget_shape(variable);
    }
}

/// Writing through `o.p` updates o's shape; any other member write drops it.
fn write_member(ctx: &PointContext<'_>, state: &mut ProgramState, target: NodeId, written: Constraint) {
    let tree = ctx.tree;
    let target = tree.skip_parentheses(target);
    if !tree.kind(target).is_member_access() {
        return;
    }
    let Some(object) = tree.child(target, 0).and_then(|object| ctx.variable_of(object)) else {
        return;
    };
    let property = tree
        .child(target, 1)
        .filter(|_| tree.is(target, SyntaxKind::DotMember))
        .and_then(|name| tree.text(name));

    match (state.shape_of(object), property) {
        (Some(shape), Some(name)) => {
            let updated = shape.clone().with_property(name, written);
            state.update_shape(object, Arc::new(updated));
        }
        _ => state.forget_shape(object),
    }
}

/// `target = value` and `let target = value`
fn store(
    ctx: &PointContext<'_>,
    node: NodeId,
    state: &mut ProgramState,
    target: SymbolicValue,
    value: SymbolicValue,
    operands: &mut Vec<Constraint>,
) {
    let constraint = value.constraint_in(state);
    operands.push(constraint);
    escape(state, &value);

    match target.as_variable() {
        Some(variable) => {
            let shape = match &value {
                SymbolicValue::Object(shape) => Some(Arc::clone(shape)),
                _ => None,
            };
            state.store(variable, constraint, shape);
            state.push(SymbolicValue::Variable(variable));
        }
        None => {
            if let Some(target_node) = ctx.tree.child(node, 0) {
                write_member(ctx, state, target_node, constraint);
            }
            state.push(value);
        }
    }
}

fn compound_assignment(
    ctx: &PointContext<'_>,
    node: NodeId,
    kind: SyntaxKind,
    state: &mut ProgramState,
    operands: &mut Vec<Constraint>,
) {
    let (target, value) = pop_operands(state, operands);
    let (current, operand) = (operands[0], operands[1]);
    escape(state, &value);

    let result = match kind {
        SyntaxKind::PlusAssignment => plus_constraint(current, operand),
        SyntaxKind::LogicalAssignment => current.or(operand),
        SyntaxKind::LeftShiftAssignment
        | SyntaxKind::RightShiftAssignment
        | SyntaxKind::UnsignedRightShiftAssignment
        | SyntaxKind::BitwiseAndAssignment
        | SyntaxKind::BitwiseOrAssignment
        | SyntaxKind::BitwiseXorAssignment => bitwise(kind),
        _ => arithmetic(current, operand),
    };

    match target.as_variable() {
        Some(variable) => {
            state.store(variable, result, None);
            state.push(SymbolicValue::Variable(variable));
        }
        None => {
            if let Some(target_node) = ctx.tree.child(node, 0) {
                write_member(ctx, state, target_node, result);
            }
            state.push(SymbolicValue::Constrained(result));
        }
    }
}

fn inc_dec(
    ctx: &PointContext<'_>,
    node: NodeId,
    kind: SyntaxKind,
    state: &mut ProgramState,
    operands: &mut Vec<Constraint>,
) {
    let operand = pop_operand(state, operands);
    let old = operands[0];
    let increment = matches!(kind, SyntaxKind::PrefixIncrement | SyntaxKind::PostfixIncrement);
    let prefix = matches!(kind, SyntaxKind::PrefixIncrement | SyntaxKind::PrefixDecrement);

    // The variable is overwritten below, so the derived value keeps a
    // snapshot of the old constraint instead of a reference to it.
    let derived_from = match operand.as_variable() {
        Some(variable) => {
            state.store(variable, step(old, increment), None);
            SymbolicValue::Constrained(old)
        }
        None => {
            if let Some(target) = ctx.tree.child(node, 0) {
                write_member(ctx, state, target, step(old, increment));
            }
            operand
        }
    };
    state.push(SymbolicValue::IncDec {
        increment,
        prefix,
        operand: Arc::new(derived_from),
    });
}

fn member_access(
    ctx: &PointContext<'_>,
    node: NodeId,
    mut state: ProgramState,
    operands: &mut Vec<Constraint>,
) -> Option<ProgramState> {
    let tree = ctx.tree;
    let bracket = tree.is(node, SyntaxKind::BracketMember);
    let index = bracket.then(|| state.pop());
    let object = state.pop();

    operands.push(object.constraint_in(&state));
    if let Some(index) = &index {
        operands.push(index.constraint_in(&state));
    }

    let mut narrowed = state.constrain(&object, Constraint::NOT_NULLY)?;
    let result = match tree.child(node, 1).filter(|_| !bracket).and_then(|n| tree.text(n)) {
        Some(name) => dot_property(ctx, &narrowed, &object, name),
        None => SymbolicValue::Unknown,
    };
    narrowed.push(result);
    Some(narrowed)
}

fn dot_property(
    ctx: &PointContext<'_>,
    state: &ProgramState,
    object: &SymbolicValue,
    name: &str,
) -> SymbolicValue {
    let shape = match object {
        SymbolicValue::Object(shape) => Some(shape.as_ref()),
        SymbolicValue::Variable(variable) => state.shape_of(*variable),
        _ => None,
    };
    if let Some(constraint) = shape.and_then(|s| s.resolve(name, ctx.property_resolution)) {
        return SymbolicValue::Constrained(constraint);
    }
    builtin_property(object.constraint_in(state), name)
        .map(SymbolicValue::Constrained)
        .unwrap_or(SymbolicValue::Unknown)
}

fn property_key(tree: &SyntaxTree, pair: NodeId) -> Option<&str> {
    let key = tree.child(pair, 0)?;
    match tree.kind(key) {
        SyntaxKind::IdentifierName
        | SyntaxKind::IdentifierReference
        | SyntaxKind::StringLiteral
        | SyntaxKind::NumericLiteral => tree.text(key),
        _ => None,
    }
}

fn object_literal(tree: &SyntaxTree, node: NodeId, state: &mut ProgramState) {
    let members = tree.children(node);
    let values = state.pop_n(members.len());
    let mut shape = ObjectShape::new();

    for (member, value) in members.iter().zip(&values) {
        let constraint = value.constraint_in(state);
        let key = match tree.kind(*member) {
            SyntaxKind::PairProperty => property_key(tree, *member),
            SyntaxKind::IdentifierReference => tree.text(*member),
            _ => None,
        };
        shape = match key {
            Some(name) => shape.with_property(name, constraint),
            None => shape.incomplete(),
        };
        escape(state, value);
    }
    state.push(SymbolicValue::Object(Arc::new(shape)));
}
