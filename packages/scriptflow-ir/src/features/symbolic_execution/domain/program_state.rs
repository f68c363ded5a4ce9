//! Program state
//!
//! One point of one explored path: the expression stack and what is known
//! about every tracked variable. States are compared and hashed structurally
//! (stack as a vector, constraints and shapes as sorted maps), which is what
//! makes `(block, state)` memoization work.
//!
//! Mutators are crate-private and only ever applied to a fresh clone by the
//! program points, so a state handed out is never changed afterwards.

use super::constraint::Constraint;
use super::symbolic_value::{LiteralValue, ObjectShape, RelationalOp, SymbolicValue};
use crate::shared::models::VariableId;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProgramState {
    stack: Vec<SymbolicValue>,
    constraints: BTreeMap<VariableId, Constraint>,
    shapes: BTreeMap<VariableId, Arc<ObjectShape>>,
}

impl ProgramState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a variable constraint
    pub fn with_constraint(mut self, variable: VariableId, constraint: Constraint) -> Self {
        self.constraints.insert(variable, constraint);
        self
    }

    pub fn stack(&self) -> &[SymbolicValue] {
        &self.stack
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn peek(&self) -> Option<&SymbolicValue> {
        self.stack.last()
    }

    /// Constraint of the top of the stack (`ANY_VALUE` when empty)
    pub fn peek_constraint(&self) -> Constraint {
        self.peek()
            .map(|value| value.constraint_in(self))
            .unwrap_or(Constraint::ANY_VALUE)
    }

    /// Constraint of a variable; untracked variables can hold anything
    pub fn variable_constraint(&self, variable: VariableId) -> Constraint {
        self.constraints
            .get(&variable)
            .copied()
            .unwrap_or(Constraint::ANY_VALUE)
    }

    pub fn is_tracked(&self, variable: VariableId) -> bool {
        self.constraints.contains_key(&variable)
    }

    pub fn constraints(&self) -> impl Iterator<Item = (VariableId, Constraint)> + '_ {
        self.constraints.iter().map(|(id, c)| (*id, *c))
    }

    pub fn shape_of(&self, variable: VariableId) -> Option<&ObjectShape> {
        self.shapes.get(&variable).map(|shape| shape.as_ref())
    }

    pub(crate) fn push(&mut self, value: SymbolicValue) {
        self.stack.push(value);
    }

    /// Pops `Unknown` from an empty stack, so malformed element orders
    /// degrade instead of failing.
    pub(crate) fn pop(&mut self) -> SymbolicValue {
        self.stack.pop().unwrap_or(SymbolicValue::Unknown)
    }

    /// Pops `n` values, returned bottom-to-top
    pub(crate) fn pop_n(&mut self, n: usize) -> Vec<SymbolicValue> {
        let mut values: Vec<SymbolicValue> = (0..n).map(|_| self.pop()).collect();
        values.reverse();
        values
    }

    pub(crate) fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Overwrite a variable's constraint, keeping its shape
    pub(crate) fn assign(&mut self, variable: VariableId, constraint: Constraint) {
        self.constraints.insert(variable, constraint);
    }

    /// Assignment of a new value; the old shape no longer applies. Stack
    /// values that read the variable earlier keep the value they read.
    pub(crate) fn store(
        &mut self,
        variable: VariableId,
        constraint: Constraint,
        shape: Option<Arc<ObjectShape>>,
    ) {
        self.detach_stack_from(variable);
        self.constraints.insert(variable, constraint);
        match shape {
            Some(shape) => {
                self.shapes.insert(variable, shape);
            }
            None => {
                self.shapes.remove(&variable);
            }
        }
    }

    /// In-place mutation of the object a variable holds. Earlier reads see
    /// the same object, so the stack is left as is.
    pub(crate) fn update_shape(&mut self, variable: VariableId, shape: Arc<ObjectShape>) {
        self.shapes.insert(variable, shape);
    }

    fn detach_stack_from(&mut self, variable: VariableId) {
        if !self.stack.iter().any(|value| value.reads(variable)) {
            return;
        }
        let snapshot = self.variable_constraint(variable);
        for value in &mut self.stack {
            if value.reads(variable) {
                *value = value.detached(variable, snapshot);
            }
        }
    }

    pub(crate) fn forget_shape(&mut self, variable: VariableId) {
        self.shapes.remove(&variable);
    }

    /// Drop everything known about variables outside `live`. Variables still
    /// referenced from the stack are kept: their values cross the edge.
    pub(crate) fn retain_variables(&mut self, live: &FxHashSet<VariableId>) {
        let mut on_stack = Vec::new();
        for value in &self.stack {
            value.collect_variables(&mut on_stack);
        }
        let keep = |id: &VariableId| live.contains(id) || on_stack.contains(id);
        self.constraints.retain(|id, _| keep(id));
        self.shapes.retain(|id, _| keep(id));
    }

    /// State in which `value` satisfies `constraint`, or `None` when no
    /// runtime value can.
    pub fn constrain(&self, value: &SymbolicValue, constraint: Constraint) -> Option<Self> {
        match value {
            SymbolicValue::LogicalNot(operand) => match boolean_outcome(constraint)? {
                Some(true) => self.constrain(operand, Constraint::FALSY),
                Some(false) => self.constrain(operand, Constraint::TRUTHY),
                None => Some(self.clone()),
            },
            SymbolicValue::Relational { op, left, right } => match boolean_outcome(constraint)? {
                Some(outcome) => self.constrain_relational(*op, left, right, outcome),
                None => Some(self.clone()),
            },
            _ => {
                let narrowed = value.constraint_in(self).and(constraint);
                if narrowed.is_bottom() {
                    return None;
                }
                let mut next = self.clone();
                if let Some(variable) = value.as_variable() {
                    next.assign(variable, narrowed);
                }
                Some(next)
            }
        }
    }

    fn constrain_relational(
        &self,
        op: RelationalOp,
        left: &SymbolicValue,
        right: &SymbolicValue,
        outcome: bool,
    ) -> Option<Self> {
        let Some((strict, asserts_equal)) = op.equality() else {
            return match (op, outcome) {
                (RelationalOp::InstanceOf, true) => {
                    self.constrain(left, Constraint::OBJECT.or(Constraint::FUNCTION))
                }
                (RelationalOp::In, true) => {
                    self.constrain(right, Constraint::OBJECT.or(Constraint::FUNCTION))
                }
                _ => Some(self.clone()),
            };
        };
        let equal = asserts_equal == outcome;

        if let Some((operand, admitted)) = typeof_comparison(left, right) {
            let narrowing = if equal { admitted } else { admitted.not() };
            return self.constrain(operand, narrowing);
        }

        let left_constraint = left.constraint_in(self);
        let right_constraint = right.constraint_in(self);

        if !strict {
            let nullish = |c: Constraint| {
                !c.is_bottom() && c.is_stricter_or_equal_to(Constraint::NULL_OR_UNDEFINED)
            };
            let narrowing = if equal {
                Constraint::NULL_OR_UNDEFINED
            } else {
                Constraint::NOT_NULLY
            };
            return if nullish(right_constraint) {
                self.constrain(left, narrowing)
            } else if nullish(left_constraint) {
                self.constrain(right, narrowing)
            } else {
                Some(self.clone())
            };
        }

        if equal {
            if left_constraint == Constraint::NAN || right_constraint == Constraint::NAN {
                return None;
            }
            let common = left_constraint.and(right_constraint);
            if common.is_bottom() {
                return None;
            }
            self.constrain(left, common)?.constrain(right, common)
        } else {
            let mut next = self.clone();
            if is_singleton(right_constraint) {
                next = next.constrain(left, right_constraint.not())?;
            }
            if is_singleton(left_constraint) {
                next = next.constrain(right, left_constraint.not())?;
            }
            Some(next)
        }
    }
}

/// `Some(None)` when both outcomes are admitted, `None` when neither is
fn boolean_outcome(constraint: Constraint) -> Option<Option<bool>> {
    let admitted = constraint.and(Constraint::BOOLEAN_PRIMITIVE);
    if admitted.is_bottom() {
        None
    } else if admitted == Constraint::TRUE {
        Some(Some(true))
    } else if admitted == Constraint::FALSE {
        Some(Some(false))
    } else {
        Some(None)
    }
}

/// `typeof x == "name"` in either operand order
fn typeof_comparison<'v>(
    left: &'v SymbolicValue,
    right: &'v SymbolicValue,
) -> Option<(&'v SymbolicValue, Constraint)> {
    match (left, right) {
        (SymbolicValue::TypeOf(operand), SymbolicValue::Literal(LiteralValue::String(name)))
        | (SymbolicValue::Literal(LiteralValue::String(name)), SymbolicValue::TypeOf(operand)) => {
            Constraint::of_typeof_name(name).map(|admitted| (operand.as_ref(), admitted))
        }
        _ => None,
    }
}

/// Constraints holding exactly one value under `===`
fn is_singleton(constraint: Constraint) -> bool {
    [
        Constraint::NULL,
        Constraint::UNDEFINED,
        Constraint::TRUE,
        Constraint::FALSE,
        Constraint::ZERO,
        Constraint::EMPTY_STRING,
    ]
    .contains(&constraint)
}
