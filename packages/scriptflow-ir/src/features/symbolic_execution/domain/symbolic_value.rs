//! Symbolic values
//!
//! Values pushed on the evaluation stack. Literals and singletons carry their
//! own constraint; derived values keep only their operands and are resolved
//! against a [`ProgramState`] when queried, so the same `a + b` can be a string
//! on one path and a number on another.

use super::constraint::Constraint;
use super::program_state::ProgramState;
use crate::shared::models::VariableId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Literal with a statically known value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    /// IEEE-754 bits, so the value can be hashed
    Number(u64),
    String(Arc<str>),
    Bool(bool),
}

impl LiteralValue {
    pub fn number(value: f64) -> Self {
        LiteralValue::Number(value.to_bits())
    }

    pub fn string(value: &str) -> Self {
        LiteralValue::String(Arc::from(value))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn constraint(&self) -> Constraint {
        match self {
            LiteralValue::Number(bits) => Constraint::of_number(f64::from_bits(*bits)),
            LiteralValue::String(s) => Constraint::of_string(s),
            LiteralValue::Bool(b) => Constraint::of_bool(*b),
        }
    }
}

/// How much a complete object-literal shape is trusted when a property is
/// missing from it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyResolution {
    /// Missing properties are unknown (the prototype chain may supply them)
    #[default]
    Partial,
    /// Missing properties of a complete shape read as `undefined`
    Complete,
}

/// Statically known own properties of an object literal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    properties: Vec<(Arc<str>, Constraint)>,
    /// false once a spread or computed key was seen
    complete: bool,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            complete: true,
        }
    }

    /// Later definitions of the same key win, as in an object literal.
    pub fn with_property(mut self, name: &str, constraint: Constraint) -> Self {
        self.properties.retain(|(key, _)| key.as_ref() != name);
        self.properties.push((Arc::from(name), constraint));
        self
    }

    pub fn incomplete(mut self) -> Self {
        self.complete = false;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn property(&self, name: &str) -> Option<Constraint> {
        self.properties
            .iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, constraint)| *constraint)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Constraint of `name` read from this shape, `None` when nothing is known
    pub fn resolve(&self, name: &str, mode: PropertyResolution) -> Option<Constraint> {
        match self.property(name) {
            Some(constraint) => Some(constraint),
            None if self.complete && mode == PropertyResolution::Complete => {
                Some(Constraint::UNDEFINED)
            }
            None => None,
        }
    }
}

impl Default for ObjectShape {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    In,
    InstanceOf,
}

impl RelationalOp {
    /// Equality operator and whether it asserts equality
    pub fn equality(self) -> Option<(bool, bool)> {
        match self {
            RelationalOp::Equal => Some((false, true)),
            RelationalOp::NotEqual => Some((false, false)),
            RelationalOp::StrictEqual => Some((true, true)),
            RelationalOp::StrictNotEqual => Some((true, false)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolicValue {
    /// Anything the engine declines to model
    Unknown,
    Null,
    Undefined,
    Literal(LiteralValue),
    /// Fresh value known only by its constraint
    Constrained(Constraint),
    /// Current value of a tracked variable
    Variable(VariableId),
    Object(Arc<ObjectShape>),
    Plus(Arc<SymbolicValue>, Arc<SymbolicValue>),
    UnaryMinus(Arc<SymbolicValue>),
    IncDec {
        increment: bool,
        prefix: bool,
        operand: Arc<SymbolicValue>,
    },
    LogicalNot(Arc<SymbolicValue>),
    TypeOf(Arc<SymbolicValue>),
    Relational {
        op: RelationalOp,
        left: Arc<SymbolicValue>,
        right: Arc<SymbolicValue>,
    },
}

impl SymbolicValue {
    pub fn number(value: f64) -> Self {
        SymbolicValue::Literal(LiteralValue::number(value))
    }

    pub fn string(value: &str) -> Self {
        SymbolicValue::Literal(LiteralValue::string(value))
    }

    pub fn boolean(value: bool) -> Self {
        SymbolicValue::Literal(LiteralValue::Bool(value))
    }

    pub fn plus(left: SymbolicValue, right: SymbolicValue) -> Self {
        SymbolicValue::Plus(Arc::new(left), Arc::new(right))
    }

    pub fn relational(op: RelationalOp, left: SymbolicValue, right: SymbolicValue) -> Self {
        SymbolicValue::Relational {
            op,
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }

    pub fn as_variable(&self) -> Option<VariableId> {
        match self {
            SymbolicValue::Variable(id) => Some(*id),
            _ => None,
        }
    }

    /// Variables this value reads when its constraint is computed
    pub(crate) fn collect_variables(&self, out: &mut Vec<VariableId>) {
        match self {
            SymbolicValue::Variable(id) => out.push(*id),
            SymbolicValue::Plus(left, right) | SymbolicValue::Relational { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            SymbolicValue::UnaryMinus(operand)
            | SymbolicValue::IncDec { operand, .. }
            | SymbolicValue::LogicalNot(operand)
            | SymbolicValue::TypeOf(operand) => operand.collect_variables(out),
            SymbolicValue::Unknown
            | SymbolicValue::Null
            | SymbolicValue::Undefined
            | SymbolicValue::Literal(_)
            | SymbolicValue::Constrained(_)
            | SymbolicValue::Object(_) => {}
        }
    }

    /// Whether computing this value's constraint reads `variable`
    pub fn reads(&self, variable: VariableId) -> bool {
        match self {
            SymbolicValue::Variable(id) => *id == variable,
            SymbolicValue::Plus(left, right) | SymbolicValue::Relational { left, right, .. } => {
                left.reads(variable) || right.reads(variable)
            }
            SymbolicValue::UnaryMinus(operand)
            | SymbolicValue::IncDec { operand, .. }
            | SymbolicValue::LogicalNot(operand)
            | SymbolicValue::TypeOf(operand) => operand.reads(variable),
            _ => false,
        }
    }

    /// Copy of this value with every read of `variable` replaced by the
    /// constraint it had when read
    pub(crate) fn detached(&self, variable: VariableId, snapshot: Constraint) -> SymbolicValue {
        let detach = |operand: &Arc<SymbolicValue>| {
            if operand.reads(variable) {
                Arc::new(operand.detached(variable, snapshot))
            } else {
                Arc::clone(operand)
            }
        };
        match self {
            SymbolicValue::Variable(id) if *id == variable => SymbolicValue::Constrained(snapshot),
            SymbolicValue::Plus(left, right) => SymbolicValue::Plus(detach(left), detach(right)),
            SymbolicValue::Relational { op, left, right } => SymbolicValue::Relational {
                op: *op,
                left: detach(left),
                right: detach(right),
            },
            SymbolicValue::UnaryMinus(operand) => SymbolicValue::UnaryMinus(detach(operand)),
            SymbolicValue::IncDec {
                increment,
                prefix,
                operand,
            } => SymbolicValue::IncDec {
                increment: *increment,
                prefix: *prefix,
                operand: detach(operand),
            },
            SymbolicValue::LogicalNot(operand) => SymbolicValue::LogicalNot(detach(operand)),
            SymbolicValue::TypeOf(operand) => SymbolicValue::TypeOf(detach(operand)),
            other => other.clone(),
        }
    }

    /// Constraint of this value in `state`
    pub fn constraint_in(&self, state: &ProgramState) -> Constraint {
        match self {
            SymbolicValue::Unknown => Constraint::ANY_VALUE,
            SymbolicValue::Null => Constraint::NULL,
            SymbolicValue::Undefined => Constraint::UNDEFINED,
            SymbolicValue::Literal(literal) => literal.constraint(),
            SymbolicValue::Constrained(constraint) => *constraint,
            SymbolicValue::Variable(id) => state.variable_constraint(*id),
            SymbolicValue::Object(_) => Constraint::OTHER_OBJECT,
            SymbolicValue::Plus(left, right) => {
                plus_constraint(left.constraint_in(state), right.constraint_in(state))
            }
            SymbolicValue::UnaryMinus(operand) => negate(operand.constraint_in(state)),
            SymbolicValue::IncDec {
                increment,
                prefix,
                operand,
            } => {
                let old = operand.constraint_in(state);
                if *prefix {
                    step(old, *increment)
                } else {
                    old.to_number()
                }
            }
            SymbolicValue::TypeOf(_) => Constraint::NON_EMPTY_STRING,
            SymbolicValue::LogicalNot(_) | SymbolicValue::Relational { .. } => {
                let can_be_true = state.constrain(self, Constraint::TRUE).is_some();
                let can_be_false = state.constrain(self, Constraint::FALSE).is_some();
                match (can_be_true, can_be_false) {
                    (true, false) => Constraint::TRUE,
                    (false, true) => Constraint::FALSE,
                    _ => Constraint::BOOLEAN_PRIMITIVE,
                }
            }
        }
    }
}

/// `+`: string concatenation as soon as one side is a string, numeric
/// addition when both sides convert to numbers without `toString`.
pub fn plus_constraint(left: Constraint, right: Constraint) -> Constraint {
    let numeric = Constraint::ANY_NUMBER
        .or(Constraint::ANY_BOOLEAN)
        .or(Constraint::NULL_OR_UNDEFINED);
    if left.is_stricter_or_equal_to(Constraint::ANY_STRING)
        || right.is_stricter_or_equal_to(Constraint::ANY_STRING)
    {
        Constraint::STRING_PRIMITIVE
    } else if left.is_stricter_or_equal_to(numeric) && right.is_stricter_or_equal_to(numeric) {
        Constraint::NUMBER_PRIMITIVE
    } else {
        Constraint::ANY_VALUE
    }
}

/// Unary `-`
pub fn negate(operand: Constraint) -> Constraint {
    let number = operand.to_number();
    let mut result = number.and(Constraint::ZERO.or(Constraint::NAN));
    if number.contains(Constraint::POSITIVE_NUMBER) {
        result |= Constraint::NEGATIVE_NUMBER;
    }
    if number.contains(Constraint::NEGATIVE_NUMBER) {
        result |= Constraint::POSITIVE_NUMBER;
    }
    result
}

/// New value of `++x` / `--x`
pub fn step(operand: Constraint, increment: bool) -> Constraint {
    let number = operand.to_number();
    let mut result = number.and(Constraint::NAN);
    let (towards, away) = if increment {
        (Constraint::POSITIVE_NUMBER, Constraint::NEGATIVE_NUMBER)
    } else {
        (Constraint::NEGATIVE_NUMBER, Constraint::POSITIVE_NUMBER)
    };
    if number.intersects(towards.or(Constraint::ZERO)) {
        result |= towards;
    }
    // -0.5 + 1 crosses zero
    if number.contains(away) {
        result |= Constraint::NUMBER_PRIMITIVE.and(Constraint::NAN.not());
    }
    result
}
