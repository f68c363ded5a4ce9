//! Constraint lattice
//!
//! A constraint is the set of value categories a runtime value may belong to.
//! Every atomic category has a fixed truthiness, so truthiness and
//! nullability are derived from the set rather than stored beside it.
//! The empty set is the bottom element: no runtime value satisfies it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Constraint: u32 {
        const NULL = 1 << 0;
        const UNDEFINED = 1 << 1;
        const TRUE = 1 << 2;
        const FALSE = 1 << 3;
        const ZERO = 1 << 4;
        const POSITIVE_NUMBER = 1 << 5;
        const NEGATIVE_NUMBER = 1 << 6;
        const NAN = 1 << 7;
        const EMPTY_STRING = 1 << 8;
        const NON_EMPTY_STRING = 1 << 9;
        const SYMBOL = 1 << 10;
        const FUNCTION = 1 << 11;
        const ARRAY = 1 << 12;
        const DATE = 1 << 13;
        const REGEXP = 1 << 14;
        const NUMBER_OBJECT = 1 << 15;
        const STRING_OBJECT = 1 << 16;
        const BOOLEAN_OBJECT = 1 << 17;
        const OTHER_OBJECT = 1 << 18;

        const NULL_OR_UNDEFINED = Self::NULL.bits() | Self::UNDEFINED.bits();
        const TRUTHY_NUMBER = Self::POSITIVE_NUMBER.bits() | Self::NEGATIVE_NUMBER.bits();
        const NON_NEGATIVE_NUMBER = Self::ZERO.bits() | Self::POSITIVE_NUMBER.bits();
        const NUMBER_PRIMITIVE = Self::ZERO.bits() | Self::TRUTHY_NUMBER.bits() | Self::NAN.bits();
        const STRING_PRIMITIVE = Self::EMPTY_STRING.bits() | Self::NON_EMPTY_STRING.bits();
        const BOOLEAN_PRIMITIVE = Self::TRUE.bits() | Self::FALSE.bits();
        const OBJECT = Self::ARRAY.bits()
            | Self::DATE.bits()
            | Self::REGEXP.bits()
            | Self::NUMBER_OBJECT.bits()
            | Self::STRING_OBJECT.bits()
            | Self::BOOLEAN_OBJECT.bits()
            | Self::OTHER_OBJECT.bits();
        const ANY_NUMBER = Self::NUMBER_PRIMITIVE.bits() | Self::NUMBER_OBJECT.bits();
        const ANY_STRING = Self::STRING_PRIMITIVE.bits() | Self::STRING_OBJECT.bits();
        const ANY_BOOLEAN = Self::BOOLEAN_PRIMITIVE.bits() | Self::BOOLEAN_OBJECT.bits();
        const FALSY = Self::NULL_OR_UNDEFINED.bits()
            | Self::FALSE.bits()
            | Self::ZERO.bits()
            | Self::NAN.bits()
            | Self::EMPTY_STRING.bits();
        const TRUTHY = Self::TRUE.bits()
            | Self::TRUTHY_NUMBER.bits()
            | Self::NON_EMPTY_STRING.bits()
            | Self::SYMBOL.bits()
            | Self::FUNCTION.bits()
            | Self::OBJECT.bits();
        const NOT_NULLY = Self::TRUTHY.bits()
            | Self::FALSE.bits()
            | Self::ZERO.bits()
            | Self::NAN.bits()
            | Self::EMPTY_STRING.bits();
        const ANY_VALUE = Self::FALSY.bits() | Self::TRUTHY.bits();
    }
}

/// Atomic categories with their display names, in bit order
const ATOMS: [(Constraint, &str); 19] = [
    (Constraint::NULL, "NULL"),
    (Constraint::UNDEFINED, "UNDEFINED"),
    (Constraint::TRUE, "TRUE"),
    (Constraint::FALSE, "FALSE"),
    (Constraint::ZERO, "ZERO"),
    (Constraint::POSITIVE_NUMBER, "POSITIVE_NUMBER"),
    (Constraint::NEGATIVE_NUMBER, "NEGATIVE_NUMBER"),
    (Constraint::NAN, "NAN"),
    (Constraint::EMPTY_STRING, "EMPTY_STRING"),
    (Constraint::NON_EMPTY_STRING, "NON_EMPTY_STRING"),
    (Constraint::SYMBOL, "SYMBOL"),
    (Constraint::FUNCTION, "FUNCTION"),
    (Constraint::ARRAY, "ARRAY"),
    (Constraint::DATE, "DATE"),
    (Constraint::REGEXP, "REGEXP"),
    (Constraint::NUMBER_OBJECT, "NUMBER_OBJECT"),
    (Constraint::STRING_OBJECT, "STRING_OBJECT"),
    (Constraint::BOOLEAN_OBJECT, "BOOLEAN_OBJECT"),
    (Constraint::OTHER_OBJECT, "OTHER_OBJECT"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Truthiness {
    Truthy,
    Falsy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nullability {
    /// Always `null` or `undefined`
    Null,
    /// Never `null` or `undefined`
    NotNull,
    Unknown,
}

/// Single runtime type a constraint may pin a value to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    NumberPrimitive,
    StringPrimitive,
    BooleanPrimitive,
    NumberObject,
    StringObject,
    BooleanObject,
    Symbol,
    Function,
    Array,
    Date,
    RegExp,
    Object,
    Null,
    Undefined,
}

impl Type {
    pub fn constraint(self) -> Constraint {
        match self {
            Type::NumberPrimitive => Constraint::NUMBER_PRIMITIVE,
            Type::StringPrimitive => Constraint::STRING_PRIMITIVE,
            Type::BooleanPrimitive => Constraint::BOOLEAN_PRIMITIVE,
            Type::NumberObject => Constraint::NUMBER_OBJECT,
            Type::StringObject => Constraint::STRING_OBJECT,
            Type::BooleanObject => Constraint::BOOLEAN_OBJECT,
            Type::Symbol => Constraint::SYMBOL,
            Type::Function => Constraint::FUNCTION,
            Type::Array => Constraint::ARRAY,
            Type::Date => Constraint::DATE,
            Type::RegExp => Constraint::REGEXP,
            Type::Object => Constraint::OTHER_OBJECT,
            Type::Null => Constraint::NULL,
            Type::Undefined => Constraint::UNDEFINED,
        }
    }
}

const TYPES: [Type; 14] = [
    Type::NumberPrimitive,
    Type::StringPrimitive,
    Type::BooleanPrimitive,
    Type::NumberObject,
    Type::StringObject,
    Type::BooleanObject,
    Type::Symbol,
    Type::Function,
    Type::Array,
    Type::Date,
    Type::RegExp,
    Type::Object,
    Type::Null,
    Type::Undefined,
];

impl Constraint {
    pub const NO_POSSIBLE_VALUE: Constraint = Constraint::empty();

    /// Intersection (narrowing)
    #[inline]
    pub fn and(self, other: Constraint) -> Constraint {
        self.intersection(other)
    }

    /// Union (merging)
    #[inline]
    pub fn or(self, other: Constraint) -> Constraint {
        self.union(other)
    }

    /// Complement within [`Constraint::ANY_VALUE`]
    #[inline]
    pub fn not(self) -> Constraint {
        self.complement()
    }

    #[inline]
    pub fn is_bottom(self) -> bool {
        self.is_empty()
    }

    /// `self` refines `other` (`self AND other == self`)
    #[inline]
    pub fn is_stricter_or_equal_to(self, other: Constraint) -> bool {
        other.contains(self)
    }

    /// No value satisfies both
    #[inline]
    pub fn is_incompatible_with(self, other: Constraint) -> bool {
        self.and(other).is_bottom()
    }

    pub fn truthiness(self) -> Truthiness {
        if self.is_bottom() {
            Truthiness::Unknown
        } else if self.is_stricter_or_equal_to(Constraint::TRUTHY) {
            Truthiness::Truthy
        } else if self.is_stricter_or_equal_to(Constraint::FALSY) {
            Truthiness::Falsy
        } else {
            Truthiness::Unknown
        }
    }

    pub fn nullability(self) -> Nullability {
        if self.is_bottom() {
            Nullability::Unknown
        } else if self.is_stricter_or_equal_to(Constraint::NULL_OR_UNDEFINED) {
            Nullability::Null
        } else if self.is_incompatible_with(Constraint::NULL_OR_UNDEFINED) {
            Nullability::NotNull
        } else {
            Nullability::Unknown
        }
    }

    /// The single type this constraint pins a value to, if any
    pub fn type_(self) -> Option<Type> {
        if self.is_bottom() {
            return None;
        }
        TYPES
            .iter()
            .copied()
            .find(|t| self.is_stricter_or_equal_to(t.constraint()))
    }

    /// Constraint of a numeric literal value
    pub fn of_number(value: f64) -> Constraint {
        if value.is_nan() {
            Constraint::NAN
        } else if value == 0.0 {
            Constraint::ZERO
        } else if value > 0.0 {
            Constraint::POSITIVE_NUMBER
        } else {
            Constraint::NEGATIVE_NUMBER
        }
    }

    pub fn of_string(value: &str) -> Constraint {
        if value.is_empty() {
            Constraint::EMPTY_STRING
        } else {
            Constraint::NON_EMPTY_STRING
        }
    }

    pub fn of_bool(value: bool) -> Constraint {
        if value {
            Constraint::TRUE
        } else {
            Constraint::FALSE
        }
    }

    /// Values a `typeof` comparison against `name` admits. Unknown names give
    /// `None` and must not narrow anything.
    pub fn of_typeof_name(name: &str) -> Option<Constraint> {
        match name {
            "undefined" => Some(Constraint::UNDEFINED),
            "object" => Some(Constraint::NULL.or(Constraint::OBJECT)),
            "function" => Some(Constraint::FUNCTION),
            "number" => Some(Constraint::NUMBER_PRIMITIVE),
            "string" => Some(Constraint::STRING_PRIMITIVE),
            "boolean" => Some(Constraint::BOOLEAN_PRIMITIVE),
            "symbol" => Some(Constraint::SYMBOL),
            _ => None,
        }
    }

    /// Result of the numeric conversion performed by unary `+` and the
    /// increment operators.
    pub fn to_number(self) -> Constraint {
        if !self.is_bottom() && self.is_stricter_or_equal_to(Constraint::NUMBER_PRIMITIVE) {
            self
        } else {
            Constraint::NUMBER_PRIMITIVE
        }
    }

    pub fn atoms(self) -> impl Iterator<Item = (Constraint, &'static str)> {
        ATOMS.iter().copied().filter(move |(atom, _)| self.contains(*atom))
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Constraint::ANY_VALUE {
            return f.write_str("ANY_VALUE");
        }
        if self.is_bottom() {
            return f.write_str("NO_POSSIBLE_VALUE");
        }
        let mut first = true;
        for (_, name) in self.atoms() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}
