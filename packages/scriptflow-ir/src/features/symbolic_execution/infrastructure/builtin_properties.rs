//! Built-in property tables
//!
//! Properties whose constraint is fixed by the receiver's type alone.

use crate::features::symbolic_execution::domain::Constraint;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

type PropertyTable = FxHashMap<&'static str, Constraint>;

fn table(length: Option<Constraint>, methods: &[&'static str]) -> PropertyTable {
    let mut table: PropertyTable = methods.iter().map(|m| (*m, Constraint::FUNCTION)).collect();
    if let Some(length) = length {
        table.insert("length", length);
    }
    table
}

static STRING_PROPERTIES: Lazy<PropertyTable> = Lazy::new(|| {
    table(
        Some(Constraint::NON_NEGATIVE_NUMBER),
        &[
            "at", "charAt", "charCodeAt", "codePointAt", "concat", "endsWith", "includes",
            "indexOf", "lastIndexOf", "localeCompare", "match", "matchAll", "normalize",
            "padEnd", "padStart", "repeat", "replace", "replaceAll", "search", "slice",
            "split", "startsWith", "substr", "substring", "toLocaleLowerCase",
            "toLocaleUpperCase", "toLowerCase", "toUpperCase", "trim", "trimEnd",
            "trimStart",
        ],
    )
});

static ARRAY_PROPERTIES: Lazy<PropertyTable> = Lazy::new(|| {
    table(
        Some(Constraint::NON_NEGATIVE_NUMBER),
        &[
            "at", "concat", "copyWithin", "entries", "every", "fill", "filter", "find",
            "findIndex", "findLast", "findLastIndex", "flat", "flatMap", "forEach",
            "includes", "indexOf", "join", "keys", "lastIndexOf", "map", "pop", "push",
            "reduce", "reduceRight", "reverse", "shift", "slice", "some", "sort", "splice",
            "unshift", "values",
        ],
    )
});

static FUNCTION_PROPERTIES: Lazy<PropertyTable> = Lazy::new(|| {
    let mut table = table(
        Some(Constraint::NON_NEGATIVE_NUMBER),
        &["apply", "bind", "call"],
    );
    table.insert("name", Constraint::STRING_PRIMITIVE);
    table
});

static NUMBER_PROPERTIES: Lazy<PropertyTable> = Lazy::new(|| {
    table(None, &["toExponential", "toFixed", "toPrecision"])
});

/// `Object.prototype` members every non-nullish value inherits
static OBJECT_PROTOTYPE: Lazy<PropertyTable> = Lazy::new(|| {
    table(
        None,
        &[
            "constructor", "hasOwnProperty", "isPrototypeOf", "propertyIsEnumerable",
            "toLocaleString", "toString", "valueOf",
        ],
    )
});

/// Receivers whose inherited members cannot be shadowed by own properties
/// we failed to see
fn has_builtin_prototype(receiver: Constraint) -> bool {
    receiver.is_stricter_or_equal_to(
        Constraint::STRING_PRIMITIVE
            .or(Constraint::NUMBER_PRIMITIVE)
            .or(Constraint::BOOLEAN_PRIMITIVE)
            .or(Constraint::ARRAY)
            .or(Constraint::FUNCTION),
    )
}

/// Constraint of `receiver.name` when the receiver's type decides it
pub(crate) fn builtin_property(receiver: Constraint, name: &str) -> Option<Constraint> {
    if receiver.is_bottom() {
        return None;
    }
    let typed = if receiver.is_stricter_or_equal_to(Constraint::ANY_STRING) {
        Some(&*STRING_PROPERTIES)
    } else if receiver.is_stricter_or_equal_to(Constraint::ARRAY) {
        Some(&*ARRAY_PROPERTIES)
    } else if receiver.is_stricter_or_equal_to(Constraint::FUNCTION) {
        Some(&*FUNCTION_PROPERTIES)
    } else if receiver.is_stricter_or_equal_to(Constraint::ANY_NUMBER) {
        Some(&*NUMBER_PROPERTIES)
    } else {
        None
    };

    if let Some(constraint) = typed.and_then(|table| table.get(name)) {
        return Some(*constraint);
    }
    if has_builtin_prototype(receiver) {
        return OBJECT_PROTOTYPE.get(name).copied();
    }
    None
}
