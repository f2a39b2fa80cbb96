//! Builtin filters.
//!
//! These are registered on every [`Engine`][crate::Engine] created with
//! [`Engine::new`][crate::Engine::new] when the `builtins` feature is
//! enabled.

use crate::{Engine, Value};

pub(crate) fn register(engine: &mut Engine<'_>) {
    engine.add_filter("upcase", upcase);
    engine.add_filter("downcase", downcase);
    engine.add_filter("capitalize", capitalize);
    engine.add_filter("append", append);
    engine.add_filter("prepend", prepend);
    engine.add_filter("size", size);
    engine.add_filter("join", join);
    engine.add_filter("first", first);
    engine.add_filter("last", last);
    engine.add_filter("reverse", reverse);
    engine.add_filter("default", default);
    engine.add_filter("plus", plus);
    engine.add_filter("minus", minus);
    engine.add_filter("times", times);
    engine.add_filter("split", split);
}

/// Returns the uppercase equivalent of a string.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn upcase(s: String) -> String {
    s.to_uppercase()
}

/// Returns the lowercase equivalent of a string.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn downcase(s: String) -> String {
    s.to_lowercase()
}

/// Uppercases the first character and lowercases the rest.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn capitalize(s: String) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => s,
    }
}

/// Concatenates the text form of two values.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn append(value: Value, suffix: Value) -> String {
    value.to_liquid_string() + &suffix.to_liquid_string()
}

/// Concatenates the text form of two values, `prefix` first.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn prepend(value: Value, prefix: Value) -> String {
    prefix.to_liquid_string() + &value.to_liquid_string()
}

/// Returns the number of characters in a string or elements in a list or map.
///
/// Any other value has size zero.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn size(value: Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::List(l) => l.len(),
        Value::Map(m) => m.len(),
        _ => 0,
    }
}

/// Joins the text form of each element with a separator.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn join(list: Vec<Value>, sep: String) -> String {
    list.iter()
        .map(Value::to_liquid_string)
        .collect::<Vec<_>>()
        .join(&sep)
}

/// Returns the first element of a list, or nil.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn first(value: Value) -> Value {
    match value {
        Value::List(list) => list.into_iter().next().unwrap_or_default(),
        _ => Value::None,
    }
}

/// Returns the last element of a list, or nil.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn last(value: Value) -> Value {
    match value {
        Value::List(mut list) => list.pop().unwrap_or_default(),
        _ => Value::None,
    }
}

/// Reverses a list or string.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn reverse(value: Value) -> Result<Value, String> {
    match value {
        Value::String(string) => Ok(Value::String(string.chars().rev().collect())),
        Value::List(list) => Ok(Value::List(list.into_iter().rev().collect())),
        value => Err(format!("cannot reverse {}", value.human())),
    }
}

/// Returns `default` when the value is nil, false or empty.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn default(value: Value, default: Value) -> Value {
    let empty = match &value {
        Value::String(s) => s.is_empty(),
        Value::List(l) => l.is_empty(),
        Value::Map(m) => m.is_empty(),
        v => !v.test(),
    };
    if empty {
        default
    } else {
        value
    }
}

/// Adds two numbers.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn plus(a: Value, b: Value) -> Result<Value, String> {
    arithmetic(&a, &b, i64::checked_add, |a, b| a + b)
}

/// Subtracts `b` from `a`.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn minus(a: Value, b: Value) -> Result<Value, String> {
    arithmetic(&a, &b, i64::checked_sub, |a, b| a - b)
}

/// Multiplies two numbers.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn times(a: Value, b: Value) -> Result<Value, String> {
    arithmetic(&a, &b, i64::checked_mul, |a, b| a * b)
}

/// Splits a string on every occurrence of a separator.
///
/// An empty separator splits the string into characters.
#[cfg_attr(docsrs, doc(cfg(feature = "builtins")))]
pub fn split(s: String, sep: String) -> Vec<String> {
    if sep.is_empty() {
        s.chars().map(String::from).collect()
    } else {
        s.split(sep.as_str()).map(String::from).collect()
    }
}

enum Number {
    Integer(i64),
    Float(f64),
}

fn number(v: &Value) -> Result<Number, String> {
    match v {
        Value::Integer(i) => Ok(Number::Integer(*i)),
        Value::Float(f) => Ok(Number::Float(*f)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .map(Number::Integer)
                .or_else(|_| s.parse().map(Number::Float))
                .map_err(|_| format!("expected number, found string {s:?}"))
        }
        Value::None => Ok(Number::Integer(0)),
        v => Err(format!("expected number, found {}", v.human())),
    }
}

fn arithmetic(
    a: &Value,
    b: &Value,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Value, String> {
    let v = match (number(a)?, number(b)?) {
        (Number::Integer(a), Number::Integer(b)) => match int(a, b) {
            Some(n) => Value::Integer(n),
            None => Value::Float(float(a as f64, b as f64)),
        },
        (Number::Integer(a), Number::Float(b)) => Value::Float(float(a as f64, b)),
        (Number::Float(a), Number::Integer(b)) => Value::Float(float(a, b as f64)),
        (Number::Float(a), Number::Float(b)) => Value::Float(float(a, b)),
    };
    Ok(v)
}
