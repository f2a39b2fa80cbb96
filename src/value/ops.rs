//! Comparison, truthiness and member access on [`Value`].

use std::cmp::Ordering;

use crate::value::ValueCow;
use crate::Value;

impl Value {
    /// Returns the truthiness of the value.
    ///
    /// `false`, `nil`, and empty strings, lists and maps are falsy. Everything
    /// else, including `0`, is truthy.
    pub fn test(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Integer(_) | Value::Float(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// Loose equality used by the `==` operator.
    ///
    /// Integers and floats compare numerically. Lists compare element-wise
    /// with the same loose rules.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.equal(b))
            }
            (a, b) => a == b,
        }
    }

    /// Ordering used by the `<` operator.
    ///
    /// Only numbers and strings are ordered; any other pair is never less.
    pub fn less(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Less)
    }

    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Membership used by the `contains` and `in` operators.
    ///
    /// A string contains a substring, a list contains an equal element and a
    /// map contains a key.
    pub fn contains(&self, needle: &Value) -> bool {
        match (self, needle) {
            (Value::String(s), Value::String(n)) => s.contains(n.as_str()),
            (Value::String(s), n @ (Value::Integer(_) | Value::Float(_) | Value::Bool(_))) => {
                s.contains(&n.to_liquid_string())
            }
            (Value::List(list), n) => list.iter().any(|v| v.equal(n)),
            (Value::Map(map), Value::String(key)) => map.contains_key(key),
            _ => false,
        }
    }

    /// Resolves `value.key`.
    ///
    /// Map entries win over the computed properties `size`, `first` and
    /// `last`. Anything unresolvable is `nil`.
    pub(crate) fn property(&self, key: &str) -> ValueCow<'_> {
        match (self, key) {
            (Value::Map(map), key) if map.contains_key(key) => ValueCow::Borrowed(&map[key]),
            (Value::Map(map), "size") => ValueCow::Owned(map.len().into()),
            (Value::List(list), "size") => ValueCow::Owned(list.len().into()),
            (Value::String(s), "size") => ValueCow::Owned(s.chars().count().into()),
            (Value::List(list), "first") => nil_or(list.first()),
            (Value::List(list), "last") => nil_or(list.last()),
            _ => ValueCow::Owned(Value::None),
        }
    }

    /// Resolves `value[key]`.
    ///
    /// Lists take integer indices, negative ones counting from the end. Maps
    /// take string keys. Anything unresolvable is `nil`.
    pub(crate) fn index(&self, key: &Value) -> ValueCow<'_> {
        match (self, key) {
            (Value::List(list), Value::Integer(i)) => {
                let i = if *i < 0 {
                    usize::try_from(i.unsigned_abs())
                        .ok()
                        .and_then(|back| list.len().checked_sub(back))
                } else {
                    usize::try_from(*i).ok()
                };
                nil_or(i.and_then(|i| list.get(i)))
            }
            (Value::Map(map), Value::String(key)) => nil_or(map.get(key)),
            (Value::Map(_), Value::Integer(_)) | (Value::List(_), Value::String(_)) => {
                let key = key.to_liquid_string();
                match self {
                    Value::Map(map) => nil_or(map.get(&key)),
                    _ => self.property(&key),
                }
            }
            _ => ValueCow::Owned(Value::None),
        }
    }

    /// The integer value of a number or an integer-like string.
    pub(crate) fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Formats a scalar the way it is rendered in output.
    pub(crate) fn to_liquid_string(&self) -> String {
        let mut s = String::new();
        // Writing into a `String` cannot fail and maps render as nothing here.
        let _ = crate::render::format_value(&mut s, self);
        s
    }
}

fn nil_or(v: Option<&Value>) -> ValueCow<'_> {
    match v {
        Some(v) => ValueCow::Borrowed(v),
        None => ValueCow::Owned(Value::None),
    }
}
