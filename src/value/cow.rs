//! Defines a clone-on-write [`Value`].

use std::ops::Deref;

use crate::Value;

/// A value produced by the evaluator.
///
/// Literals and context lookups borrow from the template or the render
/// context; computed values (comparisons, filter results, materialized
/// ranges) are owned.
#[derive(Debug)]
pub enum ValueCow<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

impl Deref for ValueCow<'_> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(v) => v,
            Self::Owned(v) => v,
        }
    }
}

impl<'a> ValueCow<'a> {
    /// Moves the value out, cloning only if it is borrowed.
    pub fn take(&mut self) -> Value {
        match self {
            Self::Borrowed(v) => v.clone(),
            Self::Owned(v) => std::mem::take(v),
        }
    }

    pub fn into_owned(self) -> Value {
        match self {
            Self::Borrowed(v) => v.clone(),
            Self::Owned(v) => v,
        }
    }

    /// Applies a projection that borrows from the inner value, keeping the
    /// borrow when possible.
    pub fn project<F>(self, f: F) -> ValueCow<'a>
    where
        F: for<'v> Fn(&'v Value) -> ValueCow<'v>,
    {
        match self {
            Self::Borrowed(v) => f(v),
            Self::Owned(v) => Self::Owned(f(&v).into_owned()),
        }
    }
}
