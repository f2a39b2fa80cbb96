use std::collections::BTreeMap;

use tracing::trace;

use crate::render::iter::Forloop;
use crate::types::expr::CycleGroup;
use crate::value::ValueCow;
use crate::{Map, Value};

/// The variables visible while rendering.
///
/// Names resolve through the loop frames (innermost first), then the
/// variables set by `assign`, then the render context.
#[cfg_attr(test, derive(Debug))]
pub struct Stack<'render> {
    globals: &'render Value,
    assigns: Map<String, Value>,
    frames: Vec<Frame<'render>>,
}

/// The bindings introduced by one loop invocation.
#[cfg_attr(test, derive(Debug))]
pub struct Frame<'render> {
    name: &'render str,
    item: ValueCow<'render>,
    forloop: Forloop,
    cycles: BTreeMap<CycleGroup, usize>,
}

impl<'render> Stack<'render> {
    pub fn new(globals: &'render Value) -> Self {
        Self {
            globals,
            assigns: Map::new(),
            frames: Vec::new(),
        }
    }

    /// Resolves a variable name, returning `None` if it is not bound.
    ///
    /// Values owned by the stack are cloned, values from the render context
    /// are borrowed.
    pub fn lookup(&self, name: &str) -> Option<ValueCow<'render>> {
        for frame in self.frames.iter().rev() {
            if frame.name == name {
                return Some(match &frame.item {
                    ValueCow::Borrowed(v) => ValueCow::Borrowed(*v),
                    ValueCow::Owned(v) => ValueCow::Owned(v.clone()),
                });
            }
            if name == "forloop" {
                return Some(ValueCow::Owned(frame.forloop.to_value()));
            }
        }
        if let Some(v) = self.assigns.get(name) {
            return Some(ValueCow::Owned(v.clone()));
        }
        match self.globals {
            Value::Map(map) => map.get(name).map(ValueCow::Borrowed),
            _ => None,
        }
    }

    /// Binds a variable for the rest of the render.
    pub fn assign(&mut self, name: &str, value: Value) {
        self.assigns.insert(name.to_owned(), value);
    }

    /// The `forloop` metadata of the innermost loop, used as `parentloop`.
    pub fn forloop(&self) -> Option<Value> {
        self.frames.last().map(|frame| frame.forloop.to_value())
    }

    pub fn push_frame(&mut self, frame: Frame<'render>) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn frame_mut(&mut self) -> Option<&mut Frame<'render>> {
        self.frames.last_mut()
    }
}

impl<'render> Frame<'render> {
    pub fn new(name: &'render str, forloop: Forloop) -> Self {
        trace!(var = name, "reset cycle groups");
        Self {
            name,
            item: ValueCow::Owned(Value::None),
            forloop,
            cycles: BTreeMap::new(),
        }
    }

    /// Binds the element and position of the current iteration.
    pub fn advance(&mut self, item: ValueCow<'render>, index0: usize) {
        self.item = item;
        self.forloop.index0 = index0;
    }

    /// Returns which of `len` values a cycle group emits next.
    pub fn next_cycle(&mut self, group: &CycleGroup, len: usize) -> usize {
        let counter = self.cycles.entry(group.clone()).or_insert(0);
        let i = *counter % len;
        *counter += 1;
        i
    }
}
