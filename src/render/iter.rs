use std::cmp::min;
use std::mem;
use std::slice;

use crate::value::ValueCow;
use crate::Value;

/// The elements a loop visits.
///
/// Loop modifiers narrow a window over the source, elements are only taken
/// out (or borrowed) when their position is visited.
#[cfg_attr(test, derive(Debug))]
pub struct Sequence<'render> {
    source: Source<'render>,
    start: usize,
    len: usize,
    reversed: bool,
}

#[cfg_attr(test, derive(Debug))]
enum Source<'render> {
    Borrowed(&'render [Value]),
    Owned(Vec<Value>),
    Range(i64),
}

/// The iteration metadata exposed as `forloop`.
#[derive(Debug, Clone)]
pub struct Forloop {
    pub index0: usize,
    length: usize,
    cols: Option<usize>,
    parent: Option<Value>,
}

impl<'render> Sequence<'render> {
    /// Converts an evaluated loop source, returning the kind of the value if
    /// it cannot be iterated.
    pub fn new(value: ValueCow<'render>) -> Result<Self, &'static str> {
        let source = match value {
            ValueCow::Borrowed(Value::List(list)) => Source::Borrowed(list),
            ValueCow::Borrowed(v @ Value::String(_)) => Source::Borrowed(slice::from_ref(v)),
            ValueCow::Borrowed(Value::Map(map)) => {
                Source::Owned(map.keys().cloned().map(Value::String).collect())
            }
            ValueCow::Owned(Value::List(list)) => Source::Owned(list),
            ValueCow::Owned(v @ Value::String(_)) => Source::Owned(vec![v]),
            ValueCow::Owned(Value::Map(map)) => {
                Source::Owned(map.into_keys().map(Value::String).collect())
            }
            ValueCow::Borrowed(Value::None) | ValueCow::Owned(Value::None) => {
                Source::Owned(Vec::new())
            }
            value => return Err(value.human()),
        };
        let len = match &source {
            Source::Borrowed(list) => list.len(),
            Source::Owned(list) => list.len(),
            Source::Range(_) => 0,
        };
        Ok(Self {
            source,
            start: 0,
            len,
            reversed: false,
        })
    }

    /// An inclusive integer range, empty when `end < start`.
    pub fn range(start: i64, end: i64) -> Self {
        let len = match end.checked_sub(start) {
            Some(d) if d >= 0 => usize::try_from(d).map_or(usize::MAX, |d| d.saturating_add(1)),
            Some(_) => 0,
            None if end > start => usize::MAX,
            None => 0,
        };
        Self {
            source: Source::Range(start),
            start: 0,
            len,
            reversed: false,
        }
    }

    /// Applies the loop modifiers: skip `offset`, keep at most `limit`, then
    /// optionally visit in reverse.
    pub fn window(&mut self, offset: usize, limit: Option<usize>, reversed: bool) {
        let skip = min(offset, self.len);
        self.start += skip;
        self.len -= skip;
        if let Some(limit) = limit {
            self.len = min(limit, self.len);
        }
        self.reversed = reversed;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the element visited at position `i`.
    ///
    /// Owned elements are moved out so each position must be taken once.
    pub fn take(&mut self, i: usize) -> ValueCow<'render> {
        let j = if self.reversed {
            self.start + self.len - 1 - i
        } else {
            self.start + i
        };
        match &mut self.source {
            Source::Borrowed(list) => ValueCow::Borrowed(&list[j]),
            Source::Owned(list) => ValueCow::Owned(mem::take(&mut list[j])),
            Source::Range(start) => {
                ValueCow::Owned(Value::Integer(start.wrapping_add(j as i64)))
            }
        }
    }
}

impl Forloop {
    pub fn new(length: usize, cols: Option<usize>, parent: Option<Value>) -> Self {
        Self {
            index0: 0,
            length,
            cols,
            parent,
        }
    }

    /// The zero based column within the current table row.
    pub fn col0(&self) -> usize {
        match self.cols {
            Some(cols) => self.index0 % cols,
            None => self.index0,
        }
    }

    /// The one based table row.
    pub fn row(&self) -> usize {
        match self.cols {
            Some(cols) => self.index0 / cols + 1,
            None => 1,
        }
    }

    pub fn to_value(&self) -> Value {
        let Self {
            index0,
            length,
            cols,
            ..
        } = *self;
        let mut map = crate::Map::new();
        let mut set = |k: &str, v: Value| {
            map.insert(k.to_owned(), v);
        };
        set("index", Value::from(index0 + 1));
        set("index0", Value::from(index0));
        set("rindex", Value::from(length.saturating_sub(index0)));
        set("rindex0", Value::from(length.saturating_sub(index0 + 1)));
        set("first", Value::Bool(index0 == 0));
        set("last", Value::Bool(index0 + 1 == length));
        set("length", Value::from(length));
        if let Some(cols) = cols {
            let col0 = self.col0();
            set("col", Value::from(col0 + 1));
            set("col0", Value::from(col0));
            set("row", Value::from(self.row()));
            set("col_first", Value::Bool(col0 == 0));
            set("col_last", Value::Bool(col0 + 1 == cols || index0 + 1 == length));
        }
        if let Some(parent) = &self.parent {
            set("parentloop", parent.clone());
        }
        Value::Map(map)
    }
}
