use crate::filters::FilterArg;
use crate::{List, Map, Value};

pub type Result<T> = std::result::Result<T, Error>;

pub enum Error {
    /// When there is a type mismatch.
    Type(
        /// Expected
        &'static str,
        /// Got
        &'static str,
    ),
    /// Failed to convert from i64 to the integer type.
    TryFromInt(
        /// Type
        &'static str,
        /// Value
        i64,
    ),
}

impl FilterArg for bool {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Bool(b) => Ok(b),
            v => Err(Error::Type("bool", v.human())),
        }
    }
}

impl FilterArg for i64 {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Integer(i) => Ok(i),
            v => Err(Error::Type("integer", v.human())),
        }
    }
}

macro_rules! impl_for_int {
    ($($ty:ty)+) => {
        $(
            impl FilterArg for $ty {
                fn from_value(v: Value) -> Result<Self> {
                    match v {
                        Value::Integer(i) => i.try_into().map_err(|_| {
                            Error::TryFromInt(stringify!($ty), i)
                        }),
                        v => Err(Error::Type("integer", v.human())),
                    }
                }
            }
        )+
    };
}

impl_for_int! { i32 u32 usize }

/// Integers are accepted where a float is expected.
impl FilterArg for f64 {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            v => Err(Error::Type("float", v.human())),
        }
    }
}

impl FilterArg for String {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::String(s) => Ok(s),
            v => Err(Error::Type("string", v.human())),
        }
    }
}

impl FilterArg for List<Value> {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::List(l) => Ok(l),
            v => Err(Error::Type("list", v.human())),
        }
    }
}

impl FilterArg for Map<String, Value> {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Map(m) => Ok(m),
            v => Err(Error::Type("map", v.human())),
        }
    }
}

impl FilterArg for Value {
    fn from_value(v: Value) -> Result<Self> {
        Ok(v)
    }
}

/// An absent argument is `None`, any other value must convert.
impl<T> FilterArg for Option<T>
where
    T: FilterArg,
{
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::None => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}
