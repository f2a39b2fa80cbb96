//! Typed filter functions.

mod args;
#[cfg(feature = "builtins")]
pub mod builtins;

use crate::types::expr::FilterCall;
use crate::types::span::Span;
use crate::value::ValueCow;
use crate::{Error, ErrorKind, Result, Value};

pub type FilterFn = dyn Fn(FilterState<'_>) -> Result<Value> + Send + Sync + 'static;

/// The evaluated receiver and arguments of one filter call.
pub struct FilterState<'a> {
    pub(crate) source: &'a str,
    pub(crate) call: &'a FilterCall,
    pub(crate) value: &'a mut ValueCow<'a>,
    pub(crate) args: &'a [ValueCow<'a>],
}

pub(crate) fn new<F, R, A>(f: F) -> Box<FilterFn>
where
    F: Filter<R, A> + Send + Sync + 'static,
    R: FilterReturn,
    A: FilterArgs,
{
    Box::new(move |state: FilterState<'_>| -> Result<Value> {
        let args = A::from_state(state)?;
        let result = Filter::filter(&f, args);
        FilterReturn::to_value(result)
    })
}

/// Represents any filter function.
///
/// This trait is used by the [`Engine::add_filter`][crate::Engine::add_filter]
/// method to abstract over functions and closures with different argument
/// types, return types and arity. The first argument receives the piped
/// value, followed by up to three arguments passed after the `:`. The number
/// and types of the arguments are checked each time the filter is called.
///
/// [`Filter`] is implemented for functions that return any of the following
/// types.
///
/// - `R` where `R` implements `Into<Value>`
/// - `Option<R>` where `R` implements `Into<Value>`
/// - `Result<R>` where `R` implements `Into<Value>`
/// - `Result<R, String>`, the message becomes a render error pointing at the
///   filter name
///
/// and take any of the following types as arguments.
///
/// - [`bool`]
/// - [`i64`], [`i32`], [`u32`], [`usize`]
/// - [`f64`] (integers are widened)
/// - [`String`]
/// - [`Vec<Value>`]
/// - [`BTreeMap<String, Value>`][std::collections::BTreeMap]
/// - [`Value`]
/// - `Option<T>` of any of the above, `None` when the value is nil
///
/// # Examples
///
/// ```
/// use droplet::{Engine, Value};
///
/// let mut engine = Engine::new();
/// engine.add_filter("shout", |s: String| format!("{}!", s.to_uppercase()));
/// engine.add_filter("pick", |list: Vec<Value>, i: usize| list.get(i).cloned());
///
/// let out = engine
///     .compile("{{ greeting | shout }} {{ names | pick: 1 }}")?
///     .render_from(&droplet::value! { greeting: "hi", names: ["a", "b"] })?;
/// assert_eq!(out, "HI! b");
/// # Ok::<(), droplet::Error>(())
/// ```
pub trait Filter<R, A> {
    #[doc(hidden)]
    fn filter(&self, args: A) -> R;
}

pub trait FilterArgs: Sized {
    #[doc(hidden)]
    fn from_state(state: FilterState<'_>) -> Result<Self>;
}

pub trait FilterArg: Sized {
    #[doc(hidden)]
    fn from_value(v: Value) -> args::Result<Self>;
}

pub trait FilterReturn {
    #[doc(hidden)]
    fn to_value(self) -> Result<Value>;
}

////////////////////////////////////////////////////////////////////////////////
// Filter
////////////////////////////////////////////////////////////////////////////////

macro_rules! impl_filter {
    ($($arg:ident)*) => {
        impl<Func, R, V, $($arg,)*> Filter<R, (V, $($arg,)*)> for Func
        where
            Func: Fn(V, $($arg,)*) -> R,
            R: FilterReturn,
            V: FilterArg,
            $($arg: FilterArg,)*
        {
            #[allow(non_snake_case)]
            fn filter(&self, (v, $($arg,)*): (V, $($arg,)*)) -> R {
                self(v, $($arg,)*)
            }
        }

        impl<V, $($arg,)*> FilterArgs for (V, $($arg,)*)
        where
            V: FilterArg,
            $($arg: FilterArg,)*
        {
            #[allow(non_snake_case, unused_assignments, unused_mut, unused_variables)]
            fn from_state(mut state: FilterState<'_>) -> Result<Self> {
                let expected = impl_filter!(@count $($arg)*);
                check_args(&state, expected)?;
                let v = V::from_value(state.value.take())
                    .map_err(|e| err_expected_val(e, state.source, state.call.name.span))?;
                let mut i = 0;
                $(
                    let $arg = get_arg::<$arg>(&state, i)?;
                    i += 1;
                )*
                Ok((v, $($arg,)*))
            }
        }
    };

    (@count) => { 0 };
    (@count $head:ident $($tail:ident)*) => { 1 + impl_filter!(@count $($tail)*) };
}

impl_filter! {}
impl_filter! { A }
impl_filter! { A B }
impl_filter! { A B C }

fn check_args(state: &FilterState<'_>, exp: usize) -> Result<()> {
    let got = state.args.len();
    if got == exp {
        Ok(())
    } else {
        let s = if exp == 1 { "" } else { "s" };
        Err(Error::render(
            format!("filter expected {exp} argument{s}, found {got}"),
            state.source,
            state.call.span,
        ))
    }
}

fn get_arg<T>(state: &FilterState<'_>, i: usize) -> Result<T>
where
    T: FilterArg,
{
    let value = (*state.args[i]).clone();
    T::from_value(value).map_err(|e| err_expected_arg(e, state.source, state.call.args[i].span()))
}

fn err_expected_arg(err: args::Error, source: &str, span: Span) -> Error {
    let msg = match err {
        args::Error::Type(exp, got) => {
            format!("filter expected {exp} argument, found {got}")
        }
        args::Error::TryFromInt(ty, i) => {
            format!("filter expected {ty} argument, but `{i}` is out of range")
        }
    };
    Error::render(msg, source, span)
}

fn err_expected_val(err: args::Error, source: &str, span: Span) -> Error {
    let msg = match err {
        args::Error::Type(exp, got) => {
            format!("filter expected {exp} value, found {got}")
        }
        args::Error::TryFromInt(ty, i) => {
            format!("filter expected {ty} value, but `{i}` is out of range")
        }
    };
    Error::render(msg, source, span)
}

////////////////////////////////////////////////////////////////////////////////
// FilterReturn
////////////////////////////////////////////////////////////////////////////////

impl<T> FilterReturn for T
where
    T: Into<Value>,
{
    fn to_value(self) -> Result<Value> {
        Ok(self.into())
    }
}

impl<T> FilterReturn for Result<T>
where
    T: Into<Value>,
{
    fn to_value(self) -> Result<Value> {
        self.map(Into::into)
    }
}

impl<T> FilterReturn for std::result::Result<T, String>
where
    T: Into<Value>,
{
    fn to_value(self) -> Result<Value> {
        self.map(Into::into)
            .map_err(|msg| Error::message(ErrorKind::Render, msg))
    }
}
