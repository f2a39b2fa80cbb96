mod core;
mod eval;
mod fmt;
mod iter;
mod stack;

use std::io;

pub(crate) use crate::render::fmt::format_value;
use crate::render::core::Renderer;
use crate::render::eval::Evaluator;
use crate::render::fmt::{Formatter, Writer};
use crate::render::stack::Stack;
use crate::types::ast;
use crate::types::expr::Expr;
use crate::{Engine, Error, Result, Value};

pub(crate) fn to_string<'render>(
    engine: &'render Engine<'render>,
    source: &'render str,
    template: &'render ast::Template,
    globals: &'render Value,
) -> Result<String> {
    let mut s = String::with_capacity(source.len());
    let mut f = Formatter::with_string(&mut s);
    Renderer { engine, source }.render(&mut f, template, globals)?;
    Ok(s)
}

pub(crate) fn to_writer<'render, W>(
    engine: &'render Engine<'render>,
    source: &'render str,
    template: &'render ast::Template,
    globals: &'render Value,
    writer: W,
) -> Result<()>
where
    W: io::Write,
{
    let mut w = Writer::new(writer);
    let mut f = Formatter::with_writer(&mut w);
    Renderer { engine, source }
        .render(&mut f, template, globals)
        .map_err(|err| w.take_err().map(Error::from).unwrap_or(err))
}

pub(crate) fn evaluate<'render>(
    engine: &'render Engine<'render>,
    source: &'render str,
    expr: &'render Expr,
    globals: &'render Value,
) -> Result<Value> {
    let stack = Stack::new(globals);
    let evaluator = Evaluator {
        engine,
        source,
        stack: &stack,
    };
    evaluator.eval(expr).map(|v| v.into_owned())
}
