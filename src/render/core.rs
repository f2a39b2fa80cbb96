use std::fmt::Write;

use tracing::{debug, trace};

use crate::render::eval::Evaluator;
use crate::render::fmt::{format_value, FormatError, Formatter};
use crate::render::iter::{Forloop, Sequence};
use crate::render::stack::{Frame, Stack};
use crate::types::ast;
use crate::types::expr::{Cycle, Expr};
use crate::types::span::Span;
use crate::{Engine, Error, ErrorKind, Result, Value};

/// The outcome of rendering a statement.
///
/// `Break` and `Continue` travel up through `if`, `unless` and `case` bodies
/// until the enclosing loop consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    Continue,
    Break,
}

/// Walks a compiled template, writing output and threading loop signals.
pub struct Renderer<'render> {
    pub engine: &'render Engine<'render>,
    pub source: &'render str,
}

impl<'render> Renderer<'render> {
    pub fn render(
        &self,
        f: &mut Formatter<'_>,
        template: &'render ast::Template,
        globals: &'render Value,
    ) -> Result<()> {
        let mut stack = Stack::new(globals);
        match self.render_scope(f, &mut stack, &template.scope)? {
            Signal::None => Ok(()),
            Signal::Break => Err(Error::message(ErrorKind::Control, "break outside a loop")),
            Signal::Continue => Err(Error::message(
                ErrorKind::Control,
                "continue outside a loop",
            )),
        }
    }

    fn render_scope(
        &self,
        f: &mut Formatter<'_>,
        stack: &mut Stack<'render>,
        scope: &'render ast::Scope,
    ) -> Result<Signal> {
        for stmt in &scope.stmts {
            match self.render_stmt(f, stack, stmt)? {
                Signal::None => {}
                signal => return Ok(signal),
            }
        }
        Ok(Signal::None)
    }

    fn render_stmt(
        &self,
        f: &mut Formatter<'_>,
        stack: &mut Stack<'render>,
        stmt: &'render ast::Stmt,
    ) -> Result<Signal> {
        match stmt {
            ast::Stmt::Raw(span) => {
                f.write_str(&self.source[*span])?;
            }

            ast::Stmt::Output(output) => {
                let value = self.evaluator(stack).eval(&output.expr)?;
                self.write_value(f, &value, output.expr.span())?;
            }

            ast::Stmt::Assign(assign) => {
                let value = self.evaluator(stack).eval(&assign.expr)?.into_owned();
                stack.assign(&self.source[assign.name.span], value);
            }

            ast::Stmt::If(cond) => {
                for branch in &cond.branches {
                    let test = self.evaluator(stack).eval(&branch.cond)?.test();
                    if test != branch.not {
                        return self.render_scope(f, stack, &branch.body);
                    }
                }
                if let Some(body) = &cond.else_branch {
                    return self.render_scope(f, stack, body);
                }
            }

            ast::Stmt::Case(case) => {
                let evaluator = self.evaluator(stack);
                let subject = evaluator.eval(&case.subject)?;
                let mut matched = None;
                'arms: for arm in &case.arms {
                    for expr in &arm.when.exprs {
                        if evaluator.eval(expr)?.equal(&subject) {
                            matched = Some(&arm.body);
                            break 'arms;
                        }
                    }
                }
                if let Some(body) = matched.or(case.else_branch.as_ref()) {
                    return self.render_scope(f, stack, body);
                }
            }

            ast::Stmt::For(lp) => return self.render_loop(f, stack, lp, false),

            ast::Stmt::TableRow(lp) => return self.render_loop(f, stack, lp, true),

            ast::Stmt::Cycle(cycle) => self.render_cycle(f, stack, cycle)?,

            ast::Stmt::Break(_) => return Ok(Signal::Break),

            ast::Stmt::Continue(_) => return Ok(Signal::Continue),
        }
        Ok(Signal::None)
    }

    fn render_cycle(
        &self,
        f: &mut Formatter<'_>,
        stack: &mut Stack<'render>,
        cycle: &'render Cycle,
    ) -> Result<()> {
        let frame = stack.frame_mut().ok_or_else(|| {
            Error::control("cycle must be within a forloop", self.source, cycle.span)
        })?;
        let i = frame.next_cycle(&cycle.group, cycle.values.len());
        let expr = &cycle.values[i];
        let value = self.evaluator(stack).eval(expr)?;
        self.write_value(f, &value, expr.span())
    }

    fn render_loop(
        &self,
        f: &mut Formatter<'_>,
        stack: &mut Stack<'render>,
        lp: &'render ast::Loop,
        tablerow: bool,
    ) -> Result<Signal> {
        let header = &lp.header;
        let mut seq = self.sequence(stack, &header.iterable)?;

        let modifiers = &header.modifiers;
        let offset = self.modifier(stack, modifiers.offset.as_ref(), "offset")?;
        let limit = self.modifier(stack, modifiers.limit.as_ref(), "limit")?;
        seq.window(offset.unwrap_or(0), limit, modifiers.reversed);

        let len = seq.len();
        let cols = match tablerow {
            true => match self.modifier(stack, modifiers.cols.as_ref(), "cols")? {
                Some(cols) if cols > 0 => Some(cols),
                _ => Some(len.max(1)),
            },
            false => None,
        };

        let name = &self.source[header.var.span];
        debug!(var = name, len, tablerow, "entering loop");

        let forloop = Forloop::new(len, cols, stack.forloop());
        stack.push_frame(Frame::new(name, forloop));
        let result = self.render_iterations(f, stack, lp, seq, cols);
        stack.pop_frame();
        result?;

        // Signals never escape the loop that consumed them.
        Ok(Signal::None)
    }

    fn render_iterations(
        &self,
        f: &mut Formatter<'_>,
        stack: &mut Stack<'render>,
        lp: &'render ast::Loop,
        mut seq: Sequence<'render>,
        cols: Option<usize>,
    ) -> Result<()> {
        let len = seq.len();
        for i in 0..len {
            let item = seq.take(i);
            if let Some(frame) = stack.frame_mut() {
                frame.advance(item, i);
            }

            if let Some(cols) = cols {
                if i % cols == 0 {
                    if i > 0 {
                        f.write_str("</tr>\n")?;
                    }
                    write!(f, "<tr class=\"row{}\">", i / cols + 1)?;
                }
                write!(f, "<td class=\"col{}\">", i % cols + 1)?;
            }

            let signal = self.render_scope(f, stack, &lp.body)?;

            if cols.is_some() {
                f.write_str("</td>")?;
            }

            match signal {
                Signal::None => {}
                Signal::Continue => trace!(index0 = i, "continue"),
                Signal::Break => {
                    trace!(index0 = i, "break");
                    break;
                }
            }
        }
        if cols.is_some() && len > 0 {
            f.write_str("</tr>")?;
        }
        Ok(())
    }

    /// Evaluates a loop source, iterating ranges without materializing them.
    fn sequence(&self, stack: &Stack<'render>, iterable: &'render Expr) -> Result<Sequence<'render>> {
        let evaluator = self.evaluator(stack);
        if let Expr::Range(range) = iterable {
            let start = evaluator.eval_integer(&range.start)?;
            let end = evaluator.eval_integer(&range.end)?;
            return Ok(Sequence::range(start, end));
        }
        let value = evaluator.eval(iterable)?;
        Sequence::new(value).map_err(|kind| {
            Error::render(
                format!("expected iterable, but expression evaluated to {kind}"),
                self.source,
                iterable.span(),
            )
        })
    }

    /// Evaluates a loop modifier, clamping negative values to zero.
    fn modifier(
        &self,
        stack: &Stack<'render>,
        expr: Option<&'render Expr>,
        name: &str,
    ) -> Result<Option<usize>> {
        let Some(expr) = expr else {
            return Ok(None);
        };
        let value = self.evaluator(stack).eval(expr)?;
        if let Value::None = *value {
            return Ok(None);
        }
        match value.as_integer() {
            Some(n) => Ok(Some(usize::try_from(n).unwrap_or(if n < 0 { 0 } else { usize::MAX }))),
            None => Err(Error::render(
                format!("loop modifier `{name}` expected integer, found {}", value.human()),
                self.source,
                expr.span(),
            )),
        }
    }

    fn write_value(&self, f: &mut Formatter<'_>, value: &Value, span: Span) -> Result<()> {
        format_value(f, value).map_err(|err| match err {
            FormatError::Unrenderable(kind) => Error::render(
                format!("expected renderable value, but expression evaluated to {kind}"),
                self.source,
                span,
            ),
            FormatError::Write(err) => Error::from(err),
        })
    }

    fn evaluator<'a>(&self, stack: &'a Stack<'render>) -> Evaluator<'a, 'render> {
        Evaluator {
            engine: self.engine,
            source: self.source,
            stack,
        }
    }
}
