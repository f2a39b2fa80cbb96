use crate::render::stack::Stack;
use crate::types::expr::{CompareOp, Expr};
use crate::types::span::Span;
use crate::value::ValueCow;
use crate::{Engine, Error, Result, Value};

/// The most integers a range may produce outside of a loop source.
const MAX_RANGE_LEN: i128 = 1 << 20;

/// Evaluates expressions against the current variable bindings.
pub struct Evaluator<'a, 'render> {
    pub engine: &'render Engine<'render>,
    pub source: &'render str,
    pub stack: &'a Stack<'render>,
}

impl<'a, 'render> Evaluator<'a, 'render> {
    pub fn eval(&self, expr: &'render Expr) -> Result<ValueCow<'render>> {
        match expr {
            Expr::Literal(lit) => Ok(ValueCow::Borrowed(&lit.value)),

            Expr::Var(ident) => Ok(self
                .stack
                .lookup(&self.source[ident.span])
                .unwrap_or(ValueCow::Owned(Value::None))),

            Expr::Property(prop) => {
                let key = &self.source[prop.key.span];
                let recv = self.eval(&prop.recv)?;
                Ok(recv.project(|v| v.property(key)))
            }

            Expr::Index(index) => {
                let recv = self.eval(&index.recv)?;
                let key = self.eval(&index.key)?;
                Ok(recv.project(|v| v.index(&key)))
            }

            Expr::Range(range) => {
                let start = self.eval_integer(&range.start)?;
                let end = self.eval_integer(&range.end)?;
                let len = i128::from(end) - i128::from(start) + 1;
                if len > MAX_RANGE_LEN {
                    return Err(Error::render(
                        format!("range of {len} integers is too large"),
                        self.source,
                        range.span,
                    ));
                }
                Ok(ValueCow::Owned((start..=end).collect()))
            }

            Expr::Compare(cmp) => {
                let lhs = self.eval(&cmp.lhs)?;
                let rhs = self.eval(&cmp.rhs)?;
                let (a, b) = (&*lhs, &*rhs);
                let result = match cmp.op {
                    CompareOp::Eq => a.equal(b),
                    CompareOp::Ne => !a.equal(b),
                    CompareOp::Lt => a.less(b),
                    CompareOp::Gt => b.less(a),
                    CompareOp::Le => a.less(b) || a.equal(b),
                    CompareOp::Ge => b.less(a) || a.equal(b),
                    CompareOp::Contains => a.contains(b),
                    CompareOp::In => b.contains(a),
                };
                Ok(ValueCow::Owned(Value::Bool(result)))
            }

            Expr::And(logical) => {
                let result = self.eval(&logical.lhs)?.test() && self.eval(&logical.rhs)?.test();
                Ok(ValueCow::Owned(Value::Bool(result)))
            }

            Expr::Or(logical) => {
                let result = self.eval(&logical.lhs)?.test() || self.eval(&logical.rhs)?.test();
                Ok(ValueCow::Owned(Value::Bool(result)))
            }

            #[cfg(feature = "filters")]
            Expr::Filter(call) => {
                let name = &self.source[call.name.span];
                let filter = self
                    .engine
                    .filters
                    .get(name)
                    .ok_or_else(|| err_undefined_filter(name, self.source, call.name.span))?;
                let mut value: ValueCow<'_> = self.eval(&call.recv)?;
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>>>()?;
                let state = crate::filters::FilterState {
                    source: self.source,
                    call,
                    value: &mut value,
                    args: &args,
                };
                let result = filter(state).map_err(|e| e.enrich(self.source, call.name.span))?;
                Ok(ValueCow::Owned(result))
            }

            #[cfg(not(feature = "filters"))]
            Expr::Filter(call) => {
                let name = &self.source[call.name.span];
                Err(err_undefined_filter(name, self.source, call.name.span))
            }
        }
    }

    /// Evaluates an expression that must produce an integer, e.g. a range
    /// bound.
    pub fn eval_integer(&self, expr: &'render Expr) -> Result<i64> {
        let value = self.eval(expr)?;
        value.as_integer().ok_or_else(|| {
            Error::render(
                format!("range bound must be an integer, found {}", value.human()),
                self.source,
                expr.span(),
            )
        })
    }
}

fn err_undefined_filter(name: &str, source: &str, span: Span) -> Error {
    Error::render(format!("undefined filter \"{name}\""), source, span)
}
