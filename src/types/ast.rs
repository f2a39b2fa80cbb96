//! The block tree of a compiled template.

use crate::types::expr::{Assignment, Cycle, Expr, LoopHeader, When};
use crate::types::span::Span;

#[derive(Debug)]
pub struct Template {
    pub scope: Scope,
}

#[derive(Debug, Default)]
pub struct Scope {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Raw(Span),
    Output(Output),
    Assign(Assignment),
    If(If),
    Case(Case),
    For(Loop),
    TableRow(Loop),
    Cycle(Cycle),
    Break(Span),
    Continue(Span),
}

/// `{{ expr }}`
#[derive(Debug)]
pub struct Output {
    pub expr: Expr,
    pub span: Span,
}

/// An `if`/`elsif`/`else` chain. `unless` is an `if` with `not` set on the
/// first branch.
#[derive(Debug)]
pub struct If {
    pub branches: Vec<Branch>,
    pub else_branch: Option<Scope>,
}

#[derive(Debug)]
pub struct Branch {
    pub not: bool,
    pub cond: Expr,
    pub body: Scope,
}

/// `case subject` with `when` arms.
#[derive(Debug)]
pub struct Case {
    pub subject: Expr,
    pub arms: Vec<Arm>,
    pub else_branch: Option<Scope>,
}

#[derive(Debug)]
pub struct Arm {
    pub when: When,
    pub body: Scope,
}

/// A `for` or `tablerow` block.
#[derive(Debug)]
pub struct Loop {
    pub header: LoopHeader,
    pub body: Scope,
    pub span: Span,
}

impl Scope {
    pub const fn new() -> Self {
        Self { stmts: Vec::new() }
    }
}
