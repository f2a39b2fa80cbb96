//! The expression tree and the statement forms built from it.

use crate::types::span::Span;
use crate::Value;

/// A parsed tag or output argument.
#[derive(Debug, Clone)]
pub enum Statement {
    Expr(Expr),
    Assign(Assignment),
    Cycle(Cycle),
    Loop(LoopHeader),
    When(When),
}

/// Selects which statement form the parser must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Expr,
    Assign,
    Cycle,
    Loop,
    When,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Var(Ident),
    Property(Box<Property>),
    Index(Box<Index>),
    Range(Box<Range>),
    Compare(Box<Compare>),
    And(Box<Logical>),
    Or(Box<Logical>),
    Filter(Box<FilterCall>),
}

/// An identifier, stored as a span into the source.
#[derive(Debug, Clone, Copy)]
pub struct Ident {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub value: Value,
    pub span: Span,
}

/// `recv.key`
#[derive(Debug, Clone)]
pub struct Property {
    pub recv: Expr,
    pub key: Ident,
    pub span: Span,
}

/// `recv[key]`
#[derive(Debug, Clone)]
pub struct Index {
    pub recv: Expr,
    pub key: Expr,
    pub span: Span,
}

/// `(start..end)`, inclusive at both ends.
#[derive(Debug, Clone)]
pub struct Range {
    pub start: Expr,
    pub end: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Compare {
    pub op: CompareOp,
    pub lhs: Expr,
    pub rhs: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Contains,
    In,
}

#[derive(Debug, Clone)]
pub struct Logical {
    pub lhs: Expr,
    pub rhs: Expr,
    pub span: Span,
}

/// `recv | name: args...`
#[derive(Debug, Clone)]
pub struct FilterCall {
    pub recv: Expr,
    pub name: Ident,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `name = expr`
#[derive(Debug, Clone)]
pub struct Assignment {
    pub name: Ident,
    pub expr: Expr,
}

/// `[group:] value, value...`
#[derive(Debug, Clone)]
pub struct Cycle {
    pub group: CycleGroup,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// Identifies the counter a cycle statement advances.
///
/// Statements without an explicit name share a counter when they list the
/// same literal values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CycleGroup {
    Named(String),
    Implicit(Vec<String>),
}

/// `var in iterable modifiers...`
#[derive(Debug, Clone)]
pub struct LoopHeader {
    pub var: Ident,
    pub iterable: Expr,
    pub modifiers: LoopModifiers,
}

#[derive(Debug, Clone, Default)]
pub struct LoopModifiers {
    pub reversed: bool,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub cols: Option<Expr>,
}

/// The match values of a `when` clause.
#[derive(Debug, Clone)]
pub struct When {
    pub exprs: Vec<Expr>,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(lit) => lit.span,
            Self::Var(ident) => ident.span,
            Self::Property(p) => p.span,
            Self::Index(i) => i.span,
            Self::Range(r) => r.span,
            Self::Compare(c) => c.span,
            Self::And(l) | Self::Or(l) => l.span,
            Self::Filter(f) => f.span,
        }
    }
}
