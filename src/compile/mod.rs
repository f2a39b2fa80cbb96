//! Compile template source into a block tree that can be executed by the
//! renderer.
//!
//! This process has two layers:
//! - The template lexer chunks the source into raw text, output markers and
//!   tags; the block parser nests those chunks into a tree.
//! - Every output and tag argument is handed to the expression parser which
//!   produces the statement form the tag requires.

mod expr;
mod lex;
mod parse;
mod search;

pub use crate::compile::search::Searcher;

use tracing::debug;

use crate::types::ast;
use crate::types::expr::Expr;
use crate::types::span::Span;
use crate::Result;

/// Compile a template into a block tree.
pub fn template(searcher: &Searcher, source: &str) -> Result<ast::Template> {
    let template = parse::Parser::new(searcher, source).parse_template()?;
    debug!(
        len = source.len(),
        stmts = template.scope.stmts.len(),
        "compiled template"
    );
    Ok(template)
}

/// Compile a standalone expression.
pub fn expression(source: &str) -> Result<Expr> {
    let expr = expr::Parser::new(source, Span::from(0..source.len())).expression()?;
    debug!(len = source.len(), "compiled expression");
    Ok(expr)
}
