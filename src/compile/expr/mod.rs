//! Lexing and parsing of the small expression language used inside output
//! markers and tag arguments.

mod lex;
mod parse;

pub use crate::compile::expr::parse::Parser;
