pub mod ast;
pub mod expr;
pub mod span;
pub mod syntax;
