//! The expression language and loop engine of a Liquid-style template
//! renderer.
//!
//! # Features
//!
//! - Outputs: `{{ product.title | upcase }}`
//! - Conditionals: `{% if a and b %}`, `{% unless %}`, `{% case %}{% when 1, 2 %}`
//! - Loops: `{% for p in products limit:2 offset:1 reversed %}` with the
//!   `forloop` variable, `{% tablerow %}`, `{% break %}` and `{% continue %}`
//! - Assignments and grouped cycles: `{% assign x = 1 %}`,
//!   `{% cycle "odd", "even" %}`
//! - Ranges: `{% for i in (1..n) %}`
//! - Typed filter functions and builtins
//! - Whitespace control with `{{-`, `-}}`, `{%-` and `-%}`
//! - Configurable delimiters
//! - Render to a [`String`] or any [`std::io::Write`] implementor, from any
//!   [`serde`] serializable value or a [`Value`]
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the syntax
//! config and the filter functions. Generally, you only need to construct one
//! engine during the lifetime of a program.
//!
//! ```
//! let engine = droplet::Engine::new();
//! let template = engine.compile("Hello {{ user.name | upcase }}!")?;
//! let result = template.render_from(&droplet::value! { user: { name: "John" } })?;
//! assert_eq!(result, "Hello JOHN!");
//! # Ok::<(), droplet::Error>(())
//! ```
//!
//! Expressions can also be compiled and evaluated on their own.
//!
//! ```
//! let engine = droplet::Engine::new();
//! let expr = engine.compile_expression("items contains 'b' and size > 1")?;
//! let value = expr.evaluate_from(&droplet::value! { items: ["a", "b"], size: 2 })?;
//! assert_eq!(value, droplet::Value::Bool(true));
//! # Ok::<(), droplet::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Context { products: Vec<Product> }
//!
//! #[derive(serde::Serialize)]
//! struct Product { title: String }
//!
//! let ctx = Context {
//!     products: vec![
//!         Product { title: "Shirt".into() },
//!         Product { title: "Hat".into() },
//!     ],
//! };
//!
//! let result = droplet::Engine::new()
//!     .compile("{% for p in products %}{{ forloop.index }}.{{ p.title }} {% endfor %}")?
//!     .render(&ctx)?;
//!
//! assert_eq!(result, "1.Shirt 2.Hat ");
//! # Ok::<(), droplet::Error>(())
//! ```
//!
//! ### Render a template using custom syntax
//!
//! ```
//! let syntax = droplet::Syntax::builder().output("<?", "?>").tag("<%", "%>").build();
//!
//! let result = droplet::Engine::with_syntax(syntax)
//!     .compile("<% for i in (1..3) %><? i ?><% endfor %>")?
//!     .render_from(&droplet::Value::None)?;
//!
//! assert_eq!(result, "123");
//! # Ok::<(), droplet::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod compile;
mod error;
#[cfg(feature = "filters")]
mod filters;
mod macros;
mod render;
mod types;
mod value;

use std::fmt;
use std::io;

#[cfg(feature = "filters")]
use std::collections::BTreeMap;

pub use crate::error::{Error, ErrorKind};
#[cfg(feature = "builtins")]
pub use crate::filters::builtins;
#[cfg(feature = "filters")]
pub use crate::filters::Filter;
pub use crate::types::syntax::{Syntax, SyntaxBuilder};
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{List, Map, Value};

use crate::compile::Searcher;
#[cfg(feature = "filters")]
use crate::filters::{FilterArgs, FilterFn, FilterReturn};
use crate::types::ast;
use crate::types::expr::Expr;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The compilation and rendering engine.
pub struct Engine<'engine> {
    searcher: Searcher,
    #[cfg(feature = "filters")]
    filters: BTreeMap<&'engine str, Box<FilterFn>>,
    #[cfg(not(feature = "filters"))]
    _marker: std::marker::PhantomData<&'engine ()>,
}

/// A compiled template.
pub struct Template<'engine, 'source> {
    engine: &'engine Engine<'engine>,
    source: &'source str,
    template: ast::Template,
}

/// A compiled standalone expression.
pub struct Expression<'engine, 'source> {
    engine: &'engine Engine<'engine>,
    source: &'source str,
    expr: Expr,
}

impl<'engine> Default for Engine<'engine> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'engine> Engine<'engine> {
    /// Construct a new engine.
    ///
    /// With the `builtins` feature the [builtin filters][builtins] are
    /// registered.
    #[inline]
    pub fn new() -> Self {
        Self::with_syntax(Syntax::default())
    }

    /// Construct a new engine with custom syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use droplet::{Engine, Syntax};
    ///
    /// let syntax = Syntax::builder().output("<{", "}>").tag("<[", "]>").build();
    /// let engine = Engine::with_syntax(syntax);
    /// ```
    #[inline]
    pub fn with_syntax(syntax: Syntax<'_>) -> Self {
        #[allow(unused_mut)]
        let mut engine = Self {
            searcher: Searcher::new(syntax),
            #[cfg(feature = "filters")]
            filters: BTreeMap::new(),
            #[cfg(not(feature = "filters"))]
            _marker: std::marker::PhantomData,
        };
        #[cfg(feature = "builtins")]
        filters::builtins::register(&mut engine);
        engine
    }

    /// Add a new filter to the engine, replacing any filter with the same
    /// name.
    ///
    /// See the [`Filter`] trait for the supported function signatures.
    #[cfg(feature = "filters")]
    #[cfg_attr(docsrs, doc(cfg(feature = "filters")))]
    #[inline]
    pub fn add_filter<F, R, A>(&mut self, name: &'engine str, f: F)
    where
        F: Filter<R, A> + Send + Sync + 'static,
        R: FilterReturn,
        A: FilterArgs,
    {
        self.filters.insert(name, filters::new(f));
    }

    /// Compile a template.
    #[inline]
    pub fn compile<'source>(&self, source: &'source str) -> Result<Template<'_, 'source>> {
        let template = compile::template(&self.searcher, source)?;
        Ok(Template {
            engine: self,
            source,
            template,
        })
    }

    /// Compile a standalone expression, e.g. the condition of an `if` tag.
    #[inline]
    pub fn compile_expression<'source>(
        &self,
        source: &'source str,
    ) -> Result<Expression<'_, 'source>> {
        let expr = compile::expression(source)?;
        Ok(Expression {
            engine: self,
            source,
            expr,
        })
    }
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Engine");
        d.field("searcher", &self.searcher);
        #[cfg(feature = "filters")]
        d.field("filters", &self.filters.keys());
        d.finish()
    }
}

impl<'engine, 'source> Template<'engine, 'source> {
    /// Render the template to a string using the provided value.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        self.render_from(&to_value(ctx)?)
    }

    /// Render the template to a writer using the provided value.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render_to_writer<W, S>(&self, writer: W, ctx: S) -> Result<()>
    where
        W: io::Write,
        S: serde::Serialize,
    {
        self.render_from_to_writer(writer, &to_value(ctx)?)
    }

    /// Render the template to a string using the provided [`Value`].
    #[inline]
    pub fn render_from(&self, ctx: &Value) -> Result<String> {
        render::to_string(self.engine, self.source, &self.template, ctx)
    }

    /// Render the template to a writer using the provided [`Value`].
    #[inline]
    pub fn render_from_to_writer<W>(&self, writer: W, ctx: &Value) -> Result<()>
    where
        W: io::Write,
    {
        render::to_writer(self.engine, self.source, &self.template, ctx, writer)
    }

    /// Returns the original template source.
    #[inline]
    pub fn source(&self) -> &'source str {
        self.source
    }
}

impl fmt::Debug for Template<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("engine", &self.engine)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<'engine, 'source> Expression<'engine, 'source> {
    /// Evaluate the expression using the provided value as the variables.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn evaluate<S>(&self, ctx: S) -> Result<Value>
    where
        S: serde::Serialize,
    {
        self.evaluate_from(&to_value(ctx)?)
    }

    /// Evaluate the expression using the provided [`Value`] as the variables.
    #[inline]
    pub fn evaluate_from(&self, ctx: &Value) -> Result<Value> {
        render::evaluate(self.engine, self.source, &self.expr, ctx)
    }

    /// Returns the original expression source.
    #[inline]
    pub fn source(&self) -> &'source str {
        self.source
    }
}

impl fmt::Debug for Expression<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("expr", &self.expr)
            .finish_non_exhaustive()
    }
}
