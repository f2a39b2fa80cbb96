use std::cmp::max;
use std::fmt;
use std::io;

use crate::types::span::Span;

/// An error that can occur during template compilation, expression evaluation
/// or rendering.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The template or an expression within it is malformed.
    Syntax,
    /// A `break`, `continue` or `cycle` was executed outside of a loop.
    Control,
    /// An expression could not be evaluated, e.g. an unknown filter.
    Render,
    /// Writing the rendered output failed.
    Io,
    /// The context value could not be converted to a [`Value`][crate::Value].
    Serialize,
}

impl Error {
    /// Constructs a new syntax error pointing at the given span.
    pub(crate) fn syntax(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::with_span(ErrorKind::Syntax, msg, source, span)
    }

    /// Constructs a new render error pointing at the given span.
    pub(crate) fn render(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::with_span(ErrorKind::Render, msg, source, span)
    }

    /// Constructs a new control flow error pointing at the given span.
    pub(crate) fn control(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::with_span(ErrorKind::Control, msg, source, span)
    }

    /// Constructs an error with no source information.
    pub(crate) fn message(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: None,
        }
    }

    fn with_span(
        kind: ErrorKind,
        msg: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: Some((source.to_owned(), span.into())),
        }
    }

    /// Attaches a source location to an error raised without one, e.g. by a
    /// filter function.
    pub(crate) fn enrich(self, source: &str, span: impl Into<Span>) -> Self {
        match self.span {
            Some(_) => self,
            None => Self::with_span(self.kind, self.msg, source, span),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::message(ErrorKind::Io, format!("io error: {err}"))
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::message(ErrorKind::Io, "format error")
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self::message(ErrorKind::Serialize, msg.to_string())
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, source, *span, f),
            None => write!(f, "{}", self.msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)
                }
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, width(&source[span]));
    let code = match lines.get(line).or_else(|| lines.last()) {
        Some(code) => code,
        None => "",
    };

    let num = (line + 1).to_string();
    let pad = num.len();
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, width(&line[..offset - n]));
        }
        n += len;
    }
    (
        lines.len().saturating_sub(1),
        lines.last().map(|l| width(l)).unwrap_or(0),
    )
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}
