use std::fmt;
use std::fmt::Write as _;
use std::io;

use crate::Value;

/// The output sink a template renders into.
pub struct Formatter<'a> {
    buf: &'a mut (dyn fmt::Write + 'a),
}

/// Adapts an [`io::Write`] to [`fmt::Write`], keeping the first I/O error so
/// it can be reported instead of the opaque [`fmt::Error`].
pub struct Writer<W> {
    writer: W,
    err: Option<io::Error>,
}

/// Why a value could not be written as output text.
#[derive(Debug)]
pub(crate) enum FormatError {
    /// The value (or an element of it) has no text form.
    Unrenderable(&'static str),
    Write(fmt::Error),
}

impl<'a> Formatter<'a> {
    pub(crate) fn with_string(buf: &'a mut String) -> Self {
        Self { buf }
    }

    pub(crate) fn with_writer<W>(buf: &'a mut Writer<W>) -> Self
    where
        W: io::Write + 'a,
    {
        Self { buf }
    }
}

impl fmt::Write for Formatter<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.write_str(s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        self.buf.write_char(c)
    }
}

impl<W> Writer<W>
where
    W: io::Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer, err: None }
    }

    pub fn take_err(&mut self) -> Option<io::Error> {
        self.err.take()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> fmt::Result {
        self.writer.write_all(bytes).map_err(|e| {
            self.err.get_or_insert(e);
            fmt::Error
        })
    }
}

impl<W> fmt::Write for Writer<W>
where
    W: io::Write,
{
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes())
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        self.write_bytes(c.encode_utf8(&mut [0; 4]).as_bytes())
    }
}

impl From<fmt::Error> for FormatError {
    fn from(err: fmt::Error) -> Self {
        Self::Write(err)
    }
}

/// Writes the text form of a value.
///
/// `None` writes nothing and lists write their elements back to back. Maps
/// have no text form.
pub(crate) fn format_value<W>(f: &mut W, value: &Value) -> Result<(), FormatError>
where
    W: fmt::Write + ?Sized,
{
    match value {
        Value::None => {}
        Value::Bool(b) => write!(f, "{b}")?,
        Value::Integer(n) => write!(f, "{n}")?,
        Value::Float(n) => format_float(f, *n)?,
        Value::String(s) => f.write_str(s)?,
        Value::List(list) => {
            for item in list {
                format_value(f, item)?;
            }
        }
        Value::Map(_) => return Err(FormatError::Unrenderable(value.human())),
    }
    Ok(())
}

fn format_float<W>(f: &mut W, n: f64) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        write!(f, "{n:.1}")
    } else {
        write!(f, "{n}")
    }
}
