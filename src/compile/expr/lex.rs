use crate::types::span::Span;
use crate::{Error, Result};

/// A lexer over the argument text of a single tag or output marker.
///
/// Spans are relative to the whole template source so that errors point at
/// the right place. One token of lookahead is available through
/// [`.peek()`][Lexer::peek].
pub struct Lexer<'source> {
    pub source: &'source str,
    cursor: usize,
    end: usize,
    peeked: Option<Option<(Token, Span)>>,
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `'text'` or `"text"`
    String,
    /// `42`, `-7`
    Integer,
    /// `0.5`, `-1.25`
    Float,
    /// A variable, property or filter name.
    Ident,
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `|`
    Pipe,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `=`
    Assign,
    /// `==`
    Eq,
    /// `!=` or `<>`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `and`
    And,
    /// `or`
    Or,
    /// `contains`
    Contains,
    /// `in`
    In,
}

impl<'source> Lexer<'source> {
    /// Construct a lexer over `span` of `source`.
    pub fn new(source: &'source str, span: Span) -> Self {
        Self {
            source,
            cursor: span.m,
            end: span.n,
            peeked: None,
        }
    }

    /// The position just past the last byte of the argument text.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns a copy of the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<(Token, Span)>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lex()?);
        }
        Ok(self.peeked.flatten())
    }

    /// Returns the next token and its span.
    pub fn next(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked.take() {
            Some(v) => Ok(v),
            None => self.lex(),
        }
    }

    fn lex(&mut self) -> Result<Option<(Token, Span)>> {
        let source = self.source;
        let rest = &source[self.cursor..self.end];
        let i = self.cursor + (rest.len() - rest.trim_start().len());
        self.cursor = i;

        let mut iter = source[i..self.end]
            .char_indices()
            .map(|(d, c)| (i + d, c))
            .peekable();

        let Some((_, c)) = iter.next() else {
            return Ok(None);
        };
        let next = iter.peek().map(|(_, c)| *c);

        let (tk, j) = match (c, next) {
            ('.', Some('.')) => (Token::DotDot, i + 2),
            ('=', Some('=')) => (Token::Eq, i + 2),
            ('!', Some('=')) | ('<', Some('>')) => (Token::Ne, i + 2),
            ('<', Some('=')) => (Token::Le, i + 2),
            ('>', Some('=')) => (Token::Ge, i + 2),
            ('.', _) => (Token::Dot, i + 1),
            ('|', _) => (Token::Pipe, i + 1),
            (':', _) => (Token::Colon, i + 1),
            (',', _) => (Token::Comma, i + 1),
            ('(', _) => (Token::OpenParen, i + 1),
            (')', _) => (Token::CloseParen, i + 1),
            ('[', _) => (Token::OpenBracket, i + 1),
            (']', _) => (Token::CloseBracket, i + 1),
            ('=', _) => (Token::Assign, i + 1),
            ('<', _) => (Token::Lt, i + 1),
            ('>', _) => (Token::Gt, i + 1),
            ('"' | '\'', _) => self.lex_string(iter, c, i)?,
            ('-', Some(d)) if d.is_ascii_digit() => {
                iter.next();
                self.lex_number(iter)
            }
            (c, _) if c.is_ascii_digit() => self.lex_number(iter),
            (c, _) if is_ident_start(c) => self.lex_ident_or_keyword(iter, i),
            (c, _) => {
                let span = i..i + c.len_utf8();
                return Err(Error::syntax("unexpected character", self.source, span));
            }
        };

        self.cursor = j;
        Ok(Some((tk, Span::from(i..j))))
    }

    fn lex_string<I>(&self, mut iter: I, quote: char, i: usize) -> Result<(Token, usize)>
    where
        I: Iterator<Item = (usize, char)>,
    {
        match iter.find(|(_, c)| *c == quote) {
            Some((j, _)) => Ok((Token::String, j + 1)),
            None => Err(Error::syntax(
                "undelimited string",
                self.source,
                i..self.end,
            )),
        }
    }

    fn lex_number<I>(&self, mut iter: std::iter::Peekable<I>) -> (Token, usize)
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        let mut tk = Token::Integer;
        loop {
            match iter.peek().copied() {
                Some((_, c)) if c.is_ascii_digit() => {
                    iter.next();
                }
                // A dot followed by a digit continues a float, `1..5` is a
                // range.
                Some((j, '.')) if tk == Token::Integer => {
                    let after = iter.clone().nth(1).map(|(_, c)| c);
                    match after {
                        Some(c) if c.is_ascii_digit() => {
                            tk = Token::Float;
                            iter.next();
                        }
                        _ => return (tk, j),
                    }
                }
                Some((j, _)) => return (tk, j),
                None => return (tk, self.end),
            }
        }
    }

    fn lex_ident_or_keyword<I>(&self, mut iter: std::iter::Peekable<I>, i: usize) -> (Token, usize)
    where
        I: Iterator<Item = (usize, char)>,
    {
        let mut j = self.end;
        while let Some((k, c)) = iter.next() {
            if c == '?' {
                j = k + 1;
                break;
            }
            if !is_ident(c) {
                j = k;
                break;
            }
        }
        let tk = match &self.source[i..j] {
            "true" => Token::True,
            "false" => Token::False,
            "nil" | "null" => Token::Nil,
            "and" => Token::And,
            "or" => Token::Or,
            "contains" => Token::Contains,
            "in" => Token::In,
            _ => Token::Ident,
        };
        (tk, j)
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Ident => "identifier",
            Self::True => "`true`",
            Self::False => "`false`",
            Self::Nil => "`nil`",
            Self::Dot => "`.`",
            Self::DotDot => "`..`",
            Self::Pipe => "`|`",
            Self::Colon => "`:`",
            Self::Comma => "`,`",
            Self::OpenParen => "`(`",
            Self::CloseParen => "`)`",
            Self::OpenBracket => "`[`",
            Self::CloseBracket => "`]`",
            Self::Assign => "`=`",
            Self::Eq => "`==`",
            Self::Ne => "`!=`",
            Self::Lt => "`<`",
            Self::Gt => "`>`",
            Self::Le => "`<=`",
            Self::Ge => "`>=`",
            Self::And => "`and`",
            Self::Or => "`or`",
            Self::Contains => "`contains`",
            Self::In => "`in`",
        }
    }
}

#[cfg(feature = "unicode")]
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

#[cfg(feature = "unicode")]
fn is_ident(c: char) -> bool {
    c == '-' || unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_ident_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_')
}

#[cfg(not(feature = "unicode"))]
fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_' | '-')
}
