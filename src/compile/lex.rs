use crate::compile::search::Searcher;
use crate::types::span::Span;
use crate::types::syntax::Kind;
use crate::{Error, Result};

/// A lexer that chunks the template source into raw text, output markers and
/// tags so that the block parser doesn't have to operate on raw text.
///
/// The lexer is implemented as a fallible iterator. The parser repeatedly
/// calls [`.next()?`][Lexer::next] until [`None`] is returned.
pub struct Lexer<'engine, 'source> {
    searcher: &'engine Searcher,

    /// The original template source.
    pub source: &'source str,

    /// A cursor over the template source.
    cursor: usize,

    /// Whether to left trim the next raw chunk.
    left_trim: bool,

    /// A marker found while emitting the raw text before it.
    next: Option<Chunk>,
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// Raw template text.
    Raw(Span),
    /// `{{ args }}`
    Output { args: Span, span: Span },
    /// `{% name args %}`
    Tag { name: Span, args: Span, span: Span },
}

impl<'engine, 'source> Lexer<'engine, 'source> {
    pub fn new(searcher: &'engine Searcher, source: &'source str) -> Self {
        Self {
            searcher,
            source,
            cursor: 0,
            left_trim: false,
            next: None,
        }
    }

    /// Returns the next chunk.
    pub fn next(&mut self) -> Result<Option<Chunk>> {
        if let Some(next) = self.next.take() {
            return Ok(Some(next));
        }

        let i = self.cursor;
        if i >= self.source.len() {
            return Ok(None);
        }

        // xxxxxxx{{xxxxxxxxx
        //    ^   ^ ^
        //    i   j k
        match self.searcher.find_at(self.source, i) {
            Some((kind, j, k)) => {
                if !kind.is_begin() {
                    let msg = format!("unexpected {}", kind.human());
                    return Err(Error::syntax(msg, self.source, j..k));
                }
                let left_trim = self.left_trim;
                let marker = self.lex_marker(kind, j, k)?;
                if i == j {
                    Ok(Some(marker))
                } else {
                    self.next = Some(marker);
                    Ok(Some(self.raw(i, j, left_trim, kind.is_trim())))
                }
            }
            None => {
                let j = self.source.len();
                self.cursor = j;
                let left_trim = std::mem::take(&mut self.left_trim);
                Ok(Some(self.raw(i, j, left_trim, false)))
            }
        }
    }

    fn raw(&self, mut i: usize, mut j: usize, left_trim: bool, right_trim: bool) -> Chunk {
        if right_trim {
            j = self.source[..j].trim_end().len().max(i);
        }
        if left_trim {
            let s = &self.source[i..j];
            i += s.len() - s.trim_start().len();
        }
        Chunk::Raw(Span::from(i..j))
    }

    /// Scans from the begin delimiter at `j..k` to the matching end delimiter,
    /// skipping over quoted strings.
    fn lex_marker(&mut self, begin: Kind, j: usize, k: usize) -> Result<Chunk> {
        let (end, end_trim) = begin.end();
        let mut quote = None;
        let mut iter = self.source[k..].char_indices().map(|(d, c)| (k + d, c));

        while let Some((m, c)) = iter.next() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }
            if c == '"' || c == '\'' {
                quote = Some(c);
                continue;
            }
            let Some((kind, n)) = self.searcher.starts_with(self.source, m) else {
                continue;
            };
            if kind == end || kind == end_trim {
                self.cursor = n;
                self.left_trim = kind.is_trim();
                let args = Span::from(k..m);
                let span = Span::from(j..n);
                return self.chunk(begin, args, span);
            }
            if kind.is_begin() {
                break;
            }
            let msg = format!("unexpected {}", kind.human());
            return Err(Error::syntax(msg, self.source, m..n));
        }

        let msg = format!("unclosed {}", begin.human());
        Err(Error::syntax(msg, self.source, j..k))
    }

    fn chunk(&self, begin: Kind, args: Span, span: Span) -> Result<Chunk> {
        if matches!(begin, Kind::BeginOutput | Kind::BeginOutputTrim) {
            return Ok(Chunk::Output { args, span });
        }
        let inner = &self.source[args];
        let start = args.m + (inner.len() - inner.trim_start().len());
        let len = self.source[start..args.n]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(args.n - start);
        if len == 0 {
            return Err(Error::syntax("expected tag name", self.source, span));
        }
        let name = Span::from(start..start + len);
        let args = Span::from(name.n..args.n);
        Ok(Chunk::Tag { name, args, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::syntax::Syntax;

    #[test]
    fn lex_empty() {
        assert_eq!(lex("").unwrap(), [] as [&str; 0]);
    }

    #[test]
    fn lex_raw() {
        assert_eq!(lex("lorem ipsum").unwrap(), ["raw:lorem ipsum"]);
    }

    #[test]
    fn lex_output() {
        assert_eq!(
            lex("lorem {{ ipsum }} dolor").unwrap(),
            ["raw:lorem ", "output: ipsum ", "raw: dolor"]
        );
    }

    #[test]
    fn lex_tag() {
        assert_eq!(
            lex("{% for a in array limit:2 %}{{ a }}{% endfor %}").unwrap(),
            [
                "tag:for| a in array limit:2 ",
                "output: a ",
                "tag:endfor| "
            ]
        );
    }

    #[test]
    fn lex_trim() {
        assert_eq!(
            lex("a  \n {%- if x -%} \n b {{- y }}  c").unwrap(),
            ["raw:a", "tag:if| x ", "raw:b", "output: y ", "raw:  c"]
        );
    }

    #[test]
    fn lex_delimiter_in_string() {
        assert_eq!(
            lex("{{ '}}' | append: \"%}\" }}").unwrap(),
            ["output: '}}' | append: \"%}\" "]
        );
    }

    #[test]
    fn lex_err_unclosed() {
        let err = lex("lorem {{ ipsum").unwrap_err();
        assert_eq!(err.to_string(), "unclosed begin output between bytes 6 and 8");
        let err = lex("lorem {% if x {{ y }}").unwrap_err();
        assert_eq!(err.to_string(), "unclosed begin tag between bytes 6 and 8");
    }

    #[test]
    fn lex_err_unexpected_end() {
        let err = lex("lorem }} ipsum").unwrap_err();
        assert_eq!(err.to_string(), "unexpected end output between bytes 6 and 8");
        let err = lex("{{ x %}").unwrap_err();
        assert_eq!(err.to_string(), "unexpected end tag between bytes 5 and 7");
    }

    #[test]
    fn lex_err_missing_tag_name() {
        let err = lex("{% %}").unwrap_err();
        assert_eq!(err.to_string(), "expected tag name between bytes 0 and 5");
    }

    fn lex(source: &str) -> Result<Vec<String>> {
        let searcher = Searcher::new(Syntax::default());
        let mut lexer = Lexer::new(&searcher, source);
        let mut chunks = Vec::new();
        while let Some(chunk) = lexer.next()? {
            chunks.push(match chunk {
                Chunk::Raw(sp) => format!("raw:{}", &source[sp]),
                Chunk::Output { args, .. } => format!("output:{}", &source[args]),
                Chunk::Tag { name, args, .. } => {
                    format!("tag:{}|{}", &source[name], &source[args])
                }
            });
        }
        for _ in 0..3 {
            assert!(lexer.next().unwrap().is_none());
        }
        Ok(chunks)
    }
}
