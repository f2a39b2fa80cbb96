use crate::compile::expr::lex::{Lexer, Token};
use crate::types::expr::{
    Assignment, Compare, CompareOp, Cycle, CycleGroup, Expr, FilterCall, Ident, Index, Literal,
    Logical, LoopHeader, LoopModifiers, Property, Range, Statement, StatementKind, When,
};
use crate::types::span::Span;
use crate::{Error, Result, Value};

/// Tokens that can begin an expression, as listed in error messages.
const EXPR_START: &[&str] = &["identifier", "string", "integer", "`(`"];

const END: &[&str] = &["end of expression"];

/// A recursive descent parser for tag and output arguments.
///
/// The caller picks the statement form up front and the whole argument text
/// must reduce to it.
pub struct Parser<'source> {
    tokens: Lexer<'source>,
}

impl<'source> Parser<'source> {
    /// Construct a parser over `span` of `source`.
    pub fn new(source: &'source str, span: Span) -> Self {
        Self {
            tokens: Lexer::new(source, span),
        }
    }

    /// Parses the argument text as the given statement form.
    pub fn parse_statement(self, kind: StatementKind) -> Result<Statement> {
        match kind {
            StatementKind::Expr => self.expression().map(Statement::Expr),
            StatementKind::Assign => self.assignment().map(Statement::Assign),
            StatementKind::Cycle => self.cycle().map(Statement::Cycle),
            StatementKind::Loop => self.loop_header().map(Statement::Loop),
            StatementKind::When => self.when().map(Statement::When),
        }
    }

    pub fn expression(self) -> Result<Expr> {
        self.complete(Self::parse_expr)
    }

    fn assignment(self) -> Result<Assignment> {
        self.complete(Self::parse_assignment)
    }

    fn cycle(self) -> Result<Cycle> {
        self.complete(Self::parse_cycle)
    }

    fn loop_header(self) -> Result<LoopHeader> {
        self.complete(Self::parse_loop_header)
    }

    fn when(self) -> Result<When> {
        self.complete(Self::parse_when)
    }

    /// Runs `f` and requires that it consumed all of the argument text.
    fn complete<T, F>(mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let parsed = f(&mut self)?;
        match self.tokens.next()? {
            None => Ok(parsed),
            next => Err(self.err_unexpected(next, END)),
        }
    }

    /// Parses an assignment.
    ///
    ///   total = price | times: quantity
    ///
    fn parse_assignment(&mut self) -> Result<Assignment> {
        let name = self.parse_ident()?;
        self.expect(Token::Assign)?;
        let expr = self.parse_expr()?;
        Ok(Assignment { name, expr })
    }

    /// Parses a cycle statement with an optional group name.
    ///
    ///   'odd', 'even'
    ///
    ///   'rows': 'odd', 'even'
    ///
    fn parse_cycle(&mut self) -> Result<Cycle> {
        let mut first = self.parse_expr()?;
        let mut group = None;
        if self.peek_token()? == Some(Token::Colon) {
            let name = match &first {
                Expr::Literal(Literal {
                    value: Value::String(s),
                    ..
                }) => Some(s.clone()),
                Expr::Var(ident) => Some(self.source()[ident.span].to_owned()),
                _ => None,
            };
            if name.is_some() {
                self.expect(Token::Colon)?;
                group = name;
                first = self.parse_expr()?;
            }
        }

        let mut values = vec![first];
        while self.peek_token()? == Some(Token::Comma) {
            self.expect(Token::Comma)?;
            values.push(self.parse_expr()?);
        }

        let span = values[0].span().combine(values[values.len() - 1].span());
        let group = match group {
            Some(name) => CycleGroup::Named(name),
            None => CycleGroup::Implicit(self.cycle_key(&values)),
        };
        Ok(Cycle {
            group,
            values,
            span,
        })
    }

    /// Builds the key shared by anonymous cycles with the same values.
    ///
    /// Literal values are keyed by kind and rendered form so that quoting and
    /// spacing do not matter. Any other expression falls back to the source
    /// text of every value.
    fn cycle_key(&self, values: &[Expr]) -> Vec<String> {
        let literals: Option<Vec<_>> = values
            .iter()
            .map(|v| match v {
                Expr::Literal(lit) => {
                    Some(format!("{} {}", lit.value.human(), lit.value.to_liquid_string()))
                }
                _ => None,
            })
            .collect();
        literals.unwrap_or_else(|| {
            values
                .iter()
                .map(|v| self.source()[v.span()].to_owned())
                .collect()
        })
    }

    /// Parses a loop header.
    ///
    ///   item in collection.items reversed limit: 3 offset: page
    ///
    ///   i in (1..count)
    ///
    fn parse_loop_header(&mut self) -> Result<LoopHeader> {
        let var = self.parse_ident()?;
        self.expect(Token::In)?;
        let iterable = self.parse_expr()?;

        let mut modifiers = LoopModifiers::default();
        while let Some(next) = self.tokens.next()? {
            let span = match next {
                (Token::Ident, span) => span,
                next => return Err(self.err_unexpected(Some(next), &["loop modifier"])),
            };
            let name = &self.source()[span];
            if self.peek_token()? == Some(Token::Colon) {
                self.expect(Token::Colon)?;
                let value = Some(self.parse_expr()?);
                match name {
                    "limit" => modifiers.limit = value,
                    "offset" => modifiers.offset = value,
                    "cols" => modifiers.cols = value,
                    _ => return Err(self.err_undefined_modifier(span)),
                }
            } else {
                match name {
                    "reversed" => modifiers.reversed = true,
                    _ => return Err(self.err_undefined_modifier(span)),
                }
            }
        }

        Ok(LoopHeader {
            var,
            iterable,
            modifiers,
        })
    }

    /// Parses the values of a `when` clause, separated by optional commas.
    fn parse_when(&mut self) -> Result<When> {
        let mut exprs = Vec::new();
        while self.tokens.peek()?.is_some() {
            exprs.push(self.parse_expr()?);
            if self.peek_token()? == Some(Token::Comma) {
                self.expect(Token::Comma)?;
            }
        }
        Ok(When { exprs })
    }

    /// Parses a full expression.
    ///
    ///   a == 1 or b contains "x" and c
    ///
    fn parse_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.peek_token()? == Some(Token::Or) {
            self.expect(Token::Or)?;
            let rhs = self.parse_and()?;
            let span = lhs.span().combine(rhs.span());
            lhs = Expr::Or(Box::new(Logical { lhs, rhs, span }));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_compare()?;
        while self.peek_token()? == Some(Token::And) {
            self.expect(Token::And)?;
            let rhs = self.parse_compare()?;
            let span = lhs.span().combine(rhs.span());
            lhs = Expr::And(Box::new(Logical { lhs, rhs, span }));
        }
        Ok(lhs)
    }

    /// Parses at most one comparison, comparisons do not chain.
    fn parse_compare(&mut self) -> Result<Expr> {
        let lhs = self.parse_filtered()?;
        let op = match self.peek_token()? {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::Ne) => CompareOp::Ne,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Ge) => CompareOp::Ge,
            Some(Token::Contains) => CompareOp::Contains,
            Some(Token::In) => CompareOp::In,
            _ => return Ok(lhs),
        };
        self.tokens.next()?;
        let rhs = self.parse_filtered()?;
        let span = lhs.span().combine(rhs.span());
        Ok(Expr::Compare(Box::new(Compare { op, lhs, rhs, span })))
    }

    /// Parses a value followed by zero or more filters.
    ///
    ///   user.name | append: " ", suffix | upcase
    ///
    fn parse_filtered(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.peek_token()? == Some(Token::Pipe) {
            self.expect(Token::Pipe)?;
            let name = self.parse_ident()?;
            let mut args = Vec::new();
            if self.peek_token()? == Some(Token::Colon) {
                self.expect(Token::Colon)?;
                loop {
                    args.push(self.parse_primary()?);
                    if self.peek_token()? != Some(Token::Comma) {
                        break;
                    }
                    self.expect(Token::Comma)?;
                }
            }
            let end = args.last().map_or(name.span, Expr::span);
            let span = expr.span().combine(end);
            expr = Expr::Filter(Box::new(FilterCall {
                recv: expr,
                name,
                args,
                span,
            }));
        }
        Ok(expr)
    }

    /// Parses an atom followed by property and index accesses.
    ///
    ///   products[0].title
    ///
    fn parse_primary(&mut self) -> Result<Expr> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.peek_token()? {
                Some(Token::Dot) => {
                    self.expect(Token::Dot)?;
                    let key = self.parse_ident()?;
                    let span = expr.span().combine(key.span);
                    expr = Expr::Property(Box::new(Property {
                        recv: expr,
                        key,
                        span,
                    }));
                }
                Some(Token::OpenBracket) => {
                    self.expect(Token::OpenBracket)?;
                    let key = self.parse_expr()?;
                    let end = self.expect(Token::CloseBracket)?;
                    let span = expr.span().combine(end);
                    expr = Expr::Index(Box::new(Index {
                        recv: expr,
                        key,
                        span,
                    }));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parses a literal, a variable, a parenthesized expression or a range.
    fn parse_atom(&mut self) -> Result<Expr> {
        let (tk, span) = match self.tokens.next()? {
            Some(next) => next,
            None => return Err(self.err_unexpected(None, EXPR_START)),
        };
        let value = match tk {
            Token::Ident => return Ok(Expr::Var(Ident { span })),
            Token::OpenParen => return self.parse_group(span),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Nil => Value::None,
            Token::String => {
                let raw = &self.source()[span];
                Value::String(raw[1..raw.len() - 1].to_owned())
            }
            Token::Integer => match self.source()[span].parse() {
                Ok(i) => Value::Integer(i),
                Err(_) => {
                    let msg = "integer literal out of range for 64-bit integer";
                    return Err(Error::syntax(msg, self.source(), span));
                }
            },
            Token::Float => match self.source()[span].parse() {
                Ok(f) => Value::Float(f),
                Err(_) => return Err(Error::syntax("invalid float literal", self.source(), span)),
            },
            _ => return Err(self.err_unexpected(Some((tk, span)), EXPR_START)),
        };
        Ok(Expr::Literal(Literal { value, span }))
    }

    /// Parses the rest of `( expr )` or `( expr .. expr )`.
    fn parse_group(&mut self, open: Span) -> Result<Expr> {
        let start = self.parse_expr()?;
        match self.tokens.next()? {
            Some((Token::CloseParen, _)) => Ok(start),
            Some((Token::DotDot, _)) => {
                let end = self.parse_expr()?;
                let close = self.expect(Token::CloseParen)?;
                let span = open.combine(close);
                Ok(Expr::Range(Box::new(Range { start, end, span })))
            }
            next => Err(self.err_unexpected(next, &["`)`", "`..`"])),
        }
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let span = self.expect(Token::Ident)?;
        Ok(Ident { span })
    }

    /// Consumes the given token and returns its span.
    fn expect(&mut self, exp: Token) -> Result<Span> {
        match self.tokens.next()? {
            Some((tk, span)) if tk == exp => Ok(span),
            next => Err(self.err_unexpected(next, &[exp.human()])),
        }
    }

    fn peek_token(&mut self) -> Result<Option<Token>> {
        Ok(self.tokens.peek()?.map(|(tk, _)| tk))
    }

    fn source(&self) -> &'source str {
        self.tokens.source
    }

    fn err_unexpected(&self, found: Option<(Token, Span)>, expected: &[&str]) -> Error {
        let (found, span) = match found {
            Some((tk, span)) => (tk.human(), span),
            None => ("end of expression", Span::at(self.tokens.end())),
        };
        let expected: Vec<_> = expected.iter().take(4).copied().collect();
        let msg = format!(
            "syntax error: unexpected {found}, expecting {}",
            expected.join(" or ")
        );
        Error::syntax(msg, self.source(), span)
    }

    fn err_undefined_modifier(&self, span: Span) -> Error {
        let name = &self.source()[span];
        Error::syntax(
            format!("undefined loop modifier {name:?}"),
            self.source(),
            span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_precedence() {
        let expr = expr("a or b and c == 1").unwrap();
        let Expr::Or(or) = expr else { panic!("expected or") };
        assert!(matches!(or.lhs, Expr::Var(_)));
        let Expr::And(and) = &or.rhs else { panic!("expected and") };
        assert!(matches!(and.rhs, Expr::Compare(_)));
    }

    #[test]
    fn parse_or_is_left_associative() {
        let source = "a or b or c";
        let Expr::Or(or) = expr(source).unwrap() else { panic!("expected or") };
        assert!(matches!(or.lhs, Expr::Or(_)));
        assert_eq!(&source[or.rhs.span()], "c");
    }

    #[test]
    fn parse_compare_does_not_chain() {
        let err = expr("a == b == c").unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected `==`, expecting end of expression between bytes 7 and 9"
        );
    }

    #[test]
    fn parse_filter_chain() {
        let source = "a | f: b, 'c' | g";
        let Expr::Filter(g) = expr(source).unwrap() else { panic!("expected filter") };
        assert_eq!(&source[g.name.span], "g");
        assert!(g.args.is_empty());
        let Expr::Filter(f) = &g.recv else { panic!("expected filter") };
        assert_eq!(&source[f.name.span], "f");
        assert_eq!(f.args.len(), 2);
        assert_eq!(&source[f.span], "a | f: b, 'c'");
    }

    #[test]
    fn parse_primary_accessors() {
        let source = "a.b[0].c";
        let Expr::Property(p) = expr(source).unwrap() else { panic!("expected property") };
        assert_eq!(&source[p.key.span], "c");
        let Expr::Index(i) = &p.recv else { panic!("expected index") };
        assert!(matches!(&i.key, Expr::Literal(Literal { value: Value::Integer(0), .. })));
        assert_eq!(&source[i.span], "a.b[0]");
    }

    #[test]
    fn parse_range() {
        let source = "(1 .. n.size)";
        let Expr::Range(r) = expr(source).unwrap() else { panic!("expected range") };
        assert_eq!(r.span, Span::from(0..source.len()));
        assert!(matches!(r.end, Expr::Property(_)));
    }

    #[test]
    fn parse_literals() {
        for (source, exp) in [
            ("'hi'", Value::from("hi")),
            ("\"hi\"", Value::from("hi")),
            ("-3", Value::from(-3)),
            ("2.5", Value::from(2.5)),
            ("true", Value::from(true)),
            ("nil", Value::None),
        ] {
            match expr(source).unwrap() {
                Expr::Literal(lit) => assert_eq!(lit.value, exp),
                e => panic!("expected literal, got {e:?}"),
            }
        }
    }

    #[test]
    fn parse_assignment() {
        let source = "x = a | plus: 1";
        let Statement::Assign(a) = stmt(source, StatementKind::Assign).unwrap() else {
            panic!("expected assignment")
        };
        assert_eq!(&source[a.name.span], "x");
        assert!(matches!(a.expr, Expr::Filter(_)));
    }

    #[test]
    fn parse_cycle_implicit_group() {
        let Statement::Cycle(c) = stmt("'odd',  'even'", StatementKind::Cycle).unwrap() else {
            panic!("expected cycle")
        };
        assert_eq!(c.group, CycleGroup::Implicit("'odd','even'".into()));
        assert_eq!(c.values.len(), 2);
    }

    #[test]
    fn parse_cycle_named_group() {
        let Statement::Cycle(c) = stmt("'g': 'a', 'b', 'c'", StatementKind::Cycle).unwrap() else {
            panic!("expected cycle")
        };
        assert_eq!(c.group, CycleGroup::Named("g".into()));
        assert_eq!(c.values.len(), 3);

        let Statement::Cycle(c) = stmt("row: 1, 2", StatementKind::Cycle).unwrap() else {
            panic!("expected cycle")
        };
        assert_eq!(c.group, CycleGroup::Named("row".into()));
    }

    #[test]
    fn parse_cycle_empty() {
        let err = stmt("", StatementKind::Cycle).unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected end of expression, expecting identifier or string or \
             integer or `(` between bytes 0 and 0"
        );
    }

    #[test]
    fn parse_loop_header_modifiers() {
        let source = "item in items reversed limit: 2 offset:n cols:3";
        let Statement::Loop(l) = stmt(source, StatementKind::Loop).unwrap() else {
            panic!("expected loop")
        };
        assert_eq!(&source[l.var.span], "item");
        assert!(l.modifiers.reversed);
        assert!(l.modifiers.limit.is_some());
        assert!(matches!(l.modifiers.offset, Some(Expr::Var(_))));
        assert!(l.modifiers.cols.is_some());
    }

    #[test]
    fn parse_loop_header_range() {
        let Statement::Loop(l) = stmt("i in (3..5)", StatementKind::Loop).unwrap() else {
            panic!("expected loop")
        };
        assert!(matches!(l.iterable, Expr::Range(_)));
        assert!(!l.modifiers.reversed);
    }

    #[test]
    fn parse_loop_header_errors() {
        let err = stmt("a b c", StatementKind::Loop).unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected identifier, expecting `in` between bytes 2 and 3"
        );

        let err = stmt("a in array offset", StatementKind::Loop).unwrap_err();
        assert_eq!(
            err.to_string(),
            "undefined loop modifier \"offset\" between bytes 11 and 17"
        );

        let err = stmt("a in array sorted: 1", StatementKind::Loop).unwrap_err();
        assert_eq!(
            err.to_string(),
            "undefined loop modifier \"sorted\" between bytes 11 and 17"
        );
    }

    #[test]
    fn parse_when() {
        let Statement::When(w) = stmt("1, 2 3", StatementKind::When).unwrap() else {
            panic!("expected when")
        };
        assert_eq!(w.exprs.len(), 3);
        let Statement::When(w) = stmt("", StatementKind::When).unwrap() else {
            panic!("expected when")
        };
        assert!(w.exprs.is_empty());
    }

    #[test]
    fn parse_err_trailing_tokens() {
        let err = expr("a b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected identifier, expecting end of expression between bytes 2 and 3"
        );
    }

    #[test]
    fn parse_err_unclosed_group() {
        let err = expr("(a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected end of expression, expecting `)` or `..` between bytes 2 and 2"
        );
    }

    fn expr(source: &str) -> Result<Expr> {
        Parser::new(source, Span::from(0..source.len())).expression()
    }

    fn stmt(source: &str, kind: StatementKind) -> Result<Statement> {
        Parser::new(source, Span::from(0..source.len())).parse_statement(kind)
    }
}
