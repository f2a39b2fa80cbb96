use crate::compile::expr;
use crate::compile::lex::{Chunk, Lexer};
use crate::compile::search::Searcher;
use crate::types::ast;
use crate::types::expr::{Expr, LoopHeader, Statement, StatementKind, When};
use crate::types::span::Span;
use crate::{Error, Result};

/// A parser that constructs the block tree from the chunk stream.
///
/// Tag and output arguments are handed to the expression parser, this parser
/// only deals with the nesting of blocks.
pub struct Parser<'engine, 'source> {
    chunks: Lexer<'engine, 'source>,
}

/// Stores the state of an open block during parsing.
enum State {
    /// A partial `if` or `unless` statement.
    If {
        /// The conditions of the `if`/`elsif` branches seen so far.
        conds: Vec<(bool, Expr)>,
        /// Whether this block was opened with `unless`.
        unless: bool,
        has_else: bool,
        span: Span,
    },

    /// A partial `case` statement.
    Case {
        subject: Expr,
        whens: Vec<When>,
        has_else: bool,
        span: Span,
    },

    /// A partial `for` or `tablerow` statement.
    Loop {
        header: LoopHeader,
        tablerow: bool,
        span: Span,
    },
}

/// A parsed tag.
enum Block {
    If(Expr),
    Unless(Expr),
    ElsIf(Expr),
    Else,
    EndIf,
    EndUnless,
    Case(Expr),
    When(When),
    EndCase,
    For(LoopHeader),
    EndFor,
    TableRow(LoopHeader),
    EndTableRow,
    Comment,
    Stmt(ast::Stmt),
}

impl<'engine, 'source> Parser<'engine, 'source> {
    pub fn new(searcher: &'engine Searcher, source: &'source str) -> Self {
        Self {
            chunks: Lexer::new(searcher, source),
        }
    }

    /// Parses a template.
    ///
    /// This function works using two stacks:
    /// - A stack of open blocks e.g. `{% if cond %} ... {% else %}`.
    /// - A stack of scopes which collect each parsed statement.
    pub fn parse_template(mut self) -> Result<ast::Template> {
        let mut blocks: Vec<State> = Vec::new();
        let mut scopes = vec![ast::Scope::new()];

        while let Some(chunk) = self.chunks.next()? {
            let (name, args, span) = match chunk {
                Chunk::Raw(span) => {
                    push(&mut scopes, ast::Stmt::Raw(span));
                    continue;
                }
                Chunk::Output { args, span } => {
                    let expr = expr::Parser::new(self.source(), args).expression()?;
                    push(&mut scopes, ast::Stmt::Output(ast::Output { expr, span }));
                    continue;
                }
                Chunk::Tag { name, args, span } => (name, args, span),
            };

            let stmt = match self.parse_block(name, args, span)? {
                Block::Stmt(stmt) => stmt,

                Block::Comment => {
                    self.skip_comment(span)?;
                    continue;
                }

                Block::If(cond) => {
                    blocks.push(State::If {
                        conds: vec![(false, cond)],
                        unless: false,
                        has_else: false,
                        span,
                    });
                    scopes.push(ast::Scope::new());
                    continue;
                }

                Block::Unless(cond) => {
                    blocks.push(State::If {
                        conds: vec![(true, cond)],
                        unless: true,
                        has_else: false,
                        span,
                    });
                    scopes.push(ast::Scope::new());
                    continue;
                }

                // An `elsif` adds another branch to the open `if`.
                Block::ElsIf(cond) => {
                    match blocks.last_mut() {
                        Some(State::If {
                            conds,
                            unless: false,
                            has_else: false,
                            ..
                        }) => conds.push((false, cond)),
                        _ => return Err(self.err_unexpected("elsif", span)),
                    }
                    scopes.push(ast::Scope::new());
                    continue;
                }

                Block::Else => {
                    match blocks.last_mut() {
                        Some(
                            State::If {
                                has_else: has_else @ false,
                                ..
                            }
                            | State::Case {
                                has_else: has_else @ false,
                                ..
                            },
                        ) => *has_else = true,
                        _ => return Err(self.err_unexpected("else", span)),
                    }
                    scopes.push(ast::Scope::new());
                    continue;
                }

                Block::EndIf | Block::EndUnless => {
                    let unless_end = matches!(self.tag_name(name), "endunless");
                    match blocks.pop() {
                        Some(State::If {
                            conds,
                            unless,
                            has_else,
                            ..
                        }) if unless == unless_end => {
                            let else_branch = has_else.then(|| pop(&mut scopes));
                            let mut branches: Vec<_> = conds
                                .into_iter()
                                .rev()
                                .map(|(not, cond)| ast::Branch {
                                    not,
                                    cond,
                                    body: pop(&mut scopes),
                                })
                                .collect();
                            branches.reverse();
                            ast::Stmt::If(ast::If {
                                branches,
                                else_branch,
                            })
                        }
                        _ => return Err(self.err_unexpected(self.tag_name(name), span)),
                    }
                }

                // Anything between `case` and the first `when` is collected
                // into a scope that is discarded.
                Block::Case(subject) => {
                    blocks.push(State::Case {
                        subject,
                        whens: Vec::new(),
                        has_else: false,
                        span,
                    });
                    scopes.push(ast::Scope::new());
                    continue;
                }

                Block::When(when) => {
                    match blocks.last_mut() {
                        Some(State::Case {
                            whens,
                            has_else: false,
                            ..
                        }) => whens.push(when),
                        _ => return Err(self.err_unexpected("when", span)),
                    }
                    scopes.push(ast::Scope::new());
                    continue;
                }

                Block::EndCase => match blocks.pop() {
                    Some(State::Case {
                        subject,
                        whens,
                        has_else,
                        ..
                    }) => {
                        let else_branch = has_else.then(|| pop(&mut scopes));
                        let mut arms: Vec<_> = whens
                            .into_iter()
                            .rev()
                            .map(|when| ast::Arm {
                                when,
                                body: pop(&mut scopes),
                            })
                            .collect();
                        arms.reverse();
                        pop(&mut scopes);
                        ast::Stmt::Case(ast::Case {
                            subject,
                            arms,
                            else_branch,
                        })
                    }
                    _ => return Err(self.err_unexpected("endcase", span)),
                },

                Block::For(header) | Block::TableRow(header) => {
                    let tablerow = self.tag_name(name) == "tablerow";
                    blocks.push(State::Loop {
                        header,
                        tablerow,
                        span,
                    });
                    scopes.push(ast::Scope::new());
                    continue;
                }

                Block::EndFor | Block::EndTableRow => {
                    let end = self.tag_name(name);
                    match blocks.pop() {
                        Some(State::Loop {
                            header,
                            tablerow,
                            span,
                        }) if tablerow == (end == "endtablerow") => {
                            let body = pop(&mut scopes);
                            let lp = ast::Loop { header, body, span };
                            if tablerow {
                                ast::Stmt::TableRow(lp)
                            } else {
                                ast::Stmt::For(lp)
                            }
                        }
                        _ => return Err(self.err_unexpected(end, span)),
                    }
                }
            };
            push(&mut scopes, stmt);
        }

        if let Some(block) = blocks.first() {
            let (msg, span) = match block {
                State::If {
                    unless: false,
                    span,
                    ..
                } => ("unclosed `if` block", span),
                State::If { span, .. } => ("unclosed `unless` block", span),
                State::Case { span, .. } => ("unclosed `case` block", span),
                State::Loop {
                    tablerow: false,
                    span,
                    ..
                } => ("unclosed `for` block", span),
                State::Loop { span, .. } => ("unclosed `tablerow` block", span),
            };
            return Err(Error::syntax(msg, self.source(), *span));
        }

        Ok(ast::Template {
            scope: pop(&mut scopes),
        })
    }

    /// Parses a single tag, dispatching its arguments to the expression
    /// parser with the start form the tag requires.
    fn parse_block(&self, name: Span, args: Span, span: Span) -> Result<Block> {
        let tag = self.tag_name(name);
        let kind = match tag {
            "if" | "elsif" | "unless" | "case" => StatementKind::Expr,
            "when" => StatementKind::When,
            "for" | "tablerow" => StatementKind::Loop,
            "assign" => StatementKind::Assign,
            "cycle" => StatementKind::Cycle,
            _ => return self.parse_bare_block(tag, name, args, span),
        };
        let block = match expr::Parser::new(self.source(), args).parse_statement(kind)? {
            Statement::Expr(cond) => match tag {
                "elsif" => Block::ElsIf(cond),
                "unless" => Block::Unless(cond),
                "case" => Block::Case(cond),
                _ => Block::If(cond),
            },
            Statement::Loop(header) if tag == "tablerow" => Block::TableRow(header),
            Statement::Loop(header) => Block::For(header),
            Statement::When(when) => Block::When(when),
            Statement::Assign(assign) => Block::Stmt(ast::Stmt::Assign(assign)),
            Statement::Cycle(cycle) => Block::Stmt(ast::Stmt::Cycle(cycle)),
        };
        Ok(block)
    }

    /// Parses a tag that takes no arguments.
    fn parse_bare_block(&self, tag: &str, name: Span, args: Span, span: Span) -> Result<Block> {
        let block = match tag {
            "else" => Block::Else,
            "endif" => Block::EndIf,
            "endunless" => Block::EndUnless,
            "endcase" => Block::EndCase,
            "endfor" => Block::EndFor,
            "endtablerow" => Block::EndTableRow,
            "break" => Block::Stmt(ast::Stmt::Break(span)),
            "continue" => Block::Stmt(ast::Stmt::Continue(span)),
            "comment" => Block::Comment,
            _ => {
                let msg = format!("unknown tag {tag:?}");
                return Err(Error::syntax(msg, self.source(), name));
            }
        };
        if !self.source()[args].trim().is_empty() {
            let msg = format!("unexpected arguments to `{tag}`");
            return Err(Error::syntax(msg, self.source(), args));
        }
        Ok(block)
    }

    /// Skips everything up to the `endcomment` that closes the comment opened
    /// at `begin`. Comments nest.
    fn skip_comment(&mut self, begin: Span) -> Result<()> {
        let mut depth = 1usize;
        while let Some(chunk) = self.chunks.next()? {
            if let Chunk::Tag { name, .. } = chunk {
                match self.tag_name(name) {
                    "comment" => depth += 1,
                    "endcomment" => depth -= 1,
                    _ => {}
                }
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(Error::syntax(
            "unclosed `comment` block",
            self.source(),
            begin,
        ))
    }

    fn tag_name(&self, name: Span) -> &'source str {
        &self.source()[name]
    }

    fn source(&self) -> &'source str {
        self.chunks.source
    }

    fn err_unexpected(&self, tag: &str, span: Span) -> Error {
        Error::syntax(format!("unexpected `{tag}` block"), self.source(), span)
    }
}

fn push(scopes: &mut [ast::Scope], stmt: ast::Stmt) {
    if let Some(scope) = scopes.last_mut() {
        scope.stmts.push(stmt);
    }
}

fn pop(scopes: &mut Vec<ast::Scope>) -> ast::Scope {
    scopes.pop().unwrap_or_default()
}
