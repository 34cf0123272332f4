//! Parser for the trace language
//!
//! A recursive descent parser that produces a [`Trace`] from a token stream.

pub mod json;

use crate::ast::{Mutability, Op, OpKind, Trace};
use crate::common::Span;
use crate::diagnostics::{CheckError, SourceFile};
use crate::lexer::{self, Token, TokenKind};
use miette::Result;

/// Parse a token stream into a trace
pub fn parse(tokens: &[Token], source: &SourceFile) -> Result<Trace> {
    let mut parser = Parser::new(tokens, source);
    Ok(parser.parse_trace()?)
}

/// Lex and parse trace text in one step
pub fn parse_str(text: &str) -> Result<Trace> {
    let source = SourceFile::new("<input>", text);
    let tokens =
        lexer::lex(text).map_err(|report| report.with_source_code(source.to_named_source()))?;
    parse(&tokens, &source)
}

/// A binding target with its modifiers
struct Binder {
    name: String,
    mutability: Mutability,
    copy: bool,
}

/// Parser state
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a SourceFile,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], source: &'a SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
        }
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> TokenKind {
        if self.tokens.is_empty() {
            return TokenKind::Eof;
        }
        self.current().kind
    }

    fn source_end(&self) -> usize {
        self.source.content.len()
    }

    fn advance(&mut self) -> Span {
        if self.tokens.is_empty() {
            let end = self.source_end();
            return Span::new(end, end);
        }
        let span = self.current().span;
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        span
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Kind of the token after the current one
    fn peek_next(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// A `mut` or `copy` keyword followed by the name it modifies
    fn at_modifier(&self, kind: TokenKind) -> bool {
        self.at(kind) && self.peek_next().is_word()
    }

    fn error_here(&self, expected: &str) -> CheckError {
        if self.at(TokenKind::Eof) {
            let end = self.source_end();
            return CheckError::UnexpectedEof {
                span: Span::new(end, end).into(),
                src: self.source.to_named_source(),
            };
        }
        let token = self.current();
        let found = match token.kind {
            TokenKind::Ident => format!("identifier `{}`", token.text),
            kind => kind.describe().to_string(),
        };
        CheckError::UnexpectedToken {
            expected: expected.to_string(),
            found,
            span: token.span.into(),
            src: self.source.to_named_source(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> std::result::Result<Span, CheckError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(kind.describe()))
        }
    }

    /// Binding name; keywords are valid names here
    fn expect_ident(&mut self) -> std::result::Result<String, CheckError> {
        if self.peek().is_word() {
            let text = self.current().text.clone();
            self.advance();
            Ok(text)
        } else {
            Err(self.error_here("a binding name"))
        }
    }

    fn skip_separators(&mut self) {
        while self.peek().is_separator() {
            self.advance();
        }
    }

    /// Parse the whole token stream
    pub fn parse_trace(&mut self) -> std::result::Result<Trace, CheckError> {
        let mut ops = Vec::new();
        let open_bracket = if self.at(TokenKind::LBracket) {
            Some(self.advance())
        } else {
            None
        };

        loop {
            self.skip_separators();
            match self.peek() {
                TokenKind::Eof => {
                    if let Some(open) = open_bracket {
                        return Err(CheckError::UnclosedBracket {
                            open_span: open.into(),
                            src: self.source.to_named_source(),
                        });
                    }
                    break;
                }
                TokenKind::RBracket if open_bracket.is_some() => {
                    self.advance();
                    self.skip_separators();
                    if !self.at(TokenKind::Eof) {
                        return Err(self.error_here("end of trace after `]`"));
                    }
                    break;
                }
                _ => ops.push(self.parse_op()?),
            }
        }

        Ok(Trace::new(ops, self.source_end()))
    }

    fn parse_op(&mut self) -> std::result::Result<Op, CheckError> {
        let start = self.current().span.start;
        let kind = match self.peek() {
            TokenKind::Bind => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let binder = self.parse_binder(true)?;
                self.expect(TokenKind::RParen)?;
                OpKind::Bind {
                    name: binder.name,
                    mutability: binder.mutability,
                    copy: binder.copy,
                }
            }
            TokenKind::Declare => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let binder = self.parse_binder(false)?;
                self.expect(TokenKind::RParen)?;
                OpKind::Declare {
                    name: binder.name,
                    mutability: binder.mutability,
                }
            }
            TokenKind::Move => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let from = self.expect_ident()?;
                self.expect(TokenKind::Arrow)?;
                let to = self.parse_binder(false)?;
                self.expect(TokenKind::RParen)?;
                OpKind::Move {
                    from,
                    to: to.name,
                    mutability: to.mutability,
                }
            }
            TokenKind::BorrowShared | TokenKind::BorrowExclusive => {
                let exclusive = self.at(TokenKind::BorrowExclusive);
                self.advance();
                self.expect(TokenKind::LParen)?;
                let from = self.expect_ident()?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Arrow)?;
                let to = self.parse_binder(false)?;
                if exclusive {
                    OpKind::BorrowExclusive {
                        from,
                        to: to.name,
                        mutability: to.mutability,
                    }
                } else {
                    OpKind::BorrowShared {
                        from,
                        to: to.name,
                        mutability: to.mutability,
                    }
                }
            }
            TokenKind::Use | TokenKind::Write => {
                let write = self.at(TokenKind::Write);
                self.advance();
                self.expect(TokenKind::LParen)?;
                let name = self.expect_ident()?;
                self.expect(TokenKind::RParen)?;
                if write {
                    OpKind::Write { name }
                } else {
                    OpKind::Use { name }
                }
            }
            TokenKind::BeginScope | TokenKind::LBrace => {
                self.advance();
                OpKind::BeginScope
            }
            TokenKind::EndScope | TokenKind::RBrace => {
                self.advance();
                OpKind::EndScope
            }
            _ => return Err(self.error_here("an operation")),
        };

        let end = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(start);
        Ok(Op::new(kind, Span::new(start, end)))
    }

    fn parse_binder(&mut self, allow_copy: bool) -> std::result::Result<Binder, CheckError> {
        let mutability = if self.at_modifier(TokenKind::Mut) {
            self.advance();
            Mutability::Mutable
        } else {
            Mutability::Immutable
        };
        let copy = if allow_copy && self.at_modifier(TokenKind::Copy) {
            self.advance();
            true
        } else {
            false
        };
        let name = self.expect_ident()?;
        Ok(Binder {
            name,
            mutability,
            copy,
        })
    }
}
