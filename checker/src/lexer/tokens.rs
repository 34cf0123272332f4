//! Token definitions for the trace lexer

use crate::common::Span;
use logos::Logos;
use serde::{Deserialize, Serialize};

/// A token with its kind, span, and text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Token kinds recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Serialize, Deserialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    // Operations
    #[token("bind")]
    Bind,
    #[token("declare")]
    Declare,
    #[token("move")]
    Move,
    #[token("borrow_shared")]
    #[token("borrow")]
    BorrowShared,
    #[token("borrow_exclusive")]
    #[token("borrow_mut")]
    BorrowExclusive,
    #[token("use")]
    Use,
    #[token("write")]
    Write,
    #[token("begin_scope")]
    BeginScope,
    #[token("end_scope")]
    EndScope,

    // Binder modifiers
    #[token("mut")]
    Mut,
    #[token("copy")]
    Copy,

    #[regex(r"[A-Za-z_][A-Za-z0-9_']*")]
    Ident,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("->")]
    Arrow,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    /// End of input (synthesized, never matched)
    Eof,
}

impl TokenKind {
    /// Tokens that can name a binding: identifiers and every keyword
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Bind
                | TokenKind::Declare
                | TokenKind::Move
                | TokenKind::BorrowShared
                | TokenKind::BorrowExclusive
                | TokenKind::Use
                | TokenKind::Write
                | TokenKind::BeginScope
                | TokenKind::EndScope
                | TokenKind::Mut
                | TokenKind::Copy
        )
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, TokenKind::Comma | TokenKind::Semi)
    }

    /// Human-readable description for diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Bind => "`bind`",
            TokenKind::Declare => "`declare`",
            TokenKind::Move => "`move`",
            TokenKind::BorrowShared => "`borrow_shared`",
            TokenKind::BorrowExclusive => "`borrow_exclusive`",
            TokenKind::Use => "`use`",
            TokenKind::Write => "`write`",
            TokenKind::BeginScope => "`begin_scope`",
            TokenKind::EndScope => "`end_scope`",
            TokenKind::Mut => "`mut`",
            TokenKind::Copy => "`copy`",
            TokenKind::Ident => "identifier",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Arrow => "`->`",
            TokenKind::Comma => "`,`",
            TokenKind::Semi => "`;`",
            TokenKind::Eof => "end of input",
        }
    }
}
