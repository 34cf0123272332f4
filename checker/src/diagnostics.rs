//! Diagnostic reporting with source locations
//!
//! Rich error messages for parse failures and checker violations, rendered
//! with miette.

use crate::common::Span;
use crate::verdict::{Violation, ViolationKind};
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Checker diagnostic
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CheckError {
    // === Lexer Errors ===
    #[error("Unexpected character at position {position}: {found:?}")]
    #[diagnostic(
        code(L0001),
        help("names use letters, digits, `_` and `'`; comments start with `//` or `#`")
    )]
    UnexpectedChar {
        found: String,
        position: usize,
        #[label("unexpected character")]
        span: SourceSpan,
    },

    // === Parse Errors ===
    #[error("Unexpected token: expected {expected}, found {found}")]
    #[diagnostic(code(P0001))]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Unexpected end of trace")]
    #[diagnostic(code(P0002))]
    UnexpectedEof {
        #[label("expected more tokens")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Unclosed `[` in trace")]
    #[diagnostic(code(P0001), help("add `]` at the end of the trace"))]
    UnclosedBracket {
        #[label("opened here")]
        open_span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Invalid JSON trace: {message}")]
    #[diagnostic(
        code(P0003),
        help("a JSON trace is an array of operations like {{\"op\": \"bind\", \"name\": \"s\"}}")
    )]
    InvalidJson { message: String },

    // === Resolution Errors ===
    #[error("Undefined name `{name}`")]
    #[diagnostic(code(R0001))]
    UndefinedName {
        name: String,
        #[label("not found in this scope")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
        #[help]
        suggestion: Option<String>,
    },

    #[error("`end_scope` without a matching `begin_scope`")]
    #[diagnostic(code(R0002))]
    UnbalancedScope {
        #[label("no scope is open here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    // === Ownership Errors ===
    #[error("Use of moved value `{name}`")]
    #[diagnostic(code(O0001))]
    UseAfterMove {
        name: String,
        #[label("value used here after move")]
        use_span: SourceSpan,
        #[label("value moved here")]
        move_span: Option<SourceSpan>,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Conflicting access to `{name}`: {message}")]
    #[diagnostic(
        code(O0002),
        help("an exclusive reference must be the only live path to its resource")
    )]
    BorrowConflict {
        name: String,
        message: String,
        #[label("conflicting access here")]
        span: SourceSpan,
        #[label("{prev_label}")]
        prev_span: Option<SourceSpan>,
        prev_label: String,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Reference outlives `{name}`: {message}")]
    #[diagnostic(
        code(O0003),
        help("end every use of the reference before the resource is moved or dropped")
    )]
    DanglingReference {
        name: String,
        message: String,
        #[label("resource invalidated here")]
        span: SourceSpan,
        #[label("{borrow_label}")]
        borrow_span: Option<SourceSpan>,
        borrow_label: String,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Cannot mutate `{name}`: {message}")]
    #[diagnostic(code(O0004))]
    ImmutableAccess {
        name: String,
        message: String,
        #[label("mutation here")]
        span: SourceSpan,
        #[label("declared here")]
        decl_span: Option<SourceSpan>,
        #[source_code]
        src: NamedSource<String>,
        #[help]
        help: Option<String>,
    },

    #[error("Use of uninitialized binding `{name}`")]
    #[diagnostic(
        code(O0005),
        help("assign it with `move(.. -> {name})` or a borrow first")
    )]
    Uninitialized {
        name: String,
        #[label("used here before assignment")]
        span: SourceSpan,
        #[label("declared here")]
        decl_span: Option<SourceSpan>,
        #[source_code]
        src: NamedSource<String>,
    },
}

impl CheckError {
    /// Render a violation against its source
    pub fn from_violation(violation: &Violation, source: &SourceFile) -> Self {
        let src = source.to_named_source();
        let span: SourceSpan = violation.span.into();
        let related_span = violation.related.as_ref().map(|r| SourceSpan::from(r.span));
        let related_label = violation
            .related
            .as_ref()
            .map(|r| r.label.clone())
            .unwrap_or_default();
        let name = violation.name.clone();

        match violation.kind {
            ViolationKind::UseAfterMove => CheckError::UseAfterMove {
                name,
                use_span: span,
                move_span: related_span,
                src,
            },
            ViolationKind::BorrowConflict => CheckError::BorrowConflict {
                name,
                message: violation.message.clone(),
                span,
                prev_span: related_span,
                prev_label: related_label,
                src,
            },
            ViolationKind::DanglingReference => CheckError::DanglingReference {
                name,
                message: violation.message.clone(),
                span,
                borrow_span: related_span,
                borrow_label: related_label,
                src,
            },
            ViolationKind::ImmutableAccess => {
                let help = Some(format!("declare it as `bind(mut {})`", violation.name))
                    .filter(|_| !violation.message.contains("reference"));
                CheckError::ImmutableAccess {
                    name,
                    message: violation.message.clone(),
                    span,
                    decl_span: related_span,
                    src,
                    help,
                }
            }
            ViolationKind::Uninitialized => CheckError::Uninitialized {
                name,
                span,
                decl_span: related_span,
                src,
            },
            ViolationKind::UndefinedName => CheckError::UndefinedName {
                name,
                span,
                src,
                suggestion: violation.help.clone(),
            },
            ViolationKind::UnbalancedScope => CheckError::UnbalancedScope { span, src },
        }
    }
}

/// Error reporter that collects diagnostics
pub struct Reporter {
    source: SourceFile,
    errors: Vec<CheckError>,
}

impl Reporter {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            errors: Vec::new(),
        }
    }

    /// Record a violation, rendered against this reporter's source
    pub fn violation(&mut self, violation: &Violation) {
        let error = CheckError::from_violation(violation, &self.source);
        self.errors.push(error);
    }

    /// Print all diagnostics
    pub fn emit_all(&self) {
        for error in &self.errors {
            eprintln!("{:?}", miette::Report::new(error.clone()));
        }
    }
}
