//! Error Codes Registry for the trace checker
//!
//! This module defines all error codes used by the checker along with
//! their documentation, examples, and explanations.

use std::collections::HashMap;

/// An error code with documentation
#[derive(Debug, Clone)]
pub struct ErrorCode {
    /// The error code (e.g., "O0001")
    pub code: &'static str,
    /// Short description
    pub title: &'static str,
    /// Detailed explanation
    pub explanation: &'static str,
    /// Example trace that triggers this error
    pub example: Option<&'static str>,
    pub category: ErrorCategory,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Lexer/tokenization errors
    Lexer,
    /// Parser/syntax errors
    Parser,
    /// Name resolution errors
    Resolve,
    /// Ownership/borrowing errors
    Ownership,
}

impl ErrorCategory {
    /// Get the category prefix for error codes
    pub fn prefix(&self) -> &'static str {
        match self {
            ErrorCategory::Lexer => "L",
            ErrorCategory::Parser => "P",
            ErrorCategory::Resolve => "R",
            ErrorCategory::Ownership => "O",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCategory::Lexer => "Lexer Error",
            ErrorCategory::Parser => "Syntax Error",
            ErrorCategory::Resolve => "Name Resolution Error",
            ErrorCategory::Ownership => "Ownership Error",
        }
    }

    /// Parse a category filter such as "ownership" or "o"
    pub fn from_filter(filter: &str) -> Option<Self> {
        match filter.to_lowercase().as_str() {
            "lexer" | "l" => Some(ErrorCategory::Lexer),
            "parser" | "p" | "syntax" => Some(ErrorCategory::Parser),
            "resolve" | "r" | "name" => Some(ErrorCategory::Resolve),
            "ownership" | "o" | "borrow" => Some(ErrorCategory::Ownership),
            _ => None,
        }
    }

    pub const ALL: [ErrorCategory; 4] = [
        ErrorCategory::Lexer,
        ErrorCategory::Parser,
        ErrorCategory::Resolve,
        ErrorCategory::Ownership,
    ];
}

/// Error index containing all registered error codes
pub struct ErrorIndex {
    codes: HashMap<&'static str, ErrorCode>,
}

impl ErrorIndex {
    /// Create a new error index with all registered codes
    pub fn new() -> Self {
        let mut index = ErrorIndex {
            codes: HashMap::new(),
        };
        index.register_all();
        index
    }

    /// Look up an error code (case-insensitive)
    pub fn get(&self, code: &str) -> Option<&ErrorCode> {
        self.codes.get(code.to_uppercase().as_str())
    }

    /// Get all error codes, sorted by code
    pub fn all(&self) -> Vec<&ErrorCode> {
        let mut codes: Vec<_> = self.codes.values().collect();
        codes.sort_by_key(|c| c.code);
        codes
    }

    /// Get codes by category, sorted by code
    pub fn by_category(&self, category: ErrorCategory) -> Vec<&ErrorCode> {
        self.all()
            .into_iter()
            .filter(|c| c.category == category)
            .collect()
    }

    /// Generate markdown documentation for all error codes
    pub fn generate_docs(&self) -> String {
        let mut doc = String::new();
        doc.push_str("# Trace Checker Error Index\n\n");
        doc.push_str("This document lists all error codes produced by `btrace`.\n\n");

        for category in ErrorCategory::ALL {
            let codes = self.by_category(category);
            if codes.is_empty() {
                continue;
            }

            doc.push_str(&format!("## {}\n\n", category.name()));

            for code in codes {
                doc.push_str(&format!("### {}: {}\n\n", code.code, code.title));
                doc.push_str(&format!("{}\n\n", code.explanation));

                if let Some(example) = code.example {
                    doc.push_str("**Example:**\n\n```text\n");
                    doc.push_str(example);
                    doc.push_str("\n```\n\n");
                }
            }
        }

        doc
    }

    fn register_all(&mut self) {
        // Lexer errors (L0xxx)
        self.register(ErrorCode {
            code: "L0001",
            title: "Invalid character",
            explanation: "The trace contains a character that is not part of the trace syntax.",
            example: Some("bind(s) @  // '@' is not a valid character"),
            category: ErrorCategory::Lexer,
        });

        // Parser errors (P0xxx)
        self.register(ErrorCode {
            code: "P0001",
            title: "Unexpected token",
            explanation: "The parser expected a different token at this position.",
            example: Some("borrow_shared(s) r  // missing `->` before the target"),
            category: ErrorCategory::Parser,
        });

        self.register(ErrorCode {
            code: "P0002",
            title: "Unexpected end of trace",
            explanation: "The trace ended in the middle of an operation.",
            example: Some("move(s ->"),
            category: ErrorCategory::Parser,
        });

        self.register(ErrorCode {
            code: "P0003",
            title: "Invalid JSON trace",
            explanation: "A `.json` trace must be an array of operation objects, or an object with an `ops` array. Each operation carries an `op` tag.",
            example: Some("[{\"op\": \"bind\", \"name\": \"s\"}, {\"op\": \"use\", \"name\": \"s\"}]"),
            category: ErrorCategory::Parser,
        });

        // Resolution errors (R0xxx)
        self.register(ErrorCode {
            code: "R0001",
            title: "Undefined name",
            explanation: "The operation names a binding that is not declared in any enclosing scope. Bindings declared inside a scope are gone once it ends.",
            example: Some("begin_scope\nbind(x)\nend_scope\nuse(x)  // `x` went out of scope"),
            category: ErrorCategory::Resolve,
        });

        self.register(ErrorCode {
            code: "R0002",
            title: "Unbalanced scope",
            explanation: "`end_scope` was reached with no scope open. The outermost scope ends implicitly at the end of the trace.",
            example: Some("bind(x)\nend_scope"),
            category: ErrorCategory::Resolve,
        });

        // Ownership errors (O0xxx)
        self.register(ErrorCode {
            code: "O0001",
            title: "Use of moved value",
            explanation: "The binding's value has been moved to another binding and can no longer be used, borrowed, written, or moved again. Copy values and shared references are duplicated instead of moved.",
            example: Some("bind(s)\nmove(s -> s2)  // s moved here\nuse(s)         // error: s has been moved"),
            category: ErrorCategory::Ownership,
        });

        self.register(ErrorCode {
            code: "O0002",
            title: "Exclusive/shared conflict",
            explanation: "Shared access is read-only access, and exclusive access is the only access. While an exclusive reference is live, no other path may reach its resource, except references borrowed from it. While shared references are live, the resource is frozen.",
            example: Some("bind(mut y)\nborrow_exclusive(y) -> m1\nborrow_exclusive(y) -> m2  // cannot borrow as exclusive more than once"),
            category: ErrorCategory::Ownership,
        });

        self.register(ErrorCode {
            code: "O0003",
            title: "Reference outlives resource",
            explanation: "A resource was moved away or dropped at the end of its scope while a reference to it was still live. The reference is used again later, so it would dangle.",
            example: Some("declare(r)\nbegin_scope\nbind(x)\nborrow_shared(x) -> r\nend_scope  // x dropped here while still borrowed\nuse(r)"),
            category: ErrorCategory::Ownership,
        });

        self.register(ErrorCode {
            code: "O0004",
            title: "Mutation through an immutable path",
            explanation: "Writing to a binding requires it to be declared `mut`, unless the write is the first assignment of a `declare`d binding. Assigning a moved-out binding again also requires `mut`. Through a reference, writing or borrowing exclusively requires the reference itself to be exclusive.",
            example: Some("bind(x)\nwrite(x)  // x is not declared as mutable"),
            category: ErrorCategory::Ownership,
        });

        self.register(ErrorCode {
            code: "O0005",
            title: "Use of uninitialized binding",
            explanation: "A binding introduced with `declare` has no value until a write, move or borrow assigns it.",
            example: Some("declare(r)\nuse(r)  // r was never assigned"),
            category: ErrorCategory::Ownership,
        });
    }

    fn register(&mut self, code: ErrorCode) {
        self.codes.insert(code.code, code);
    }
}

impl Default for ErrorIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up error explanation by code
pub fn explain_error(code: &str) -> Option<String> {
    let index = ErrorIndex::new();
    index.get(code).map(|e| {
        let mut explanation = format!("# {} - {}\n\n", e.code, e.title);
        explanation.push_str(&format!("**Category:** {}\n\n", e.category.name()));
        explanation.push_str(&format!("## Explanation\n\n{}\n", e.explanation));

        if let Some(example) = e.example {
            explanation.push_str("\n## Example\n\n```text\n");
            explanation.push_str(example);
            explanation.push_str("\n```\n");
        }

        explanation
    })
}
