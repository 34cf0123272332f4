//! Borrow trace checker
//!
//! Decides whether a sequence of abstract ownership operations obeys the
//! single-owner, shared-xor-exclusive access discipline:
//! - Every resource has exactly one owning binding at a time
//! - Any number of shared references, or exactly one exclusive reference
//! - No reference outlives the resource it points to
//! - No access through a binding whose value was moved out
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → Trace → Resolver → Liveness → Ownership Checker → Verdict
//! ```
//!
//! # Example
//!
//! ```
//! use borrowtrace::{Verdict, ViolationKind, check_source};
//!
//! let verdict = check_source("[bind(s), move(s -> s2), use(s)]").unwrap();
//! assert_eq!(verdict.reason(), Some(ViolationKind::UseAfterMove));
//!
//! let verdict = check_source("bind(s) borrow(s) -> r1 borrow(s) -> r2 use(r1) use(r2)").unwrap();
//! assert_eq!(verdict, Verdict::Valid);
//! ```

pub mod ast;
pub mod common;
pub mod config;
pub mod diagnostic;
pub mod diagnostics;
pub mod lexer;
pub mod loader;
pub mod ownership;
pub mod parser;
pub mod resolve;
pub mod verdict;

// Re-export diagnostics for convenience
pub use diagnostics::{CheckError, Reporter, SourceFile};

// Re-exports for convenience
pub use ast::{Op, OpKind, Trace};
pub use config::{CheckMode, CheckerConfig, UnusedBorrows};
pub use verdict::{Verdict, Violation, ViolationKind};

/// Checker version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check a trace, collecting violations according to `config`
pub fn check_trace_with(trace: &Trace, config: &CheckerConfig) -> Vec<Violation> {
    let resolved = resolve::resolve(trace);
    ownership::check_resolved(&resolved, config)
}

/// Check a trace, stopping at the first violation
pub fn check_trace(trace: &Trace) -> Verdict {
    check_trace_with(trace, &CheckerConfig::default()).into()
}

/// Parse trace text and check it
pub fn check_source(source: &str) -> miette::Result<Verdict> {
    let trace = parser::parse_str(source)?;
    Ok(check_trace(&trace))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_source_examples() {
        assert_eq!(
            check_source("[bind(s), move(s->s2), use(s)]")
                .unwrap()
                .reason(),
            Some(ViolationKind::UseAfterMove)
        );
        assert!(
            check_source("[bind(s), borrow_shared(s)->r1, borrow_shared(s)->r2, use(r1), use(r2)]")
                .unwrap()
                .is_valid()
        );
        assert_eq!(
            check_source("[bind(s), borrow_exclusive(s)->r1, borrow_exclusive(s)->r2]")
                .unwrap()
                .reason(),
            Some(ViolationKind::BorrowConflict)
        );
    }

    #[test]
    fn test_check_source_propagates_syntax_errors() {
        assert!(check_source("bind(s) @").is_err());
        assert!(check_source("move(s").is_err());
    }

    #[test]
    fn test_check_trace_with_all_mode() {
        let trace = parser::parse_str("bind(s) move(s -> t) use(s) use(s) end_scope").unwrap();
        let violations = check_trace_with(&trace, &CheckerConfig::all());
        let kinds: Vec<_> = violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::UseAfterMove,
                ViolationKind::UseAfterMove,
                ViolationKind::UnbalancedScope
            ]
        );
    }
}
