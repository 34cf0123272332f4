//! Checker verdicts and violation reasons

use crate::common::Span;
use serde::Serialize;
use std::fmt;

/// Reason a trace was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A binding was accessed after its value was moved out
    UseAfterMove,
    /// An exclusive reference overlaps another path to the same resource
    BorrowConflict,
    /// A resource was moved or dropped while a reference to it was live
    DanglingReference,
    /// Mutation of an immutable binding or through a shared reference
    ImmutableAccess,
    /// A declared binding was accessed before it was assigned
    Uninitialized,
    /// A name that no binding in scope declares
    UndefinedName,
    /// `end_scope` with no open scope
    UnbalancedScope,
}

impl ViolationKind {
    /// Error code in the registry (see `codes`)
    pub fn code(self) -> &'static str {
        match self {
            ViolationKind::UseAfterMove => "O0001",
            ViolationKind::BorrowConflict => "O0002",
            ViolationKind::DanglingReference => "O0003",
            ViolationKind::ImmutableAccess => "O0004",
            ViolationKind::Uninitialized => "O0005",
            ViolationKind::UndefinedName => "R0001",
            ViolationKind::UnbalancedScope => "R0002",
        }
    }

    /// Short reason string
    pub fn reason(self) -> &'static str {
        match self {
            ViolationKind::UseAfterMove => "use-after-move",
            ViolationKind::BorrowConflict => "exclusive/shared conflict",
            ViolationKind::DanglingReference => "reference outlives resource",
            ViolationKind::ImmutableAccess => "mutation through immutable path",
            ViolationKind::Uninitialized => "use of uninitialized binding",
            ViolationKind::UndefinedName => "undefined name",
            ViolationKind::UnbalancedScope => "unbalanced scope",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// An earlier operation involved in a violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedSite {
    pub op_index: usize,
    pub span: Span,
    pub label: String,
}

/// A single violation of the access discipline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Index of the offending operation (trace length for implicit scope ends)
    pub op_index: usize,
    /// Binding the violation is about
    pub name: String,
    pub span: Span,
    pub message: String,
    pub related: Option<RelatedSite>,
    pub help: Option<String>,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
        op_index: usize,
        name: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            op_index,
            name: name.into(),
            span,
            message: message.into(),
            related: None,
            help: None,
        }
    }

    pub fn with_related(mut self, op_index: usize, span: Span, label: impl Into<String>) -> Self {
        self.related = Some(RelatedSite {
            op_index,
            span,
            label: label.into(),
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "op #{}: {} [{}]: {}",
            self.op_index,
            self.kind,
            self.kind.code(),
            self.message
        )
    }
}

/// Result of checking a trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Rejected(Violation),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Verdict::Valid => None,
            Verdict::Rejected(v) => Some(v),
        }
    }

    pub fn reason(&self) -> Option<ViolationKind> {
        self.violation().map(|v| v.kind)
    }
}

impl From<Vec<Violation>> for Verdict {
    /// First violation wins
    fn from(violations: Vec<Violation>) -> Self {
        violations
            .into_iter()
            .next()
            .map_or(Verdict::Valid, Verdict::Rejected)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "valid"),
            Verdict::Rejected(v) => write!(f, "rejected: {}", v.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(ViolationKind::UseAfterMove.reason(), "use-after-move");
        assert_eq!(
            ViolationKind::BorrowConflict.reason(),
            "exclusive/shared conflict"
        );
        assert_eq!(
            ViolationKind::DanglingReference.reason(),
            "reference outlives resource"
        );
    }

    #[test]
    fn test_verdict_from_violations() {
        assert_eq!(Verdict::from(Vec::new()), Verdict::Valid);

        let first = Violation::new(ViolationKind::UseAfterMove, 2, "s", Span::dummy(), "moved");
        let second = Violation::new(ViolationKind::BorrowConflict, 4, "s", Span::dummy(), "x");
        let verdict = Verdict::from(vec![first.clone(), second]);
        assert_eq!(verdict, Verdict::Rejected(first));
        assert_eq!(verdict.to_string(), "rejected: use-after-move");
    }
}
