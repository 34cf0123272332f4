//! Trace syntax tree
//!
//! A trace is an ordered list of operations over named bindings. The parser
//! produces it from trace text; JSON traces deserialize straight into
//! [`OpKind`] values.

use crate::common::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binding mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    #[default]
    Immutable,
    Mutable,
}

impl Mutability {
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Kind of reference produced by a borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowKind {
    Shared,
    Exclusive,
}

impl BorrowKind {
    pub fn is_exclusive(self) -> bool {
        matches!(self, BorrowKind::Exclusive)
    }
}

impl fmt::Display for BorrowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorrowKind::Shared => write!(f, "shared"),
            BorrowKind::Exclusive => write!(f, "exclusive"),
        }
    }
}

/// A single trace operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpKind {
    /// New binding owning a fresh resource
    Bind {
        name: String,
        #[serde(default)]
        mutability: Mutability,
        #[serde(default)]
        copy: bool,
    },
    /// Binding declared without a value
    Declare {
        name: String,
        #[serde(default)]
        mutability: Mutability,
    },
    /// Transfer of the value held by `from` into `to`
    Move {
        from: String,
        to: String,
        #[serde(default)]
        mutability: Mutability,
    },
    BorrowShared {
        from: String,
        to: String,
        #[serde(default)]
        mutability: Mutability,
    },
    BorrowExclusive {
        from: String,
        to: String,
        #[serde(default)]
        mutability: Mutability,
    },
    Use {
        name: String,
    },
    /// Assignment to a binding, or through it when it holds a reference
    Write {
        name: String,
    },
    BeginScope,
    EndScope,
}

impl OpKind {
    /// Borrow kind, if this is a borrow
    pub fn borrow_kind(&self) -> Option<BorrowKind> {
        match self {
            OpKind::BorrowShared { .. } => Some(BorrowKind::Shared),
            OpKind::BorrowExclusive { .. } => Some(BorrowKind::Exclusive),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn binder(mutability: &Mutability, copy: bool, name: &str) -> String {
            let mut out = String::new();
            if mutability.is_mutable() {
                out.push_str("mut ");
            }
            if copy {
                out.push_str("copy ");
            }
            out.push_str(name);
            out
        }

        match self {
            OpKind::Bind {
                name,
                mutability,
                copy,
            } => write!(f, "bind({})", binder(mutability, *copy, name)),
            OpKind::Declare { name, mutability } => {
                write!(f, "declare({})", binder(mutability, false, name))
            }
            OpKind::Move {
                from,
                to,
                mutability,
            } => write!(f, "move({} -> {})", from, binder(mutability, false, to)),
            OpKind::BorrowShared {
                from,
                to,
                mutability,
            } => write!(
                f,
                "borrow_shared({}) -> {}",
                from,
                binder(mutability, false, to)
            ),
            OpKind::BorrowExclusive {
                from,
                to,
                mutability,
            } => write!(
                f,
                "borrow_exclusive({}) -> {}",
                from,
                binder(mutability, false, to)
            ),
            OpKind::Use { name } => write!(f, "use({})", name),
            OpKind::Write { name } => write!(f, "write({})", name),
            OpKind::BeginScope => write!(f, "begin_scope"),
            OpKind::EndScope => write!(f, "end_scope"),
        }
    }
}

/// An operation with its source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub kind: OpKind,
    pub span: Span,
}

impl Op {
    pub fn new(kind: OpKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Operation without a source location (built in code)
    pub fn synthetic(kind: OpKind) -> Self {
        Self {
            kind,
            span: Span::dummy(),
        }
    }
}

/// A parsed trace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    pub ops: Vec<Op>,
    /// Byte offset of the end of the source, used for implicit scope ends
    pub end: usize,
}

impl Trace {
    pub fn new(ops: Vec<Op>, end: usize) -> Self {
        Self { ops, end }
    }

    /// Build a trace from operations that carry no spans
    pub fn from_kinds(kinds: impl IntoIterator<Item = OpKind>) -> Self {
        Self {
            ops: kinds.into_iter().map(Op::synthetic).collect(),
            end: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &OpKind> {
        self.ops.iter().map(|op| &op.kind)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", op.kind)?;
        }
        write!(f, "]")
    }
}

/// Builder helpers for constructing traces in code
pub mod build {
    use super::{Mutability, OpKind};

    pub fn bind(name: &str) -> OpKind {
        OpKind::Bind {
            name: name.to_string(),
            mutability: Mutability::Immutable,
            copy: false,
        }
    }

    pub fn bind_mut(name: &str) -> OpKind {
        OpKind::Bind {
            name: name.to_string(),
            mutability: Mutability::Mutable,
            copy: false,
        }
    }

    pub fn bind_copy(name: &str) -> OpKind {
        OpKind::Bind {
            name: name.to_string(),
            mutability: Mutability::Immutable,
            copy: true,
        }
    }

    pub fn declare(name: &str) -> OpKind {
        OpKind::Declare {
            name: name.to_string(),
            mutability: Mutability::Immutable,
        }
    }

    pub fn mv(from: &str, to: &str) -> OpKind {
        OpKind::Move {
            from: from.to_string(),
            to: to.to_string(),
            mutability: Mutability::Immutable,
        }
    }

    pub fn borrow_shared(from: &str, to: &str) -> OpKind {
        OpKind::BorrowShared {
            from: from.to_string(),
            to: to.to_string(),
            mutability: Mutability::Immutable,
        }
    }

    pub fn borrow_exclusive(from: &str, to: &str) -> OpKind {
        OpKind::BorrowExclusive {
            from: from.to_string(),
            to: to.to_string(),
            mutability: Mutability::Immutable,
        }
    }

    pub fn use_(name: &str) -> OpKind {
        OpKind::Use {
            name: name.to_string(),
        }
    }

    pub fn write(name: &str) -> OpKind {
        OpKind::Write {
            name: name.to_string(),
        }
    }

    pub fn begin_scope() -> OpKind {
        OpKind::BeginScope
    }

    pub fn end_scope() -> OpKind {
        OpKind::EndScope
    }
}
