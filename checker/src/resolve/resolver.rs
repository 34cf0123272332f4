//! Name resolution pass

use super::symbols::*;
use crate::ast::{BorrowKind, Mutability, OpKind, Trace};
use crate::common::Span;
use crate::diagnostic::did_you_mean;
use crate::verdict::{Violation, ViolationKind};
use tracing::trace;

/// An operation with every name resolved to a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedOp {
    Bind {
        binding: BindingId,
        copy: bool,
    },
    Declare {
        binding: BindingId,
    },
    Move {
        from: BindingId,
        to: BindingId,
    },
    Borrow {
        from: BindingId,
        to: BindingId,
        kind: BorrowKind,
    },
    Use {
        binding: BindingId,
    },
    Write {
        binding: BindingId,
    },
    EnterScope,
    /// Bindings dropped by this scope exit, in drop order
    ExitScope {
        dropped: Vec<BindingId>,
    },
    /// Operation that failed to resolve
    Invalid(Violation),
}

/// A resolved operation at its position in the trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    /// Index of the source operation; `trace.len()` for implicit scope exits
    pub index: usize,
    pub span: Span,
    pub op: ResolvedOp,
}

/// Resolved trace (steps + symbol arena)
#[derive(Debug)]
pub struct ResolvedTrace {
    pub steps: Vec<ResolvedStep>,
    pub symbols: Vec<Symbol>,
    /// Index used for scope exits at the end of the trace
    pub end_index: usize,
}

impl ResolvedTrace {
    pub fn symbol(&self, id: BindingId) -> &Symbol {
        &self.symbols[id.index()]
    }
}

/// Resolve names in a trace
pub fn resolve(trace: &Trace) -> ResolvedTrace {
    Resolver::new().resolve(trace)
}

/// Name resolver
pub struct Resolver {
    symbols: SymbolTable,
    steps: Vec<ResolvedStep>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            steps: Vec::new(),
        }
    }

    /// Resolve all names in the trace
    pub fn resolve(mut self, trace: &Trace) -> ResolvedTrace {
        for (index, op) in trace.ops.iter().enumerate() {
            let resolved = self.resolve_op(index, &op.kind, op.span);
            trace!(index, op = %op.kind, "resolved");
            self.steps.push(ResolvedStep {
                index,
                span: op.span,
                op: resolved,
            });
        }

        // Every scope still open ends with the trace
        let end_index = trace.len();
        let end_span = Span::new(trace.end, trace.end);
        for scope in self.symbols.drain_scopes() {
            let dropped = self.close_scope(scope, end_index);
            self.steps.push(ResolvedStep {
                index: end_index,
                span: end_span,
                op: ResolvedOp::ExitScope { dropped },
            });
        }

        ResolvedTrace {
            steps: self.steps,
            symbols: self.symbols.into_symbols(),
            end_index,
        }
    }

    fn resolve_op(&mut self, index: usize, kind: &OpKind, span: Span) -> ResolvedOp {
        match kind {
            OpKind::Bind {
                name,
                mutability,
                copy,
            } => {
                let binding =
                    self.symbols
                        .define(name, *mutability, BindingOrigin::Bind, index, span);
                ResolvedOp::Bind {
                    binding,
                    copy: *copy,
                }
            }

            OpKind::Declare { name, mutability } => {
                let binding =
                    self.symbols
                        .define(name, *mutability, BindingOrigin::Declare, index, span);
                ResolvedOp::Declare { binding }
            }

            OpKind::Move {
                from,
                to,
                mutability,
            } => match self.lookup(from, index, span) {
                Ok(from) => {
                    let to = self.target(to, *mutability, BindingOrigin::MoveTarget, index, span);
                    ResolvedOp::Move { from, to }
                }
                Err(violation) => ResolvedOp::Invalid(violation),
            },

            OpKind::BorrowShared {
                from,
                to,
                mutability,
            }
            | OpKind::BorrowExclusive {
                from,
                to,
                mutability,
            } => {
                let borrow_kind = kind.borrow_kind().unwrap_or(BorrowKind::Shared);
                match self.lookup(from, index, span) {
                    Ok(from) => {
                        let to =
                            self.target(to, *mutability, BindingOrigin::BorrowTarget, index, span);
                        ResolvedOp::Borrow {
                            from,
                            to,
                            kind: borrow_kind,
                        }
                    }
                    Err(violation) => ResolvedOp::Invalid(violation),
                }
            }

            OpKind::Use { name } => match self.lookup(name, index, span) {
                Ok(binding) => ResolvedOp::Use { binding },
                Err(violation) => ResolvedOp::Invalid(violation),
            },

            // Writing a declared binding assigns it
            OpKind::Write { name } => match self.lookup(name, index, span) {
                Ok(binding) => {
                    if let Some(symbol) = self.symbols.get_mut(binding) {
                        symbol.awaiting_value = false;
                    }
                    ResolvedOp::Write { binding }
                }
                Err(violation) => ResolvedOp::Invalid(violation),
            },

            OpKind::BeginScope => {
                self.symbols.push_scope();
                ResolvedOp::EnterScope
            }

            OpKind::EndScope => match self.symbols.pop_scope() {
                Some(scope) => ResolvedOp::ExitScope {
                    dropped: self.close_scope(scope, index),
                },
                None => ResolvedOp::Invalid(Violation::new(
                    ViolationKind::UnbalancedScope,
                    index,
                    "",
                    span,
                    "`end_scope` without a matching `begin_scope`",
                )),
            },
        }
    }

    fn lookup(&self, name: &str, index: usize, span: Span) -> Result<BindingId, Violation> {
        self.symbols.lookup(name).ok_or_else(|| {
            let violation = Violation::new(
                ViolationKind::UndefinedName,
                index,
                name,
                span,
                format!("`{}` is not declared in this scope", name),
            );
            match did_you_mean(name, self.symbols.visible_names()) {
                Some(similar) => violation.with_help(format!("did you mean `{}`?", similar)),
                None => violation,
            }
        })
    }

    /// Resolve the target of a move or borrow
    ///
    /// A visible `declare`d binding without a value is initialized in place;
    /// otherwise a new binding shadows any existing one.
    fn target(
        &mut self,
        name: &str,
        mutability: Mutability,
        origin: BindingOrigin,
        index: usize,
        span: Span,
    ) -> BindingId {
        if let Some(existing) = self.symbols.lookup(name)
            && let Some(symbol) = self.symbols.get_mut(existing)
            && symbol.awaiting_value
        {
            symbol.awaiting_value = false;
            return existing;
        }
        self.symbols.define(name, mutability, origin, index, span)
    }

    /// Record drop positions and return bindings in drop order
    fn close_scope(&mut self, scope: Scope, index: usize) -> Vec<BindingId> {
        let mut dropped = scope.bindings;
        dropped.reverse();
        for id in &dropped {
            if let Some(symbol) = self.symbols.get_mut(*id) {
                symbol.dropped_at = Some(index);
            }
        }
        dropped
    }
}
