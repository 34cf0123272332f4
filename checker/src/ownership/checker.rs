//! Ownership checker implementation
//!
//! Replays a resolved trace against the ownership state, enforcing move
//! semantics, the shared-xor-exclusive rule, and reference lifetimes.

use super::liveness::Liveness;
use super::state::*;
use crate::ast::BorrowKind;
use crate::common::Span;
use crate::config::{CheckMode, CheckerConfig};
use crate::resolve::{BindingId, ResolvedOp, ResolvedStep, ResolvedTrace};
use crate::verdict::{Violation, ViolationKind};
use tracing::debug;

/// The resource a binding reaches and the loan chain it reaches it through
#[derive(Debug, Clone, Copy)]
struct AccessPath {
    resource: ResourceId,
    via: Option<LoanId>,
}

/// A loan that blocks an access
struct Conflict {
    intro: usize,
    span: Span,
    kind: BorrowKind,
    holder: String,
}

/// Ownership and borrow checker
pub struct OwnershipChecker<'a> {
    trace: &'a ResolvedTrace,
    config: &'a CheckerConfig,
    liveness: Liveness,
    state: TraceState,
    violations: Vec<Violation>,
}

impl<'a> OwnershipChecker<'a> {
    pub fn new(trace: &'a ResolvedTrace, config: &'a CheckerConfig) -> Self {
        Self {
            trace,
            config,
            liveness: Liveness::compute(trace, config.unused_borrows),
            state: TraceState::new(&trace.symbols),
            violations: Vec::new(),
        }
    }

    /// Check every step, returning violations in trace order
    pub fn check(mut self) -> Vec<Violation> {
        let trace = self.trace;
        for step in &trace.steps {
            debug!(index = step.index, op = ?step.op, "checking");
            self.check_step(step);
            if self.stopped() {
                break;
            }
        }
        self.violations
    }

    fn stopped(&self) -> bool {
        self.config.mode == CheckMode::First && !self.violations.is_empty()
    }

    fn report(&mut self, violation: Violation) {
        if self.stopped() {
            return;
        }
        debug!(code = violation.kind.code(), op = violation.op_index, "violation");
        self.violations.push(violation);
    }

    fn name(&self, binding: BindingId) -> String {
        self.state.binding(binding).name.clone()
    }

    fn check_step(&mut self, step: &ResolvedStep) {
        match &step.op {
            ResolvedOp::Bind { binding, copy } => {
                let resource = self.state.new_resource(*binding, *copy);
                self.state
                    .binding_mut(*binding)
                    .assign(Value::Owned(resource));
            }

            // Bindings start uninitialized
            ResolvedOp::Declare { .. } | ResolvedOp::EnterScope => {}

            ResolvedOp::Move { from, to } => self.check_move(*from, *to, step),

            ResolvedOp::Borrow { from, to, kind } => self.check_borrow(*from, *to, *kind, step),

            ResolvedOp::Use { binding } => {
                if let Some(path) = self.access(*binding, step) {
                    self.check_read(*binding, path, step);
                }
            }

            ResolvedOp::Write { binding } => self.check_write(*binding, step),

            ResolvedOp::ExitScope { dropped } => {
                for binding in dropped {
                    self.drop_binding(*binding, step);
                }
            }

            ResolvedOp::Invalid(violation) => self.report(violation.clone()),
        }
    }

    /// Validate that a binding can be read and find what it reaches
    fn access(&mut self, binding: BindingId, step: &ResolvedStep) -> Option<AccessPath> {
        let tracked = self.state.binding(binding);
        match tracked.state {
            OwnershipState::Uninit => {
                let violation = Violation::new(
                    ViolationKind::Uninitialized,
                    step.index,
                    &tracked.name,
                    step.span,
                    format!("`{}` is used before it is assigned", tracked.name),
                )
                .with_related(tracked.decl_index, tracked.decl_span, "declared here");
                self.report(violation);
                return None;
            }
            OwnershipState::Moved { at, span } => {
                let violation = Violation::new(
                    ViolationKind::UseAfterMove,
                    step.index,
                    &tracked.name,
                    step.span,
                    format!("use of moved value `{}`", tracked.name),
                )
                .with_related(at, span, "value moved here");
                self.report(violation);
            }
            OwnershipState::Live | OwnershipState::Dropped => {}
        }

        let value = self.state.binding(binding).value?;
        Some(match value {
            Value::Owned(resource) => AccessPath {
                resource,
                via: None,
            },
            Value::Ref(loan) => AccessPath {
                resource: self.state.loan(loan).resource,
                via: Some(loan),
            },
        })
    }

    /// First live loan on the path's resource that is not part of the path
    fn find_conflict(
        &self,
        path: AccessPath,
        index: usize,
        exclusive_only: bool,
    ) -> Option<Conflict> {
        let ancestry = self.state.ancestry(path.via);
        self.state
            .active_loans(path.resource, index)
            .find(|loan| {
                !ancestry.contains(&loan.id) && (!exclusive_only || loan.kind.is_exclusive())
            })
            .map(|loan| Conflict {
                intro: loan.intro,
                span: loan.span,
                kind: loan.kind,
                holder: loan.holder.clone(),
            })
    }

    fn report_conflict(
        &mut self,
        binding: BindingId,
        conflict: Conflict,
        step: &ResolvedStep,
        message: String,
    ) {
        let violation = Violation::new(
            ViolationKind::BorrowConflict,
            step.index,
            self.name(binding),
            step.span,
            message,
        )
        .with_related(
            conflict.intro,
            conflict.span,
            format!(
                "{} borrow held by `{}` starts here",
                conflict.kind, conflict.holder
            ),
        );
        self.report(violation);
    }

    fn check_read(&mut self, binding: BindingId, path: AccessPath, step: &ResolvedStep) {
        if let Some(conflict) = self.find_conflict(path, step.index, true) {
            let message = format!(
                "cannot use `{}` while it is exclusively borrowed by `{}`",
                self.name(binding),
                conflict.holder
            );
            self.report_conflict(binding, conflict, step, message);
        }
    }

    /// Mutation through a reference needs an exclusive one; `owner_mut`
    /// additionally requires a direct owner to be declared mutable
    fn check_mutable(
        &mut self,
        binding: BindingId,
        path: AccessPath,
        step: &ResolvedStep,
        what: &str,
        owner_mut: bool,
    ) {
        let tracked = self.state.binding(binding);
        let violation = match path.via {
            None if owner_mut && !tracked.mutability.is_mutable() => Violation::new(
                ViolationKind::ImmutableAccess,
                step.index,
                &tracked.name,
                step.span,
                format!("cannot {} immutable binding `{}`", what, tracked.name),
            )
            .with_related(tracked.decl_index, tracked.decl_span, "declared immutable here"),
            Some(loan) if !self.state.loan(loan).kind.is_exclusive() => {
                let loan = self.state.loan(loan);
                Violation::new(
                    ViolationKind::ImmutableAccess,
                    step.index,
                    &tracked.name,
                    step.span,
                    format!("cannot {} `{}`: it is a shared reference", what, tracked.name),
                )
                .with_related(loan.intro, loan.span, "shared borrow created here")
            }
            _ => return,
        };
        self.report(violation);
    }

    fn check_write(&mut self, binding: BindingId, step: &ResolvedStep) {
        let tracked = self.state.binding(binding);
        match (tracked.state, tracked.value) {
            (OwnershipState::Uninit, _) => {
                self.initialize(binding);
                return;
            }
            // Assigning to a moved-out owner gives it a fresh value
            (OwnershipState::Moved { at, span }, Some(Value::Owned(_))) => {
                if !tracked.mutability.is_mutable() {
                    let violation = Violation::new(
                        ViolationKind::ImmutableAccess,
                        step.index,
                        &tracked.name,
                        step.span,
                        format!("cannot assign twice to immutable binding `{}`", tracked.name),
                    )
                    .with_related(at, span, "value moved here");
                    self.report(violation);
                }
                self.initialize(binding);
                return;
            }
            _ => {}
        }

        let Some(path) = self.access(binding, step) else {
            return;
        };
        self.check_mutable(binding, path, step, "write to", true);
        if let Some(conflict) = self.find_conflict(path, step.index, false) {
            let message = format!(
                "cannot write to `{}` while it is borrowed by `{}`",
                self.name(binding),
                conflict.holder
            );
            self.report_conflict(binding, conflict, step, message);
        }
    }

    fn check_borrow(
        &mut self,
        from: BindingId,
        to: BindingId,
        kind: BorrowKind,
        step: &ResolvedStep,
    ) {
        let Some(path) = self.access(from, step) else {
            return;
        };

        // Owner mutability only governs writes; exclusive borrows cannot
        // be taken through a shared reference
        if kind.is_exclusive() {
            self.check_mutable(from, path, step, "borrow as exclusive", false);
        }
        if let Some(conflict) = self.find_conflict(path, step.index, !kind.is_exclusive()) {
            let message = format!(
                "cannot borrow `{}` as {} because it is also borrowed as {} by `{}`",
                self.name(from),
                kind,
                conflict.kind,
                conflict.holder
            );
            self.report_conflict(from, conflict, step, message);
        }

        let live_end = self.liveness.live_end(step.index).unwrap_or(step.index);
        let holder = self.name(to);
        let loan = self.state.add_loan(Loan {
            id: LoanId(0),
            resource: path.resource,
            kind,
            parent: path.via,
            intro: step.index,
            live_end,
            span: step.span,
            holder,
        });
        self.state.binding_mut(to).assign(Value::Ref(loan));
    }

    fn check_move(&mut self, from: BindingId, to: BindingId, step: &ResolvedStep) {
        let Some(path) = self.access(from, step) else {
            return;
        };
        let Some(value) = self.state.binding(from).value else {
            return;
        };

        match value {
            Value::Owned(resource) if self.state.resource(resource).copy => {
                self.check_read(from, path, step);
                let copied = self.state.new_resource(to, true);
                self.state.binding_mut(to).assign(Value::Owned(copied));
            }
            Value::Owned(resource) => {
                let outliving = self
                    .state
                    .outliving_loans(resource, step.index)
                    .next()
                    .map(|loan| (loan.intro, loan.span, loan.holder.clone()));
                if let Some((intro, span, holder)) = outliving {
                    let name = self.name(from);
                    let violation = Violation::new(
                        ViolationKind::DanglingReference,
                        step.index,
                        &name,
                        step.span,
                        format!("cannot move `{}` while it is borrowed by `{}`", name, holder),
                    )
                    .with_related(intro, span, format!("borrow held by `{}` starts here", holder));
                    self.report(violation);
                }
                self.state.resource_mut(resource).owner = to;
                self.transfer(from, to, value, step);
            }
            Value::Ref(loan) if !self.state.loan(loan).kind.is_exclusive() => {
                self.check_read(from, path, step);
                self.state.binding_mut(to).assign(value);
            }
            Value::Ref(_) => {
                if let Some(conflict) = self.find_conflict(path, step.index, false) {
                    let message = format!(
                        "cannot move `{}` while it is reborrowed by `{}`",
                        self.name(from),
                        conflict.holder
                    );
                    self.report_conflict(from, conflict, step, message);
                }
                self.transfer(from, to, value, step);
            }
        }
    }

    fn initialize(&mut self, binding: BindingId) {
        let resource = self.state.new_resource(binding, false);
        self.state
            .binding_mut(binding)
            .assign(Value::Owned(resource));
    }

    fn transfer(&mut self, from: BindingId, to: BindingId, value: Value, step: &ResolvedStep) {
        self.state.binding_mut(from).state = OwnershipState::Moved {
            at: step.index,
            span: step.span,
        };
        self.state.binding_mut(to).assign(value);
    }

    fn drop_binding(&mut self, binding: BindingId, step: &ResolvedStep) {
        let tracked = self.state.binding(binding);
        if tracked.state == OwnershipState::Live
            && let Some(Value::Owned(resource)) = tracked.value
            && self.state.resource(resource).owner == binding
        {
            let outliving = self
                .state
                .outliving_loans(resource, step.index)
                .next()
                .map(|loan| (loan.intro, loan.span, loan.holder.clone()));
            if let Some((intro, span, holder)) = outliving {
                let name = tracked.name.clone();
                let violation = Violation::new(
                    ViolationKind::DanglingReference,
                    step.index,
                    &name,
                    step.span,
                    format!("`{}` dropped while still borrowed by `{}`", name, holder),
                )
                .with_related(intro, span, format!("borrow held by `{}` starts here", holder));
                self.report(violation);
            }
        }
        self.state.binding_mut(binding).state = OwnershipState::Dropped;
    }
}
