//! Reference liveness
//!
//! A reference is live from the borrow that creates it through the last
//! operation that needs it: the last use of any binding holding it, or of
//! any reference reborrowed from it. A holder that is never used keeps the
//! reference live according to [`UnusedBorrows`].

use crate::ast::BorrowKind;
use crate::config::UnusedBorrows;
use crate::resolve::{BindingId, ResolvedOp, ResolvedTrace};
use rustc_hash::FxHashMap;

/// Liveness of a single borrow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanLiveness {
    /// Index of the borrowing operation
    pub intro: usize,
    pub kind: BorrowKind,
    /// Borrow this one reborrows from (index into [`Liveness::loans`])
    pub parent: Option<usize>,
    /// Bindings that held the reference, with the index where each got it
    pub holders: Vec<(BindingId, usize)>,
    pub live_end: usize,
}

/// Liveness facts for a resolved trace
#[derive(Debug, Default)]
pub struct Liveness {
    loans: Vec<LoanLiveness>,
    by_op: FxHashMap<usize, usize>,
}

impl Liveness {
    pub fn compute(trace: &ResolvedTrace, policy: UnusedBorrows) -> Self {
        let mut last_use: Vec<Option<usize>> = vec![None; trace.symbols.len()];
        let mut holds: Vec<Option<usize>> = vec![None; trace.symbols.len()];
        let mut loans: Vec<LoanLiveness> = Vec::new();
        let mut by_op = FxHashMap::default();

        for step in &trace.steps {
            match &step.op {
                ResolvedOp::Use { binding } | ResolvedOp::Write { binding } => {
                    last_use[binding.index()] = Some(step.index);
                }
                ResolvedOp::Move { from, to } => {
                    last_use[from.index()] = Some(step.index);
                    if let Some(loan) = holds[from.index()] {
                        holds[to.index()] = Some(loan);
                        loans[loan].holders.push((*to, step.index));
                    }
                }
                ResolvedOp::Borrow { from, to, kind } => {
                    last_use[from.index()] = Some(step.index);
                    let id = loans.len();
                    loans.push(LoanLiveness {
                        intro: step.index,
                        kind: *kind,
                        parent: holds[from.index()],
                        holders: vec![(*to, step.index)],
                        live_end: step.index,
                    });
                    by_op.insert(step.index, id);
                    holds[to.index()] = Some(id);
                }
                _ => {}
            }
        }

        for loan in &mut loans {
            loan.live_end = loan
                .holders
                .iter()
                .map(|&(holder, received)| match last_use[holder.index()] {
                    Some(used) if used > received => used,
                    _ => match policy {
                        UnusedBorrows::ScopeEnd => trace
                            .symbol(holder)
                            .dropped_at
                            .unwrap_or(trace.end_index),
                        UnusedBorrows::Immediate => received,
                    },
                })
                .max()
                .unwrap_or(loan.intro);
        }

        // Reborrows keep their parent alive; parents always come first
        for i in (0..loans.len()).rev() {
            if let Some(parent) = loans[i].parent {
                let end = loans[i].live_end;
                if end > loans[parent].live_end {
                    loans[parent].live_end = end;
                }
            }
        }

        Self { loans, by_op }
    }

    /// Live range end of the borrow created at operation `op_index`
    pub fn live_end(&self, op_index: usize) -> Option<usize> {
        self.by_op.get(&op_index).map(|&i| self.loans[i].live_end)
    }

    pub fn loans(&self) -> &[LoanLiveness] {
        &self.loans
    }
}
