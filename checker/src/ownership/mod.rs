//! Ownership and borrow checking
//!
//! This module implements the ownership and borrow checker for traces.
//! It enforces:
//! - Move semantics for non-copy resources
//! - Borrow rules (at most one exclusive reference, or any number of shared ones)
//! - References never outliving the resource they point to
//! - Mutation only through mutable bindings or exclusive references

mod checker;
pub mod liveness;
mod state;

pub use checker::OwnershipChecker;
pub use liveness::{LoanLiveness, Liveness};
pub use state::{
    Loan, LoanId, OwnershipState, Resource, ResourceId, TraceState, TrackedBinding, Value,
};

use crate::config::CheckerConfig;
use crate::resolve::ResolvedTrace;
use crate::verdict::Violation;

/// Check a resolved trace, returning violations in trace order
pub fn check_resolved(trace: &ResolvedTrace, config: &CheckerConfig) -> Vec<Violation> {
    OwnershipChecker::new(trace, config).check()
}
