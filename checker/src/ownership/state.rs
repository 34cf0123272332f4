//! Ownership state tracking
//!
//! Tracks bindings, the resources they own, and the loans taken against
//! those resources while a trace is checked.

use crate::ast::{BorrowKind, Mutability};
use crate::common::Span;
use crate::resolve::{BindingId, Symbol};

/// Unique resource ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u32);

/// Unique loan ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoanId(pub u32);

/// What a binding currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Owns a resource
    Owned(ResourceId),
    /// Holds a reference created by a loan
    Ref(LoanId),
}

/// State of ownership for a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipState {
    /// Declared but never assigned
    Uninit,
    /// Holds a usable value
    Live,
    /// Value moved to another binding
    Moved { at: usize, span: Span },
    /// Out of scope
    Dropped,
}

/// Tracked binding
#[derive(Debug, Clone)]
pub struct TrackedBinding {
    pub name: String,
    pub mutability: Mutability,
    pub state: OwnershipState,
    pub value: Option<Value>,
    pub decl_span: Span,
    pub decl_index: usize,
}

impl TrackedBinding {
    pub fn new(symbol: &Symbol) -> Self {
        Self {
            name: symbol.name.clone(),
            mutability: symbol.mutability,
            state: OwnershipState::Uninit,
            value: None,
            decl_span: symbol.span,
            decl_index: symbol.declared_at,
        }
    }

    pub fn assign(&mut self, value: Value) {
        self.value = Some(value);
        self.state = OwnershipState::Live;
    }
}

/// A resource created by `bind`
#[derive(Debug, Clone)]
pub struct Resource {
    /// Binding that currently owns the resource
    pub owner: BindingId,
    /// Copy values are duplicated by moves
    pub copy: bool,
}

/// State of a borrow
#[derive(Debug, Clone)]
pub struct Loan {
    pub id: LoanId,
    pub resource: ResourceId,
    pub kind: BorrowKind,
    /// Loan this one reborrows from
    pub parent: Option<LoanId>,
    /// Index of the borrowing operation
    pub intro: usize,
    /// Last operation index at which the reference is needed
    pub live_end: usize,
    pub span: Span,
    /// Binding the reference was first stored in
    pub holder: String,
}

impl Loan {
    /// Whether the reference is live at operation `index`
    pub fn is_active_at(&self, index: usize) -> bool {
        self.intro < index && index <= self.live_end
    }

    /// Whether the reference is still needed after operation `index`
    pub fn outlives(&self, index: usize) -> bool {
        self.intro < index && self.live_end > index
    }
}

/// Ownership state for the whole trace
#[derive(Debug, Default)]
pub struct TraceState {
    bindings: Vec<TrackedBinding>,
    resources: Vec<Resource>,
    loans: Vec<Loan>,
}

impl TraceState {
    pub fn new(symbols: &[Symbol]) -> Self {
        Self {
            bindings: symbols.iter().map(TrackedBinding::new).collect(),
            resources: Vec::new(),
            loans: Vec::new(),
        }
    }

    pub fn binding(&self, id: BindingId) -> &TrackedBinding {
        &self.bindings[id.index()]
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut TrackedBinding {
        &mut self.bindings[id.index()]
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0 as usize]
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id.0 as usize]
    }

    pub fn loan(&self, id: LoanId) -> &Loan {
        &self.loans[id.0 as usize]
    }

    pub fn new_resource(&mut self, owner: BindingId, copy: bool) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(Resource { owner, copy });
        id
    }

    pub fn add_loan(&mut self, mut loan: Loan) -> LoanId {
        let id = LoanId(self.loans.len() as u32);
        loan.id = id;
        self.loans.push(loan);
        id
    }

    /// The loan and every loan it reborrows from
    pub fn ancestry(&self, loan: Option<LoanId>) -> Vec<LoanId> {
        let mut chain = Vec::new();
        let mut current = loan;
        while let Some(id) = current {
            chain.push(id);
            current = self.loan(id).parent;
        }
        chain
    }

    /// Loans against `resource` that are live at `index`
    pub fn active_loans(
        &self,
        resource: ResourceId,
        index: usize,
    ) -> impl Iterator<Item = &Loan> + '_ {
        self.loans
            .iter()
            .filter(move |l| l.resource == resource && l.is_active_at(index))
    }

    /// Loans against `resource` still needed after `index`
    pub fn outliving_loans(
        &self,
        resource: ResourceId,
        index: usize,
    ) -> impl Iterator<Item = &Loan> + '_ {
        self.loans
            .iter()
            .filter(move |l| l.resource == resource && l.outlives(index))
    }
}
