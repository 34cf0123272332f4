//! Symbol table implementation

use crate::ast::Mutability;
use crate::common::Span;
use rustc_hash::FxHashMap;

/// Unique binding ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u32);

impl BindingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a binding came into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    /// `bind`: owns a fresh resource
    Bind,
    /// `declare`: no value until assigned
    Declare,
    /// Target of a move
    MoveTarget,
    /// Target of a borrow
    BorrowTarget,
}

/// Symbol information
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: BindingId,
    pub name: String,
    pub mutability: Mutability,
    /// Index of the declaring operation
    pub declared_at: usize,
    pub span: Span,
    /// Index of the scope exit that drops this binding
    pub dropped_at: Option<usize>,
    /// Declared binding that no move or borrow has targeted yet
    pub(crate) awaiting_value: bool,
}

/// A single scope
#[derive(Debug, Default)]
pub struct Scope {
    /// Names visible in this scope; later bindings shadow earlier ones
    pub names: FxHashMap<String, BindingId>,
    /// Bindings in declaration order
    pub bindings: Vec<BindingId>,
}

/// Symbol table with scoped lookups
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope. The outermost scope is never popped here.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Pop every remaining scope, innermost first, including the outermost
    pub fn drain_scopes(&mut self) -> Vec<Scope> {
        let mut drained: Vec<Scope> = self.scopes.drain(..).collect();
        drained.reverse();
        drained
    }

    /// Define a new binding in the current scope
    pub fn define(
        &mut self,
        name: &str,
        mutability: Mutability,
        origin: BindingOrigin,
        declared_at: usize,
        span: Span,
    ) -> BindingId {
        let id = BindingId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            mutability,
            declared_at,
            span,
            dropped_at: None,
            awaiting_value: origin == BindingOrigin::Declare,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(name.to_string(), id);
            scope.bindings.push(id);
        }
        id
    }

    /// Look up a name through all enclosing scopes
    pub fn lookup(&self, name: &str) -> Option<BindingId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.names.get(name).copied())
    }

    pub fn get(&self, id: BindingId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn get_mut(&mut self, id: BindingId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.index())
    }

    /// Names visible from the current scope
    pub fn visible_names(&self) -> impl Iterator<Item = &str> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.names.keys().map(String::as_str))
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}
