//! Name resolution pass
//!
//! Resolves every name in a trace to the binding it refers to, tracking
//! scopes, shadowing, and deferred initialization of `declare`d bindings.

mod resolver;
mod symbols;

pub use resolver::{ResolvedOp, ResolvedStep, ResolvedTrace, Resolver, resolve};
pub use symbols::{BindingId, BindingOrigin, Scope, Symbol, SymbolTable};
