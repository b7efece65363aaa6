//! Control-flow type information consumed by quick fixes.
//!
//! The analysis that decides which types an expression may have at a program point lives with
//! the host; this crate defines the query it answers ([`ControlFlowTypes`]) and a small
//! fact-table implementation ([`NarrowingFacts`]) built from `instanceof` guards.

mod narrowing;

use nova_hir::{ExprId, ExprTree};
use nova_types::Type;

pub use crate::narrowing::NarrowingFacts;

/// Answers "what could this expression be here?".
pub trait ControlFlowTypes {
    /// The types `expr` is known to have at its location, most specific first.
    ///
    /// Each entry (a conjunct) holds independently; an expression narrowed by
    /// `x instanceof Foo && x instanceof Bar` yields both `Foo` and `Bar` plus its declared
    /// type. The list may contain duplicates and may be empty.
    fn control_flow_type_conjuncts(&self, tree: &ExprTree, expr: ExprId) -> Vec<Type>;
}

impl<T: ControlFlowTypes + ?Sized> ControlFlowTypes for &T {
    fn control_flow_type_conjuncts(&self, tree: &ExprTree, expr: ExprId) -> Vec<Type> {
        (**self).control_flow_type_conjuncts(tree, expr)
    }
}
