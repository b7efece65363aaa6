use std::collections::HashMap;

use nova_hir::{ExprId, ExprKind, ExprTree};
use nova_types::Type;

use crate::ControlFlowTypes;

/// `instanceof` facts keyed by variable name.
///
/// Facts are not scoped: a guard recorded for `x` applies to every reference to `x` in the
/// tree, which is what a host does after computing the facts that hold at one location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrowingFacts {
    guards: HashMap<String, Vec<Type>>,
}

impl NarrowingFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name instanceof ty` holds.
    pub fn record(&mut self, name: impl Into<String>, ty: Type) {
        self.guards.entry(name.into()).or_default().push(ty);
    }

    #[must_use]
    pub fn with_guard(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.record(name, ty);
        self
    }

    /// Record the fact established by the `instanceof` node `guard`.
    ///
    /// Returns `false` (recording nothing) unless `guard` is an `instanceof` whose operand is a
    /// simple name, possibly parenthesized.
    pub fn record_instanceof(&mut self, tree: &ExprTree, guard: ExprId) -> bool {
        let Some(ExprKind::InstanceOf { expr, ty }) = tree.get(guard) else {
            return false;
        };
        let Some(ExprKind::Name { name }) = tree.deparenthesize(*expr).and_then(|e| tree.get(e))
        else {
            return false;
        };
        tracing::trace!(name = %name, "recorded instanceof guard");
        self.record(name.clone(), ty.ty.clone());
        true
    }

    #[must_use]
    pub fn guards(&self, name: &str) -> &[Type] {
        self.guards.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

impl ControlFlowTypes for NarrowingFacts {
    fn control_flow_type_conjuncts(&self, tree: &ExprTree, expr: ExprId) -> Vec<Type> {
        let mut conjuncts = Vec::new();
        let target = tree.deparenthesize(expr).unwrap_or(expr);
        if let Some(ExprKind::Name { name }) = tree.get(target) {
            conjuncts.extend(self.guards(name).iter().cloned());
        }
        conjuncts.extend(tree.ty(expr));
        conjuncts
    }
}
