//! Cast proposals for member accesses that don't resolve on the qualifier's declared type.
//!
//! ```text
//! if (o instanceof Foo) {
//!     o.bar(); // `bar` is unresolved on `Object`; offer "Cast qualifier to 'Foo'"
//! }
//! ```

use nova_flow::ControlFlowTypes;
use nova_hir::{ExprId, ExprKind, ExprTree};
use nova_types::{find_field_by_name, find_methods_by_name, resolve_class_in_type, TypeEnv};

use crate::add_type_cast::{CastAction, CastLabelKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    FieldAccess,
    MethodCall,
}

pub struct QualifierCastProposer<'a, O> {
    env: &'a dyn TypeEnv,
    oracle: O,
}

impl<'a, O: ControlFlowTypes> QualifierCastProposer<'a, O> {
    pub fn new(env: &'a dyn TypeEnv, oracle: O) -> Self {
        Self { env, oracle }
    }

    /// One action per distinct narrowed type of `qualifier` that declares or inherits a member
    /// named `member_name`, in the order the oracle reports the types.
    ///
    /// Methods match by name only (any arity); overload resolution is left to the compiler once
    /// the cast is in place.
    pub fn propose(
        &self,
        tree: &ExprTree,
        qualifier: ExprId,
        member_name: &str,
        access_kind: AccessKind,
    ) -> Vec<CastAction> {
        let conjuncts = self.oracle.control_flow_type_conjuncts(tree, qualifier);
        let mut actions: Vec<CastAction> = Vec::new();

        for ty in conjuncts {
            if actions.iter().any(|action| *action.ty() == ty) {
                continue;
            }
            let Some(class) = resolve_class_in_type(self.env, &ty) else {
                continue;
            };
            let has_member = match access_kind {
                AccessKind::MethodCall => {
                    !find_methods_by_name(self.env, class, member_name, true).is_empty()
                }
                AccessKind::FieldAccess => {
                    find_field_by_name(self.env, class, member_name, true).is_some()
                }
            };
            if !has_member {
                continue;
            }

            actions.push(CastAction::with_label_kind(
                self.env,
                ty,
                qualifier,
                CastLabelKind::Qualifier,
            ));
        }

        tracing::debug!(
            ?qualifier,
            member = member_name,
            ?access_kind,
            proposals = actions.len(),
            "proposed qualifier casts"
        );
        actions
    }

    /// [`Self::propose`] for an unresolved `qualifier.name` or `qualifier.name(..)` node.
    ///
    /// Unqualified calls have nothing to cast and yield no actions.
    pub fn propose_for_member(&self, tree: &ExprTree, member: ExprId) -> Vec<CastAction> {
        match tree.get(member) {
            Some(ExprKind::FieldAccess { qualifier, name }) => {
                self.propose(tree, *qualifier, name, AccessKind::FieldAccess)
            }
            Some(ExprKind::MethodCall {
                receiver: Some(receiver),
                name,
                ..
            }) => self.propose(tree, *receiver, name, AccessKind::MethodCall),
            _ => Vec::new(),
        }
    }
}
