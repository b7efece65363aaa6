use std::collections::HashMap;

use nova_types::{Type, TypeEnv, TypeVarId};
use thiserror::Error;

use crate::expr::{ExprId, ExprKind, RootId, Slot, SlotMut};
use crate::scope::ImportScope;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown expression {0:?}")]
    UnknownExpr(ExprId),
    #[error("unknown root {0:?}")]
    UnknownRoot(RootId),
    #[error("expression {0:?} is not attached to the tree")]
    Detached(ExprId),
    #[error("expression {0:?} is already attached to the tree")]
    AlreadyAttached(ExprId),
    #[error("replacing {target:?} with {node:?} would make {node:?} its own descendant")]
    Cycle { node: ExprId, target: ExprId },
    #[error("slot {index} of {parent:?} does not exist")]
    MissingChild { parent: ExprId, index: usize },
    #[error("slot {index} of {parent:?} cannot be left empty")]
    RequiredSlot { parent: ExprId, index: usize },
    #[error("parent link of {0:?} does not match its slot")]
    Inconsistent(ExprId),
}

/// Marks an arena length; see [`ExprTree::rollback_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMark(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    kind: ExprKind,
    parent: Option<Slot>,
    ty: Option<Type>,
    read_only: bool,
    type_params: Vec<TypeVarId>,
}

/// An arena of expression nodes with parent back-links.
///
/// Replacing a node detaches it; detached subtrees stay addressable (and may be attached
/// again) until [`ExprTree::compact`] drops them. Every mutating operation either
/// succeeds and leaves parent links and child slots in agreement, or fails without changing
/// anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExprTree {
    nodes: Vec<Node>,
    roots: Vec<Option<ExprId>>,
    scope: ImportScope,
    type_params: Vec<TypeVarId>,
    read_only: bool,
}

impl ExprTree {
    pub fn new(scope: ImportScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    // === Construction ===

    /// Allocate a detached node.
    ///
    /// Fails without allocating if a child of `kind` is unknown, already attached elsewhere,
    /// or named by more than one slot.
    pub fn alloc(&mut self, kind: ExprKind) -> Result<ExprId, TreeError> {
        let id = ExprId::from_raw(self.nodes.len() as u32);
        let children: Vec<ExprId> = kind.child_slots().into_iter().flatten().collect();
        for (position, child) in children.iter().enumerate() {
            if self.node(*child)?.parent.is_some() || children[..position].contains(child) {
                return Err(TreeError::AlreadyAttached(*child));
            }
        }

        for (index, child) in kind.child_slots().into_iter().enumerate() {
            let Some(child) = child else { continue };
            self.nodes[child.idx()].parent = Some(Slot::Child { parent: id, index });
        }
        Ok(self.push(kind))
    }

    /// Allocate a node that has no children.
    pub(crate) fn alloc_leaf(&mut self, kind: ExprKind) -> ExprId {
        debug_assert!(kind.child_slots().is_empty());
        self.push(kind)
    }

    fn push(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            ty: None,
            read_only: false,
            type_params: Vec::new(),
        });
        id
    }

    /// Attach a detached expression as a new top-level slot.
    pub fn add_root(&mut self, expr: ExprId) -> Result<RootId, TreeError> {
        let node = self.node(expr)?;
        if node.parent.is_some() {
            return Err(TreeError::AlreadyAttached(expr));
        }
        let root = RootId::from_raw(self.roots.len() as u32);
        self.roots.push(Some(expr));
        self.nodes[expr.idx()].parent = Some(Slot::Root(root));
        Ok(root)
    }

    #[must_use]
    pub fn root(&self, root: RootId) -> Option<ExprId> {
        self.roots.get(root.idx()).copied().flatten()
    }

    #[must_use]
    pub fn mark(&self) -> TreeMark {
        TreeMark(self.nodes.len())
    }

    /// Drop every node allocated after `mark`.
    ///
    /// Only valid when none of those nodes became part of the tree reachable from nodes older
    /// than `mark`; the tree is left untouched otherwise.
    pub fn rollback_to(&mut self, mark: TreeMark) -> Result<(), TreeError> {
        let TreeMark(len) = mark;
        for (idx, node) in self.nodes.iter().enumerate().skip(len) {
            let escaped = match node.parent {
                Some(Slot::Root(_)) => true,
                Some(Slot::Child { parent, .. }) => parent.idx() < len,
                None => false,
            };
            if escaped {
                return Err(TreeError::AlreadyAttached(ExprId::from_raw(idx as u32)));
            }
        }
        self.nodes.truncate(len);
        Ok(())
    }

    // === Queries ===

    fn node(&self, id: ExprId) -> Result<&Node, TreeError> {
        self.nodes.get(id.idx()).ok_or(TreeError::UnknownExpr(id))
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree (or was dropped by [`ExprTree::compact`]).
    /// Use [`ExprTree::get`] for ids that may be stale.
    #[must_use]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.nodes[id.idx()].kind
    }

    #[must_use]
    pub fn get(&self, id: ExprId) -> Option<&ExprKind> {
        self.nodes.get(id.idx()).map(|node| &node.kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn parent_slot(&self, id: ExprId) -> Option<Slot> {
        self.nodes.get(id.idx()).and_then(|node| node.parent)
    }

    #[must_use]
    pub fn parent(&self, id: ExprId) -> Option<ExprId> {
        match self.parent_slot(id)? {
            Slot::Child { parent, .. } => Some(parent),
            Slot::Root(_) => None,
        }
    }

    /// Whether `id` is reachable from a root.
    #[must_use]
    pub fn is_attached(&self, id: ExprId) -> bool {
        self.ancestors(id)
            .last()
            .is_some_and(|top| matches!(self.parent_slot(top), Some(Slot::Root(_))))
    }

    /// `id` and its ancestors, innermost first.
    pub fn ancestors(&self, id: ExprId) -> impl Iterator<Item = ExprId> + '_ {
        let start = self.nodes.get(id.idx()).map(|_| id);
        std::iter::successors(start, move |current| self.parent(*current))
    }

    /// Unwrap any chain of parentheses around `id`.
    ///
    /// Returns `None` for unknown ids and for parentheses with nothing inside.
    #[must_use]
    pub fn deparenthesize(&self, id: ExprId) -> Option<ExprId> {
        let mut current = id;
        loop {
            match self.get(current)? {
                ExprKind::Parenthesized { inner } => current = (*inner)?,
                _ => return Some(current),
            }
        }
    }

    /// The static type of `id`: the recorded type if the host set one, otherwise whatever the
    /// node's shape determines (cast type, parenthesized inner type, literal type).
    ///
    /// String literals have no type here since `String` needs a class lookup; see
    /// [`ExprTree::ty_in`].
    #[must_use]
    pub fn ty(&self, id: ExprId) -> Option<Type> {
        self.resolve_ty(id, None)
    }

    /// Like [`ExprTree::ty`], with literals that name a class resolved through `env`.
    #[must_use]
    pub fn ty_in(&self, id: ExprId, env: &dyn TypeEnv) -> Option<Type> {
        self.resolve_ty(id, Some(env))
    }

    fn resolve_ty(&self, id: ExprId, env: Option<&dyn TypeEnv>) -> Option<Type> {
        let node = self.nodes.get(id.idx())?;
        if let Some(ty) = &node.ty {
            return Some(ty.clone());
        }
        match &node.kind {
            ExprKind::Cast { ty, .. } => Some(ty.ty.clone()),
            ExprKind::Parenthesized { inner } => self.resolve_ty((*inner)?, env),
            ExprKind::Literal { kind, .. } => match env {
                Some(env) => kind.ty(env),
                None => kind.builtin_type(),
            },
            ExprKind::Assign { target, .. } => self.resolve_ty(*target, env),
            _ => None,
        }
    }

    pub fn set_type(&mut self, id: ExprId, ty: Type) -> Result<(), TreeError> {
        self.node(id)?;
        self.nodes[id.idx()].ty = Some(ty);
        Ok(())
    }

    #[must_use]
    pub fn import_scope(&self) -> &ImportScope {
        &self.scope
    }

    pub fn set_import_scope(&mut self, scope: ImportScope) {
        self.scope = scope;
    }

    /// Declare type parameters visible inside the subtree rooted at `id`
    /// (e.g. the method body an expression belongs to).
    pub fn declare_type_params(
        &mut self,
        id: ExprId,
        params: impl IntoIterator<Item = TypeVarId>,
    ) -> Result<(), TreeError> {
        self.node(id)?;
        self.nodes[id.idx()].type_params.extend(params);
        Ok(())
    }

    /// Declare type parameters visible everywhere in the tree (e.g. class type parameters).
    pub fn declare_tree_type_params(&mut self, params: impl IntoIterator<Item = TypeVarId>) {
        self.type_params.extend(params);
    }

    #[must_use]
    pub fn is_type_param_in_scope(&self, site: ExprId, param: TypeVarId) -> bool {
        self.type_params.contains(&param)
            || self
                .ancestors(site)
                .any(|id| self.nodes[id.idx()].type_params.contains(&param))
    }

    pub fn set_read_only(&mut self, id: ExprId, read_only: bool) -> Result<(), TreeError> {
        self.node(id)?;
        self.nodes[id.idx()].read_only = read_only;
        Ok(())
    }

    pub fn set_tree_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Whether `id` may be edited: the tree is writable and neither `id` nor any ancestor is
    /// marked read-only.
    #[must_use]
    pub fn is_writable(&self, id: ExprId) -> bool {
        !self.read_only
            && self.nodes.get(id.idx()).is_some()
            && self
                .ancestors(id)
                .all(|ancestor| !self.nodes[ancestor.idx()].read_only)
    }

    // === Mutation ===

    /// Substitute the detached node `new` for `old` in `old`'s parent slot.
    ///
    /// `old` becomes detached (its subtree stays intact). Returns `new`.
    pub fn replace(&mut self, old: ExprId, new: ExprId) -> Result<ExprId, TreeError> {
        let slot = self.node(old)?.parent.ok_or(TreeError::Detached(old))?;
        if old == new {
            return Ok(new);
        }
        if self.node(new)?.parent.is_some() {
            return Err(TreeError::AlreadyAttached(new));
        }
        if self.ancestors(old).any(|ancestor| ancestor == new) {
            return Err(TreeError::Cycle {
                node: new,
                target: old,
            });
        }

        self.write_slot(slot, Some(new))?;
        self.nodes[new.idx()].parent = Some(slot);
        self.nodes[old.idx()].parent = None;
        tracing::trace!(?old, ?new, ?slot, "replaced expression");
        Ok(new)
    }

    /// Detach `id` from an optional slot (or a root), leaving the slot empty.
    pub fn detach(&mut self, id: ExprId) -> Result<(), TreeError> {
        let slot = self.node(id)?.parent.ok_or(TreeError::Detached(id))?;
        self.write_slot(slot, None)?;
        self.nodes[id.idx()].parent = None;
        Ok(())
    }

    fn write_slot(&mut self, slot: Slot, value: Option<ExprId>) -> Result<(), TreeError> {
        match slot {
            Slot::Root(root) => {
                let entry = self
                    .roots
                    .get_mut(root.idx())
                    .ok_or(TreeError::UnknownRoot(root))?;
                *entry = value;
            }
            Slot::Child { parent, index } => {
                let node = self
                    .nodes
                    .get_mut(parent.idx())
                    .ok_or(TreeError::UnknownExpr(parent))?;
                match node.kind.slot_mut(index) {
                    Some(SlotMut::Optional(child)) => *child = value,
                    Some(SlotMut::Required(child)) => match value {
                        Some(value) => *child = value,
                        None => return Err(TreeError::RequiredSlot { parent, index }),
                    },
                    None => return Err(TreeError::MissingChild { parent, index }),
                }
            }
        }
        Ok(())
    }

    /// Deep-copy the subtree at `id` as a new detached subtree.
    ///
    /// Recorded types, read-only flags and declared type parameters are copied along.
    pub fn copy_subtree(&mut self, id: ExprId) -> Result<ExprId, TreeError> {
        let node = self.node(id)?.clone();
        let mut failure = None;
        let kind = node.kind.map_children(&mut |child| match self.copy_subtree(child) {
            Ok(copy) => copy,
            Err(err) => {
                failure.get_or_insert(err);
                child
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }

        let copy = self.alloc(kind)?;
        let copied = &mut self.nodes[copy.idx()];
        copied.ty = node.ty;
        copied.read_only = node.read_only;
        copied.type_params = node.type_params;
        Ok(copy)
    }

    /// Drop every node that isn't reachable from a root and renumber the rest.
    ///
    /// Returns the new id of each surviving node. Ids missing from the map no longer exist, and
    /// ids handed out before the call must be translated through it (or discarded).
    pub fn compact(&mut self) -> HashMap<ExprId, ExprId> {
        let live: Vec<bool> = (0..self.nodes.len())
            .map(|idx| self.is_attached(ExprId::from_raw(idx as u32)))
            .collect();
        let mut remap = HashMap::new();
        for (idx, _) in live.iter().enumerate().filter(|(_, live)| **live) {
            let new = ExprId::from_raw(remap.len() as u32);
            remap.insert(ExprId::from_raw(idx as u32), new);
        }
        let moved = |id: ExprId| remap.get(&id).copied().unwrap_or(id);

        let before = self.nodes.len();
        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_iter()
            .zip(live)
            .filter(|(_, live)| *live)
            .map(|(node, _)| Node {
                kind: node.kind.map_children(&mut |child| moved(child)),
                parent: node.parent.map(|slot| match slot {
                    Slot::Child { parent, index } => Slot::Child {
                        parent: moved(parent),
                        index,
                    },
                    root @ Slot::Root(_) => root,
                }),
                ..node
            })
            .collect();
        for root in self.roots.iter_mut().flatten() {
            *root = moved(*root);
        }

        tracing::debug!(before, after = self.nodes.len(), "compacted expression tree");
        remap
    }

    /// Check that every parent link agrees with the slot it names.
    pub fn validate(&self) -> Result<(), TreeError> {
        for (idx, node) in self.nodes.iter().enumerate() {
            let id = ExprId::from_raw(idx as u32);
            for (index, child) in node.kind.child_slots().into_iter().enumerate() {
                let Some(child) = child else { continue };
                let expected = Some(Slot::Child { parent: id, index });
                if self.node(child)?.parent != expected {
                    return Err(TreeError::Inconsistent(child));
                }
            }
            let linked = match node.parent {
                None => true,
                Some(Slot::Root(root)) => self.root(root) == Some(id),
                Some(Slot::Child { parent, index }) => self
                    .get(parent)
                    .and_then(|kind| kind.child_slots().get(index).copied().flatten())
                    == Some(id),
            };
            if !linked {
                return Err(TreeError::Inconsistent(id));
            }
        }
        Ok(())
    }

    /// Structural equality of the subtree at `id` and the subtree at `other_id` in `other`,
    /// ignoring node ids.
    #[must_use]
    pub fn subtree_eq(&self, id: ExprId, other: &ExprTree, other_id: ExprId) -> bool {
        let (Some(a), Some(b)) = (self.get(id), other.get(other_id)) else {
            return false;
        };
        let strip = |kind: &ExprKind| kind.map_children(&mut |_| ExprId::from_raw(0));
        if strip(a) != strip(b) {
            return false;
        }
        let (a, b) = (a.child_slots(), b.child_slots());
        a.len() == b.len()
            && a.iter().zip(&b).all(|pair| match pair {
                (Some(a), Some(b)) => self.subtree_eq(*a, other, *b),
                (None, None) => true,
                _ => false,
            })
    }
}
