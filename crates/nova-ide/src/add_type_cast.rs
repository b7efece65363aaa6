//! The "Add type cast" quick fix.
//!
//! [`add_type_cast`] rewrites an expression into a cast of itself to a given type. When the
//! expression is a conditional whose branches disagree about assignability, only the offending
//! branch is cast. [`availability`] decides whether a [`CastAction`] may be offered (and must be
//! consulted again right before it is invoked, since the tree may have changed in between).

use nova_hir::{ExprId, ExprKind, ExprTree, TreeError, TypeRef};
use nova_types::{
    all_type_vars_resolved, format_type, is_assignable, is_denotable, is_valid_type, ClassId,
    Type, TypeEnv, TypeFormatter,
};
use thiserror::Error;

use crate::config::CastFixConfig;

pub const FAMILY_NAME: &str = "Add type cast";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("expression is detached or has nothing inside its parentheses")]
    MalformedInput,
    #[error("casting to the null type has no effect")]
    NoOpCast,
    #[error("type cannot be written in source")]
    NotDenotable,
    #[error("type mentions type parameters that are not in scope at the insertion site")]
    UnresolvedGenerics,
    #[error("type refers to declarations that no longer exist")]
    InvalidType,
    #[error("cannot cast to void")]
    VoidCast,
    #[error("insertion site is not editable")]
    ReadOnly,
    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Which label an action carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastLabelKind {
    /// `Cast to 'T'`
    Expression,
    /// `Cast qualifier to 'T'`
    Qualifier,
}

/// A proposed cast of `target` to `ty`.
///
/// Invoking an action consumes it: the tree it was computed against changes shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastAction {
    ty: Type,
    type_text: String,
    target: ExprId,
    label: String,
    priority: Priority,
}

impl CastAction {
    pub fn new(env: &dyn TypeEnv, ty: Type, target: ExprId) -> Self {
        Self::with_label_kind(env, ty, target, CastLabelKind::Expression)
    }

    pub fn with_label_kind(
        env: &dyn TypeEnv,
        ty: Type,
        target: ExprId,
        kind: CastLabelKind,
    ) -> Self {
        // A type whose declaration went away has no spelling.
        let type_text = if is_valid_type(env, &ty) {
            format_type(env, &ty)
        } else {
            String::new()
        };
        let label = match kind {
            CastLabelKind::Expression => format!("Cast to '{type_text}'"),
            CastLabelKind::Qualifier => format!("Cast qualifier to '{type_text}'"),
        };
        Self {
            ty,
            type_text,
            target,
            label,
            priority: Priority::High,
        }
    }

    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Canonical (fully qualified) spelling of the cast type.
    #[must_use]
    pub fn type_text(&self) -> &str {
        &self.type_text
    }

    #[must_use]
    pub fn target(&self) -> ExprId {
        self.target
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn family_name(&self) -> &'static str {
        FAMILY_NAME
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[must_use]
    pub fn is_available(&self, tree: &ExprTree, env: &dyn TypeEnv) -> bool {
        is_available(self, tree, env)
    }

    /// Re-check availability against the current tree, then insert the cast.
    pub fn invoke(
        self,
        tree: &mut ExprTree,
        env: &dyn TypeEnv,
        config: &CastFixConfig,
    ) -> Result<ExprId, CastError> {
        availability(&self, tree, env)?;
        add_type_cast(tree, env, self.target, &self.ty, config)
    }
}

/// Why `action` cannot be applied to `tree` right now, if anything.
pub fn availability(
    action: &CastAction,
    tree: &ExprTree,
    env: &dyn TypeEnv,
) -> Result<(), CastError> {
    let site = action.target;
    let ty = &action.ty;

    let result = if !tree.is_attached(site) {
        Err(CastError::MalformedInput)
    } else if !is_valid_type(env, ty) {
        Err(CastError::InvalidType)
    } else if *ty == Type::Void {
        Err(CastError::VoidCast)
    } else if !is_denotable(env, ty) {
        Err(CastError::NotDenotable)
    } else if !all_type_vars_resolved(ty, |param| tree.is_type_param_in_scope(site, param)) {
        Err(CastError::UnresolvedGenerics)
    } else if !tree.is_writable(site) {
        Err(CastError::ReadOnly)
    } else {
        Ok(())
    };

    if let Err(err) = &result {
        tracing::debug!(label = %action.label, ?site, %err, "type cast unavailable");
    }
    result
}

#[must_use]
pub fn is_available(action: &CastAction, tree: &ExprTree, env: &dyn TypeEnv) -> bool {
    availability(action, tree, env).is_ok()
}

/// Replace `original` with a cast of it to `ty` and return the node now occupying its slot.
///
/// That node is the new cast, or the conditional when only one of its branches needed the cast.
/// On error the tree is left exactly as it was.
pub fn add_type_cast(
    tree: &mut ExprTree,
    env: &dyn TypeEnv,
    original: ExprId,
    ty: &Type,
    config: &CastFixConfig,
) -> Result<ExprId, CastError> {
    if !tree.is_attached(original) {
        return Err(CastError::MalformedInput);
    }
    let (expr, ty) = prepare(tree, original, ty)?;

    let mark = tree.mark();
    let result = splice_cast(tree, env, original, expr, &ty, config);
    match &result {
        Ok(replacement) => {
            tracing::debug!(?original, ?replacement, ty = %format_type(env, &ty), "inserted type cast");
        }
        Err(err) => {
            tracing::error!(?original, %err, "failed to insert type cast");
            if let Err(rollback) = tree.rollback_to(mark) {
                tracing::error!(%rollback, "type cast left nodes attached to the tree");
            }
        }
    }
    result
}

/// Build the expression [`add_type_cast`] would put at `original`, as a new detached subtree.
///
/// The tree's attached nodes are not touched; the subtree is built from a copy of `original`.
pub fn create_cast_expression(
    tree: &mut ExprTree,
    env: &dyn TypeEnv,
    original: ExprId,
    ty: &Type,
    config: &CastFixConfig,
) -> Result<ExprId, CastError> {
    let (expr, ty) = prepare(tree, original, ty)?;

    let mark = tree.mark();
    let result = build_detached(tree, env, expr, &ty, config);
    if result.is_err() {
        tree.rollback_to(mark)?;
    }
    result
}

fn prepare(tree: &ExprTree, original: ExprId, ty: &Type) -> Result<(ExprId, Type), CastError> {
    let expr = tree
        .deparenthesize(original)
        .ok_or(CastError::MalformedInput)?;
    if *ty == Type::Null {
        return Err(CastError::NoOpCast);
    }
    Ok((expr, ty.to_array_type()))
}

fn splice_cast(
    tree: &mut ExprTree,
    env: &dyn TypeEnv,
    original: ExprId,
    expr: ExprId,
    ty: &Type,
    config: &CastFixConfig,
) -> Result<ExprId, CastError> {
    let (cast, placeholder) = cast_template(tree, env, ty, config)?;

    if let Some(branch) = branch_needing_cast(tree, env, expr, ty) {
        let conditional = tree.copy_subtree(expr)?;
        cast_branch(tree, conditional, branch, cast, placeholder)?;
        tracing::trace!(?branch, "cast a single conditional branch");
        // Everything above only touched new nodes.
        tree.replace(original, conditional)?;
        return Ok(conditional);
    }

    tree.replace(original, cast)?;
    if expr != original {
        // Leaves the old parentheses behind, detached.
        tree.detach(expr)?;
    }
    tree.replace(placeholder, expr)?;
    Ok(cast)
}

fn build_detached(
    tree: &mut ExprTree,
    env: &dyn TypeEnv,
    expr: ExprId,
    ty: &Type,
    config: &CastFixConfig,
) -> Result<ExprId, CastError> {
    let (cast, placeholder) = cast_template(tree, env, ty, config)?;
    let value = tree.copy_subtree(expr)?;

    if let Some(branch) = branch_needing_cast(tree, env, value, ty) {
        cast_branch(tree, value, branch, cast, placeholder)?;
        return Ok(value);
    }
    tree.replace(placeholder, value)?;
    Ok(cast)
}

/// A detached `(T) <placeholder>` node and its placeholder operand.
///
/// The type is spelled against the tree's import scope, so the result is only meaningful at a
/// location of this tree.
fn cast_template(
    tree: &mut ExprTree,
    env: &dyn TypeEnv,
    ty: &Type,
    config: &CastFixConfig,
) -> Result<(ExprId, ExprId), CastError> {
    let text = cast_type_text(tree, env, ty, config);
    let placeholder = tree.name("expr");
    let cast = tree.alloc(ExprKind::Cast {
        ty: TypeRef::new(ty.clone(), text),
        operand: Some(placeholder),
        spaced: config.space_after_type_cast,
    })?;

    match tree.get(cast) {
        Some(ExprKind::Cast {
            operand: Some(operand),
            ..
        }) if *operand == placeholder => Ok((cast, placeholder)),
        _ => Err(CastError::Invariant("cast template has no operand")),
    }
}

fn cast_type_text(tree: &ExprTree, env: &dyn TypeEnv, ty: &Type, config: &CastFixConfig) -> String {
    let scope = tree.import_scope();
    let shortest = |id: ClassId, binary_name: &str| scope.shortest_class_name(env, id, binary_name);
    let separator = if config.space_after_comma_in_type_args {
        ", "
    } else {
        ","
    };

    let formatter = TypeFormatter::new(env).with_arg_separator(separator);
    if config.shorten_class_references {
        formatter.with_class_names(&shortest).format(ty)
    } else {
        formatter.format(ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Then,
    Else,
}

/// The one branch of conditional `expr` that isn't assignable to `ty`.
///
/// `None` unless `expr` is a conditional and exactly one branch needs the cast. A branch
/// without a known type counts as needing it.
fn branch_needing_cast(
    tree: &ExprTree,
    env: &dyn TypeEnv,
    expr: ExprId,
    ty: &Type,
) -> Option<Branch> {
    let ExprKind::Conditional {
        then_branch,
        else_branch,
        ..
    } = tree.get(expr)?
    else {
        return None;
    };
    let needs_cast = |branch: ExprId| {
        !tree
            .ty_in(branch, env)
            .is_some_and(|branch_ty| is_assignable(env, ty, &branch_ty))
    };

    match (needs_cast(*then_branch), needs_cast(*else_branch)) {
        (true, false) => Some(Branch::Then),
        (false, true) => Some(Branch::Else),
        _ => None,
    }
}

/// Move `branch` of the detached `conditional` into the cast operand and put the cast there.
fn cast_branch(
    tree: &mut ExprTree,
    conditional: ExprId,
    branch: Branch,
    cast: ExprId,
    placeholder: ExprId,
) -> Result<(), CastError> {
    let Some(ExprKind::Conditional {
        then_branch,
        else_branch,
        ..
    }) = tree.get(conditional)
    else {
        return Err(CastError::Invariant("copied conditional is not a conditional"));
    };
    let value = match branch {
        Branch::Then => *then_branch,
        Branch::Else => *else_branch,
    };

    tree.replace(value, cast)?;
    tree.replace(placeholder, value)?;
    Ok(())
}
